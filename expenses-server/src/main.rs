use expenses_common::ai::clients::disabled::DisabledGenerator;
use expenses_common::ai::clients::gemini::GeminiClient;
use expenses_common::ai::GenerateText;
use expenses_common::db::memory::MemoryStore;
use expenses_common::db::{self, BudgetStore, ExpenseStore};

use actix_web::web::Data;
use actix_web::{App, HttpServer};
use flexi_logger::{
    Age, Cleanup, Criterion, Duplicate, FileSpec, LogSpecification, Logger, Naming, WriteMode,
};
use std::sync::Arc;

use crate::env::StorageBackend;

mod env;
mod handlers;
mod middleware;
mod services;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let mut port = 5001u16;
    let mut bind_addr = String::from("127.0.0.1");

    let mut args = std::env::args();

    // Eat the first argument, which is the relative path to the executable
    args.next();

    while let Some(arg) = args.next() {
        match arg.to_lowercase().as_str() {
            "--port" => {
                let port_str = {
                    let next_arg = args.next();

                    match next_arg {
                        Some(s) => s,
                        None => {
                            eprintln!("ERROR: --port option specified but no port was given");
                            std::process::exit(1);
                        }
                    }
                };

                port = {
                    let port_result = port_str.parse::<u16>();

                    match port_result {
                        Ok(p) => p,
                        Err(_) => {
                            eprintln!("ERROR: Incorrect format for port. Integer expected");
                            std::process::exit(1);
                        }
                    }
                };

                continue;
            }
            "--bind" => {
                bind_addr = match args.next() {
                    Some(a) => a,
                    None => {
                        eprintln!("ERROR: --bind option specified but no address was given");
                        std::process::exit(1);
                    }
                };

                continue;
            }
            a => {
                eprintln!("ERROR: Invalid argument: {}", &a);
                std::process::exit(1);
            }
        }
    }

    let base_addr = format!("{}:{}", &bind_addr, &port);

    let log_spec = match LogSpecification::parse(&env::CONF.log_level) {
        Ok(s) => s,
        Err(_) => {
            eprintln!(
                "WARNING: Invalid log level '{}'. Defaulting to info",
                &env::CONF.log_level
            );
            LogSpecification::info()
        }
    };

    let _logger = Logger::with(log_spec)
        .log_to_file(FileSpec::default().directory("./logs"))
        .rotate(
            Criterion::Age(Age::Day),
            Naming::Timestamps,
            Cleanup::KeepLogAndCompressedFiles(60, 365),
        )
        .cleanup_in_background_thread(true)
        .duplicate_to_stdout(Duplicate::All)
        .write_mode(WriteMode::Async)
        .format(|writer, now, record| {
            write!(
                writer,
                "{:5} | {} | {}:{} | {}",
                record.level(),
                now.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
                record.module_path().unwrap_or("<unknown>"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .use_utc()
        .start()
        .expect("Failed to start logger");

    let actix_workers = env::CONF.actix_worker_count;

    let (budget_store, expense_store): (Arc<dyn BudgetStore>, Arc<dyn ExpenseStore>) =
        match env::CONF.storage {
            StorageBackend::Postgres => {
                log::info!("Connecting to database...");

                // To prevent resource starvation, max connections must be at least as large as
                // the number of actix workers
                let db_max_connections =
                    env::CONF.db_max_connections.max(actix_workers as u32);

                let db_async_pool =
                    db::create_db_async_pool(&env::CONF.database_uri(), db_max_connections).await;

                log::info!("Successfully connected to database");

                let budget_store: Arc<dyn BudgetStore> =
                    Arc::new(db::budget::Dao::new(&db_async_pool));
                let expense_store: Arc<dyn ExpenseStore> =
                    Arc::new(db::expense::Dao::new(&db_async_pool));

                (budget_store, expense_store)
            }
            StorageBackend::Memory => {
                log::warn!("Using in-memory storage. Data will be lost when the server stops.");

                let store = Arc::new(MemoryStore::new());
                let budget_store: Arc<dyn BudgetStore> = store.clone();
                let expense_store: Arc<dyn ExpenseStore> = store;

                (budget_store, expense_store)
            }
        };

    let generator: Arc<dyn GenerateText> = match env::CONF.gemini_api_key.as_deref() {
        Some(api_key) => match GeminiClient::new(api_key, &env::CONF.gemini_model) {
            Ok(client) => {
                log::info!("Assistant enabled using model {}", &env::CONF.gemini_model);
                Arc::new(client)
            }
            Err(e) => {
                log::error!("{e}");
                log::warn!("Assistant disabled. Falling back to rule-based responses.");
                Arc::new(DisabledGenerator)
            }
        },
        None => {
            log::info!("No Gemini API key configured. Assistant uses rule-based responses.");
            Arc::new(DisabledGenerator)
        }
    };

    HttpServer::new(move || {
        App::new()
            .app_data(Data::from(budget_store.clone()))
            .app_data(Data::from(expense_store.clone()))
            .app_data(Data::from(generator.clone()))
            .configure(services::api::configure)
            .wrap(actix_web::middleware::Logger::default())
    })
    .workers(actix_workers)
    .bind(base_addr)?
    .run()
    .await?;

    // Safe because all server threads have been joined
    unsafe {
        env::CONF.zeroize();
    }

    Ok(())
}

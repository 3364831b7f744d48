use actix_web::web::*;

use crate::handlers::error::{json_error_handler, path_error_handler, query_error_handler};

mod ai;
mod analytics;
mod budget;
mod category;
mod expense;
mod health;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.app_data(JsonConfig::default().error_handler(json_error_handler))
        .app_data(PathConfig::default().error_handler(path_error_handler))
        .app_data(QueryConfig::default().error_handler(query_error_handler))
        .service(
            scope("/api")
                .configure(budget::configure)
                .configure(expense::configure)
                .configure(category::configure)
                .configure(analytics::configure)
                .configure(ai::configure)
                .configure(health::configure),
        );
}

use base64::engine::general_purpose::STANDARD as b64;
use base64::Engine;
use once_cell::sync::Lazy;
use std::cell::UnsafeCell;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use zeroize::{Zeroize, Zeroizing};

#[cfg(not(test))]
pub static CONF: Lazy<Config> = Lazy::new(|| Config::from_env().expect("Failed to load config"));

#[cfg(test)]
pub static CONF: Lazy<Config> = Lazy::new(Config::for_tests);

const DB_USERNAME_VAR: &str = "EXPENSES_DB_USERNAME";
const DB_PASSWORD_VAR: &str = "EXPENSES_DB_PASSWORD";
const DB_HOSTNAME_VAR: &str = "EXPENSES_DB_HOSTNAME";
const DB_PORT_VAR: &str = "EXPENSES_DB_PORT";
const DB_NAME_VAR: &str = "EXPENSES_DB_NAME";
const DB_MAX_CONNECTIONS_VAR: &str = "EXPENSES_DB_MAX_CONNECTIONS";
const STORAGE_VAR: &str = "EXPENSES_STORAGE";

const TOKEN_SIGNING_KEY_VAR: &str = "EXPENSES_TOKEN_SIGNING_KEY_B64";
const GEMINI_API_KEY_VAR: &str = "EXPENSES_GEMINI_API_KEY";
const GEMINI_MODEL_VAR: &str = "EXPENSES_GEMINI_MODEL";
const HEALTH_ENDPOINT_KEY_VAR: &str = "EXPENSES_HEALTH_ENDPOINT_KEY";

const ACTIX_WORKER_COUNT_VAR: &str = "EXPENSES_ACTIX_WORKER_COUNT";
const LOG_LEVEL_VAR: &str = "EXPENSES_LOG_LEVEL";

const MIN_TOKEN_SIGNING_KEY_SIZE: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Zeroize)]
pub struct ConfigInner {
    #[zeroize(skip)]
    pub storage: StorageBackend,
    pub db_username: String,
    pub db_password: String,
    pub db_hostname: String,
    #[zeroize(skip)]
    pub db_port: u16,
    pub db_name: String,
    #[zeroize(skip)]
    pub db_max_connections: u32,

    pub token_signing_key: Vec<u8>,
    pub gemini_api_key: Option<String>,
    #[zeroize(skip)]
    pub gemini_model: String,
    pub health_endpoint_key: String,

    #[zeroize(skip)]
    pub actix_worker_count: usize,

    #[zeroize(skip)]
    pub log_level: String,
}

impl ConfigInner {
    pub fn database_uri(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.db_username, self.db_password, self.db_hostname, self.db_port, self.db_name,
        )
    }
}

pub struct Config {
    inner: UnsafeCell<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        // Safe as long as `unsafe Config::zeroize()` hasn't been called
        unsafe { &*self.inner.get() }
    }
}

// Safe to be shared across threads as long as `unsafe Config::zeroize()` hasn't been called
unsafe impl Sync for Config {}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let token_signing_key = b64
            .decode(Zeroizing::new(env_var::<String>(TOKEN_SIGNING_KEY_VAR)?).as_bytes())
            .map_err(|_| ConfigError::InvalidVar(TOKEN_SIGNING_KEY_VAR))?;

        if token_signing_key.len() < MIN_TOKEN_SIGNING_KEY_SIZE {
            return Err(ConfigError::InvalidVar(TOKEN_SIGNING_KEY_VAR));
        }

        let storage = match std::env::var(STORAGE_VAR) {
            Ok(s) => s.parse().map_err(|_| ConfigError::invalid(STORAGE_VAR))?,
            Err(_) => StorageBackend::Postgres,
        };

        // Database settings only matter when the data lives in Postgres
        let db_var = |key: &'static str| -> Result<String, ConfigError> {
            match storage {
                StorageBackend::Postgres => env_var(key),
                StorageBackend::Memory => Ok(env_var_or(key, String::new())),
            }
        };

        let inner = ConfigInner {
            storage,
            db_username: db_var(DB_USERNAME_VAR)?,
            db_password: db_var(DB_PASSWORD_VAR)?,
            db_hostname: db_var(DB_HOSTNAME_VAR)?,
            db_port: match storage {
                StorageBackend::Postgres => env_var(DB_PORT_VAR)?,
                StorageBackend::Memory => env_var_or(DB_PORT_VAR, 5432),
            },
            db_name: db_var(DB_NAME_VAR)?,
            db_max_connections: env_var_or(DB_MAX_CONNECTIONS_VAR, 48),

            token_signing_key,
            gemini_api_key: std::env::var(GEMINI_API_KEY_VAR)
                .ok()
                .filter(|k| !k.trim().is_empty()),
            gemini_model: env_var_or(
                GEMINI_MODEL_VAR,
                String::from(expenses_common::ai::clients::gemini::DEFAULT_MODEL),
            ),
            health_endpoint_key: env_var(HEALTH_ENDPOINT_KEY_VAR)?,

            actix_worker_count: env_var_or(ACTIX_WORKER_COUNT_VAR, num_cpus::get()),

            log_level: env_var_or(LOG_LEVEL_VAR, String::from("info")),
        };

        Ok(Config {
            inner: UnsafeCell::new(inner),
        })
    }

    #[cfg(test)]
    fn for_tests() -> Config {
        let inner = ConfigInner {
            storage: StorageBackend::Memory,
            db_username: String::new(),
            db_password: String::new(),
            db_hostname: String::new(),
            db_port: 5432,
            db_name: String::new(),
            db_max_connections: 4,

            token_signing_key: vec![7; 64],
            gemini_api_key: None,
            gemini_model: String::from(expenses_common::ai::clients::gemini::DEFAULT_MODEL),
            health_endpoint_key: String::from("test-health-key-0123456789"),

            actix_worker_count: 1,

            log_level: String::from("info"),
        };

        Config {
            inner: UnsafeCell::new(inner),
        }
    }

    /// # Safety
    ///
    /// Safe only if the Config isn't being used by other threads or across an async
    /// boundary. Generally, this should only be used at the end of the main function once
    /// all threads have been joined.
    pub unsafe fn zeroize(&self) {
        unsafe {
            (*self.inner.get()).zeroize();
        }
    }
}

fn env_var<T: FromStr>(key: &'static str) -> Result<T, ConfigError> {
    let var = std::env::var(key).map_err(|_| ConfigError::missing(key))?;
    let var: T = var.parse().map_err(|_| ConfigError::invalid(key))?;
    Ok(var)
}

fn env_var_or<T: FromStr>(key: &'static str, default: T) -> T {
    let Ok(var) = std::env::var(key) else {
        return default;
    };

    var.parse().unwrap_or(default)
}

#[derive(Clone, Copy, Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar(&'static str),
}

impl ConfigError {
    fn missing(var_name: &'static str) -> Self {
        Self::MissingVar(var_name)
    }

    fn invalid(var_name: &'static str) -> Self {
        Self::InvalidVar(var_name)
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(key) => write!(f, "Missing environment variable '{}'", key),
            Self::InvalidVar(key) => write!(f, "Environment variable '{}' is invalid", key),
        }
    }
}

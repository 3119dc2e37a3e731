use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub static_dir: String,
}

impl AppConfig {
    /// Reads settings from the environment. `.env` is loaded first when present.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        let defaults = AppConfig::default();
        AppConfig {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            static_dir: env::var("STATIC_DIR").unwrap_or(defaults.static_dir),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: "sqlite://library.db".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            static_dir: "static".to_string(),
        }
    }
}

use serde::{Deserialize, Serialize};

const DEFAULT_API_URL_DEVELOPMENT: &str = "http://localhost:8080/api";
const DEFAULT_API_URL_PRODUCTION: &str = "https://api.moneymapper.app/api";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_base_url_development: String,
    pub api_base_url_production: String,
    pub environment: String,
    pub enable_logging: bool,
    pub log_level: String,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Freshness window for non-forced refetches
    pub cache_seconds: u32,
    /// 0 disables the background refresh timer
    pub auto_refresh_seconds: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            cache_seconds: 30,
            auto_refresh_seconds: 0,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url_development: DEFAULT_API_URL_DEVELOPMENT.to_string(),
            api_base_url_production: DEFAULT_API_URL_PRODUCTION.to_string(),
            environment: "development".to_string(),
            enable_logging: true,
            log_level: "info".to_string(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration from compile-time environment variables (see build.rs)
    pub fn from_env() -> Self {
        Self {
            api_base_url_development: option_env!("API_BASE_URL_DEVELOPMENT")
                .unwrap_or(DEFAULT_API_URL_DEVELOPMENT)
                .to_string(),
            api_base_url_production: option_env!("API_BASE_URL_PRODUCTION")
                .unwrap_or(DEFAULT_API_URL_PRODUCTION)
                .to_string(),
            environment: option_env!("ENVIRONMENT").unwrap_or("development").to_string(),
            enable_logging: option_env!("ENABLE_LOGGING")
                .unwrap_or("true")
                .parse()
                .unwrap_or(true),
            log_level: option_env!("LOG_LEVEL").unwrap_or("info").to_string(),
            dashboard: DashboardConfig {
                cache_seconds: option_env!("DASHBOARD_CACHE_SECONDS")
                    .unwrap_or("30")
                    .parse()
                    .unwrap_or(30),
                auto_refresh_seconds: option_env!("DASHBOARD_AUTO_REFRESH_SECONDS")
                    .unwrap_or("0")
                    .parse()
                    .unwrap_or(0),
            },
        }
    }

    /// API base URL for the current environment
    pub fn api_base_url(&self) -> &str {
        match self.environment.as_str() {
            "production" => &self.api_base_url_production,
            _ => &self.api_base_url_development,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Log level for wasm_logger, `info` when unrecognised
    pub fn log_level(&self) -> log::Level {
        match self.log_level.to_ascii_lowercase().as_str() {
            "error" => log::Level::Error,
            "warn" => log::Level::Warn,
            "debug" => log::Level::Debug,
            "trace" => log::Level::Trace,
            _ => log::Level::Info,
        }
    }

    /// Freshness window in milliseconds
    pub fn dashboard_cache_ms(&self) -> f64 {
        f64::from(self.dashboard.cache_seconds) * 1000.0
    }
}

lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}

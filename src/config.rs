use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Wi-Fi mapping backend
    pub api_base_url: String,
    // Prefix for relative floor plan image URLs, as reachable from the browser
    pub public_api_base_url: String,
    pub api_token: Option<Secret<String>>,
    pub request_timeout_secs: u64,

    // Dashboard server
    pub host: String,
    pub port: u16,
    pub cookie_secure: bool,
    pub max_upload_bytes: usize,

    // Views
    pub admin_refresh_secs: u64,
    pub user_refresh_secs: u64,
    pub raw_scan_limit: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for local development)
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .build()?;

        Self::from_source(&config)
    }

    pub fn from_source(config: &config::Config) -> Result<Self, config::ConfigError> {
        let api_base_url: String = config
            .get("api_base_url")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());

        Ok(Self {
            public_api_base_url: config
                .get("public_api_base_url")
                .unwrap_or_else(|_| api_base_url.clone()),
            api_base_url,
            api_token: config.get::<String>("api_token").ok().map(Secret::new),
            request_timeout_secs: get_or(config, "request_timeout_secs", 10)?,

            host: config.get("host").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: get_or(config, "port", 3000)?,
            cookie_secure: get_or(config, "cookie_secure", false)?,
            max_upload_bytes: get_or(config, "max_upload_bytes", 10 * 1024 * 1024)?,

            admin_refresh_secs: get_or(config, "admin_refresh_secs", 10)?,
            user_refresh_secs: get_or(config, "user_refresh_secs", 5)?,
            raw_scan_limit: get_or(config, "raw_scan_limit", 100)?,
        })
    }
}

/// Reads `key`, falling back to `default` when it is unset. A value that is
/// set but cannot be parsed is still an error.
fn get_or<'de, T: Deserialize<'de>>(
    config: &config::Config,
    key: &str,
    default: T,
) -> Result<T, config::ConfigError> {
    match config.get::<T>(key) {
        Ok(value) => Ok(value),
        Err(config::ConfigError::NotFound(_)) => Ok(default),
        Err(e) => Err(e),
    }
}

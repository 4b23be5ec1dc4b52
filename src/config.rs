use std::env;
use thiserror::Error;

pub const DEFAULT_STORE_API_URL: &str = "https://api.cosmicjs.com/v3";
pub const DEFAULT_MAIL_API_URL: &str = "https://api.mailgun.net/v3";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Failed to parse {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub api_url: String,
    pub bucket_slug: String,
    pub read_key: String,
    pub write_key: String,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub domain: String,
    pub from_email: String,
    /// Base for links inside emails (tracking, unsubscribe, "view all").
    pub app_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let optional = |key: &'static str| {
            get(key).unwrap_or_else(|| {
                log::warn!("{} is not set; storage calls will fail", key);
                String::new()
            })
        };

        let host = get("RL_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match get("RL_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "RL_PORT", value })?,
            None => 8080,
        };
        log::info!("Using bind address {}:{}", host, port);

        let store = StoreConfig {
            api_url: get("COSMIC_API_URL").unwrap_or_else(|| DEFAULT_STORE_API_URL.to_string()),
            bucket_slug: optional("COSMIC_BUCKET_SLUG"),
            read_key: optional("COSMIC_READ_KEY"),
            write_key: optional("COSMIC_WRITE_KEY"),
        };

        let mail = MailConfig {
            api_url: get("MAILGUN_API_URL").unwrap_or_else(|| DEFAULT_MAIL_API_URL.to_string()),
            api_key: required("MAILGUN_API_KEY")?,
            domain: required("MAILGUN_DOMAIN")?,
            from_email: required("MAILGUN_FROM_EMAIL")?,
            app_url: get("APP_URL").unwrap_or_else(|| format!("http://localhost:{}", port)),
        };

        Ok(AppConfig {
            server: ServerConfig { host, port },
            store,
            mail,
        })
    }
}

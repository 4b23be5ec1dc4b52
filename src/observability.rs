use crate::config::AppConfig;
use serde::Serialize;
use std::time::SystemTime;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging settings read from the environment
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_format: String,
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
        }
    }

    pub fn is_json(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// Initialize structured logging and tracing. `log` records are forwarded
/// into the same subscriber.
pub fn init_logging(config: &ObservabilityConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.is_json() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }

    info!(
        service = "readlater",
        version = env!("CARGO_PKG_VERSION"),
        log_level = %config.log_level,
        log_format = %config.log_format,
        "Logging initialized"
    );
}

/// Report served on `/health`. Only local configuration is inspected; the
/// bucket and mail provider are not contacted.
#[derive(Clone, Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

#[derive(Clone, Debug, Serialize)]
pub struct HealthChecks {
    pub storage: &'static str,
    pub email: &'static str,
}

impl HealthStatus {
    pub fn check(started: SystemTime, config: &AppConfig) -> Self {
        let storage = if config.store.bucket_slug.is_empty() || config.store.read_key.is_empty() {
            "unconfigured"
        } else {
            "configured"
        };
        let email = if config.mail.api_key.is_empty() {
            "unconfigured"
        } else {
            "configured"
        };

        Self {
            status: if storage == "configured" && email == "configured" {
                "healthy"
            } else {
                "degraded"
            },
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds: started.elapsed().map(|d| d.as_secs()).unwrap_or(0),
            checks: HealthChecks { storage, email },
        }
    }
}

/// Structured logging macros for consistent log format
#[macro_export]
macro_rules! log_user_action {
    ($user_id:expr, $action:expr, $details:tt) => {
        tracing::info!(
            user_id = %$user_id,
            action = $action,
            details = %serde_json::json!($details),
            "User action performed"
        );
    };
}

#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:tt) => {
        tracing::error!(
            error = %$error,
            context = %serde_json::json!($context),
            "Application error occurred"
        );
    };
}

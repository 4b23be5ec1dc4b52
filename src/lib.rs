pub mod api;
pub mod config;
pub mod email;
pub mod errors;
pub mod filters;
pub mod models;
pub mod observability;
pub mod security;
pub mod storage;
pub mod utils;

use actix_web::web;
use config::AppConfig;
use email::EmailService;
use std::time::SystemTime;
use storage::BucketClient;

/// Process-wide clients, built once from config and shared read-only.
pub struct AppState {
    pub store: BucketClient,
    pub mailer: EmailService,
    pub config: AppConfig,
    pub started: SystemTime,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            store: BucketClient::new(&config.store),
            mailer: EmailService::new(&config.mail),
            config,
            started: SystemTime::now(),
        }
    }
}

pub type RqState = web::Data<AppState>;

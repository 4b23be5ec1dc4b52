use super::{articles, test_email, users};
use crate::errors::AppError;
use actix_web::{web, Scope};

/// Malformed JSON bodies and query strings get the same error envelope as
/// everything else.
fn extractor_config() -> (web::JsonConfig, web::QueryConfig) {
    let json = web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::invalid_input("body", &err.to_string()).into());
    let query = web::QueryConfig::default()
        .error_handler(|err, _req| AppError::invalid_input("query", &err.to_string()).into());
    (json, query)
}

pub fn routes() -> Scope {
    let (json, query) = extractor_config();
    web::scope("/api")
        .app_data(json)
        .app_data(query)
        .service(test_email::routes())
        .service(articles::routes())
        .service(users::routes())
}

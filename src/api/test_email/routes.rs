use super::handlers;
use actix_web::{web, Scope};

pub fn routes() -> Scope {
    web::scope("/test-email").service(handlers::send_test_email)
}

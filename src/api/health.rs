use crate::observability::HealthStatus;
use crate::RqState;
use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

/// Health check endpoint for load balancers
#[get("")]
pub async fn health_check(state: RqState) -> impl Responder {
    let health = HealthStatus::check(state.started, &state.config);
    HttpResponse::Ok().json(health)
}

/// Liveness check - simple check to see if the app is alive
#[get("/live")]
pub async fn liveness_check() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn routes() -> actix_web::Scope {
    web::scope("/health")
        .service(health_check)
        .service(liveness_check)
}

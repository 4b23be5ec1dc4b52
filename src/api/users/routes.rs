use super::handlers;
use actix_web::{web, Scope};

pub fn routes() -> Scope {
    web::scope("/users")
        .service(handlers::find_user)
        .service(handlers::create_user)
        .service(handlers::update_user)
        .service(handlers::get_shared_lists)
        .service(handlers::get_stats)
        .service(handlers::send_digest)
}

use super::handlers;
use actix_web::{web, Scope};

pub fn routes() -> Scope {
    // literal paths before the `{slug}` catch-all
    web::scope("/articles")
        .service(handlers::search_articles)
        .service(handlers::bulk_update)
        .service(handlers::list_articles)
        .service(handlers::create_article)
        .service(handlers::get_article)
        .service(handlers::update_article)
        .service(handlers::delete_article)
}

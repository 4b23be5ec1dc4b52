#![allow(dead_code)]

use actix_web::{web, App};
use httpmock::MockServer;
use readlater::{
    api,
    config::{AppConfig, MailConfig, ServerConfig, StoreConfig},
    security::SecurityHeaders,
    AppState,
};

pub const BUCKET: &str = "test-bucket";
pub const READ_KEY: &str = "read-key";
pub const WRITE_KEY: &str = "write-key";
pub const MAIL_DOMAIN: &str = "mg.example.com";

pub fn objects_path() -> String {
    format!("/v3/buckets/{}/objects", BUCKET)
}

pub fn object_path(id: &str) -> String {
    format!("{}/{}", objects_path(), id)
}

pub fn messages_path() -> String {
    format!("/v3/{}/messages", MAIL_DOMAIN)
}

/// Config pointing both outbound APIs at local mock servers.
pub fn test_config(bucket: &MockServer, mail: &MockServer) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        },
        store: StoreConfig {
            api_url: bucket.url("/v3"),
            bucket_slug: BUCKET.to_string(),
            read_key: READ_KEY.to_string(),
            write_key: WRITE_KEY.to_string(),
        },
        mail: MailConfig {
            api_url: mail.url("/v3"),
            api_key: "key-test".to_string(),
            domain: MAIL_DOMAIN.to_string(),
            from_email: "Read Later <digest@mg.example.com>".to_string(),
            app_url: "https://read.example.com".to_string(),
        },
    }
}

pub fn create_test_app(
    bucket: &MockServer,
    mail: &MockServer,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        Config = (),
        InitError = (),
    >,
> {
    let state = web::Data::new(AppState::new(test_config(bucket, mail)));

    App::new()
        .app_data(state)
        .wrap(SecurityHeaders)
        .service(api::health::routes())
        .service(api::routes())
}

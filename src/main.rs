use actix_cors::Cors;
use actix_governor::Governor;
use actix_web::{middleware, web, App, HttpServer};
use clap::Parser;
use dotenvy::dotenv;
use readlater::config::AppConfig;
use readlater::email::placeholder_articles;
use readlater::observability::{init_logging, ObservabilityConfig};
use readlater::{api, security, AppState};
use std::io;

/// CLI options
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Send a test digest of placeholder articles to this address and exit
    #[clap(long, value_name = "EMAIL")]
    send_test_email: Option<String>,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    init_logging(&ObservabilityConfig::from_env());

    let args = Args::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let state = web::Data::new(AppState::new(config));

    if let Some(recipient) = args.send_test_email {
        return cli_send_test_email(&state, &recipient).await;
    }

    run_server(state).await
}

async fn cli_send_test_email(state: &AppState, recipient: &str) -> io::Result<()> {
    if let Err(e) = security::validation::validate_email(recipient) {
        println!("Invalid email address: {}", e);
        return Ok(());
    }

    match state
        .mailer
        .send_test_digest_email(recipient, &placeholder_articles(), None)
        .await
    {
        Ok(message_id) => {
            println!("Test email sent to {} (message id {})", recipient, message_id);
            Ok(())
        }
        Err(e) => {
            println!("Failed to send test email: {}", e);
            Err(io::Error::new(io::ErrorKind::Other, e.to_string()))
        }
    }
}

async fn run_server(state: web::Data<AppState>) -> io::Result<()> {
    let host = state.config.server.host.clone();
    let port = state.config.server.port;
    let rate_limiter = security::create_rate_limiter().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "invalid rate limiter settings")
    })?;

    tracing::info!("Starting server at http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::new(
                middleware::TrailingSlash::Trim,
            ))
            .wrap(security::SecurityHeaders)
            .wrap(cors)
            .app_data(state.clone())
            .service(api::health::routes()) // no rate limiting
            .service(api::routes().wrap(Governor::new(&rate_limiter)))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

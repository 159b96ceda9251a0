use std::time::Instant;

use actix_web::{
    middleware::{from_fn, Logger},
    web, App, HttpServer,
};
use env_logger::Env;
use log::{debug, info};

use crate::{
    config::{Config, Environment},
    errors::AppError,
    middleware::{request_id, IdentityCookie, VisitorIdentity},
    routes, services,
    types::{AppState, Result},
};

// Setup logging with custom format and configuration
fn setup_logging(config: &Config) -> Result<()> {
    let log_level = match config.app.environment {
        Environment::Development => config.app.log_level.clone(),
        Environment::Testing => "debug,actix_web=info".to_string(),
        Environment::Production => "info,actix_web=warn".to_string(),
    };

    let env = Env::default()
        .filter_or("RUST_LOG", log_level)
        .write_style_or("RUST_LOG_STYLE", "always");

    env_logger::try_init_from_env(env)
        .map_err(|e| AppError::Logger(format!("Failed to initialize logger: {}", e)))
}

pub async fn server() -> Result<()> {
    let config = Config::load()?;

    setup_logging(&config)?;

    // Capture start time for uptime calculation
    let start_time = Instant::now();

    info!("Starting {} v{}", config.app.name, config.app.version);
    info!("Environment: {:?}", config.app.environment);
    info!(
        "Binding to {}:{} with {} workers",
        config.server.host, config.server.port, config.server.workers
    );

    if config.app.environment == Environment::Development {
        debug!("Debug logging enabled");
        debug!("Full configuration: {:?}", config);
    }

    // One generator for the whole process, shared by every worker
    let resolver = services::identity_resolver(&config.identity);
    let identity_cookie = IdentityCookie::from(&config.identity);

    let log_format = if config.app.environment == Environment::Production {
        "%a \"%r\" %s %b %T"
    } else {
        "%a \"%r\" %s %b %T \"%{Referer}i\" \"%{User-Agent}i\" %{X-Request-ID}o"
    };

    let version = config.app.version.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(AppState {
                start_time,
                version: version.clone(),
            }))
            .wrap(VisitorIdentity::new(
                resolver.clone(),
                identity_cookie.clone(),
            ))
            .wrap(from_fn(request_id))
            .wrap(Logger::new(log_format))
            .configure(routes::configure_routes)
    })
    .workers(config.server.workers)
    .bind((config.server.host.to_string(), config.server.port))?
    .run()
    .await?;

    Ok(())
}

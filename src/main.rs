use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use teamforge::cache::{CachedUserRepository, RedisCache};
use teamforge::config::Config;
use teamforge::notify::{HttpMailer, LogMailer, Notifier};
use teamforge::repository::PgRepository;
use teamforge::services::ServiceSettings;
use teamforge::{routes, AppState, Ports};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(to_io)?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(config.request_timeout)
        .connect(&config.database_url)
        .await
        .map_err(to_io)?;
    let store = Arc::new(PgRepository::new(pool));
    store.migrate().await.map_err(to_io)?;

    let mut ports = Ports::shared(store);
    if let Some(url) = &config.redis_url {
        match RedisCache::connect(url).await {
            Ok(cache) => {
                log::info!("user cache enabled");
                let cached = CachedUserRepository::new(
                    ports.users.clone(),
                    Arc::new(cache),
                    config.cache_ttl,
                );
                ports = ports.with_users(Arc::new(cached));
            }
            Err(e) => log::warn!("redis unavailable, running without cache: {}", e),
        }
    }

    let notifier: Arc<dyn Notifier> = match &config.mail_service_url {
        Some(url) => Arc::new(HttpMailer::new(url.clone())),
        None => {
            log::warn!("MAIL_SERVICE_URL not set, verification links are only logged");
            Arc::new(LogMailer)
        }
    };

    let state = web::Data::new(AppState::new(
        ports,
        notifier,
        ServiceSettings::from(&config),
    ));

    // Starts the uptime clock.
    let _ = routes::health::HealthReport::now();
    let allowed_origins = config.cors_allowed_origins.clone();
    log::info!("CORS origins: {}", allowed_origins.join(", "));
    log::info!("Starting server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(routes::cors(&allowed_origins))
            .app_data(state.clone())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}

fn to_io<E: std::fmt::Display>(error: E) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, error.to_string())
}

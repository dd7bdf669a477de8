use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;

use taskforge::auth::{AuthService, PasswordHasher, TokenCodec};
use taskforge::config::Config;
use taskforge::request_id::RequestIdMiddleware;
use taskforge::store::PgStore;
use taskforge::todos::TodoService;

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    log::error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("invalid configuration", e))?;
    if config.jwt.uses_placeholder_secret() {
        log::warn!("JWT_SECRET is not set; using the development placeholder secret");
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(|e| startup_error("failed to connect to database", e))?;

    let store = PgStore::new(pool);
    store
        .migrate()
        .await
        .map_err(|e| startup_error("failed to run migrations", e))?;
    let store = Arc::new(store);

    let hasher = PasswordHasher::new(config.bcrypt_cost)
        .map_err(|e| startup_error("failed to initialize password hasher", e))?;
    let codec = Arc::new(TokenCodec::new(&config.jwt));

    let auth = web::Data::new(AuthService::new(store.clone(), hasher, codec));
    let todos = web::Data::new(TodoService::new(store));

    log::info!("Starting TaskForge server at {}", config.server_url());

    HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .expose_headers(["x-request-id"])
                    .max_age(3600),
            )
            .wrap(Logger::new(r#"%{x-request-id}o "%r" %s %b %T"#))
            .configure(|cfg| taskforge::configure_app(cfg, auth.clone(), todos.clone()))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}

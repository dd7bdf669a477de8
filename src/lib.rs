#![doc = "The `taskforge` library crate."]
#![doc = ""]
#![doc = "Authentication (password hashing, bearer tokens, the authorization gate),"]
#![doc = "ownership-scoped todo operations, persistence backends, routing and error"]
#![doc = "handling. The binary (`main.rs`) wires these together against PostgreSQL;"]
#![doc = "the integration tests wire them against `store::MemoryStore`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod request_id;
pub mod response;
pub mod routes;
pub mod store;
pub mod todos;

use actix_web::web;

use crate::auth::{AuthMiddleware, AuthService};
use crate::todos::TodoService;

/// Registers the services, extractor error handlers, the public health probe and
/// the gated `/api` scope.
///
/// Outer middleware (CORS, request id, access log) is left to the caller, since
/// `App::wrap` changes the app's type.
pub fn configure_app(
    cfg: &mut web::ServiceConfig,
    auth: web::Data<AuthService>,
    todos: web::Data<TodoService>,
) {
    let codec = auth.codec();
    cfg.app_data(auth)
        .app_data(todos)
        .configure(routes::extractor_config)
        .service(routes::health::health)
        .service(
            web::scope("/api")
                .wrap(AuthMiddleware::new(codec))
                .configure(routes::config),
        );
}

pub mod auth;
pub mod health;
pub mod todos;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::error::AppError;

/// Mounts the `/api` routes. The caller wraps the enclosing scope with
/// `AuthMiddleware`.
///
/// `/todos/stats` is registered before `/todos/{id}` so it is not captured as an id.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login)
            .service(auth::profile)
            .service(auth::refresh),
    )
    .service(
        web::scope("/todos")
            .service(todos::create_todo)
            .service(todos::list_todos)
            .service(todos::todo_stats)
            .service(todos::get_todo)
            .service(todos::update_todo)
            .service(todos::delete_todo),
    );
}

/// Decoding failures for JSON bodies, paths and query strings all render as
/// enveloped `400 BAD_REQUEST` responses.
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::PathConfig::default().error_handler(|err, _req| {
            AppError::BadRequest(format!("Invalid path parameter: {}", err)).into()
        }))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            AppError::BadRequest(format!("Invalid query string: {}", err)).into()
        }));
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
        JsonPayloadError::Deserialize(e) => format!("Invalid JSON: {}", e),
        other => format!("Invalid request body: {}", other),
    };
    AppError::BadRequest(message).into()
}

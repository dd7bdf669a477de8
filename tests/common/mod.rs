#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web, App, Error};
use serde_json::{json, Value};
use std::sync::Arc;

use taskforge::auth::{AuthService, PasswordHasher, TokenCodec};
use taskforge::config::JwtConfig;
use taskforge::request_id::RequestIdMiddleware;
use taskforge::store::MemoryStore;
use taskforge::todos::TodoService;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "password123";

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_SECRET.to_string(),
        expiry_secs: 3600,
        issuer: "todo-api".to_string(),
    }
}

/// The full application over `store`, with bcrypt cost 4.
pub async fn spawn_app(
    store: MemoryStore,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    let store = Arc::new(store);
    let hasher = PasswordHasher::new(4).unwrap();
    let codec = Arc::new(TokenCodec::new(&jwt_config()));
    let auth = web::Data::new(AuthService::new(store.clone(), hasher, codec));
    let todos = web::Data::new(TodoService::new(store));

    test::init_service(
        App::new()
            .wrap(RequestIdMiddleware)
            .configure(|cfg| taskforge::configure_app(cfg, auth, todos)),
    )
    .await
}

/// Sends `req` and returns the status and the JSON body (`Null` when empty).
pub async fn send<S, B>(app: &S, req: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Registers `email` with `PASSWORD` and returns `(user id, token)`.
pub async fn register<S, B>(app: &S, email: &str) -> (i64, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

    let id = body["data"]["user"]["id"].as_i64().unwrap();
    let token = body["data"]["token"].as_str().unwrap().to_string();
    (id, token)
}

/// Creates a todo with `title` as the owner of `token` and returns its id.
pub async fn create_todo<S, B>(app: &S, token: &str, title: &str) -> i64
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        test::TestRequest::post()
            .uri("/api/todos")
            .insert_header(bearer(token))
            .set_json(json!({ "title": title })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body["data"]["id"].as_i64().unwrap()
}

//! Per-request correlation id.
//!
//! Every request gets a fresh UUID v4, stored in request extensions and echoed
//! back in the `X-Request-ID` response header, where the access log picks it up.
//! Server errors get an extra warning prefixed with the first eight characters
//! of the id.

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl FromRequest for RequestId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    /// Falls back to an empty id when the middleware is not mounted.
    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let id = req
            .extensions()
            .get::<RequestId>()
            .cloned()
            .unwrap_or_else(|| RequestId(String::new()));
        ready(Ok(id))
    }
}

pub struct RequestIdMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestIdMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdMiddlewareService { service }))
    }
}

pub struct RequestIdMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestIdMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = RequestId(Uuid::new_v4().to_string());
        let method = req.method().clone();
        let path = req.path().to_owned();

        req.extensions_mut().insert(request_id.clone());
        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            let status = res.status();

            if status.is_server_error() {
                log::warn!(
                    "[{}] {} {} failed with {}",
                    request_id.short(),
                    method,
                    path,
                    status
                );
            }

            if let Ok(value) = HeaderValue::from_str(&request_id.0) {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test as actix_test, web, App, HttpResponse};

    async fn echo(id: RequestId) -> HttpResponse {
        HttpResponse::Ok().body(id.0)
    }

    #[actix_rt::test]
    async fn test_request_id_is_exposed_to_handler_and_header() {
        let app = actix_test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .route("/echo", web::get().to(echo)),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/echo").to_request();
        let resp = actix_test::call_service(&app, req).await;
        let header = resp
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .unwrap();
        let body = actix_test::read_body(resp).await;

        assert_eq!(body, header.as_bytes());
        assert!(Uuid::parse_str(&header).is_ok());
    }

    #[actix_rt::test]
    async fn test_each_request_gets_a_new_id() {
        let app = actix_test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .route("/echo", web::get().to(echo)),
        )
        .await;

        let first =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/echo").to_request())
                .await;
        let second =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/echo").to_request())
                .await;
        assert_ne!(
            first.headers().get(REQUEST_ID_HEADER),
            second.headers().get(REQUEST_ID_HEADER)
        );
    }

    #[test]
    fn test_short_form() {
        let id = RequestId("0123456789abcdef".into());
        assert_eq!(id.short(), "01234567");
        assert_eq!(RequestId("abc".into()).short(), "abc");
    }
}

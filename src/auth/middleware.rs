use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::sync::Arc;

use crate::auth::extractors::AuthenticatedUser;
use crate::auth::token::TokenCodec;
use crate::error::AppError;

/// Paths under the gated scope that are reachable without a token.
const PUBLIC_PATHS: &[&str] = &["/api/auth/register", "/api/auth/login"];

/// Extracts the token from an `Authorization` header value.
///
/// Accepts exactly `<scheme> <token>` where the scheme is `Bearer` in any case,
/// separated by a single space, and the token is non-empty with no whitespace.
pub fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer")
        || token.is_empty()
        || token.contains(char::is_whitespace)
    {
        return None;
    }
    Some(token)
}

/// Authorization gate. Verifies the bearer token and stores the resolved
/// `AuthenticatedUser` in request extensions before calling the inner service.
///
/// Any failure short-circuits with an `AppError::Unauthenticated` response; the
/// inner service is never called. No store lookup
/// happens here; the claims of a validly signed token are trusted as-is.
pub struct AuthMiddleware {
    codec: Arc<TokenCodec>,
}

impl AuthMiddleware {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            codec: Arc::clone(&self.codec),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    codec: Arc<TokenCodec>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if PUBLIC_PATHS.contains(&req.path()) {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        }

        let claims = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AppError::Unauthenticated)
            .and_then(|token| self.codec.verify(token));

        match claims {
            Ok(claims) => {
                req.extensions_mut().insert(AuthenticatedUser::from(&claims));
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(app_err) => {
                let response = req.into_response(app_err.error_response());
                Box::pin(async move { Ok(response.map_into_right_body()) })
            }
        }
    }
}

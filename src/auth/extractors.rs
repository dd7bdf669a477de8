use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;

/// The caller's identity, as resolved by `AuthMiddleware` from a verified token.
///
/// Handlers take this as an argument to learn who is calling. It is the only
/// source of an owner id for todo operations; request bodies never supply one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: String,
}

impl From<&Claims> for AuthenticatedUser {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.user_id,
            email: claims.email.clone(),
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(user) => ready(Ok(user)),
            // Only reachable if a handler is mounted outside the gated scope.
            None => ready(Err(AppError::Unauthenticated.into())),
        }
    }
}

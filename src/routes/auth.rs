use actix_web::{get, post, web, Responder};

use crate::auth::{AuthService, AuthenticatedUser, LoginRequest, RegisterRequest, TokenResponse};
use crate::error::AppError;
use crate::response;

/// Register a new user
///
/// Creates an account and returns it together with an authentication token.
/// `409` if the email is already registered, `422` on invalid input.
#[post("/register")]
pub async fn register(
    auth: web::Data<AuthService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let registered = auth.register(register_data.into_inner()).await?;
    Ok(response::created("User registered successfully", registered))
}

/// Login user
///
/// Both an unknown email and a wrong password produce the same `401`.
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let logged_in = auth.login(login_data.into_inner()).await?;
    Ok(response::ok("Login successful", logged_in))
}

#[get("/profile")]
pub async fn profile(
    auth: web::Data<AuthService>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let profile = auth.profile(&user).await?;
    Ok(response::ok("Profile retrieved successfully", profile))
}

/// Re-issue a token for the caller's current, still valid token.
#[post("/refresh")]
pub async fn refresh(
    auth: web::Data<AuthService>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let token = auth.refresh(&user)?;
    Ok(response::ok("Token refreshed successfully", TokenResponse { token }))
}

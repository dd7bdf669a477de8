//! Uniform JSON envelope for every API response.
//!
//! Successful responses carry `success: true` with an optional message and data payload;
//! failures carry `success: false` and an `error` object (see `crate::error::AppError`).

use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

/// Top-level envelope wrapping every response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// Error details carried by a failed response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(code: &str, message: impl Into<String>, details: Option<serde_json::Value>) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.into(),
                details,
            }),
        }
    }
}

/// 200 OK with an envelope around `data`.
pub fn ok<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(message, data))
}

/// 201 Created with an envelope around `data`.
pub fn created<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::success(message, data))
}

pub fn no_content() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

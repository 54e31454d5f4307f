// src/common/response.rs

use axum::{Json, http::StatusCode};
use serde::Serialize;

// Envelope de sucesso: { success: true, data, message, error: null }
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub message: String,
    pub error: Option<()>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
            error: None,
        }
    }
}

/// 200 com o envelope padrão.
pub fn ok<T: Serialize>(data: T, message: impl Into<String>) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::OK, Json(ApiResponse::new(data, message)))
}

/// 201 com o envelope padrão.
pub fn created<T: Serialize>(
    data: T,
    message: impl Into<String>,
) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::new(data, message)))
}

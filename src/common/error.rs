// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

// Todos os erros da aplicação passam por aqui e viram o envelope
// { success: false, data: null, message, error: { message, details } }.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Um ou mais campos são inválidos.")]
    ValidationError(#[from] validator::ValidationErrors),

    // Validação de regra de negócio (campo obrigatório ausente, formato etc.)
    #[error("{0}")]
    Validation(String),

    // Validação com detalhes estruturados (ex: itens de um lote)
    #[error("{message}")]
    ValidationDetails { message: String, details: Value },

    #[error("Sessão não encontrada. Faça login novamente.")]
    Unauthenticated,

    #[error("E-mail ou senha inválidos.")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("E-mail já cadastrado.")]
    EmailAlreadyExists,

    // O banco recusou o valor por causa de uma restrição CHECK do schema
    #[error("{message}")]
    ConstraintViolation { message: String, hint: String },

    // Falha em serviço de terceiros (webhook, Graph API)
    #[error("Falha ao comunicar com serviço externo: {0}")]
    Upstream(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::Validation(_)
            | AppError::ValidationDetails { .. }
            | AppError::EmailAlreadyExists => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConstraintViolation { .. }
            | AppError::Upstream(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Value {
        match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                Value::Object(details)
            }
            AppError::ValidationDetails { details, .. } => details.clone(),
            AppError::ConstraintViolation { hint, .. } => json!({ "hint": hint }),
            _ => Value::Null,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (message, details) = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("🔥 Erro Interno do Servidor: {:?}", self);
            match &self {
                // A dica de correção é justamente o que o operador precisa ver
                AppError::ConstraintViolation { .. } => (self.to_string(), self.details()),
                AppError::Upstream(_) => (self.to_string(), Value::Null),
                _ => ("Ocorreu um erro inesperado.".to_string(), json!(self.to_string())),
            }
        } else {
            (self.to_string(), self.details())
        };

        let body = Json(json!({
            "success": false,
            "data": null,
            "message": message,
            "error": {
                "message": message,
                "details": details,
            },
        }));
        (status, body).into_response()
    }
}

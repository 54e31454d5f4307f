// src/middleware/webhook.rs
//
// Os webhooks de leads são públicos. Quando LEAD_WEBHOOK_TOKEN está definido,
// a integração precisa mandar o mesmo valor no header `x-webhook-token`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState};

pub const WEBHOOK_TOKEN_HEADER: &str = "x-webhook-token";

pub async fn webhook_token_guard(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = app_state.config.lead_webhook_token.as_deref() {
        let received = request
            .headers()
            .get(WEBHOOK_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());

        if received != Some(expected) {
            tracing::warn!("⛔ Webhook de leads chamado sem token válido");
            return Err(AppError::Unauthenticated);
        }
    }

    Ok(next.run(request).await)
}

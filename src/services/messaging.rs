// src/services/messaging.rs
//
// Envio de mensagens de WhatsApp através do webhook da automação.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::common::error::AppError;

#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, telefone: &str, mensagem: &str) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct WhatsAppWebhook {
    client: reqwest::Client,
    url: Option<String>,
}

impl WhatsAppWebhook {
    pub fn new(url: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl MessageSender for WhatsAppWebhook {
    async fn send(&self, telefone: &str, mensagem: &str) -> Result<(), AppError> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| AppError::Upstream("WHATSAPP_WEBHOOK_URL não configurada".to_string()))?;

        let response = self
            .client
            .post(url)
            .json(&json!({ "telefone": telefone, "mensagem": mensagem }))
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "webhook do WhatsApp respondeu HTTP {}",
                response.status().as_u16()
            )));
        }

        tracing::info!(telefone, "📲 Mensagem enviada");
        Ok(())
    }
}

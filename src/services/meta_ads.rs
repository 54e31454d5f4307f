// src/services/meta_ads.rs
//
// Leitura de métricas da conta de anúncios na Graph API da Meta.

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::common::error::AppError;

#[async_trait]
pub trait AdMetricsSource: Send + Sync {
    /// Conversões (eventos de lead) do dia anterior.
    async fn conversions_yesterday(&self, conta_anuncio: &str) -> Result<u64, AppError>;
    /// Saldo disponível da conta, na moeda da conta.
    async fn balance(&self, conta_anuncio: &str) -> Result<Decimal, AppError>;
}

#[derive(Clone)]
pub struct MetaInsightsClient {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl MetaInsightsClient {
    pub fn new(
        base_url: String,
        access_token: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, AppError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or_else(|| AppError::Upstream("META_ACCESS_TOKEN não configurado".to_string()))?;

        let response = self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .query(query)
            .query(&[("access_token", token)])
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if !status.is_success() {
            let detail = body["error"]["message"].as_str().unwrap_or("sem detalhes");
            return Err(AppError::Upstream(format!(
                "Graph API respondeu HTTP {}: {}",
                status.as_u16(),
                detail
            )));
        }
        Ok(body)
    }
}

#[async_trait]
impl AdMetricsSource for MetaInsightsClient {
    async fn conversions_yesterday(&self, conta_anuncio: &str) -> Result<u64, AppError> {
        let path = format!("{}/insights", account_path(conta_anuncio));
        let body = self
            .get(&path, &[("fields", "actions"), ("date_preset", "yesterday")])
            .await?;
        Ok(count_conversions(&body))
    }

    async fn balance(&self, conta_anuncio: &str) -> Result<Decimal, AppError> {
        let body = self
            .get(&account_path(conta_anuncio), &[("fields", "balance,currency")])
            .await?;
        parse_balance(&body).ok_or_else(|| {
            AppError::Upstream(format!("saldo ausente para a conta {}", conta_anuncio))
        })
    }
}

/// "123", "act_123" → "act_123"
pub fn account_path(conta_anuncio: &str) -> String {
    let id = conta_anuncio.trim();
    let id = id.strip_prefix("act_").unwrap_or(id);
    format!("act_{}", id)
}

/// Soma as ações de lead de todas as linhas do insights.
pub fn count_conversions(body: &Value) -> u64 {
    body["data"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|row| row["actions"].as_array())
        .flatten()
        .filter(|action| {
            action["action_type"]
                .as_str()
                .is_some_and(is_lead_action)
        })
        .filter_map(|action| match &action["value"] {
            Value::String(s) => s.parse::<u64>().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        })
        .sum()
}

/// `lead`, eventos de pixel (`offsite_conversion.fb_pixel_lead`) e formulários
/// instantâneos (`onsite_conversion.lead_grouped`).
fn is_lead_action(action_type: &str) -> bool {
    action_type == "lead" || action_type.ends_with("_lead") || action_type.contains(".lead")
}

/// A Graph API devolve o saldo em centavos, como string.
pub fn parse_balance(body: &Value) -> Option<Decimal> {
    let cents = match &body["balance"] {
        Value::String(s) => Decimal::from_str(s.trim()).ok()?,
        Value::Number(n) => Decimal::from(n.as_i64()?),
        _ => return None,
    };
    Some(cents / Decimal::from(100))
}

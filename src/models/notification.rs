// src/models/notification.rs

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Tabela `notificacoes`: quem recebe o resumo diário e de quais empresas
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct NotificationRule {
    pub id: i64,

    #[schema(example = "Resumo diário - Diretoria")]
    pub nome: String,

    #[schema(example = "5511999990000")]
    pub telefone: String,

    #[schema(value_type = String, example = "09:00:00")]
    pub horario: NaiveTime,

    pub ativo: bool,
}

// Regra + empresas associadas (em ordem)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationRuleWithCompanies {
    #[serde(flatten)]
    pub regra: NotificationRule,
    pub empresas: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NotificationRulePayload {
    #[validate(length(min = 1, message = "O nome da notificação é obrigatório."))]
    pub nome: String,

    #[validate(length(min = 8, message = "Telefone inválido."))]
    pub telefone: String,

    #[schema(value_type = String, example = "09:00:00")]
    pub horario: NaiveTime,

    #[serde(default = "default_true")]
    pub ativo: bool,

    #[serde(default)]
    pub empresas: Vec<i64>,
}

fn default_true() -> bool {
    true
}

// Tabela `notificasaldobaixo`
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct LowBalanceAlert {
    pub id: i64,
    pub empresa_id: i64,

    #[schema(example = "5511999990000")]
    pub telefone: String,

    // Abaixo deste saldo (na moeda da conta) o alerta dispara
    #[schema(example = "150.00")]
    pub limite: Decimal,

    pub ativo: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LowBalanceAlertPayload {
    pub empresa_id: i64,

    #[validate(length(min = 8, message = "Telefone inválido."))]
    pub telefone: String,

    pub limite: Decimal,

    #[serde(default = "default_true")]
    pub ativo: bool,
}

// Resultado de uma rodada de disparos
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DispatchReport {
    pub regras_processadas: usize,
    pub alertas_processados: usize,
    pub mensagens_enviadas: usize,
    pub falhas: usize,
}

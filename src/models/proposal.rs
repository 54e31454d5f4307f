// src/models/proposal.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_proposta", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    // PDF ou outro arquivo já enviado para o storage
    Arquivo,
    // Link externo de design (Canva, Figma...)
    LinkDesign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_proposta", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    NaoAberta,
    Aberta,
}

// Tabela `propostas`
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Proposal {
    pub id: Uuid,

    #[schema(example = "Proposta Plano Anual")]
    pub nome: String,

    // Visitante precisa informar contato antes de ver a proposta
    pub exige_contato: bool,

    pub tipo: ProposalKind,

    #[sqlx(json)]
    #[schema(value_type = Object)]
    pub conteudo: Value,

    pub criado_em: DateTime<Utc>,

    pub status: ProposalStatus,

    pub visualizacoes: i32,

    pub empresa_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewProposal {
    pub nome: String,
    pub exige_contato: bool,
    pub tipo: ProposalKind,
    pub conteudo: Value,
    pub empresa_id: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProposalPayload {
    #[validate(length(min = 1, message = "O nome da proposta é obrigatório."))]
    pub nome: String,

    pub empresa_id: i64,

    #[serde(default)]
    pub exige_contato: bool,

    pub tipo: ProposalKind,

    #[schema(value_type = Object)]
    pub conteudo: Value,
}

// Tabela `aberturas_proposta` (log de auditoria, só cresce)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ProposalOpenEvent {
    pub id: i64,
    pub proposta_id: Uuid,
    pub nome: String,
    pub contato: Option<String>,
    pub aberto_em: DateTime<Utc>,
    pub ip: String,
}

#[derive(Debug, Clone)]
pub struct NewOpenEvent {
    pub proposta_id: Uuid,
    pub nome: String,
    pub contato: Option<String>,
    pub ip: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterViewPayload {
    #[schema(example = "Marcos")]
    pub nome: Option<String>,

    #[schema(example = "11966665555")]
    pub contato: Option<String>,
}

// Tabela `visual_proposta`: identidade visual da página pública
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct VisualConfig {
    #[serde(default)]
    pub empresa_id: i64,

    #[schema(example = "#1E88E5")]
    pub cor_primaria: String,

    #[schema(example = "#FFFFFF")]
    pub cor_secundaria: String,

    pub logo_url: Option<String>,

    pub titulo: Option<String>,
}

impl VisualConfig {
    pub fn default_for(empresa_id: i64) -> Self {
        Self {
            empresa_id,
            cor_primaria: "#1E88E5".to_string(),
            cor_secundaria: "#FFFFFF".to_string(),
            logo_url: None,
            titulo: None,
        }
    }
}

// O que a página pública recebe
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicProposal {
    pub proposta: Proposal,
    pub visual: VisualConfig,
}

// src/models/stages.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Uma coluna do kanban
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Stage {
    #[schema(example = "qualificado")]
    pub id: String,

    #[schema(example = "Qualificado")]
    pub nome: String,

    #[schema(example = "#FF9800")]
    pub cor: String,

    #[schema(example = 2)]
    pub ordem: i32,
}

impl Stage {
    fn new(id: &str, nome: &str, cor: &str, ordem: i32) -> Self {
        Self {
            id: id.to_string(),
            nome: nome.to_string(),
            cor: cor.to_string(),
            ordem,
        }
    }
}

/// Funil padrão, usado enquanto a empresa não salvar o seu.
pub fn default_stages() -> Vec<Stage> {
    vec![
        Stage::new("entrou", "Entrou", "#2196F3", 1),
        Stage::new("qualificado", "Qualificado", "#FF9800", 2),
        Stage::new("conversao", "Conversão", "#9C27B0", 3),
        Stage::new("ganho", "Ganho", "#4CAF50", 4),
    ]
}

// Linha da tabela `empresa_stages`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StageConfigRow {
    pub empresa_id: i64,
    #[sqlx(json)]
    pub stages: Vec<Stage>,
    pub updated_at: Option<DateTime<Utc>>,
}

// O que a API devolve: a lista e se ela é o padrão (não persistido)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StageConfig {
    pub empresa_id: i64,
    pub stages: Vec<Stage>,
    pub padrao: bool,
}

// Entrada do PUT: campos opcionais para podermos validar um por um
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StageInput {
    pub id: Option<String>,
    pub nome: Option<String>,
    pub cor: Option<String>,
    pub ordem: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveStagesPayload {
    #[serde(default)]
    pub stages: Vec<StageInput>,
}

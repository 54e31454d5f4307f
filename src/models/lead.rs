// src/models/lead.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

use crate::services::lead_normalizer;

/// Estágio inicial de todo lead recém-criado.
pub const INITIAL_STAGE: &str = "entrou";

// Os "dados originais" do lead: o payload bruto recebido, mais o que o sistema
// acrescenta depois (qualificação, origem manual...).
// A empresa dona do lead mora AQUI, na chave `empresa_id` (ou um sinônimo dela),
// e não numa coluna própria. Sempre leia por `empresa_id()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DadosOriginais(pub Map<String, Value>);

impl DadosOriginais {
    pub const EMPRESA_ID: &'static str = "empresa_id";

    pub fn new(raw: Map<String, Value>) -> Self {
        Self(raw)
    }

    /// Referência à empresa dona, sempre como string.
    pub fn empresa_id(&self) -> Option<String> {
        lead_normalizer::company_ref(&self.0)
    }

    /// Mescla as chaves de `extra`, sobrescrevendo as iguais e preservando o resto.
    pub fn merge(&mut self, extra: Map<String, Value>) {
        for (key, value) in extra {
            self.0.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

// Tabela `leads`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Lead {
    #[schema(example = 42)]
    pub id: i64,

    #[schema(example = "Ana Silva")]
    pub nome: Option<String>,

    #[schema(example = "ana@x.com")]
    pub email: Option<String>,

    #[schema(example = "11999990000")]
    pub telefone: Option<String>,

    pub data_contato: Option<DateTime<Utc>>,

    // Texto livre: a ordem "real" do funil vem da configuração de stages da empresa
    #[schema(example = "entrou")]
    pub stage: String,

    pub data_entrada: DateTime<Utc>,

    pub updated_at: Option<DateTime<Utc>>,

    #[sqlx(json)]
    #[schema(value_type = Object)]
    pub dados_originais: DadosOriginais,
}

// O que o repositório insere
#[derive(Debug, Clone)]
pub struct NewLead {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub data_contato: Option<DateTime<Utc>>,
    pub stage: String,
    pub data_entrada: DateTime<Utc>,
    pub dados_originais: DadosOriginais,
}

// Cadastro manual feito pela tela do CRM
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ManualLeadPayload {
    #[validate(length(min = 1, message = "O nome do lead é obrigatório."))]
    #[schema(example = "Carlos Pereira")]
    pub nome: Option<String>,

    #[schema(example = "carlos@x.com")]
    pub email: Option<String>,

    #[schema(example = "11977776666")]
    pub telefone: Option<String>,

    #[schema(example = 1)]
    pub empresa_id: Option<i64>,

    // Campos extras que o usuário quer guardar junto do lead
    #[serde(default)]
    #[schema(value_type = Object)]
    pub dados_extras: Map<String, Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStagePayload {
    #[schema(example = "proposta_enviada")]
    pub stage: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct QualifyLeadPayload {
    pub data_qualificacao: Option<DateTime<Utc>>,
}

// Resultado de um lote: o que entrou e o que foi recusado (por índice)
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchIngestResult {
    pub inseridos: Vec<Lead>,
    pub erros: Vec<BatchItemError>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BatchItemError {
    pub indice: usize,
    pub mensagem: String,
}

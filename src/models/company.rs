// src/models/company.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Tabela `empresas`: o "tenant" dono de leads, propostas e stages
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Company {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "Clínica Sorriso")]
    pub nome: String,

    // ID da conta de anúncios na Meta (sem o prefixo "act_")
    #[schema(example = "123456789012345")]
    pub conta_anuncio: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CompanyPayload {
    #[validate(length(min = 1, message = "O nome da empresa é obrigatório."))]
    #[schema(example = "Clínica Sorriso")]
    pub nome: String,

    #[schema(example = "123456789012345")]
    pub conta_anuncio: Option<String>,
}

// src/db/lead_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, types::Json};

use crate::{
    common::error::AppError,
    models::lead::{DadosOriginais, Lead, NewLead},
};

#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn insert(&self, lead: &NewLead) -> Result<Lead, AppError>;
    /// Insere todos ou nenhum.
    async fn insert_many(&self, leads: &[NewLead]) -> Result<Vec<Lead>, AppError>;
    /// Todos os leads, mais recentes primeiro (`data_entrada` DESC).
    async fn list_all(&self) -> Result<Vec<Lead>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Lead>, AppError>;
    async fn update_stage(
        &self,
        id: i64,
        stage: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Lead, AppError>;
    async fn update_dados(
        &self,
        id: i64,
        dados: &DadosOriginais,
        updated_at: DateTime<Utc>,
    ) -> Result<Lead, AppError>;
}

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const LEAD_COLUMNS: &str =
    "id, nome, email, telefone, data_contato, stage, data_entrada, updated_at, dados_originais";

const INSERT_LEAD: &str = "INSERT INTO leads \
    (nome, email, telefone, data_contato, stage, data_entrada, dados_originais) \
    VALUES ($1, $2, $3, $4, $5, $6, $7)";

// Uma CHECK antiga na coluna `stage` (do tempo em que o funil era fixo)
// recusa stages personalizados. O operador precisa removê-la no banco.
fn map_stage_check(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_check_violation() {
            return stage_check_violation(db_err.constraint().unwrap_or("leads_stage_check"));
        }
    }
    e.into()
}

pub fn stage_check_violation(constraint: &str) -> AppError {
    AppError::ConstraintViolation {
        message: "O banco recusou o novo stage do lead.".to_string(),
        hint: format!(
            "Remova a restrição antiga com: ALTER TABLE leads DROP CONSTRAINT {};",
            constraint
        ),
    }
}

#[async_trait]
impl LeadStore for LeadRepository {
    async fn insert(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let created = sqlx::query_as::<_, Lead>(&format!("{INSERT_LEAD} RETURNING {LEAD_COLUMNS}"))
            .bind(lead.nome.as_deref())
            .bind(lead.email.as_deref())
            .bind(lead.telefone.as_deref())
            .bind(lead.data_contato)
            .bind(&lead.stage)
            .bind(lead.data_entrada)
            .bind(Json(&lead.dados_originais))
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn insert_many(&self, leads: &[NewLead]) -> Result<Vec<Lead>, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(leads.len());

        for lead in leads {
            let row =
                sqlx::query_as::<_, Lead>(&format!("{INSERT_LEAD} RETURNING {LEAD_COLUMNS}"))
                    .bind(lead.nome.as_deref())
                    .bind(lead.email.as_deref())
                    .bind(lead.telefone.as_deref())
                    .bind(lead.data_contato)
                    .bind(&lead.stage)
                    .bind(lead.data_entrada)
                    .bind(Json(&lead.dados_originais))
                    .fetch_one(&mut *tx)
                    .await?;
            created.push(row);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn list_all(&self) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads ORDER BY data_entrada DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(leads)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(lead)
    }

    async fn update_stage(
        &self,
        id: i64,
        stage: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Lead, AppError> {
        sqlx::query_as::<_, Lead>(&format!(
            "UPDATE leads SET stage = $2, updated_at = $3 WHERE id = $1 RETURNING {LEAD_COLUMNS}"
        ))
        .bind(id)
        .bind(stage)
        .bind(updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_stage_check)
    }

    async fn update_dados(
        &self,
        id: i64,
        dados: &DadosOriginais,
        updated_at: DateTime<Utc>,
    ) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            "UPDATE leads SET dados_originais = $2, updated_at = $3 WHERE id = $1 \
             RETURNING {LEAD_COLUMNS}"
        ))
        .bind(id)
        .bind(Json(dados))
        .bind(updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(lead)
    }
}

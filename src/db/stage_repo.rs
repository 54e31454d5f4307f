// src/db/stage_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};

use crate::{
    common::error::AppError,
    models::stages::{Stage, StageConfigRow},
};

#[async_trait]
pub trait StageStore: Send + Sync {
    async fn find(&self, empresa_id: i64) -> Result<Option<StageConfigRow>, AppError>;
    async fn upsert(&self, empresa_id: i64, stages: &[Stage]) -> Result<StageConfigRow, AppError>;
    async fn delete(&self, empresa_id: i64) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct StageRepository {
    pool: PgPool,
}

impl StageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StageStore for StageRepository {
    async fn find(&self, empresa_id: i64) -> Result<Option<StageConfigRow>, AppError> {
        // Sem linha = empresa ainda usa o funil padrão
        let row = sqlx::query_as::<_, StageConfigRow>(
            "SELECT empresa_id, stages, updated_at FROM empresa_stages WHERE empresa_id = $1",
        )
        .bind(empresa_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn upsert(&self, empresa_id: i64, stages: &[Stage]) -> Result<StageConfigRow, AppError> {
        // UPSERT (Insert or Update)
        let row = sqlx::query_as::<_, StageConfigRow>(
            r#"
            INSERT INTO empresa_stages (empresa_id, stages, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (empresa_id)
            DO UPDATE SET
                stages = EXCLUDED.stages,
                updated_at = NOW()
            RETURNING empresa_id, stages, updated_at
            "#,
        )
        .bind(empresa_id)
        .bind(Json(stages))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, empresa_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM empresa_stages WHERE empresa_id = $1")
            .bind(empresa_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// src/db/company_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::company::{Company, CompanyPayload},
};

#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Company>, AppError>;
    async fn list_ids(&self) -> Result<Vec<i64>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Company>, AppError>;
    async fn create(&self, input: &CompanyPayload) -> Result<Company, AppError>;
    async fn update(&self, id: i64, input: &CompanyPayload) -> Result<Option<Company>, AppError>;
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyStore for CompanyRepository {
    async fn list(&self) -> Result<Vec<Company>, AppError> {
        let companies = sqlx::query_as::<_, Company>(
            "SELECT id, nome, conta_anuncio FROM empresas ORDER BY nome ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(companies)
    }

    async fn list_ids(&self) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM empresas ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT id, nome, conta_anuncio FROM empresas WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(company)
    }

    async fn create(&self, input: &CompanyPayload) -> Result<Company, AppError> {
        let company = sqlx::query_as::<_, Company>(
            "INSERT INTO empresas (nome, conta_anuncio) VALUES ($1, $2) \
             RETURNING id, nome, conta_anuncio",
        )
        .bind(&input.nome)
        .bind(input.conta_anuncio.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(company)
    }

    async fn update(&self, id: i64, input: &CompanyPayload) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            "UPDATE empresas SET nome = $2, conta_anuncio = $3 WHERE id = $1 \
             RETURNING id, nome, conta_anuncio",
        )
        .bind(id)
        .bind(&input.nome)
        .bind(input.conta_anuncio.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(company)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM empresas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

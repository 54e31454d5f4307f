// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{
        auth::User,
        user::{NewUser, UserChanges},
    },
};

// Tudo que os serviços precisam das tabelas `usuario` e `usuario_empresa`
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn list(&self) -> Result<Vec<User>, AppError>;
    async fn create(&self, user: &NewUser) -> Result<User, AppError>;
    async fn update(&self, id: i64, changes: &UserChanges) -> Result<Option<User>, AppError>;
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// IDs das empresas vinculadas ao usuário (tabela-ponte).
    async fn linked_company_ids(&self, user_id: i64) -> Result<Vec<i64>, AppError>;
    async fn has_link(&self, user_id: i64, company_id: i64) -> Result<bool, AppError>;
    async fn replace_links(&self, user_id: i64, company_ids: &[i64]) -> Result<(), AppError>;
}

// O repositório de usuários, responsável por todas as interações com a tabela 'usuario'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, nome, email, senha, permissao";

fn map_unique_email(e: sqlx::Error) -> AppError {
    // Converte erro de violação de chave única em um erro mais amigável
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::EmailAlreadyExists;
        }
    }
    e.into()
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM usuario WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM usuario WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM usuario ORDER BY nome ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn create(&self, user: &NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO usuario (nome, email, senha, permissao) VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.nome)
        .bind(&user.email)
        .bind(&user.senha_hash)
        .bind(user.permissao)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_email)
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> Result<Option<User>, AppError> {
        // COALESCE mantém o valor atual quando o campo não veio
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE usuario SET
                nome = COALESCE($2, nome),
                email = COALESCE($3, email),
                senha = COALESCE($4, senha),
                permissao = COALESCE($5, permissao)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.nome.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.senha_hash.as_deref())
        .bind(changes.permissao)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_email)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM usuario_empresa WHERE usuario_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM usuario WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn linked_company_ids(&self, user_id: i64) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT empresa_id FROM usuario_empresa WHERE usuario_id = $1 ORDER BY empresa_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn has_link(&self, user_id: i64, company_id: i64) -> Result<bool, AppError> {
        // SELECT EXISTS: só queremos saber se a linha existe
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM usuario_empresa WHERE usuario_id = $1 AND empresa_id = $2)",
        )
        .bind(user_id)
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn replace_links(&self, user_id: i64, company_ids: &[i64]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM usuario_empresa WHERE usuario_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if !company_ids.is_empty() {
            // Inserção em massa usando UNNEST
            sqlx::query(
                r#"
                INSERT INTO usuario_empresa (usuario_id, empresa_id)
                SELECT $1, unnest($2::bigint[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(company_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

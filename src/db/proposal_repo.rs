// src/db/proposal_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::proposal::{NewOpenEvent, NewProposal, Proposal, ProposalOpenEvent, VisualConfig},
};

#[async_trait]
pub trait ProposalStore: Send + Sync {
    async fn create(&self, input: &NewProposal) -> Result<Proposal, AppError>;
    async fn list_all(&self) -> Result<Vec<Proposal>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Proposal>, AppError>;
    /// Soma uma visualização e marca a proposta como aberta.
    async fn register_view(&self, id: Uuid) -> Result<Option<Proposal>, AppError>;
    async fn insert_open_event(&self, event: &NewOpenEvent) -> Result<ProposalOpenEvent, AppError>;
    async fn list_open_events(&self, proposta_id: Uuid) -> Result<Vec<ProposalOpenEvent>, AppError>;
    /// Apaga as aberturas e depois a proposta.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    async fn find_visual(&self, empresa_id: i64) -> Result<Option<VisualConfig>, AppError>;
    async fn save_visual(&self, config: &VisualConfig) -> Result<VisualConfig, AppError>;
}

#[derive(Clone)]
pub struct ProposalRepository {
    pool: PgPool,
}

impl ProposalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PROPOSAL_COLUMNS: &str =
    "id, nome, exige_contato, tipo, conteudo, criado_em, status, visualizacoes, empresa_id";

const EVENT_COLUMNS: &str = "id, proposta_id, nome, contato, aberto_em, ip";

const VISUAL_COLUMNS: &str = "empresa_id, cor_primaria, cor_secundaria, logo_url, titulo";

#[async_trait]
impl ProposalStore for ProposalRepository {
    async fn create(&self, input: &NewProposal) -> Result<Proposal, AppError> {
        let proposal = sqlx::query_as::<_, Proposal>(&format!(
            r#"
            INSERT INTO propostas (id, nome, exige_contato, tipo, conteudo, empresa_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PROPOSAL_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&input.nome)
        .bind(input.exige_contato)
        .bind(input.tipo)
        .bind(Json(&input.conteudo))
        .bind(input.empresa_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(proposal)
    }

    async fn list_all(&self) -> Result<Vec<Proposal>, AppError> {
        let proposals = sqlx::query_as::<_, Proposal>(&format!(
            "SELECT {PROPOSAL_COLUMNS} FROM propostas ORDER BY criado_em DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(proposals)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Proposal>, AppError> {
        let proposal = sqlx::query_as::<_, Proposal>(&format!(
            "SELECT {PROPOSAL_COLUMNS} FROM propostas WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(proposal)
    }

    async fn register_view(&self, id: Uuid) -> Result<Option<Proposal>, AppError> {
        let proposal = sqlx::query_as::<_, Proposal>(&format!(
            r#"
            UPDATE propostas
            SET visualizacoes = visualizacoes + 1, status = 'aberta'
            WHERE id = $1
            RETURNING {PROPOSAL_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(proposal)
    }

    async fn insert_open_event(&self, event: &NewOpenEvent) -> Result<ProposalOpenEvent, AppError> {
        let created = sqlx::query_as::<_, ProposalOpenEvent>(&format!(
            "INSERT INTO aberturas_proposta (proposta_id, nome, contato, ip) VALUES ($1, $2, $3, $4) \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(event.proposta_id)
        .bind(&event.nome)
        .bind(event.contato.as_deref())
        .bind(&event.ip)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_open_events(&self, proposta_id: Uuid) -> Result<Vec<ProposalOpenEvent>, AppError> {
        let events = sqlx::query_as::<_, ProposalOpenEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM aberturas_proposta WHERE proposta_id = $1 \
             ORDER BY aberto_em DESC"
        ))
        .bind(proposta_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM aberturas_proposta WHERE proposta_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM propostas WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_visual(&self, empresa_id: i64) -> Result<Option<VisualConfig>, AppError> {
        let config = sqlx::query_as::<_, VisualConfig>(&format!(
            "SELECT {VISUAL_COLUMNS} FROM visual_proposta WHERE empresa_id = $1"
        ))
        .bind(empresa_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(config)
    }

    async fn save_visual(&self, config: &VisualConfig) -> Result<VisualConfig, AppError> {
        let saved = sqlx::query_as::<_, VisualConfig>(&format!(
            r#"
            INSERT INTO visual_proposta (empresa_id, cor_primaria, cor_secundaria, logo_url, titulo)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (empresa_id)
            DO UPDATE SET
                cor_primaria = EXCLUDED.cor_primaria,
                cor_secundaria = EXCLUDED.cor_secundaria,
                logo_url = EXCLUDED.logo_url,
                titulo = EXCLUDED.titulo
            RETURNING {VISUAL_COLUMNS}
            "#
        ))
        .bind(config.empresa_id)
        .bind(&config.cor_primaria)
        .bind(&config.cor_secundaria)
        .bind(config.logo_url.as_deref())
        .bind(config.titulo.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }
}

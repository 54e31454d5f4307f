// src/db/notification_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::notification::{
        LowBalanceAlert, LowBalanceAlertPayload, NotificationRule, NotificationRulePayload,
    },
};

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn list_rules(&self) -> Result<Vec<NotificationRule>, AppError>;
    async fn find_rule(&self, id: i64) -> Result<Option<NotificationRule>, AppError>;
    async fn insert_rule(&self, input: &NotificationRulePayload) -> Result<NotificationRule, AppError>;
    async fn update_rule(
        &self,
        id: i64,
        input: &NotificationRulePayload,
    ) -> Result<Option<NotificationRule>, AppError>;
    async fn delete_rule(&self, id: i64) -> Result<bool, AppError>;

    /// Empresas da regra, na ordem cadastrada.
    async fn rule_company_ids(&self, rule_id: i64) -> Result<Vec<i64>, AppError>;
    async fn replace_rule_companies(&self, rule_id: i64, company_ids: &[i64]) -> Result<(), AppError>;
    /// Regras ativas que incluem a empresa.
    async fn active_rules_for_company(&self, empresa_id: i64) -> Result<Vec<NotificationRule>, AppError>;

    async fn list_low_balance_alerts(&self) -> Result<Vec<LowBalanceAlert>, AppError>;
    async fn insert_low_balance_alert(
        &self,
        input: &LowBalanceAlertPayload,
    ) -> Result<LowBalanceAlert, AppError>;
    async fn delete_low_balance_alert(&self, id: i64) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const RULE_COLUMNS: &str = "id, nome, telefone, horario, ativo";
const ALERT_COLUMNS: &str = "id, empresa_id, telefone, limite, ativo";

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn list_rules(&self) -> Result<Vec<NotificationRule>, AppError> {
        let rules = sqlx::query_as::<_, NotificationRule>(&format!(
            "SELECT {RULE_COLUMNS} FROM notificacoes ORDER BY horario, nome"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rules)
    }

    async fn find_rule(&self, id: i64) -> Result<Option<NotificationRule>, AppError> {
        let rule = sqlx::query_as::<_, NotificationRule>(&format!(
            "SELECT {RULE_COLUMNS} FROM notificacoes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rule)
    }

    async fn insert_rule(&self, input: &NotificationRulePayload) -> Result<NotificationRule, AppError> {
        let rule = sqlx::query_as::<_, NotificationRule>(&format!(
            "INSERT INTO notificacoes (nome, telefone, horario, ativo) VALUES ($1, $2, $3, $4) \
             RETURNING {RULE_COLUMNS}"
        ))
        .bind(&input.nome)
        .bind(&input.telefone)
        .bind(input.horario)
        .bind(input.ativo)
        .fetch_one(&self.pool)
        .await?;
        Ok(rule)
    }

    async fn update_rule(
        &self,
        id: i64,
        input: &NotificationRulePayload,
    ) -> Result<Option<NotificationRule>, AppError> {
        let rule = sqlx::query_as::<_, NotificationRule>(&format!(
            "UPDATE notificacoes SET nome = $2, telefone = $3, horario = $4, ativo = $5 \
             WHERE id = $1 RETURNING {RULE_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.nome)
        .bind(&input.telefone)
        .bind(input.horario)
        .bind(input.ativo)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rule)
    }

    async fn delete_rule(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM notificacao_empresas WHERE notificacao_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM notificacoes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn rule_company_ids(&self, rule_id: i64) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT empresa_id FROM notificacao_empresas WHERE notificacao_id = $1 ORDER BY ordem",
        )
        .bind(rule_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn replace_rule_companies(&self, rule_id: i64, company_ids: &[i64]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM notificacao_empresas WHERE notificacao_id = $1")
            .bind(rule_id)
            .execute(&mut *tx)
            .await?;

        if !company_ids.is_empty() {
            // WITH ORDINALITY preserva a ordem em que as empresas vieram
            sqlx::query(
                r#"
                INSERT INTO notificacao_empresas (notificacao_id, empresa_id, ordem)
                SELECT $1, e.empresa_id, e.ordem
                FROM unnest($2::bigint[]) WITH ORDINALITY AS e(empresa_id, ordem)
                "#,
            )
            .bind(rule_id)
            .bind(company_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn active_rules_for_company(&self, empresa_id: i64) -> Result<Vec<NotificationRule>, AppError> {
        let rules = sqlx::query_as::<_, NotificationRule>(
            r#"
            SELECT n.id, n.nome, n.telefone, n.horario, n.ativo
            FROM notificacoes n
            INNER JOIN notificacao_empresas ne ON ne.notificacao_id = n.id
            WHERE ne.empresa_id = $1 AND n.ativo = true
            ORDER BY n.id
            "#,
        )
        .bind(empresa_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rules)
    }

    async fn list_low_balance_alerts(&self) -> Result<Vec<LowBalanceAlert>, AppError> {
        let alerts = sqlx::query_as::<_, LowBalanceAlert>(&format!(
            "SELECT {ALERT_COLUMNS} FROM notificasaldobaixo ORDER BY empresa_id, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(alerts)
    }

    async fn insert_low_balance_alert(
        &self,
        input: &LowBalanceAlertPayload,
    ) -> Result<LowBalanceAlert, AppError> {
        let alert = sqlx::query_as::<_, LowBalanceAlert>(&format!(
            "INSERT INTO notificasaldobaixo (empresa_id, telefone, limite, ativo) \
             VALUES ($1, $2, $3, $4) RETURNING {ALERT_COLUMNS}"
        ))
        .bind(input.empresa_id)
        .bind(&input.telefone)
        .bind(input.limite)
        .bind(input.ativo)
        .fetch_one(&self.pool)
        .await?;
        Ok(alert)
    }

    async fn delete_low_balance_alert(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notificasaldobaixo WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

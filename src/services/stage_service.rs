// src/services/stage_service.rs

use std::{collections::HashSet, sync::Arc};

use crate::{
    common::error::AppError,
    db::StageStore,
    models::{
        auth::SessionUser,
        stages::{Stage, StageConfig, StageInput, default_stages},
    },
    services::access::AccessResolver,
};

#[derive(Clone)]
pub struct StageService {
    stages: Arc<dyn StageStore>,
    access: AccessResolver,
}

impl StageService {
    pub fn new(stages: Arc<dyn StageStore>, access: AccessResolver) -> Self {
        Self { stages, access }
    }

    pub async fn get(&self, user: &SessionUser, empresa_id: i64) -> Result<StageConfig, AppError> {
        self.access.ensure_existing_company(user, empresa_id).await?;

        let config = match self.stages.find(empresa_id).await? {
            Some(row) => StageConfig {
                empresa_id,
                stages: row.stages,
                padrao: false,
            },
            None => default_config(empresa_id),
        };
        Ok(config)
    }

    pub async fn save(
        &self,
        user: &SessionUser,
        empresa_id: i64,
        inputs: Vec<StageInput>,
    ) -> Result<StageConfig, AppError> {
        let stages = validate_stages(inputs)?;
        self.access.ensure_existing_company(user, empresa_id).await?;

        let row = self.stages.upsert(empresa_id, &stages).await?;
        tracing::info!(empresa_id, total = row.stages.len(), "🗂️ Stages da empresa salvos");

        Ok(StageConfig {
            empresa_id,
            stages: row.stages,
            padrao: false,
        })
    }

    /// Apaga a configuração salva e devolve o funil padrão.
    pub async fn reset(&self, user: &SessionUser, empresa_id: i64) -> Result<StageConfig, AppError> {
        self.access.ensure_existing_company(user, empresa_id).await?;

        if self.stages.delete(empresa_id).await? {
            tracing::info!(empresa_id, "↩️ Stages da empresa voltaram ao padrão");
        }
        Ok(default_config(empresa_id))
    }
}

fn default_config(empresa_id: i64) -> StageConfig {
    StageConfig {
        empresa_id,
        stages: default_stages(),
        padrao: true,
    }
}

/// Lista não vazia; cada stage com id, nome e cor; ids sem repetição.
/// Sem `ordem`, vale a posição na lista (a partir de 1).
pub fn validate_stages(inputs: Vec<StageInput>) -> Result<Vec<Stage>, AppError> {
    if inputs.is_empty() {
        return Err(AppError::Validation(
            "Informe ao menos um stage.".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut stages = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.into_iter().enumerate() {
        let (Some(id), Some(nome), Some(cor)) = (
            required(input.id),
            required(input.nome),
            required(input.cor),
        ) else {
            return Err(AppError::Validation(format!(
                "O stage na posição {} precisa de id, nome e cor.",
                index + 1
            )));
        };

        if !seen.insert(id.clone()) {
            return Err(AppError::Validation(format!(
                "O id de stage '{}' está repetido.",
                id
            )));
        }

        stages.push(Stage {
            id,
            nome,
            cor,
            ordem: input.ordem.unwrap_or(index as i32 + 1),
        });
    }

    Ok(stages)
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn input(id: &str, nome: &str, cor: &str) -> StageInput {
        StageInput {
            id: Some(id.to_string()),
            nome: Some(nome.to_string()),
            cor: Some(cor.to_string()),
            ordem: None,
        }
    }

    #[test]
    fn default_pipeline_has_four_stages_in_order() {
        let stages = default_stages();
        let ids: Vec<&str> = stages.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["entrou", "qualificado", "conversao", "ganho"]);
        assert_eq!(stages[0].cor, "#2196F3");
        assert_eq!(stages[3].cor, "#4CAF50");
        assert_eq!(stages.iter().map(|s| s.ordem).collect::<Vec<_>>(), [1, 2, 3, 4]);
    }

    #[test]
    fn missing_order_falls_back_to_position() {
        let stages = validate_stages(vec![
            input("novo", "Novo", "#000"),
            input("visita", "Visita", "#111"),
        ])
        .unwrap();
        assert_eq!(stages[1].ordem, 2);
    }

    #[test]
    fn rejects_empty_incomplete_and_duplicated_lists() {
        assert_matches!(validate_stages(vec![]), Err(AppError::Validation(_)));

        let mut sem_cor = input("novo", "Novo", "#000");
        sem_cor.cor = Some("  ".to_string());
        assert_matches!(validate_stages(vec![sem_cor]), Err(AppError::Validation(_)));

        assert_matches!(
            validate_stages(vec![input("a", "A", "#1"), input("a", "B", "#2")]),
            Err(AppError::Validation(msg)) if msg.contains("repetido")
        );
    }
}

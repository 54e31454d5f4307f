// src/services/proposal_service.rs

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, text::non_empty},
    db::ProposalStore,
    models::{
        auth::SessionUser,
        proposal::{
            CreateProposalPayload, NewOpenEvent, NewProposal, Proposal, ProposalKind,
            ProposalOpenEvent, PublicProposal, RegisterViewPayload, VisualConfig,
        },
    },
    services::{
        access::{AccessResolver, require_full_access},
        notification_service::NotificationService,
    },
};

#[derive(Clone)]
pub struct ProposalService {
    proposals: Arc<dyn ProposalStore>,
    access: AccessResolver,
    notifications: NotificationService,
}

impl ProposalService {
    pub fn new(
        proposals: Arc<dyn ProposalStore>,
        access: AccessResolver,
        notifications: NotificationService,
    ) -> Self {
        Self {
            proposals,
            access,
            notifications,
        }
    }

    pub async fn create(
        &self,
        user: &SessionUser,
        payload: CreateProposalPayload,
    ) -> Result<Proposal, AppError> {
        payload.validate()?;
        validate_content(payload.tipo, &payload.conteudo)?;
        self.access
            .ensure_existing_company(user, payload.empresa_id)
            .await?;

        let proposal = self
            .proposals
            .create(&NewProposal {
                nome: payload.nome.trim().to_string(),
                exige_contato: payload.exige_contato,
                tipo: payload.tipo,
                conteudo: payload.conteudo,
                empresa_id: payload.empresa_id,
            })
            .await?;

        tracing::info!(proposta_id = %proposal.id, empresa_id = proposal.empresa_id, "📄 Proposta criada");
        Ok(proposal)
    }

    pub async fn list(&self, user: &SessionUser) -> Result<Vec<Proposal>, AppError> {
        let scope = self.access.resolve(user).await?;
        let proposals = self.proposals.list_all().await?;

        if scope.full_access {
            return Ok(proposals);
        }
        Ok(proposals
            .into_iter()
            .filter(|p| scope.contains(p.empresa_id))
            .collect())
    }

    pub async fn list_open_events(
        &self,
        user: &SessionUser,
        id: Uuid,
    ) -> Result<Vec<ProposalOpenEvent>, AppError> {
        let proposal = self.find(id).await?;
        self.access.ensure_company(user, proposal.empresa_id).await?;
        self.proposals.list_open_events(id).await
    }

    pub async fn delete(&self, user: &SessionUser, id: Uuid) -> Result<(), AppError> {
        require_full_access(user)?;

        if !self.proposals.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(proposta_id = %id, usuario_id = user.id, "🗑️ Proposta removida");
        Ok(())
    }

    // =========================================================================
    //  PÁGINA PÚBLICA (sem sessão)
    // =========================================================================

    pub async fn public_view(&self, id: Uuid) -> Result<PublicProposal, AppError> {
        let proposta = self.find(id).await?;
        let visual = self.visual_or_default(proposta.empresa_id).await?;
        Ok(PublicProposal { proposta, visual })
    }

    /// Conta a abertura. O registro de auditoria e o aviso às regras da empresa
    /// são melhor-esforço: falhas vão para o log e a resposta segue.
    pub async fn register_view(
        &self,
        id: Uuid,
        payload: RegisterViewPayload,
        ip: String,
    ) -> Result<Proposal, AppError> {
        let nome = non_empty(payload.nome.as_deref())
            .ok_or_else(|| AppError::Validation("Informe seu nome para abrir a proposta.".to_string()))?;
        let contato = non_empty(payload.contato.as_deref());

        let current = self.find(id).await?;
        if current.exige_contato && contato.is_none() {
            return Err(AppError::Validation(
                "Esta proposta exige um contato (telefone ou e-mail).".to_string(),
            ));
        }

        let proposal = self
            .proposals
            .register_view(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        let event = NewOpenEvent {
            proposta_id: id,
            nome: nome.clone(),
            contato: contato.clone(),
            ip,
        };
        if let Err(e) = self.proposals.insert_open_event(&event).await {
            tracing::error!(proposta_id = %id, "❌ Falha ao registrar abertura: {}", e);
        }

        self.notifications
            .notify_proposal_opened(&proposal, &nome, contato.as_deref())
            .await;

        tracing::info!(proposta_id = %id, visualizacoes = proposal.visualizacoes, "👀 Proposta aberta");
        Ok(proposal)
    }

    // =========================================================================
    //  IDENTIDADE VISUAL
    // =========================================================================

    pub async fn get_visual(&self, user: &SessionUser, empresa_id: i64) -> Result<VisualConfig, AppError> {
        self.access.ensure_existing_company(user, empresa_id).await?;
        self.visual_or_default(empresa_id).await
    }

    pub async fn save_visual(
        &self,
        user: &SessionUser,
        empresa_id: i64,
        mut config: VisualConfig,
    ) -> Result<VisualConfig, AppError> {
        if config.cor_primaria.trim().is_empty() || config.cor_secundaria.trim().is_empty() {
            return Err(AppError::Validation(
                "As cores primária e secundária são obrigatórias.".to_string(),
            ));
        }
        self.access.ensure_existing_company(user, empresa_id).await?;

        // O id da rota manda sobre o do corpo
        config.empresa_id = empresa_id;
        self.proposals.save_visual(&config).await
    }

    async fn visual_or_default(&self, empresa_id: i64) -> Result<VisualConfig, AppError> {
        Ok(self
            .proposals
            .find_visual(empresa_id)
            .await?
            .unwrap_or_else(|| VisualConfig::default_for(empresa_id)))
    }

    async fn find(&self, id: Uuid) -> Result<Proposal, AppError> {
        self.proposals
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Proposta {} não encontrada.", id))
}

/// `arquivo` → `{url, nome_arquivo?}`; `link_design` → `{url}`.
pub fn validate_content(tipo: ProposalKind, conteudo: &Value) -> Result<(), AppError> {
    let url = conteudo
        .get("url")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if url.is_empty() {
        return Err(AppError::Validation(
            "O conteúdo da proposta precisa de uma url.".to_string(),
        ));
    }

    if tipo == ProposalKind::Arquivo {
        if let Some(nome) = conteudo.get("nome_arquivo") {
            if !nome.is_string() && !nome.is_null() {
                return Err(AppError::Validation(
                    "O nome_arquivo precisa ser texto.".to_string(),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn content_needs_a_url() {
        assert!(validate_content(ProposalKind::LinkDesign, &json!({ "url": "https://canva.com/x" })).is_ok());
        assert!(
            validate_content(
                ProposalKind::Arquivo,
                &json!({ "url": "https://cdn/x.pdf", "nome_arquivo": "x.pdf" })
            )
            .is_ok()
        );
        assert_matches!(
            validate_content(ProposalKind::LinkDesign, &json!({ "url": "  " })),
            Err(AppError::Validation(_))
        );
        assert_matches!(
            validate_content(ProposalKind::Arquivo, &json!({ "url": "a", "nome_arquivo": 3 })),
            Err(AppError::Validation(_))
        );
    }
}

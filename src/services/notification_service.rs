// src/services/notification_service.rs
//
// Regras de notificação, alertas de saldo baixo e a rodada diária de disparos.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{CompanyStore, NotificationStore},
    models::{
        notification::{
            DispatchReport, LowBalanceAlert, LowBalanceAlertPayload, NotificationRule,
            NotificationRulePayload, NotificationRuleWithCompanies,
        },
        proposal::Proposal,
    },
    services::{messaging::MessageSender, meta_ads::AdMetricsSource},
};

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    companies: Arc<dyn CompanyStore>,
    sender: Arc<dyn MessageSender>,
    metrics: Arc<dyn AdMetricsSource>,
}

impl NotificationService {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        companies: Arc<dyn CompanyStore>,
        sender: Arc<dyn MessageSender>,
        metrics: Arc<dyn AdMetricsSource>,
    ) -> Self {
        Self {
            store,
            companies,
            sender,
            metrics,
        }
    }

    // =========================================================================
    //  1. REGRAS
    // =========================================================================

    pub async fn list_rules(&self) -> Result<Vec<NotificationRuleWithCompanies>, AppError> {
        let rules = self.store.list_rules().await?;
        let mut result = Vec::with_capacity(rules.len());
        for regra in rules {
            let empresas = self.store.rule_company_ids(regra.id).await?;
            result.push(NotificationRuleWithCompanies { regra, empresas });
        }
        Ok(result)
    }

    /// Grava a regra e depois os vínculos. Se os vínculos falharem, a regra
    /// recém-criada é apagada para não ficar órfã.
    pub async fn create_rule(
        &self,
        payload: NotificationRulePayload,
    ) -> Result<NotificationRuleWithCompanies, AppError> {
        payload.validate()?;

        let regra = self.store.insert_rule(&payload).await?;

        if let Err(e) = self.store.replace_rule_companies(regra.id, &payload.empresas).await {
            tracing::error!(regra_id = regra.id, "❌ Falha ao vincular empresas; desfazendo regra: {}", e);
            if let Err(undo) = self.store.delete_rule(regra.id).await {
                tracing::error!(regra_id = regra.id, "❌ Falha ao desfazer regra: {}", undo);
            }
            return Err(e);
        }

        tracing::info!(regra_id = regra.id, empresas = payload.empresas.len(), "🔔 Regra de notificação criada");
        Ok(NotificationRuleWithCompanies {
            regra,
            empresas: payload.empresas,
        })
    }

    pub async fn update_rule(
        &self,
        id: i64,
        payload: NotificationRulePayload,
    ) -> Result<NotificationRuleWithCompanies, AppError> {
        payload.validate()?;

        let regra = self
            .store
            .update_rule(id, &payload)
            .await?
            .ok_or_else(|| rule_not_found(id))?;
        self.store.replace_rule_companies(id, &payload.empresas).await?;

        Ok(NotificationRuleWithCompanies {
            regra,
            empresas: payload.empresas,
        })
    }

    pub async fn delete_rule(&self, id: i64) -> Result<(), AppError> {
        if !self.store.delete_rule(id).await? {
            return Err(rule_not_found(id));
        }
        tracing::info!(regra_id = id, "🗑️ Regra de notificação removida");
        Ok(())
    }

    // =========================================================================
    //  2. ALERTAS DE SALDO BAIXO
    // =========================================================================

    pub async fn list_low_balance_alerts(&self) -> Result<Vec<LowBalanceAlert>, AppError> {
        self.store.list_low_balance_alerts().await
    }

    pub async fn create_low_balance_alert(
        &self,
        payload: LowBalanceAlertPayload,
    ) -> Result<LowBalanceAlert, AppError> {
        payload.validate()?;
        if payload.limite < Decimal::ZERO {
            return Err(AppError::Validation(
                "O limite não pode ser negativo.".to_string(),
            ));
        }
        if self.companies.find_by_id(payload.empresa_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Empresa {} não encontrada.",
                payload.empresa_id
            )));
        }

        self.store.insert_low_balance_alert(&payload).await
    }

    pub async fn delete_low_balance_alert(&self, id: i64) -> Result<(), AppError> {
        if !self.store.delete_low_balance_alert(id).await? {
            return Err(AppError::NotFound(format!("Alerta {} não encontrado.", id)));
        }
        Ok(())
    }

    // =========================================================================
    //  3. DISPAROS
    // =========================================================================

    /// Uma rodada completa. Falhas de uma regra, de uma empresa ou de um envio
    /// entram no relatório e a rodada continua.
    pub async fn dispatch(&self) -> DispatchReport {
        let mut report = DispatchReport::default();
        let ontem = Local::now().date_naive().pred_opt().unwrap_or_else(|| Local::now().date_naive());

        match self.store.list_rules().await {
            Ok(regras) => {
                for regra in regras.into_iter().filter(|r| r.ativo) {
                    report.regras_processadas += 1;
                    self.dispatch_rule(&regra, ontem, &mut report).await;
                }
            }
            Err(e) => {
                tracing::error!("❌ Falha ao carregar regras de notificação: {}", e);
                report.falhas += 1;
            }
        }

        match self.store.list_low_balance_alerts().await {
            Ok(alertas) => {
                for alerta in alertas.into_iter().filter(|a| a.ativo) {
                    report.alertas_processados += 1;
                    self.dispatch_low_balance(&alerta, &mut report).await;
                }
            }
            Err(e) => {
                tracing::error!("❌ Falha ao carregar alertas de saldo: {}", e);
                report.falhas += 1;
            }
        }

        tracing::info!(
            regras = report.regras_processadas,
            alertas = report.alertas_processados,
            enviadas = report.mensagens_enviadas,
            falhas = report.falhas,
            "📬 Rodada de notificações concluída"
        );
        report
    }

    async fn dispatch_rule(&self, regra: &NotificationRule, dia: NaiveDate, report: &mut DispatchReport) {
        let empresas = match self.store.rule_company_ids(regra.id).await {
            Ok(empresas) => empresas,
            Err(e) => {
                tracing::error!(regra_id = regra.id, "❌ Falha ao carregar empresas da regra: {}", e);
                report.falhas += 1;
                return;
            }
        };

        let mut linhas = Vec::new();
        for empresa_id in empresas {
            let company = match self.companies.find_by_id(empresa_id).await {
                Ok(Some(company)) => company,
                Ok(None) => {
                    tracing::warn!(regra_id = regra.id, empresa_id, "⚠️ Empresa da regra não existe mais");
                    report.falhas += 1;
                    continue;
                }
                Err(e) => {
                    tracing::error!(regra_id = regra.id, empresa_id, "❌ Falha ao carregar empresa: {}", e);
                    report.falhas += 1;
                    continue;
                }
            };
            let Some(conta) = company.conta_anuncio.as_deref().filter(|c| !c.trim().is_empty()) else {
                tracing::warn!(regra_id = regra.id, empresa_id, "⚠️ Empresa sem conta de anúncio");
                report.falhas += 1;
                continue;
            };

            match self.metrics.conversions_yesterday(conta).await {
                Ok(total) => linhas.push((company.nome, total)),
                Err(e) => {
                    tracing::error!(regra_id = regra.id, empresa_id, "❌ Falha ao buscar conversões: {}", e);
                    report.falhas += 1;
                }
            }
        }

        if linhas.is_empty() {
            return;
        }

        let mensagem = daily_summary_message(dia, &linhas);
        self.send_counted(&regra.telefone, &mensagem, report).await;
    }

    async fn dispatch_low_balance(&self, alerta: &LowBalanceAlert, report: &mut DispatchReport) {
        let company = match self.companies.find_by_id(alerta.empresa_id).await {
            Ok(company) => company,
            Err(e) => {
                tracing::error!(alerta_id = alerta.id, empresa_id = alerta.empresa_id, "❌ Falha ao carregar empresa: {}", e);
                report.falhas += 1;
                return;
            }
        };
        let Some((nome, conta)) = company.and_then(|c| c.conta_anuncio.map(|conta| (c.nome, conta)))
        else {
            tracing::warn!(alerta_id = alerta.id, empresa_id = alerta.empresa_id, "⚠️ Alerta sem conta de anúncio");
            report.falhas += 1;
            return;
        };

        match self.metrics.balance(&conta).await {
            Ok(saldo) if saldo < alerta.limite => {
                let mensagem = low_balance_message(&nome, saldo, alerta.limite);
                self.send_counted(&alerta.telefone, &mensagem, report).await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(alerta_id = alerta.id, "❌ Falha ao buscar saldo: {}", e);
                report.falhas += 1;
            }
        }
    }

    async fn send_counted(&self, telefone: &str, mensagem: &str, report: &mut DispatchReport) {
        match self.sender.send(telefone, mensagem).await {
            Ok(()) => report.mensagens_enviadas += 1,
            Err(e) => {
                tracing::error!(telefone, "❌ Falha ao enviar mensagem: {}", e);
                report.falhas += 1;
            }
        }
    }

    /// Avisa as regras ativas da empresa que alguém abriu a proposta.
    /// Nunca falha: erros só vão para o log.
    pub async fn notify_proposal_opened(
        &self,
        proposta: &Proposal,
        visitante: &str,
        contato: Option<&str>,
    ) {
        let regras = match self.store.active_rules_for_company(proposta.empresa_id).await {
            Ok(regras) => regras,
            Err(e) => {
                tracing::error!(proposta_id = %proposta.id, "❌ Falha ao buscar regras: {}", e);
                return;
            }
        };

        let mensagem = proposal_opened_message(&proposta.nome, visitante, contato);
        for regra in regras {
            if let Err(e) = self.sender.send(&regra.telefone, &mensagem).await {
                tracing::error!(regra_id = regra.id, "❌ Falha ao avisar abertura de proposta: {}", e);
            }
        }
    }
}

fn rule_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Notificação {} não encontrada.", id))
}

pub fn daily_summary_message(dia: NaiveDate, linhas: &[(String, u64)]) -> String {
    let mut mensagem = format!("📊 Resumo de leads de {}\n", dia.format("%d/%m/%Y"));
    for (empresa, total) in linhas {
        let sufixo = if *total == 1 { "lead" } else { "leads" };
        mensagem.push_str(&format!("\n• {}: {} {}", empresa, total, sufixo));
    }
    mensagem
}

pub fn low_balance_message(empresa: &str, saldo: Decimal, limite: Decimal) -> String {
    format!(
        "⚠️ Saldo baixo na conta de anúncios de {}: R$ {} (limite R$ {}).",
        empresa,
        saldo.round_dp(2),
        limite.round_dp(2)
    )
}

pub fn proposal_opened_message(proposta: &str, visitante: &str, contato: Option<&str>) -> String {
    match contato {
        Some(contato) => format!(
            "👀 A proposta \"{}\" foi aberta por {} ({}).",
            proposta, visitante, contato
        ),
        None => format!("👀 A proposta \"{}\" foi aberta por {}.", proposta, visitante),
    }
}

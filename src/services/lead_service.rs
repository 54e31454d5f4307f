// src/services/lead_service.rs

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value, json};
use validator::Validate;

use crate::{
    common::{error::AppError, text::non_empty},
    db::{CompanyStore, LeadStore},
    models::{
        auth::SessionUser,
        company::Company,
        lead::{
            BatchIngestResult, BatchItemError, DadosOriginais, INITIAL_STAGE, Lead,
            ManualLeadPayload, NewLead,
        },
    },
    services::{
        access::AccessResolver,
        lead_normalizer::{self, LeadFields},
    },
};

pub const NO_LINKED_COMPANIES_MESSAGE: &str =
    "Nenhuma empresa vinculada ao seu usuário. Peça a um administrador para liberar o acesso.";

pub const QUALIFIED_MESSAGE: &str = "Lead marcado como qualificado. Esse sinal será usado \
    para otimizar as campanhas de anúncio da empresa.";

#[derive(Clone)]
pub struct LeadService {
    leads: Arc<dyn LeadStore>,
    companies: Arc<dyn CompanyStore>,
    access: AccessResolver,
}

impl LeadService {
    pub fn new(
        leads: Arc<dyn LeadStore>,
        companies: Arc<dyn CompanyStore>,
        access: AccessResolver,
    ) -> Self {
        Self {
            leads,
            companies,
            access,
        }
    }

    // =========================================================================
    //  1. ENTRADA (webhooks de formulário / integrações)
    // =========================================================================

    pub async fn ingest(&self, payload: Value) -> Result<Lead, AppError> {
        let raw = match payload {
            Value::Object(map) if !map.is_empty() => map,
            _ => return Err(AppError::Validation("O payload do lead está vazio.".to_string())),
        };

        let empresa_ref = lead_normalizer::company_ref(&raw).ok_or_else(missing_company_ref)?;

        let mut cache = HashMap::new();
        let new_lead = self.prepare(raw, &empresa_ref, &mut cache).await?;

        let lead = self.leads.insert(&new_lead).await?;
        tracing::info!(lead_id = lead.id, empresa = %empresa_ref, "📥 Lead recebido");
        Ok(lead)
    }

    /// Lote: a referência à empresa é checada em TODOS os itens antes de qualquer
    /// inserção (um item sem ela derruba o lote inteiro). O resto da validação é
    /// por item: os válidos entram, os inválidos voltam em `erros`.
    pub async fn ingest_batch(&self, items: Vec<Value>) -> Result<BatchIngestResult, AppError> {
        if items.is_empty() {
            return Err(AppError::Validation("O lote de leads está vazio.".to_string()));
        }

        let mut prepared = Vec::with_capacity(items.len());
        for (indice, item) in items.into_iter().enumerate() {
            let raw = match item {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            match lead_normalizer::company_ref(&raw) {
                Some(empresa_ref) => prepared.push((indice, raw, empresa_ref)),
                None => {
                    return Err(AppError::ValidationDetails {
                        message: format!(
                            "O lead na posição {} não informa empresa_id. Nenhum lead do lote foi salvo.",
                            indice
                        ),
                        details: json!({ "indice": indice }),
                    });
                }
            }
        }

        let mut cache = HashMap::new();
        let mut valid = Vec::new();
        let mut erros = Vec::new();

        for (indice, raw, empresa_ref) in prepared {
            match self.prepare(raw, &empresa_ref, &mut cache).await {
                Ok(new_lead) => valid.push(new_lead),
                Err(AppError::Validation(mensagem)) => erros.push(BatchItemError { indice, mensagem }),
                Err(other) => return Err(other),
            }
        }

        if valid.is_empty() {
            return Err(AppError::ValidationDetails {
                message: "Nenhum lead válido no lote.".to_string(),
                details: serde_json::to_value(&erros).unwrap_or(Value::Null),
            });
        }

        let inseridos = self.leads.insert_many(&valid).await?;
        tracing::info!(
            inseridos = inseridos.len(),
            recusados = erros.len(),
            "📥 Lote de leads processado"
        );

        Ok(BatchIngestResult { inseridos, erros })
    }

    // Validação de um item já com referência à empresa
    async fn prepare(
        &self,
        raw: Map<String, Value>,
        empresa_ref: &str,
        cache: &mut HashMap<i64, Option<Company>>,
    ) -> Result<NewLead, AppError> {
        let empresa_id = lead_normalizer::parse_company_id(empresa_ref)
            .ok_or_else(|| company_not_found(empresa_ref))?;

        let company = match cache.get(&empresa_id) {
            Some(found) => found.clone(),
            None => {
                let found = self.companies.find_by_id(empresa_id).await?;
                cache.insert(empresa_id, found.clone());
                found
            }
        };
        if company.is_none() {
            return Err(company_not_found(empresa_ref));
        }

        let fields = lead_normalizer::normalize(&raw);
        if !fields.has_identity() {
            return Err(AppError::Validation(
                "O lead precisa ter ao menos nome, e-mail ou telefone.".to_string(),
            ));
        }

        Ok(new_lead_from(fields, DadosOriginais::new(raw), Utc::now()))
    }

    // =========================================================================
    //  2. LISTAGEM
    // =========================================================================

    /// Devolve os leads visíveis e a mensagem para o envelope.
    pub async fn list(&self, user: &SessionUser) -> Result<(Vec<Lead>, String), AppError> {
        let scope = self.access.resolve(user).await?;

        if scope.full_access {
            let leads = self.leads.list_all().await?;
            let message = format!("{} leads encontrados.", leads.len());
            return Ok((leads, message));
        }

        if scope.is_empty() {
            return Ok((Vec::new(), NO_LINKED_COMPANIES_MESSAGE.to_string()));
        }

        let leads: Vec<Lead> = self
            .leads
            .list_all()
            .await?
            .into_iter()
            .filter(|lead| {
                lead.dados_originais
                    .empresa_id()
                    .is_some_and(|empresa_ref| scope.contains_ref(&empresa_ref))
            })
            .collect();

        let message = format!("{} leads encontrados.", leads.len());
        Ok((leads, message))
    }

    // =========================================================================
    //  3. CADASTRO MANUAL
    // =========================================================================

    pub async fn add_manual(
        &self,
        user: &SessionUser,
        payload: ManualLeadPayload,
    ) -> Result<Lead, AppError> {
        payload.validate()?;
        let nome = non_empty(payload.nome.as_deref())
            .ok_or_else(|| AppError::Validation("O nome do lead é obrigatório.".to_string()))?;
        let empresa_id = payload
            .empresa_id
            .ok_or_else(|| AppError::Validation("A empresa do lead é obrigatória.".to_string()))?;
        let email = non_empty(payload.email.as_deref());
        let telefone = non_empty(payload.telefone.as_deref());
        if email.is_none() && telefone.is_none() {
            return Err(AppError::Validation(
                "Informe ao menos e-mail ou telefone.".to_string(),
            ));
        }

        let company = self.access.ensure_existing_company(user, empresa_id).await?;

        // Extras do usuário primeiro; os campos do sistema por cima. Nenhuma
        // chave dos extras pode apontar para outra empresa.
        let mut extras = payload.dados_extras;
        extras.retain(|key, _| !lead_normalizer::is_company_ref_key(key));
        let mut dados = DadosOriginais::new(extras);
        dados.merge(
            json!({
                "empresa_id": company.id,
                "empresa_nome": company.nome,
                "origem": "manual",
                "criado_por": {
                    "id": user.id,
                    "nome": user.nome,
                    "email": user.email,
                },
            })
            .as_object()
            .cloned()
            .unwrap_or_default(),
        );

        let now = Utc::now();
        let new_lead = NewLead {
            nome: Some(nome),
            email,
            telefone,
            data_contato: Some(now),
            stage: INITIAL_STAGE.to_string(),
            data_entrada: now,
            dados_originais: dados,
        };

        let lead = self.leads.insert(&new_lead).await?;
        tracing::info!(lead_id = lead.id, usuario_id = user.id, "📝 Lead cadastrado manualmente");
        Ok(lead)
    }

    // =========================================================================
    //  4. MOVIMENTAÇÃO NO FUNIL
    // =========================================================================

    /// Qualquer texto não vazio é um stage válido: quem define o funil é a
    /// configuração de stages da empresa.
    pub async fn update_stage(
        &self,
        user: &SessionUser,
        lead_id: i64,
        stage: Option<&str>,
    ) -> Result<Lead, AppError> {
        let stage = non_empty(stage)
            .ok_or_else(|| AppError::Validation("O novo stage é obrigatório.".to_string()))?;

        self.owned_lead(user, lead_id).await?;

        let lead = self.leads.update_stage(lead_id, &stage, Utc::now()).await?;
        tracing::info!(lead_id, stage = %stage, "🔀 Lead movido de stage");
        Ok(lead)
    }

    pub async fn mark_qualified(
        &self,
        user: &SessionUser,
        lead_id: i64,
        data_qualificacao: Option<DateTime<Utc>>,
    ) -> Result<(Lead, String), AppError> {
        let lead = self.owned_lead(user, lead_id).await?;

        let data_qualificacao = data_qualificacao.unwrap_or_else(Utc::now);
        let mut dados = lead.dados_originais;
        dados.merge(
            json!({
                "qualificado": true,
                "data_qualificacao": data_qualificacao.to_rfc3339(),
                "qualificado_por": user.nome,
                "qualificado_por_id": user.id,
            })
            .as_object()
            .cloned()
            .unwrap_or_default(),
        );

        // TODO: enviar o evento de qualificação para a Conversions API da Meta
        // usando o pixel da empresa (tabela trackeamento_empresa).
        let lead = self.leads.update_dados(lead_id, &dados, Utc::now()).await?;
        tracing::info!(lead_id, usuario_id = user.id, "⭐ Lead qualificado");

        Ok((lead, QUALIFIED_MESSAGE.to_string()))
    }

    // Lead existe, tem empresa nos dados originais, e o usuário pode mexer nela
    async fn owned_lead(&self, user: &SessionUser, lead_id: i64) -> Result<Lead, AppError> {
        let lead = self
            .leads
            .find_by_id(lead_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lead {} não encontrado.", lead_id)))?;

        let empresa_ref = lead.dados_originais.empresa_id().ok_or_else(|| {
            AppError::Validation("O lead não possui empresa_id nos dados originais.".to_string())
        })?;

        if !user.permissao.has_full_access() {
            let empresa_id = lead_normalizer::parse_company_id(&empresa_ref).ok_or_else(|| {
                AppError::Forbidden("Você não tem permissão para alterar este lead.".to_string())
            })?;
            self.access.ensure_company(user, empresa_id).await?;
        }

        Ok(lead)
    }
}

fn missing_company_ref() -> AppError {
    AppError::Validation("O campo empresa_id é obrigatório.".to_string())
}

fn company_not_found(empresa_ref: &str) -> AppError {
    AppError::Validation(format!("Empresa {} não encontrada.", empresa_ref))
}

fn new_lead_from(fields: LeadFields, dados: DadosOriginais, now: DateTime<Utc>) -> NewLead {
    NewLead {
        nome: fields.nome.as_ref().map(lead_normalizer::as_text),
        email: fields.email.as_ref().map(lead_normalizer::as_text),
        telefone: fields.telefone.as_ref().map(lead_normalizer::as_text),
        data_contato: fields.data_contato.as_ref().and_then(parse_contact_date),
        stage: INITIAL_STAGE.to_string(),
        data_entrada: now,
        dados_originais: dados,
    }
}

/// Datas de contato chegam em vários formatos; o que não der para ler fica só
/// nos dados originais.
fn parse_contact_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|d| d.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                ["%Y-%m-%d", "%d/%m/%Y"].iter().find_map(|fmt| {
                    NaiveDate::parse_from_str(s, fmt)
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(|d| d.and_utc())
                })
            }),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_date_accepts_common_formats() {
        let iso = parse_contact_date(&json!("2024-05-01T10:30:00-03:00")).unwrap();
        assert_eq!(iso.to_rfc3339(), "2024-05-01T13:30:00+00:00");

        let br = parse_contact_date(&json!("01/05/2024")).unwrap();
        assert_eq!(br.date_naive(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());

        assert!(parse_contact_date(&json!(1714560000)).is_some());
        assert!(parse_contact_date(&json!("ontem")).is_none());
    }

    #[test]
    fn normalized_fields_become_text_columns() {
        let raw = json!({ "Name": "Ana", "phone": 11999990000u64, "empresa_id": "1" });
        let raw = raw.as_object().cloned().unwrap();
        let fields = lead_normalizer::normalize(&raw);
        let lead = new_lead_from(fields, DadosOriginais::new(raw), Utc::now());

        assert_eq!(lead.nome.as_deref(), Some("Ana"));
        assert_eq!(lead.telefone.as_deref(), Some("11999990000"));
        assert_eq!(lead.stage, INITIAL_STAGE);
        assert_eq!(lead.dados_originais.empresa_id().as_deref(), Some("1"));
    }
}

#![allow(dead_code)]

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicI64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::{DateTime, NaiveTime, Utc};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use painel_backend::{
    common::error::AppError,
    config::{AppState, Config, Stores},
    db::{
        CompanyStore, LeadStore, NotificationStore, ProposalStore, StageStore, UserStore,
        lead_repo::stage_check_violation,
    },
    models::{
        auth::{Role, SessionUser, User},
        company::{Company, CompanyPayload},
        lead::{DadosOriginais, Lead, NewLead},
        notification::{
            LowBalanceAlert, LowBalanceAlertPayload, NotificationRule, NotificationRulePayload,
        },
        proposal::{
            NewOpenEvent, NewProposal, Proposal, ProposalOpenEvent, ProposalStatus, VisualConfig,
        },
        stages::{Stage, StageConfigRow},
        user::{NewUser, UserChanges},
    },
    routes,
    services::{messaging::MessageSender, meta_ads::AdMetricsSource},
};

// ---------------------------------------------------------------------------
// Banco em memória: implementa todos os stores
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryDb {
    next_id: AtomicI64,
    pub users: Mutex<Vec<User>>,
    pub links: Mutex<BTreeSet<(i64, i64)>>,
    pub companies: Mutex<Vec<Company>>,
    pub leads: Mutex<Vec<Lead>>,
    pub stages: Mutex<HashMap<i64, StageConfigRow>>,
    pub proposals: Mutex<Vec<Proposal>>,
    pub open_events: Mutex<Vec<ProposalOpenEvent>>,
    pub visuals: Mutex<HashMap<i64, VisualConfig>>,
    pub rules: Mutex<Vec<NotificationRule>>,
    // (regra, empresa, ordem)
    pub rule_links: Mutex<Vec<(i64, i64, usize)>>,
    pub alerts: Mutex<Vec<LowBalanceAlert>>,
    pub fail_rule_links: AtomicBool,
    pub fail_open_events: AtomicBool,
    // Stages recusados como se houvesse a CHECK antiga na coluna
    pub checked_stages: Mutex<HashSet<String>>,
    // Empresas cuja leitura falha
    pub failing_companies: Mutex<HashSet<i64>>,
    // Regras cuja leitura dos vínculos falha
    pub failing_rule_links: Mutex<HashSet<i64>>,
}

impl MemoryDb {
    fn id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1000
    }

    pub fn add_company(&self, id: i64, nome: &str, conta_anuncio: Option<&str>) {
        self.companies.lock().unwrap().push(Company {
            id,
            nome: nome.to_string(),
            conta_anuncio: conta_anuncio.map(str::to_string),
        });
    }

    pub fn add_user(&self, id: i64, nome: &str, email: &str, senha: &str, permissao: Role) {
        self.users.lock().unwrap().push(User {
            id,
            nome: nome.to_string(),
            email: email.to_string(),
            senha: senha.to_string(),
            permissao,
        });
    }

    pub fn link(&self, usuario_id: i64, empresa_id: i64) {
        self.links.lock().unwrap().insert((usuario_id, empresa_id));
    }

    pub fn lead_count(&self) -> usize {
        self.leads.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for MemoryDb {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let mut users = self.users.lock().unwrap().clone();
        users.sort_by(|a, b| a.nome.cmp(&b.nome));
        Ok(users)
    }

    async fn create(&self, user: &NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(AppError::EmailAlreadyExists);
        }
        let created = User {
            id: self.id(),
            nome: user.nome.clone(),
            email: user.email.clone(),
            senha: user.senha_hash.clone(),
            permissao: user.permissao,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> Result<Option<User>, AppError> {
        let mut users = self.users.lock().unwrap();
        if let Some(email) = &changes.email {
            if users
                .iter()
                .any(|u| u.id != id && u.email.eq_ignore_ascii_case(email))
            {
                return Err(AppError::EmailAlreadyExists);
            }
        }
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(nome) = &changes.nome {
            user.nome = nome.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(senha) = &changes.senha_hash {
            user.senha = senha.clone();
        }
        if let Some(permissao) = changes.permissao {
            user.permissao = permissao;
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        self.links.lock().unwrap().retain(|(u, _)| *u != id);
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }

    async fn linked_company_ids(&self, user_id: i64) -> Result<Vec<i64>, AppError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, e)| *e)
            .collect())
    }

    async fn has_link(&self, user_id: i64, company_id: i64) -> Result<bool, AppError> {
        Ok(self.links.lock().unwrap().contains(&(user_id, company_id)))
    }

    async fn replace_links(&self, user_id: i64, company_ids: &[i64]) -> Result<(), AppError> {
        let mut links = self.links.lock().unwrap();
        links.retain(|(u, _)| *u != user_id);
        links.extend(company_ids.iter().map(|e| (user_id, *e)));
        Ok(())
    }
}

#[async_trait]
impl CompanyStore for MemoryDb {
    async fn list(&self) -> Result<Vec<Company>, AppError> {
        let mut companies = self.companies.lock().unwrap().clone();
        companies.sort_by(|a, b| a.nome.cmp(&b.nome));
        Ok(companies)
    }

    async fn list_ids(&self) -> Result<Vec<i64>, AppError> {
        let mut ids: Vec<i64> = self.companies.lock().unwrap().iter().map(|c| c.id).collect();
        ids.sort();
        Ok(ids)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Company>, AppError> {
        if self.failing_companies.lock().unwrap().contains(&id) {
            return Err(AppError::InternalServerError(anyhow::anyhow!(
                "falha simulada ao ler a empresa {}",
                id
            )));
        }
        Ok(self
            .companies
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn create(&self, input: &CompanyPayload) -> Result<Company, AppError> {
        let company = Company {
            id: self.id(),
            nome: input.nome.clone(),
            conta_anuncio: input.conta_anuncio.clone(),
        };
        self.companies.lock().unwrap().push(company.clone());
        Ok(company)
    }

    async fn update(&self, id: i64, input: &CompanyPayload) -> Result<Option<Company>, AppError> {
        let mut companies = self.companies.lock().unwrap();
        let Some(company) = companies.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        company.nome = input.nome.clone();
        company.conta_anuncio = input.conta_anuncio.clone();
        Ok(Some(company.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut companies = self.companies.lock().unwrap();
        let before = companies.len();
        companies.retain(|c| c.id != id);
        Ok(companies.len() < before)
    }
}

fn lead_from(id: i64, lead: &NewLead) -> Lead {
    Lead {
        id,
        nome: lead.nome.clone(),
        email: lead.email.clone(),
        telefone: lead.telefone.clone(),
        data_contato: lead.data_contato,
        stage: lead.stage.clone(),
        data_entrada: lead.data_entrada,
        updated_at: None,
        dados_originais: lead.dados_originais.clone(),
    }
}

#[async_trait]
impl LeadStore for MemoryDb {
    async fn insert(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let created = lead_from(self.id(), lead);
        self.leads.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn insert_many(&self, leads: &[NewLead]) -> Result<Vec<Lead>, AppError> {
        let created: Vec<Lead> = leads.iter().map(|l| lead_from(self.id(), l)).collect();
        self.leads.lock().unwrap().extend(created.iter().cloned());
        Ok(created)
    }

    async fn list_all(&self) -> Result<Vec<Lead>, AppError> {
        let mut leads = self.leads.lock().unwrap().clone();
        leads.sort_by(|a, b| b.data_entrada.cmp(&a.data_entrada).then(b.id.cmp(&a.id)));
        Ok(leads)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Lead>, AppError> {
        Ok(self.leads.lock().unwrap().iter().find(|l| l.id == id).cloned())
    }

    async fn update_stage(
        &self,
        id: i64,
        stage: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Lead, AppError> {
        if self.checked_stages.lock().unwrap().contains(stage) {
            return Err(stage_check_violation("leads_stage_check"));
        }
        let mut leads = self.leads.lock().unwrap();
        let lead = leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Lead {} não encontrado.", id)))?;
        lead.stage = stage.to_string();
        lead.updated_at = Some(updated_at);
        Ok(lead.clone())
    }

    async fn update_dados(
        &self,
        id: i64,
        dados: &DadosOriginais,
        updated_at: DateTime<Utc>,
    ) -> Result<Lead, AppError> {
        let mut leads = self.leads.lock().unwrap();
        let lead = leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Lead {} não encontrado.", id)))?;
        lead.dados_originais = dados.clone();
        lead.updated_at = Some(updated_at);
        Ok(lead.clone())
    }
}

#[async_trait]
impl StageStore for MemoryDb {
    async fn find(&self, empresa_id: i64) -> Result<Option<StageConfigRow>, AppError> {
        Ok(self.stages.lock().unwrap().get(&empresa_id).cloned())
    }

    async fn upsert(&self, empresa_id: i64, stages: &[Stage]) -> Result<StageConfigRow, AppError> {
        let row = StageConfigRow {
            empresa_id,
            stages: stages.to_vec(),
            updated_at: Some(Utc::now()),
        };
        self.stages.lock().unwrap().insert(empresa_id, row.clone());
        Ok(row)
    }

    async fn delete(&self, empresa_id: i64) -> Result<bool, AppError> {
        Ok(self.stages.lock().unwrap().remove(&empresa_id).is_some())
    }
}

#[async_trait]
impl ProposalStore for MemoryDb {
    async fn create(&self, input: &NewProposal) -> Result<Proposal, AppError> {
        let proposal = Proposal {
            id: Uuid::new_v4(),
            nome: input.nome.clone(),
            exige_contato: input.exige_contato,
            tipo: input.tipo,
            conteudo: input.conteudo.clone(),
            criado_em: Utc::now(),
            status: ProposalStatus::NaoAberta,
            visualizacoes: 0,
            empresa_id: input.empresa_id,
        };
        self.proposals.lock().unwrap().push(proposal.clone());
        Ok(proposal)
    }

    async fn list_all(&self) -> Result<Vec<Proposal>, AppError> {
        let mut proposals = self.proposals.lock().unwrap().clone();
        proposals.sort_by(|a, b| b.criado_em.cmp(&a.criado_em));
        Ok(proposals)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Proposal>, AppError> {
        Ok(self
            .proposals
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn register_view(&self, id: Uuid) -> Result<Option<Proposal>, AppError> {
        let mut proposals = self.proposals.lock().unwrap();
        let Some(proposal) = proposals.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        proposal.visualizacoes += 1;
        proposal.status = ProposalStatus::Aberta;
        Ok(Some(proposal.clone()))
    }

    async fn insert_open_event(&self, event: &NewOpenEvent) -> Result<ProposalOpenEvent, AppError> {
        if self.fail_open_events.load(Ordering::SeqCst) {
            return Err(AppError::Validation("falha simulada".to_string()));
        }
        let created = ProposalOpenEvent {
            id: self.id(),
            proposta_id: event.proposta_id,
            nome: event.nome.clone(),
            contato: event.contato.clone(),
            aberto_em: Utc::now(),
            ip: event.ip.clone(),
        };
        self.open_events.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn list_open_events(&self, proposta_id: Uuid) -> Result<Vec<ProposalOpenEvent>, AppError> {
        let mut events: Vec<ProposalOpenEvent> = self
            .open_events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.proposta_id == proposta_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.aberto_em.cmp(&a.aberto_em).then(b.id.cmp(&a.id)));
        Ok(events)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.open_events.lock().unwrap().retain(|e| e.proposta_id != id);
        let mut proposals = self.proposals.lock().unwrap();
        let before = proposals.len();
        proposals.retain(|p| p.id != id);
        Ok(proposals.len() < before)
    }

    async fn find_visual(&self, empresa_id: i64) -> Result<Option<VisualConfig>, AppError> {
        Ok(self.visuals.lock().unwrap().get(&empresa_id).cloned())
    }

    async fn save_visual(&self, config: &VisualConfig) -> Result<VisualConfig, AppError> {
        self.visuals
            .lock()
            .unwrap()
            .insert(config.empresa_id, config.clone());
        Ok(config.clone())
    }
}

#[async_trait]
impl NotificationStore for MemoryDb {
    async fn list_rules(&self) -> Result<Vec<NotificationRule>, AppError> {
        Ok(self.rules.lock().unwrap().clone())
    }

    async fn find_rule(&self, id: i64) -> Result<Option<NotificationRule>, AppError> {
        Ok(self.rules.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn insert_rule(&self, input: &NotificationRulePayload) -> Result<NotificationRule, AppError> {
        let rule = NotificationRule {
            id: self.id(),
            nome: input.nome.clone(),
            telefone: input.telefone.clone(),
            horario: input.horario,
            ativo: input.ativo,
        };
        self.rules.lock().unwrap().push(rule.clone());
        Ok(rule)
    }

    async fn update_rule(
        &self,
        id: i64,
        input: &NotificationRulePayload,
    ) -> Result<Option<NotificationRule>, AppError> {
        let mut rules = self.rules.lock().unwrap();
        let Some(rule) = rules.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        rule.nome = input.nome.clone();
        rule.telefone = input.telefone.clone();
        rule.horario = input.horario;
        rule.ativo = input.ativo;
        Ok(Some(rule.clone()))
    }

    async fn delete_rule(&self, id: i64) -> Result<bool, AppError> {
        self.rule_links.lock().unwrap().retain(|(r, _, _)| *r != id);
        let mut rules = self.rules.lock().unwrap();
        let before = rules.len();
        rules.retain(|r| r.id != id);
        Ok(rules.len() < before)
    }

    async fn rule_company_ids(&self, rule_id: i64) -> Result<Vec<i64>, AppError> {
        if self.failing_rule_links.lock().unwrap().contains(&rule_id) {
            return Err(AppError::InternalServerError(anyhow::anyhow!(
                "falha simulada ao ler os vínculos da regra {}",
                rule_id
            )));
        }
        let mut links: Vec<(i64, i64, usize)> = self
            .rule_links
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _, _)| *r == rule_id)
            .copied()
            .collect();
        links.sort_by_key(|(_, _, ordem)| *ordem);
        Ok(links.into_iter().map(|(_, e, _)| e).collect())
    }

    async fn replace_rule_companies(&self, rule_id: i64, company_ids: &[i64]) -> Result<(), AppError> {
        if self.fail_rule_links.load(Ordering::SeqCst) {
            return Err(AppError::InternalServerError(anyhow::anyhow!(
                "falha simulada ao vincular empresas"
            )));
        }
        let mut links = self.rule_links.lock().unwrap();
        links.retain(|(r, _, _)| *r != rule_id);
        links.extend(
            company_ids
                .iter()
                .enumerate()
                .map(|(ordem, e)| (rule_id, *e, ordem)),
        );
        Ok(())
    }

    async fn active_rules_for_company(&self, empresa_id: i64) -> Result<Vec<NotificationRule>, AppError> {
        let rule_ids: HashSet<i64> = self
            .rule_links
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, e, _)| *e == empresa_id)
            .map(|(r, _, _)| *r)
            .collect();
        Ok(self
            .rules
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.ativo && rule_ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn list_low_balance_alerts(&self) -> Result<Vec<LowBalanceAlert>, AppError> {
        Ok(self.alerts.lock().unwrap().clone())
    }

    async fn insert_low_balance_alert(
        &self,
        input: &LowBalanceAlertPayload,
    ) -> Result<LowBalanceAlert, AppError> {
        let alert = LowBalanceAlert {
            id: self.id(),
            empresa_id: input.empresa_id,
            telefone: input.telefone.clone(),
            limite: input.limite,
            ativo: input.ativo,
        };
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(alert)
    }

    async fn delete_low_balance_alert(&self, id: i64) -> Result<bool, AppError> {
        let mut alerts = self.alerts.lock().unwrap();
        let before = alerts.len();
        alerts.retain(|a| a.id != id);
        Ok(alerts.len() < before)
    }
}

// ---------------------------------------------------------------------------
// WhatsApp e Meta falsos
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeSender {
    pub sent: Mutex<Vec<(String, String)>>,
    pub failing_phones: Mutex<HashSet<String>>,
}

impl FakeSender {
    pub fn messages_to(&self, telefone: &str) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == telefone)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

#[async_trait]
impl MessageSender for FakeSender {
    async fn send(&self, telefone: &str, mensagem: &str) -> Result<(), AppError> {
        if self.failing_phones.lock().unwrap().contains(telefone) {
            return Err(AppError::Upstream(format!("telefone {} indisponível", telefone)));
        }
        self.sent
            .lock()
            .unwrap()
            .push((telefone.to_string(), mensagem.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeMetrics {
    // conta -> conversões; conta ausente = falha na Graph API
    pub conversions: Mutex<HashMap<String, u64>>,
    pub balances: Mutex<HashMap<String, Decimal>>,
}

#[async_trait]
impl AdMetricsSource for FakeMetrics {
    async fn conversions_yesterday(&self, conta_anuncio: &str) -> Result<u64, AppError> {
        self.conversions
            .lock()
            .unwrap()
            .get(conta_anuncio)
            .copied()
            .ok_or_else(|| AppError::Upstream(format!("conta {} sem insights", conta_anuncio)))
    }

    async fn balance(&self, conta_anuncio: &str) -> Result<Decimal, AppError> {
        self.balances
            .lock()
            .unwrap()
            .get(conta_anuncio)
            .copied()
            .ok_or_else(|| AppError::Upstream(format!("conta {} sem saldo", conta_anuncio)))
    }
}

// ---------------------------------------------------------------------------
// Aplicação de teste
// ---------------------------------------------------------------------------

pub const ADMIN_ID: i64 = 1;
pub const GESTOR_ID: i64 = 2;
// USER vinculado só à empresa 1
pub const LINKED_USER_ID: i64 = 3;
// USER sem nenhum vínculo
pub const LONELY_USER_ID: i64 = 4;

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://nao-usado".to_string(),
        jwt_secret: "segredo-de-teste".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        whatsapp_webhook_url: None,
        meta_access_token: None,
        meta_graph_url: "http://localhost".to_string(),
        dispatch_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        lead_webhook_token: None,
        http_timeout: Duration::from_secs(1),
        cors_origins: Vec::new(),
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub db: Arc<MemoryDb>,
    pub sender: Arc<FakeSender>,
    pub metrics: Arc<FakeMetrics>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Empresas 1 (conta 111), 2 (conta 222) e 3 (sem conta), mais um usuário
    /// de cada perfil.
    pub fn with_config(config: Config) -> Self {
        let db = Arc::new(MemoryDb::default());
        db.add_company(1, "Clínica Sorriso", Some("111"));
        db.add_company(2, "Auto Center", Some("222"));
        db.add_company(3, "Padaria Central", None);

        db.add_user(ADMIN_ID, "Alice Admin", "admin@painel.com", "admin123", Role::Admin);
        db.add_user(GESTOR_ID, "Gustavo Gestor", "gestor@painel.com", "gestor123", Role::Gestor);
        db.add_user(LINKED_USER_ID, "Ulisses", "ulisses@painel.com", "user123", Role::User);
        db.add_user(LONELY_USER_ID, "Sofia", "sofia@painel.com", "user123", Role::User);
        db.link(LINKED_USER_ID, 1);

        let sender = Arc::new(FakeSender::default());
        let metrics = Arc::new(FakeMetrics::default());

        let stores = Stores {
            users: db.clone(),
            companies: db.clone(),
            leads: db.clone(),
            stages: db.clone(),
            proposals: db.clone(),
            notifications: db.clone(),
        };
        let state = AppState::from_parts(config, stores, sender.clone(), metrics.clone());
        let router = routes::build_router(state.clone());

        Self {
            router,
            state,
            db,
            sender,
            metrics,
        }
    }

    pub fn token(&self, user_id: i64) -> String {
        let users = self.db.users.lock().unwrap();
        let user = users
            .iter()
            .find(|u| u.id == user_id)
            .expect("usuário de teste inexistente");
        self.state
            .auth_service
            .create_token(&SessionUser::from(user))
            .unwrap()
    }

    pub fn session(&self, user_id: i64) -> SessionUser {
        let users = self.db.users.lock().unwrap();
        SessionUser::from(users.iter().find(|u| u.id == user_id).unwrap())
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.request_with_headers(method, uri, token, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }
}

/// Confere o envelope de erro e devolve a mensagem.
pub fn assert_error_envelope(body: &Value) -> String {
    assert_eq!(body["success"], false, "envelope: {body}");
    assert!(body["data"].is_null());
    assert!(body["error"]["message"].is_string());
    body["message"].as_str().unwrap_or_default().to_string()
}

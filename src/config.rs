// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::NaiveTime;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    db::{
        CompanyRepository, CompanyStore, LeadRepository, LeadStore, NotificationRepository,
        NotificationStore, ProposalRepository, ProposalStore, StageRepository, StageStore,
        UserRepository, UserStore,
    },
    services::{
        access::AccessResolver,
        auth::AuthService,
        company_service::CompanyService,
        lead_service::LeadService,
        messaging::{MessageSender, WhatsAppWebhook},
        meta_ads::{AdMetricsSource, MetaInsightsClient},
        notification_service::NotificationService,
        proposal_service::ProposalService,
        stage_service::StageService,
        user_service::UserService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_META_GRAPH_URL: &str = "https://graph.facebook.com/v19.0";

// Tudo que vem do ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub whatsapp_webhook_url: Option<String>,
    pub meta_access_token: Option<String>,
    pub meta_graph_url: String,
    pub dispatch_time: NaiveTime,
    // Segredo opcional exigido no header `x-webhook-token` dos webhooks de leads
    pub lead_webhook_token: Option<String>,
    pub http_timeout: Duration,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let dispatch_time = match optional("NOTIFICATION_DISPATCH_TIME") {
            Some(raw) => parse_dispatch_time(&raw)
                .with_context(|| format!("NOTIFICATION_DISPATCH_TIME inválido: {}", raw))?,
            None => NaiveTime::from_hms_opt(9, 0, 0).context("horário padrão inválido")?,
        };

        let http_timeout = match optional("HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("HTTP_TIMEOUT_SECS inválido: {}", raw))?,
            ),
            None => Duration::from_secs(15),
        };

        let cors_origins = optional("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            whatsapp_webhook_url: optional("WHATSAPP_WEBHOOK_URL"),
            meta_access_token: optional("META_ACCESS_TOKEN"),
            meta_graph_url: optional("META_GRAPH_URL")
                .unwrap_or_else(|| DEFAULT_META_GRAPH_URL.to_string()),
            dispatch_time,
            lead_webhook_token: optional("LEAD_WEBHOOK_TOKEN"),
            http_timeout,
            cors_origins,
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Aceita "HH:MM" ou "HH:MM:SS".
pub fn parse_dispatch_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
    Ok(pool)
}

// Os repositórios por trás dos serviços. Em produção, Postgres; nos testes, fakes.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub companies: Arc<dyn CompanyStore>,
    pub leads: Arc<dyn LeadStore>,
    pub stages: Arc<dyn StageStore>,
    pub proposals: Arc<dyn ProposalStore>,
    pub notifications: Arc<dyn NotificationStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            companies: Arc::new(CompanyRepository::new(pool.clone())),
            leads: Arc::new(LeadRepository::new(pool.clone())),
            stages: Arc::new(StageRepository::new(pool.clone())),
            proposals: Arc::new(ProposalRepository::new(pool.clone())),
            notifications: Arc::new(NotificationRepository::new(pool)),
        }
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub lead_service: LeadService,
    pub stage_service: StageService,
    pub company_service: CompanyService,
    pub user_service: UserService,
    pub proposal_service: ProposalService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<(Self, PgPool)> {
        let pool = connect(&config.database_url).await?;

        let sender = WhatsAppWebhook::new(config.whatsapp_webhook_url.clone(), config.http_timeout)?;
        let metrics = MetaInsightsClient::new(
            config.meta_graph_url.clone(),
            config.meta_access_token.clone(),
            config.http_timeout,
        )?;

        let state = Self::from_parts(
            config,
            Stores::postgres(pool.clone()),
            Arc::new(sender),
            Arc::new(metrics),
        );
        Ok((state, pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(
        config: Config,
        stores: Stores,
        sender: Arc<dyn MessageSender>,
        metrics: Arc<dyn AdMetricsSource>,
    ) -> Self {
        let access = AccessResolver::new(stores.users.clone(), stores.companies.clone());

        let notification_service = NotificationService::new(
            stores.notifications.clone(),
            stores.companies.clone(),
            sender,
            metrics,
        );

        Self {
            auth_service: AuthService::new(stores.users.clone(), config.jwt_secret.clone()),
            lead_service: LeadService::new(
                stores.leads.clone(),
                stores.companies.clone(),
                access.clone(),
            ),
            stage_service: StageService::new(stores.stages.clone(), access.clone()),
            company_service: CompanyService::new(stores.companies.clone(), access.clone()),
            user_service: UserService::new(stores.users.clone(), stores.companies.clone()),
            proposal_service: ProposalService::new(
                stores.proposals.clone(),
                access,
                notification_service.clone(),
            ),
            notification_service,
            config: Arc::new(config),
        }
    }
}

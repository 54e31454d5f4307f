// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Usuários ---
        handlers::admin::list_users,
        handlers::admin::create_user,
        handlers::admin::update_user,
        handlers::admin::delete_user,

        // --- Empresas ---
        handlers::admin::list_companies,
        handlers::admin::create_company,
        handlers::admin::update_company,
        handlers::admin::delete_company,

        // --- Leads ---
        handlers::leads::receive_lead,
        handlers::leads::receive_batch,
        handlers::leads::list_leads,
        handlers::leads::create_lead,
        handlers::leads::update_stage,
        handlers::leads::qualify_lead,

        // --- Stages ---
        handlers::stages::get_stages,
        handlers::stages::save_stages,
        handlers::stages::reset_stages,

        // --- Propostas ---
        handlers::proposals::create_proposal,
        handlers::proposals::list_proposals,
        handlers::proposals::list_open_events,
        handlers::proposals::delete_proposal,
        handlers::proposals::public_proposal,
        handlers::proposals::register_view,
        handlers::proposals::get_visual,
        handlers::proposals::save_visual,

        // --- Notificações ---
        handlers::notifications::list_rules,
        handlers::notifications::create_rule,
        handlers::notifications::update_rule,
        handlers::notifications::delete_rule,
        handlers::notifications::list_low_balance_alerts,
        handlers::notifications::create_low_balance_alert,
        handlers::notifications::delete_low_balance_alert,
        handlers::notifications::dispatch_now,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::SessionUser,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Usuários / Empresas ---
            models::user::UserWithCompanies,
            models::user::CreateUserPayload,
            models::user::UpdateUserPayload,
            models::company::Company,
            models::company::CompanyPayload,

            // --- Leads ---
            models::lead::Lead,
            models::lead::ManualLeadPayload,
            models::lead::UpdateStagePayload,
            models::lead::QualifyLeadPayload,
            models::lead::BatchIngestResult,
            models::lead::BatchItemError,

            // --- Stages ---
            models::stages::Stage,
            models::stages::StageConfig,
            models::stages::StageInput,
            models::stages::SaveStagesPayload,

            // --- Propostas ---
            models::proposal::ProposalKind,
            models::proposal::ProposalStatus,
            models::proposal::Proposal,
            models::proposal::CreateProposalPayload,
            models::proposal::ProposalOpenEvent,
            models::proposal::RegisterViewPayload,
            models::proposal::VisualConfig,
            models::proposal::PublicProposal,

            // --- Notificações ---
            models::notification::NotificationRule,
            models::notification::NotificationRuleWithCompanies,
            models::notification::NotificationRulePayload,
            models::notification::LowBalanceAlert,
            models::notification::LowBalanceAlertPayload,
            models::notification::DispatchReport,
        )
    ),
    tags(
        (name = "Auth", description = "Login e sessão"),
        (name = "Usuarios", description = "Cadastro de usuários e vínculos com empresas"),
        (name = "Empresas", description = "Cadastro de empresas"),
        (name = "Leads", description = "Entrada, listagem e funil de leads"),
        (name = "Stages", description = "Funil de stages por empresa"),
        (name = "Propostas", description = "Propostas compartilháveis e página pública"),
        (name = "Notificacoes", description = "Resumo diário e alertas de saldo via WhatsApp")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

// src/routes.rs

use axum::{
    Router,
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::{auth::auth_guard, webhook::webhook_token_guard},
};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/public/propostas/{id}",
            get(handlers::proposals::public_proposal),
        )
        .route(
            "/api/public/propostas/{id}/abertura",
            post(handlers::proposals::register_view),
        );

    // Webhooks de leads (token compartilhado opcional)
    let webhook_routes = Router::new()
        .route("/api/leads/webhook", post(handlers::leads::receive_lead))
        .route("/api/leads/webhook/lote", post(handlers::leads::receive_batch))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            webhook_token_guard,
        ));

    // Tudo que exige sessão
    let protected_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::get_me))
        // Usuários
        .route(
            "/api/usuarios",
            get(handlers::admin::list_users).post(handlers::admin::create_user),
        )
        .route(
            "/api/usuarios/{id}",
            put(handlers::admin::update_user).delete(handlers::admin::delete_user),
        )
        // Empresas
        .route(
            "/api/empresas",
            get(handlers::admin::list_companies).post(handlers::admin::create_company),
        )
        .route(
            "/api/empresas/{id}",
            put(handlers::admin::update_company)
                .delete(handlers::admin::delete_company),
        )
        .route(
            "/api/empresas/{id}/stages",
            get(handlers::stages::get_stages)
                .put(handlers::stages::save_stages)
                .delete(handlers::stages::reset_stages),
        )
        .route(
            "/api/empresas/{id}/visual-proposta",
            get(handlers::proposals::get_visual).put(handlers::proposals::save_visual),
        )
        // Leads
        .route(
            "/api/leads",
            get(handlers::leads::list_leads).post(handlers::leads::create_lead),
        )
        .route("/api/leads/{id}/stage", patch(handlers::leads::update_stage))
        .route("/api/leads/{id}/qualificar", post(handlers::leads::qualify_lead))
        // Propostas
        .route(
            "/api/propostas",
            get(handlers::proposals::list_proposals).post(handlers::proposals::create_proposal),
        )
        .route(
            "/api/propostas/{id}",
            delete(handlers::proposals::delete_proposal),
        )
        .route(
            "/api/propostas/{id}/aberturas",
            get(handlers::proposals::list_open_events),
        )
        // Notificações
        .route(
            "/api/notificacoes",
            get(handlers::notifications::list_rules).post(handlers::notifications::create_rule),
        )
        .route(
            "/api/notificacoes/{id}",
            put(handlers::notifications::update_rule)
                .delete(handlers::notifications::delete_rule),
        )
        .route(
            "/api/notificacoes/saldo-baixo",
            get(handlers::notifications::list_low_balance_alerts)
                .post(handlers::notifications::create_low_balance_alert),
        )
        .route(
            "/api/notificacoes/saldo-baixo/{id}",
            delete(handlers::notifications::delete_low_balance_alert),
        )
        .route(
            "/api/notificacoes/disparar",
            post(handlers::notifications::dispatch_now),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let cors = cors_layer(&app_state.config.cors_origins);

    // Combina tudo no router principal
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public_routes)
        .merge(webhook_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

// Sem CORS_ORIGINS, qualquer origem é aceita
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    if parsed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(parsed))
    }
}

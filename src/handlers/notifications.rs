// src/handlers/notifications.rs
//
// Só ADMIN/GESTOR configuram e disparam notificações.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    common::{error::AppError, response},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::notification::{
        DispatchReport, LowBalanceAlert, LowBalanceAlertPayload, NotificationRulePayload,
        NotificationRuleWithCompanies,
    },
    services::access::require_full_access,
};

// =============================================================================
//  ÁREA 1: REGRAS
// =============================================================================

// GET /api/notificacoes
#[utoipa::path(
    get,
    path = "/api/notificacoes",
    tag = "Notificacoes",
    responses(
        (status = 200, description = "Regras com as empresas vinculadas", body = Vec<NotificationRuleWithCompanies>),
        (status = 403, description = "Apenas ADMIN/GESTOR")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_rules(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    require_full_access(&user)?;
    let rules = app_state.notification_service.list_rules().await?;
    let message = format!("{} notificações configuradas.", rules.len());
    Ok(response::ok(rules, message))
}

// POST /api/notificacoes
#[utoipa::path(
    post,
    path = "/api/notificacoes",
    tag = "Notificacoes",
    request_body = NotificationRulePayload,
    responses(
        (status = 201, description = "Regra criada", body = NotificationRuleWithCompanies),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas ADMIN/GESTOR")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_rule(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<NotificationRulePayload>,
) -> Result<impl IntoResponse, AppError> {
    require_full_access(&user)?;
    let rule = app_state.notification_service.create_rule(payload).await?;
    Ok(response::created(rule, "Notificação criada com sucesso."))
}

// PUT /api/notificacoes/{id}
#[utoipa::path(
    put,
    path = "/api/notificacoes/{id}",
    tag = "Notificacoes",
    request_body = NotificationRulePayload,
    responses(
        (status = 200, description = "Regra atualizada", body = NotificationRuleWithCompanies),
        (status = 403, description = "Apenas ADMIN/GESTOR"),
        (status = 404, description = "Regra não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da regra")),
    security(("api_jwt" = []))
)]
pub async fn update_rule(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(payload): Json<NotificationRulePayload>,
) -> Result<impl IntoResponse, AppError> {
    require_full_access(&user)?;
    let rule = app_state.notification_service.update_rule(id, payload).await?;
    Ok(response::ok(rule, "Notificação atualizada com sucesso."))
}

// DELETE /api/notificacoes/{id}
#[utoipa::path(
    delete,
    path = "/api/notificacoes/{id}",
    tag = "Notificacoes",
    responses(
        (status = 200, description = "Regra removida"),
        (status = 403, description = "Apenas ADMIN/GESTOR"),
        (status = 404, description = "Regra não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da regra")),
    security(("api_jwt" = []))
)]
pub async fn delete_rule(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    require_full_access(&user)?;
    app_state.notification_service.delete_rule(id).await?;
    Ok(response::ok((), "Notificação removida com sucesso."))
}

// =============================================================================
//  ÁREA 2: SALDO BAIXO
// =============================================================================

// GET /api/notificacoes/saldo-baixo
#[utoipa::path(
    get,
    path = "/api/notificacoes/saldo-baixo",
    tag = "Notificacoes",
    responses(
        (status = 200, description = "Alertas de saldo baixo", body = Vec<LowBalanceAlert>),
        (status = 403, description = "Apenas ADMIN/GESTOR")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_low_balance_alerts(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    require_full_access(&user)?;
    let alerts = app_state.notification_service.list_low_balance_alerts().await?;
    let message = format!("{} alertas configurados.", alerts.len());
    Ok(response::ok(alerts, message))
}

// POST /api/notificacoes/saldo-baixo
#[utoipa::path(
    post,
    path = "/api/notificacoes/saldo-baixo",
    tag = "Notificacoes",
    request_body = LowBalanceAlertPayload,
    responses(
        (status = 201, description = "Alerta criado", body = LowBalanceAlert),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas ADMIN/GESTOR"),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_low_balance_alert(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<LowBalanceAlertPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_full_access(&user)?;
    let alert = app_state
        .notification_service
        .create_low_balance_alert(payload)
        .await?;
    Ok(response::created(alert, "Alerta de saldo criado com sucesso."))
}

// DELETE /api/notificacoes/saldo-baixo/{id}
#[utoipa::path(
    delete,
    path = "/api/notificacoes/saldo-baixo/{id}",
    tag = "Notificacoes",
    responses(
        (status = 200, description = "Alerta removido"),
        (status = 403, description = "Apenas ADMIN/GESTOR"),
        (status = 404, description = "Alerta não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do alerta")),
    security(("api_jwt" = []))
)]
pub async fn delete_low_balance_alert(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    require_full_access(&user)?;
    app_state.notification_service.delete_low_balance_alert(id).await?;
    Ok(response::ok((), "Alerta de saldo removido com sucesso."))
}

// POST /api/notificacoes/disparar
#[utoipa::path(
    post,
    path = "/api/notificacoes/disparar",
    tag = "Notificacoes",
    responses(
        (status = 200, description = "Rodada executada", body = DispatchReport),
        (status = 403, description = "Apenas ADMIN/GESTOR")
    ),
    security(("api_jwt" = []))
)]
pub async fn dispatch_now(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    require_full_access(&user)?;
    tracing::info!(usuario_id = user.id, "📬 Disparo manual de notificações");
    let report = app_state.notification_service.dispatch().await;
    Ok(response::ok(report, "Disparo concluído."))
}

// src/handlers/leads.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::Value;

use crate::{
    common::{error::AppError, response},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::lead::{
        BatchIngestResult, Lead, ManualLeadPayload, QualifyLeadPayload, UpdateStagePayload,
    },
};

// =============================================================================
//  ÁREA 1: WEBHOOKS (públicos)
// =============================================================================

// POST /api/leads/webhook
#[utoipa::path(
    post,
    path = "/api/leads/webhook",
    tag = "Leads",
    request_body(content = Object, description = "Lead no formato do formulário de origem; precisa de empresa_id"),
    responses(
        (status = 201, description = "Lead registrado", body = Lead),
        (status = 400, description = "Payload vazio, sem empresa ou sem identificação")
    ),
    params(
        ("x-webhook-token" = Option<String>, Header, description = "Segredo compartilhado, quando configurado")
    )
)]
pub async fn receive_lead(
    State(app_state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state.lead_service.ingest(payload).await?;
    Ok(response::created(lead, "Lead recebido com sucesso."))
}

// POST /api/leads/webhook/lote
#[utoipa::path(
    post,
    path = "/api/leads/webhook/lote",
    tag = "Leads",
    request_body(content = Object, description = "{ leads: [...] } ou um array de leads"),
    responses(
        (status = 201, description = "Lote processado", body = BatchIngestResult),
        (status = 400, description = "Lote vazio, item sem empresa ou nenhum lead válido")
    ),
    params(
        ("x-webhook-token" = Option<String>, Header, description = "Segredo compartilhado, quando configurado")
    )
)]
pub async fn receive_batch(
    State(app_state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let items = batch_items(payload)?;
    let result = app_state.lead_service.ingest_batch(items).await?;

    let message = format!(
        "{} leads inseridos, {} recusados.",
        result.inseridos.len(),
        result.erros.len()
    );
    Ok(response::created(result, message))
}

fn batch_items(payload: Value) -> Result<Vec<Value>, AppError> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("leads") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(AppError::Validation(
                "Envie um array de leads ou um objeto { leads: [...] }.".to_string(),
            )),
        },
        _ => Err(AppError::Validation(
            "Envie um array de leads ou um objeto { leads: [...] }.".to_string(),
        )),
    }
}

// =============================================================================
//  ÁREA 2: PAINEL (com sessão)
// =============================================================================

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    responses(
        (status = 200, description = "Leads das empresas acessíveis", body = Vec<Lead>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let (leads, message) = app_state.lead_service.list(&user).await?;
    Ok(response::ok(leads, message))
}

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = ManualLeadPayload,
    responses(
        (status = 201, description = "Lead cadastrado", body = Lead),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem acesso à empresa"),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<ManualLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state.lead_service.add_manual(&user, payload).await?;
    Ok(response::created(lead, "Lead cadastrado com sucesso."))
}

// PATCH /api/leads/{id}/stage
#[utoipa::path(
    patch,
    path = "/api/leads/{id}/stage",
    tag = "Leads",
    request_body = UpdateStagePayload,
    responses(
        (status = 200, description = "Stage atualizado", body = Lead),
        (status = 400, description = "Stage ausente ou lead sem empresa"),
        (status = 403, description = "Sem acesso à empresa do lead"),
        (status = 404, description = "Lead não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do lead")),
    security(("api_jwt" = []))
)]
pub async fn update_stage(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStagePayload>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state
        .lead_service
        .update_stage(&user, id, payload.stage.as_deref())
        .await?;
    Ok(response::ok(lead, "Stage atualizado com sucesso."))
}

// POST /api/leads/{id}/qualificar
#[utoipa::path(
    post,
    path = "/api/leads/{id}/qualificar",
    tag = "Leads",
    request_body = QualifyLeadPayload,
    responses(
        (status = 200, description = "Lead qualificado", body = Lead),
        (status = 403, description = "Sem acesso à empresa do lead"),
        (status = 404, description = "Lead não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do lead")),
    security(("api_jwt" = []))
)]
pub async fn qualify_lead(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
    payload: Option<Json<QualifyLeadPayload>>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.unwrap_or_default();
    let (lead, message) = app_state
        .lead_service
        .mark_qualified(&user, id, payload.data_qualificacao)
        .await?;
    Ok(response::ok(lead, message))
}

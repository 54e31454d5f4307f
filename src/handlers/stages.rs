// src/handlers/stages.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    common::{error::AppError, response},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::stages::{SaveStagesPayload, StageConfig},
};

// GET /api/empresas/{id}/stages
#[utoipa::path(
    get,
    path = "/api/empresas/{id}/stages",
    tag = "Stages",
    responses(
        (status = 200, description = "Funil da empresa (ou o padrão)", body = StageConfig),
        (status = 403, description = "Sem acesso à empresa"),
        (status = 404, description = "Empresa não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn get_stages(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(empresa_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let config = app_state.stage_service.get(&user, empresa_id).await?;
    let message = if config.padrao {
        "Empresa usando o funil padrão."
    } else {
        "Funil personalizado da empresa."
    };
    Ok(response::ok(config, message))
}

// PUT /api/empresas/{id}/stages
#[utoipa::path(
    put,
    path = "/api/empresas/{id}/stages",
    tag = "Stages",
    request_body = SaveStagesPayload,
    responses(
        (status = 200, description = "Funil salvo", body = StageConfig),
        (status = 400, description = "Lista vazia, stage incompleto ou id repetido"),
        (status = 403, description = "Sem acesso à empresa"),
        (status = 404, description = "Empresa não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn save_stages(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(empresa_id): Path<i64>,
    Json(payload): Json<SaveStagesPayload>,
) -> Result<impl IntoResponse, AppError> {
    let config = app_state
        .stage_service
        .save(&user, empresa_id, payload.stages)
        .await?;
    Ok(response::ok(config, "Stages salvos com sucesso."))
}

// DELETE /api/empresas/{id}/stages
#[utoipa::path(
    delete,
    path = "/api/empresas/{id}/stages",
    tag = "Stages",
    responses(
        (status = 200, description = "Funil voltou ao padrão", body = StageConfig),
        (status = 403, description = "Sem acesso à empresa"),
        (status = 404, description = "Empresa não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn reset_stages(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(empresa_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let config = app_state.stage_service.reset(&user, empresa_id).await?;
    Ok(response::ok(config, "Stages restaurados para o padrão."))
}

// src/handlers/proposals.rs

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    common::{error::AppError, response},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::proposal::{
        CreateProposalPayload, Proposal, ProposalOpenEvent, PublicProposal, RegisterViewPayload,
        VisualConfig,
    },
};

const UNKNOWN_IP: &str = "desconhecido";

// =============================================================================
//  ÁREA 1: GESTÃO (com sessão)
// =============================================================================

// POST /api/propostas
#[utoipa::path(
    post,
    path = "/api/propostas",
    tag = "Propostas",
    request_body = CreateProposalPayload,
    responses(
        (status = 201, description = "Proposta criada", body = Proposal),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem acesso à empresa"),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_proposal(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateProposalPayload>,
) -> Result<impl IntoResponse, AppError> {
    let proposal = app_state.proposal_service.create(&user, payload).await?;
    Ok(response::created(proposal, "Proposta criada com sucesso."))
}

// GET /api/propostas
#[utoipa::path(
    get,
    path = "/api/propostas",
    tag = "Propostas",
    responses(
        (status = 200, description = "Propostas das empresas acessíveis", body = Vec<Proposal>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_proposals(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let proposals = app_state.proposal_service.list(&user).await?;
    let message = format!("{} propostas encontradas.", proposals.len());
    Ok(response::ok(proposals, message))
}

// GET /api/propostas/{id}/aberturas
#[utoipa::path(
    get,
    path = "/api/propostas/{id}/aberturas",
    tag = "Propostas",
    responses(
        (status = 200, description = "Aberturas, mais recentes primeiro", body = Vec<ProposalOpenEvent>),
        (status = 403, description = "Sem acesso à empresa"),
        (status = 404, description = "Proposta não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da proposta")),
    security(("api_jwt" = []))
)]
pub async fn list_open_events(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let events = app_state.proposal_service.list_open_events(&user, id).await?;
    let message = format!("{} aberturas registradas.", events.len());
    Ok(response::ok(events, message))
}

// DELETE /api/propostas/{id}
#[utoipa::path(
    delete,
    path = "/api/propostas/{id}",
    tag = "Propostas",
    responses(
        (status = 200, description = "Proposta removida"),
        (status = 403, description = "Apenas ADMIN/GESTOR"),
        (status = 404, description = "Proposta não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da proposta")),
    security(("api_jwt" = []))
)]
pub async fn delete_proposal(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.proposal_service.delete(&user, id).await?;
    Ok(response::ok((), "Proposta removida com sucesso."))
}

// =============================================================================
//  ÁREA 2: PÁGINA PÚBLICA
// =============================================================================

// GET /api/public/propostas/{id}
#[utoipa::path(
    get,
    path = "/api/public/propostas/{id}",
    tag = "Propostas",
    responses(
        (status = 200, description = "Proposta e identidade visual", body = PublicProposal),
        (status = 404, description = "Proposta não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da proposta"))
)]
pub async fn public_proposal(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = app_state.proposal_service.public_view(id).await?;
    Ok(response::ok(view, "Proposta encontrada."))
}

// POST /api/public/propostas/{id}/abertura
#[utoipa::path(
    post,
    path = "/api/public/propostas/{id}/abertura",
    tag = "Propostas",
    request_body = RegisterViewPayload,
    responses(
        (status = 200, description = "Abertura registrada", body = Proposal),
        (status = 400, description = "Nome ou contato ausente"),
        (status = 404, description = "Proposta não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da proposta"))
)]
pub async fn register_view(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<RegisterViewPayload>,
) -> Result<impl IntoResponse, AppError> {
    let ip = client_ip(&headers);
    let proposal = app_state
        .proposal_service
        .register_view(id, payload, ip)
        .await?;
    Ok(response::ok(proposal, "Abertura registrada."))
}

/// Primeiro IP do `x-forwarded-for`; depois `x-real-ip`.
pub fn client_ip(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    header("x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string()))
        .filter(|ip| !ip.is_empty())
        .or_else(|| header("x-real-ip").map(|ip| ip.trim().to_string()).filter(|ip| !ip.is_empty()))
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}

// =============================================================================
//  ÁREA 3: IDENTIDADE VISUAL
// =============================================================================

// GET /api/empresas/{id}/visual-proposta
#[utoipa::path(
    get,
    path = "/api/empresas/{id}/visual-proposta",
    tag = "Propostas",
    responses(
        (status = 200, description = "Identidade visual (ou a padrão)", body = VisualConfig),
        (status = 403, description = "Sem acesso à empresa"),
        (status = 404, description = "Empresa não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn get_visual(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(empresa_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let config = app_state.proposal_service.get_visual(&user, empresa_id).await?;
    Ok(response::ok(config, "Identidade visual da empresa."))
}

// PUT /api/empresas/{id}/visual-proposta
#[utoipa::path(
    put,
    path = "/api/empresas/{id}/visual-proposta",
    tag = "Propostas",
    request_body = VisualConfig,
    responses(
        (status = 200, description = "Identidade visual salva", body = VisualConfig),
        (status = 400, description = "Cores ausentes"),
        (status = 403, description = "Sem acesso à empresa"),
        (status = 404, description = "Empresa não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn save_visual(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(empresa_id): Path<i64>,
    Json(payload): Json<VisualConfig>,
) -> Result<impl IntoResponse, AppError> {
    let config = app_state
        .proposal_service
        .save_visual(&user, empresa_id, payload)
        .await?;
    Ok(response::ok(config, "Identidade visual salva com sucesso."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), "desconhecido");

        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));
        assert_eq!(client_ip(&headers), "10.0.0.9");

        headers.insert("x-forwarded-for", HeaderValue::from_static("200.1.2.3, 10.0.0.1"));
        assert_eq!(client_ip(&headers), "200.1.2.3");
    }
}

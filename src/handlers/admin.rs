// src/handlers/admin.rs
//
// Cadastro de usuários e empresas.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    common::{error::AppError, response},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        company::{Company, CompanyPayload},
        user::{CreateUserPayload, UpdateUserPayload, UserWithCompanies},
    },
};

// =============================================================================
//  ÁREA 1: USUÁRIOS
// =============================================================================

// GET /api/usuarios
#[utoipa::path(
    get,
    path = "/api/usuarios",
    tag = "Usuarios",
    responses(
        (status = 200, description = "Usuários com as empresas vinculadas", body = Vec<UserWithCompanies>),
        (status = 403, description = "Apenas ADMIN/GESTOR")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state.user_service.list(&user).await?;
    let message = format!("{} usuários encontrados.", users.len());
    Ok(response::ok(users, message))
}

// POST /api/usuarios
#[utoipa::path(
    post,
    path = "/api/usuarios",
    tag = "Usuarios",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = UserWithCompanies),
        (status = 400, description = "Dados inválidos ou e-mail já cadastrado"),
        (status = 403, description = "Apenas ADMIN/GESTOR")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let created = app_state.user_service.create(&user, payload).await?;
    Ok(response::created(created, "Usuário criado com sucesso."))
}

// PUT /api/usuarios/{id}
#[utoipa::path(
    put,
    path = "/api/usuarios/{id}",
    tag = "Usuarios",
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Usuário atualizado", body = UserWithCompanies),
        (status = 403, description = "Apenas ADMIN/GESTOR"),
        (status = 404, description = "Usuário não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do usuário")),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let updated = app_state.user_service.update(&user, id, payload).await?;
    Ok(response::ok(updated, "Usuário atualizado com sucesso."))
}

// DELETE /api/usuarios/{id}
#[utoipa::path(
    delete,
    path = "/api/usuarios/{id}",
    tag = "Usuarios",
    responses(
        (status = 200, description = "Usuário removido"),
        (status = 403, description = "Apenas ADMIN/GESTOR"),
        (status = 404, description = "Usuário não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do usuário")),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.user_service.delete(&user, id).await?;
    Ok(response::ok((), "Usuário removido com sucesso."))
}

// =============================================================================
//  ÁREA 2: EMPRESAS
// =============================================================================

// GET /api/empresas
#[utoipa::path(
    get,
    path = "/api/empresas",
    tag = "Empresas",
    responses(
        (status = 200, description = "Empresas acessíveis", body = Vec<Company>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_companies(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let companies = app_state.company_service.list(&user).await?;
    let message = format!("{} empresas encontradas.", companies.len());
    Ok(response::ok(companies, message))
}

// POST /api/empresas
#[utoipa::path(
    post,
    path = "/api/empresas",
    tag = "Empresas",
    request_body = CompanyPayload,
    responses(
        (status = 201, description = "Empresa criada", body = Company),
        (status = 403, description = "Apenas ADMIN/GESTOR")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_company(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.create(&user, payload).await?;
    Ok(response::created(company, "Empresa criada com sucesso."))
}

// PUT /api/empresas/{id}
#[utoipa::path(
    put,
    path = "/api/empresas/{id}",
    tag = "Empresas",
    request_body = CompanyPayload,
    responses(
        (status = 200, description = "Empresa atualizada", body = Company),
        (status = 403, description = "Apenas ADMIN/GESTOR"),
        (status = 404, description = "Empresa não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn update_company(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(payload): Json<CompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.update(&user, id, payload).await?;
    Ok(response::ok(company, "Empresa atualizada com sucesso."))
}

// DELETE /api/empresas/{id}
#[utoipa::path(
    delete,
    path = "/api/empresas/{id}",
    tag = "Empresas",
    responses(
        (status = 200, description = "Empresa removida"),
        (status = 403, description = "Apenas ADMIN/GESTOR"),
        (status = 404, description = "Empresa não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn delete_company(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.company_service.delete(&user, id).await?;
    Ok(response::ok((), "Empresa removida com sucesso."))
}

// src/services/user_service.rs

use std::sync::Arc;

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{CompanyStore, UserStore},
    models::{
        auth::SessionUser,
        user::{CreateUserPayload, NewUser, UpdateUserPayload, UserChanges, UserWithCompanies},
    },
    services::{access::require_full_access, auth::hash_password},
};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    companies: Arc<dyn CompanyStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, companies: Arc<dyn CompanyStore>) -> Self {
        Self { users, companies }
    }

    pub async fn list(&self, actor: &SessionUser) -> Result<Vec<UserWithCompanies>, AppError> {
        require_full_access(actor)?;

        let users = self.users.list().await?;
        let mut result = Vec::with_capacity(users.len());
        for usuario in users {
            let empresas = self.users.linked_company_ids(usuario.id).await?;
            result.push(UserWithCompanies { usuario, empresas });
        }
        Ok(result)
    }

    pub async fn create(
        &self,
        actor: &SessionUser,
        payload: CreateUserPayload,
    ) -> Result<UserWithCompanies, AppError> {
        require_full_access(actor)?;
        payload.validate()?;
        self.ensure_companies_exist(&payload.empresas).await?;

        let senha_hash = hash_password(&payload.senha).await?;
        let usuario = self
            .users
            .create(&NewUser {
                nome: payload.nome.trim().to_string(),
                email: payload.email.trim().to_lowercase(),
                senha_hash,
                permissao: payload.permissao,
            })
            .await?;

        self.users.replace_links(usuario.id, &payload.empresas).await?;
        tracing::info!(usuario_id = usuario.id, criado_por = actor.id, "👤 Usuário criado");

        Ok(UserWithCompanies {
            usuario,
            empresas: payload.empresas,
        })
    }

    pub async fn update(
        &self,
        actor: &SessionUser,
        id: i64,
        payload: UpdateUserPayload,
    ) -> Result<UserWithCompanies, AppError> {
        require_full_access(actor)?;
        payload.validate()?;
        if let Some(empresas) = &payload.empresas {
            self.ensure_companies_exist(empresas).await?;
        }

        let senha_hash = match payload.senha.as_deref() {
            Some(senha) => Some(hash_password(senha).await?),
            None => None,
        };

        let changes = UserChanges {
            nome: payload.nome.map(|n| n.trim().to_string()),
            email: payload.email.map(|e| e.trim().to_lowercase()),
            senha_hash,
            permissao: payload.permissao,
        };

        let usuario = self
            .users
            .update(id, &changes)
            .await?
            .ok_or_else(|| user_not_found(id))?;

        if let Some(empresas) = &payload.empresas {
            self.users.replace_links(id, empresas).await?;
        }
        let empresas = self.users.linked_company_ids(id).await?;

        Ok(UserWithCompanies { usuario, empresas })
    }

    pub async fn delete(&self, actor: &SessionUser, id: i64) -> Result<(), AppError> {
        require_full_access(actor)?;
        if actor.id == id {
            return Err(AppError::Validation(
                "Você não pode excluir o próprio usuário.".to_string(),
            ));
        }

        if !self.users.delete(id).await? {
            return Err(user_not_found(id));
        }
        tracing::info!(usuario_id = id, removido_por = actor.id, "🗑️ Usuário removido");
        Ok(())
    }

    async fn ensure_companies_exist(&self, empresas: &[i64]) -> Result<(), AppError> {
        let existentes = self.companies.list_ids().await?;
        if let Some(faltando) = empresas.iter().find(|id| !existentes.contains(id)) {
            return Err(AppError::Validation(format!(
                "Empresa {} não encontrada.",
                faltando
            )));
        }
        Ok(())
    }
}

fn user_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Usuário {} não encontrado.", id))
}

// src/services/company_service.rs

use std::sync::Arc;

use validator::Validate;

use crate::{
    common::error::AppError,
    db::CompanyStore,
    models::{
        auth::SessionUser,
        company::{Company, CompanyPayload},
    },
    services::access::{AccessResolver, require_full_access},
};

#[derive(Clone)]
pub struct CompanyService {
    companies: Arc<dyn CompanyStore>,
    access: AccessResolver,
}

impl CompanyService {
    pub fn new(companies: Arc<dyn CompanyStore>, access: AccessResolver) -> Self {
        Self { companies, access }
    }

    /// Só as empresas que o usuário enxerga.
    pub async fn list(&self, user: &SessionUser) -> Result<Vec<Company>, AppError> {
        let scope = self.access.resolve(user).await?;
        let companies = self.companies.list().await?;
        if scope.full_access {
            return Ok(companies);
        }
        Ok(companies
            .into_iter()
            .filter(|c| scope.contains(c.id))
            .collect())
    }

    pub async fn create(
        &self,
        user: &SessionUser,
        mut payload: CompanyPayload,
    ) -> Result<Company, AppError> {
        require_full_access(user)?;
        payload.validate()?;
        normalize(&mut payload);

        let company = self.companies.create(&payload).await?;
        tracing::info!(empresa_id = company.id, "🏢 Empresa criada");
        Ok(company)
    }

    pub async fn update(
        &self,
        user: &SessionUser,
        id: i64,
        mut payload: CompanyPayload,
    ) -> Result<Company, AppError> {
        require_full_access(user)?;
        payload.validate()?;
        normalize(&mut payload);

        self.companies
            .update(id, &payload)
            .await?
            .ok_or_else(|| company_not_found(id))
    }

    pub async fn delete(&self, user: &SessionUser, id: i64) -> Result<(), AppError> {
        require_full_access(user)?;
        if !self.companies.delete(id).await? {
            return Err(company_not_found(id));
        }
        tracing::info!(empresa_id = id, "🗑️ Empresa removida");
        Ok(())
    }
}

// Conta de anúncio vazia vira NULL
fn normalize(payload: &mut CompanyPayload) {
    payload.nome = payload.nome.trim().to_string();
    payload.conta_anuncio = payload
        .conta_anuncio
        .take()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
}

fn company_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Empresa {} não encontrada.", id))
}

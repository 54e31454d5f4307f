// src/services/access.rs
//
// Quem pode ver/alterar o quê. ADMIN e GESTOR enxergam todas as empresas;
// USER só as que aparecem em `usuario_empresa` para ele.

use std::{collections::BTreeSet, sync::Arc};

use crate::{
    common::error::AppError,
    db::{CompanyStore, UserStore},
    models::{auth::SessionUser, company::Company},
};

/// Conjunto de empresas acessíveis para um usuário.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessibleCompanies {
    pub full_access: bool,
    pub ids: BTreeSet<i64>,
}

impl AccessibleCompanies {
    pub fn contains(&self, empresa_id: i64) -> bool {
        self.ids.contains(&empresa_id)
    }

    /// Testa uma referência bruta (vinda de `dados_originais`) comparando como string.
    pub fn contains_ref(&self, reference: &str) -> bool {
        let reference = reference.trim();
        self.ids.iter().any(|id| id.to_string() == reference)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Clone)]
pub struct AccessResolver {
    users: Arc<dyn UserStore>,
    companies: Arc<dyn CompanyStore>,
}

impl AccessResolver {
    pub fn new(users: Arc<dyn UserStore>, companies: Arc<dyn CompanyStore>) -> Self {
        Self { users, companies }
    }

    pub async fn resolve(&self, user: &SessionUser) -> Result<AccessibleCompanies, AppError> {
        if user.permissao.has_full_access() {
            let ids = self.companies.list_ids().await?;
            return Ok(AccessibleCompanies {
                full_access: true,
                ids: ids.into_iter().collect(),
            });
        }

        let ids = self.users.linked_company_ids(user.id).await?;
        Ok(AccessibleCompanies {
            full_access: false,
            ids: ids.into_iter().collect(),
        })
    }

    /// Verifica o vínculo usuário↔empresa. Acesso total passa direto.
    pub async fn ensure_company(&self, user: &SessionUser, empresa_id: i64) -> Result<(), AppError> {
        if user.permissao.has_full_access() {
            return Ok(());
        }

        if self.users.has_link(user.id, empresa_id).await? {
            Ok(())
        } else {
            tracing::warn!(
                usuario_id = user.id,
                empresa_id,
                "⛔ Acesso negado: usuário sem vínculo com a empresa"
            );
            Err(AppError::Forbidden(
                "Você não tem permissão para acessar esta empresa.".to_string(),
            ))
        }
    }

    /// Como `ensure_company`, mas antes exige que a empresa exista (404).
    pub async fn ensure_existing_company(
        &self,
        user: &SessionUser,
        empresa_id: i64,
    ) -> Result<Company, AppError> {
        let company = self
            .companies
            .find_by_id(empresa_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Empresa {} não encontrada.", empresa_id)))?;

        self.ensure_company(user, empresa_id).await?;
        Ok(company)
    }
}

/// Operações administrativas: só ADMIN e GESTOR.
pub fn require_full_access(user: &SessionUser) -> Result<(), AppError> {
    if user.permissao.has_full_access() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Apenas administradores e gestores podem realizar esta ação.".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(ids: &[i64]) -> AccessibleCompanies {
        AccessibleCompanies {
            full_access: false,
            ids: ids.iter().copied().collect(),
        }
    }

    #[test]
    fn reference_membership_compares_as_strings() {
        let companies = scope(&[1, 12]);
        assert!(companies.contains_ref("12"));
        assert!(companies.contains_ref(" 1 "));
        assert!(!companies.contains_ref("2"));
        assert!(!companies.contains_ref("01x"));
    }
}

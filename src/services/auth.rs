// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{
    common::error::AppError,
    db::UserStore,
    models::auth::{AuthResponse, Claims, SessionUser},
};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: String) -> Self {
        Self { users, jwt_secret }
    }

    pub async fn login(&self, email: &str, senha: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .users
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(senha, &user.senha).await? {
            return Err(AppError::InvalidCredentials);
        }

        let session = SessionUser::from(&user);
        let token = self.create_token(&session)?;
        tracing::info!(usuario_id = user.id, "🔑 Login realizado");

        Ok(AuthResponse {
            token,
            usuario: session,
        })
    }

    /// O token é a sessão: não vai ao banco para reconstruir o usuário.
    pub fn validate_token(&self, token: &str) -> Result<SessionUser, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthenticated)?;

        let claims = token_data.claims;
        Ok(SessionUser {
            id: claims.sub,
            nome: claims.nome,
            email: claims.email,
            permissao: claims.permissao,
        })
    }

    pub fn create_token(&self, session: &SessionUser) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: session.id,
            nome: session.nome.clone(),
            email: session.email.clone(),
            permissao: session.permissao,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

/// Gera o hash bcrypt numa thread separada.
pub async fn hash_password(senha: &str) -> Result<String, AppError> {
    let senha = senha.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&senha, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

/// Contas antigas guardam a senha como veio; as novas, como hash bcrypt.
pub async fn verify_password(senha: &str, armazenada: &str) -> Result<bool, AppError> {
    if !armazenada.starts_with("$2") {
        return Ok(senha == armazenada);
    }

    let senha = senha.to_owned();
    let armazenada = armazenada.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&senha, &armazenada))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn legacy_plain_password_is_compared_verbatim() {
        assert!(verify_password("segredo", "segredo").await.unwrap());
        assert!(!verify_password("Segredo", "segredo").await.unwrap());
    }

    #[tokio::test]
    async fn hashed_password_round_trips() {
        let hashed = hash_password("minha-senha").await.unwrap();
        assert!(hashed.starts_with("$2"));
        assert!(verify_password("minha-senha", &hashed).await.unwrap());
        assert!(!verify_password("outra", &hashed).await.unwrap());
    }
}

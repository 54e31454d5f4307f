// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Mapeia o CREATE TYPE permissao_usuario do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "permissao_usuario", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Gestor,
    User,
}

impl Role {
    /// ADMIN e GESTOR enxergam todas as empresas.
    pub fn has_full_access(self) -> bool {
        matches!(self, Role::Admin | Role::Gestor)
    }
}

// Representa um usuário vindo do banco de dados (tabela `usuario`)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    #[schema(example = 7)]
    pub id: i64,

    #[schema(example = "Ana Souza")]
    pub nome: String,

    #[schema(example = "ana@empresa.com")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub senha: String,

    pub permissao: Role,
}

// O que fica guardado no token: é a "sessão" do usuário logado
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionUser {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub permissao: Role,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            nome: user.nome.clone(),
            email: user.email.clone(),
            permissao: user.permissao,
        }
    }
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "ana@empresa.com")]
    pub email: String,

    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub senha: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub usuario: SessionUser,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub nome: String,
    pub email: String,
    pub permissao: Role,
    pub exp: usize,
    pub iat: usize,
}

// src/models/user.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::auth::{Role, User};

// Usuário + empresas vinculadas, como a tela de administração mostra
#[derive(Debug, Serialize, ToSchema)]
pub struct UserWithCompanies {
    #[serde(flatten)]
    pub usuario: User,
    pub empresas: Vec<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Bruno Lima")]
    pub nome: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "bruno@empresa.com")]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub senha: String,

    pub permissao: Role,

    #[serde(default)]
    pub empresas: Vec<i64>,
}

// Atualização parcial: só o que vier preenchido é alterado
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub nome: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub senha: Option<String>,

    pub permissao: Option<Role>,

    // Quando presente, substitui todos os vínculos do usuário
    pub empresas: Option<Vec<i64>>,
}

// Dados já resolvidos que o repositório grava
#[derive(Debug, Clone)]
pub struct NewUser {
    pub nome: String,
    pub email: String,
    pub senha_hash: String,
    pub permissao: Role,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub senha_hash: Option<String>,
    pub permissao: Option<Role>,
}

// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Linha da visão de credenciais (somente leitura, mantida pelo ERP)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UsuarioAcesso {
    pub usuario: String,
    pub codusuario: i32,
    pub nivel: String,
}

/// Identidade do usuário autenticado, reconstruída do token a cada requisição
/// e passada explicitamente para os serviços.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identidade {
    #[schema(example = "JOAO")]
    pub usuario: String,
    #[schema(example = 42)]
    pub codusuario: i32,
    #[schema(example = "03")]
    pub nivel: String,
}

impl From<UsuarioAcesso> for Identidade {
    fn from(u: UsuarioAcesso) -> Self {
        Self {
            usuario: u.usuario,
            codusuario: u.codusuario,
            nivel: u.nivel,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "O usuário é obrigatório."))]
    #[schema(example = "joao")]
    pub usuario: String,
    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    #[schema(example = "minhasenha")]
    pub senha: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub usuario: String,
    pub codusuario: i32,
    pub nivel: String,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerificarResponse {
    pub autenticado: bool,
    pub usuario: String,
    pub codusuario: i32,
    pub nivel: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // usuário (maiúsculo)
    pub codusuario: i32,
    pub nivel: String,
    pub iat: i64,
    pub exp: i64,
}

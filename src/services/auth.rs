// src/services/auth.rs

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sha2::Sha256;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, Identidade, LoginResponse},
};

/// Validade fixa do token de sessão.
pub const TOKEN_TTL_HOURS: i64 = 8;

/// Hash determinístico: HMAC-SHA256(chave, USUARIO + senha) em hexadecimal.
pub fn hash_senha(chave: &str, usuario: &str, senha: &str) -> Result<String, AppError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(chave.as_bytes())
        .map_err(|e| anyhow::anyhow!("Chave HMAC inválida: {}", e))?;
    mac.update(usuario.to_uppercase().as_bytes());
    mac.update(senha.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

// Emissão e verificação dos tokens (sem estado no servidor)
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn create_token(&self, identidade: &Identidade) -> Result<String, AppError> {
        self.create_token_at(identidade, Utc::now())
    }

    pub fn create_token_at(
        &self,
        identidade: &Identidade,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = Claims {
            sub: identidade.usuario.clone(),
            codusuario: identidade.codusuario,
            nivel: identidade.nivel.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn verify_token(&self, token: &str) -> Result<Identidade, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expira exatamente em 8h, sem tolerância
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| AppError::InvalidOrExpiredToken)?;

        Ok(Identidade {
            usuario: data.claims.sub,
            codusuario: data.claims.codusuario,
            nivel: data.claims.nivel,
        })
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tokens: TokenService,
    password_hash_key: String,
    niveis_login: Vec<String>,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        jwt_secret: &str,
        password_hash_key: String,
        niveis_login: Vec<String>,
    ) -> Self {
        Self {
            user_repo,
            tokens: TokenService::new(jwt_secret),
            password_hash_key,
            niveis_login,
        }
    }

    pub async fn authenticate(&self, usuario: &str, senha: &str) -> Result<LoginResponse, AppError> {
        let usuario = usuario.trim().to_uppercase();
        let senha_hash = hash_senha(&self.password_hash_key, &usuario, senha)?;

        let user = self
            .user_repo
            .find_by_credentials(&usuario, &senha_hash, &self.niveis_login)
            .await?
            .ok_or_else(|| {
                tracing::warn!("⚠️ Tentativa de login inválida para o usuário {}", usuario);
                AppError::InvalidCredentials
            })?;

        let identidade = Identidade::from(user);
        let token = self.tokens.create_token(&identidade)?;

        tracing::info!("🔑 Login de {} (nível {})", identidade.usuario, identidade.nivel);

        Ok(LoginResponse {
            usuario: identidade.usuario,
            codusuario: identidade.codusuario,
            nivel: identidade.nivel,
            token,
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Identidade, AppError> {
        self.tokens.verify_token(token)
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joao() -> Identidade {
        Identidade {
            usuario: "JOAO".into(),
            codusuario: 42,
            nivel: "03".into(),
        }
    }

    #[test]
    fn hash_is_deterministic_and_case_insensitive_on_user() {
        let a = hash_senha("chave", "joao", "senha123").unwrap();
        let b = hash_senha("chave", "JOAO", "senha123").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, hash_senha("chave", "JOAO", "Senha123").unwrap());
        assert_ne!(a, hash_senha("outra", "JOAO", "senha123").unwrap());
    }

    #[test]
    fn token_round_trip_keeps_identity() {
        let tokens = TokenService::new("segredo");
        let token = tokens.create_token(&joao()).unwrap();
        assert_eq!(tokens.verify_token(&token).unwrap(), joao());
    }

    #[test]
    fn token_expires_after_eight_hours() {
        let tokens = TokenService::new("segredo");
        let issued = Utc::now() - Duration::hours(TOKEN_TTL_HOURS) - Duration::seconds(1);
        let token = tokens.create_token_at(&joao(), issued).unwrap();
        assert!(matches!(
            tokens.verify_token(&token),
            Err(AppError::InvalidOrExpiredToken)
        ));
    }

    #[test]
    fn token_still_valid_just_before_expiry() {
        let tokens = TokenService::new("segredo");
        let issued = Utc::now() - Duration::hours(TOKEN_TTL_HOURS) + Duration::seconds(30);
        let token = tokens.create_token_at(&joao(), issued).unwrap();
        assert!(tokens.verify_token(&token).is_ok());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = TokenService::new("outro").create_token(&joao()).unwrap();
        assert!(matches!(
            TokenService::new("segredo").verify_token(&token),
            Err(AppError::InvalidOrExpiredToken)
        ));
        assert!(TokenService::new("segredo").verify_token("nao.e.jwt").is_err());
    }
}

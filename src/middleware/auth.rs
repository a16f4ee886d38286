// src/middleware/auth.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::AppError,
    config::{AppConfig, AppState},
    models::auth::Identidade,
};

/// Extrai o token do cabeçalho `Authorization: Bearer <token>`.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AppError> {
    let valor = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::MissingToken)?
        .to_str()
        .map_err(|_| AppError::MalformedToken)?;

    match valor.split_once(' ') {
        Some((esquema, token)) if esquema.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AppError::MalformedToken),
    }
}

// Valida o JWT e deixa a identidade nas extensions da requisição
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(request.headers())?;
    let identidade = app_state.auth_service.verify_token(token)?;

    request.extensions_mut().insert(identidade);
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
pub struct AuthenticatedUser(pub Identidade);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identidade>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::MissingToken)
    }
}

// ---
// RESTRIÇÃO POR NÍVEL (lista fixa vinda da configuração)
// ---

pub trait LevelGate: Send + Sync + 'static {
    fn niveis(config: &AppConfig) -> &[String];
    fn descricao() -> &'static str;
}

/// Só deixa passar usuários cujo nível está na lista de `T`.
pub struct RequireLevel<T>(pub Identidade, pub PhantomData<T>);

pub fn checar_nivel(identidade: &Identidade, permitidos: &[String], descricao: &str) -> Result<(), AppError> {
    if permitidos.iter().any(|n| *n == identidade.nivel) {
        Ok(())
    } else {
        tracing::warn!(
            "⛔ {} (nível {}) tentou acessar recurso restrito a {}",
            identidade.usuario,
            identidade.nivel,
            descricao
        );
        Err(AppError::Forbidden(format!(
            "Acesso restrito a {}.",
            descricao
        )))
    }
}

impl<T, S> FromRequestParts<S> for RequireLevel<T>
where
    T: LevelGate,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let AuthenticatedUser(identidade) = AuthenticatedUser::from_request_parts(parts, state).await?;

        checar_nivel(&identidade, T::niveis(&app_state.config), T::descricao())?;
        Ok(RequireLevel(identidade, PhantomData))
    }
}

pub struct Controladoria;
impl LevelGate for Controladoria {
    fn niveis(config: &AppConfig) -> &[String] {
        &config.niveis_controladoria
    }
    fn descricao() -> &'static str {
        "controladoria"
    }
}

pub struct Diretoria;
impl LevelGate for Diretoria {
    fn niveis(config: &AppConfig) -> &[String] {
        &config.niveis_diretoria
    }
    fn descricao() -> &'static str {
        "diretoria"
    }
}

pub struct AdminAcesso;
impl LevelGate for AdminAcesso {
    fn niveis(config: &AppConfig) -> &[String] {
        &config.niveis_admin
    }
    fn descricao() -> &'static str {
        "administradores do controle de acesso"
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(valor: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(valor).unwrap());
        h
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(extract_bearer(&headers("bearer abc")).unwrap(), "abc");
        assert!(matches!(extract_bearer(&HeaderMap::new()), Err(AppError::MissingToken)));
        assert!(matches!(extract_bearer(&headers("Basic abc")), Err(AppError::MalformedToken)));
        assert!(matches!(extract_bearer(&headers("Bearer ")), Err(AppError::MalformedToken)));
        assert!(matches!(extract_bearer(&headers("abc")), Err(AppError::MalformedToken)));
    }

    #[test]
    fn level_check() {
        let ana = Identidade {
            usuario: "ANA".into(),
            codusuario: 7,
            nivel: "02".into(),
        };
        assert!(checar_nivel(&ana, &["02".into()], "controladoria").is_ok());
        assert!(matches!(
            checar_nivel(&ana, &["01".into()], "diretoria"),
            Err(AppError::Forbidden(_))
        ));
    }
}

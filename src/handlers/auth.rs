// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{LoginPayload, LoginResponse, VerificarResponse},
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login realizado", body = LoginResponse),
        (status = 401, description = "Usuário ou senha inválidos")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let resposta = app_state
        .auth_service
        .authenticate(&payload.usuario, &payload.senha)
        .await?;

    Ok((StatusCode::OK, Json(resposta)))
}

// GET /api/auth/verificar
#[utoipa::path(
    get,
    path = "/api/auth/verificar",
    tag = "Auth",
    responses(
        (status = 200, description = "Token válido", body = VerificarResponse),
        (status = 401, description = "Token ausente, malformado ou expirado")
    ),
    security(("api_jwt" = []))
)]
pub async fn verificar(AuthenticatedUser(identidade): AuthenticatedUser) -> Json<VerificarResponse> {
    Json(VerificarResponse {
        autenticado: true,
        usuario: identidade.usuario,
        codusuario: identidade.codusuario,
        nivel: identidade.nivel,
    })
}

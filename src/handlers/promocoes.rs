// src/handlers/promocoes.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{
        PermPromocaoCreate, PermPromocaoDelete, PermPromocaoEdit, PermPromocaoRead,
        RequirePermission,
    },
    models::promocao::{
        CreatePromocaoPayload, FiltroPromocoes, ImportarPromocoesPayload, Promocao,
        UpdatePromocaoPayload,
    },
};

// GET /api/promocoes
#[utoipa::path(
    get,
    path = "/api/promocoes",
    tag = "Promoções",
    params(
        ("competencia" = Option<String>, Query, description = "AAAA-MM"),
        ("ativa" = Option<bool>, Query),
        ("codprod" = Option<i32>, Query)
    ),
    responses((status = 200, description = "Promoções", body = [Promocao])),
    security(("api_jwt" = []))
)]
pub async fn list_promocoes(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermPromocaoRead>,
    Query(filtro): Query<FiltroPromocoes>,
) -> Result<impl IntoResponse, AppError> {
    let promocoes = app_state.promocao_service.list(&filtro).await?;
    Ok((StatusCode::OK, Json(promocoes)))
}

// GET /api/promocoes/{id}
#[utoipa::path(
    get,
    path = "/api/promocoes/{id}",
    tag = "Promoções",
    params(("id" = Uuid, Path, description = "ID da promoção")),
    responses((status = 200, description = "Promoção", body = Promocao)),
    security(("api_jwt" = []))
)]
pub async fn get_promocao(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermPromocaoRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let promocao = app_state.promocao_service.get(id).await?;
    Ok((StatusCode::OK, Json(promocao)))
}

// POST /api/promocoes
#[utoipa::path(
    post,
    path = "/api/promocoes",
    tag = "Promoções",
    request_body = CreatePromocaoPayload,
    responses(
        (status = 201, description = "Promoção criada", body = Promocao),
        (status = 409, description = "Produto já em promoção na competência")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_promocao(
    State(app_state): State<AppState>,
    RequirePermission(identidade, _): RequirePermission<PermPromocaoCreate>,
    Json(payload): Json<CreatePromocaoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let promocao = app_state.promocao_service.create(&identidade, &payload).await?;
    Ok((StatusCode::CREATED, Json(promocao)))
}

// PUT /api/promocoes/{id}
#[utoipa::path(
    put,
    path = "/api/promocoes/{id}",
    tag = "Promoções",
    request_body = UpdatePromocaoPayload,
    params(("id" = Uuid, Path, description = "ID da promoção")),
    responses((status = 200, description = "Promoção atualizada", body = Promocao)),
    security(("api_jwt" = []))
)]
pub async fn update_promocao(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermPromocaoEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePromocaoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let promocao = app_state.promocao_service.update(id, &payload).await?;
    Ok((StatusCode::OK, Json(promocao)))
}

// DELETE /api/promocoes/{id}
#[utoipa::path(
    delete,
    path = "/api/promocoes/{id}",
    tag = "Promoções",
    params(("id" = Uuid, Path, description = "ID da promoção")),
    responses((status = 204, description = "Promoção removida")),
    security(("api_jwt" = []))
)]
pub async fn delete_promocao(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermPromocaoDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.promocao_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/promocoes/importar
#[utoipa::path(
    post,
    path = "/api/promocoes/importar",
    tag = "Promoções",
    request_body = ImportarPromocoesPayload,
    responses(
        (status = 200, description = "Relatório da importação: { sucesso: [Promocao], erros: [ImportErro] }")
    ),
    security(("api_jwt" = []))
)]
pub async fn importar_promocoes(
    State(app_state): State<AppState>,
    RequirePermission(identidade, _): RequirePermission<PermPromocaoCreate>,
    Json(payload): Json<ImportarPromocoesPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let relatorio = app_state.promocao_service.importar(&identidade, payload).await?;
    Ok((StatusCode::OK, Json(relatorio)))
}

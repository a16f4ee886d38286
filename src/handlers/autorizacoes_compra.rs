// src/handlers/autorizacoes_compra.rs

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
    middleware::{
        auth::{Controladoria, Diretoria, RequireLevel},
        rbac::{
            PermAutorizacaoCreate, PermAutorizacaoDelete, PermAutorizacaoEdit, PermAutorizacaoRead,
            RequirePermission,
        },
    },
    models::autorizacao_compra::{
        AtualizarAutorizacaoPayload, AutorizacaoCompraResponse, CreateAutorizacaoPayload,
        FiltroAutorizacoes,
    },
};

// POST /api/autorizacoes-compra
#[utoipa::path(
    post,
    path = "/api/autorizacoes-compra",
    tag = "Autorizações de Compra",
    request_body = CreateAutorizacaoPayload,
    responses(
        (status = 201, description = "Autorização registrada (pendente)", body = AutorizacaoCompraResponse),
        (status = 400, description = "Campos obrigatórios ausentes")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_autorizacao(
    State(app_state): State<AppState>,
    RequirePermission(identidade, _): RequirePermission<PermAutorizacaoCreate>,
    Json(payload): Json<CreateAutorizacaoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let autorizacao = app_state
        .autorizacao_service
        .create(&identidade, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(AutorizacaoCompraResponse::from(autorizacao))))
}

// GET /api/autorizacoes-compra
#[utoipa::path(
    get,
    path = "/api/autorizacoes-compra",
    tag = "Autorizações de Compra",
    params(FiltroAutorizacoes),
    responses(
        (status = 200, description = "Autorizações visíveis ao usuário", body = [AutorizacaoCompraResponse])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_autorizacoes(
    State(app_state): State<AppState>,
    RequirePermission(identidade, _): RequirePermission<PermAutorizacaoRead>,
    Query(filtro): Query<FiltroAutorizacoes>,
) -> Result<impl IntoResponse, AppError> {
    let lista: Vec<AutorizacaoCompraResponse> = app_state
        .autorizacao_service
        .list_for(&identidade, &filtro)
        .await?
        .into_iter()
        .map(AutorizacaoCompraResponse::from)
        .collect();

    Ok((StatusCode::OK, Json(lista)))
}

// GET /api/autorizacoes-compra/{id}
#[utoipa::path(
    get,
    path = "/api/autorizacoes-compra/{id}",
    tag = "Autorizações de Compra",
    params(("id" = Uuid, Path, description = "ID da autorização")),
    responses(
        (status = 200, description = "Autorização", body = AutorizacaoCompraResponse),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_autorizacao(
    State(app_state): State<AppState>,
    RequirePermission(identidade, _): RequirePermission<PermAutorizacaoRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let autorizacao = app_state.autorizacao_service.get(&identidade, id).await?;
    Ok((StatusCode::OK, Json(AutorizacaoCompraResponse::from(autorizacao))))
}

// PUT|PATCH /api/autorizacoes-compra/{id}
#[utoipa::path(
    patch,
    path = "/api/autorizacoes-compra/{id}",
    tag = "Autorizações de Compra",
    request_body = AtualizarAutorizacaoPayload,
    params(("id" = Uuid, Path, description = "ID da autorização")),
    responses(
        (status = 200, description = "Autorização atualizada", body = AutorizacaoCompraResponse),
        (status = 400, description = "Nenhum campo para atualizar"),
        (status = 403, description = "Somente o solicitante pode alterar"),
        (status = 409, description = "Já aprovada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_autorizacao(
    State(app_state): State<AppState>,
    RequirePermission(identidade, _): RequirePermission<PermAutorizacaoEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AtualizarAutorizacaoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let autorizacao = app_state
        .autorizacao_service
        .update(&identidade, id, &payload)
        .await?;

    Ok((StatusCode::OK, Json(AutorizacaoCompraResponse::from(autorizacao))))
}

// DELETE /api/autorizacoes-compra/{id}
#[utoipa::path(
    delete,
    path = "/api/autorizacoes-compra/{id}",
    tag = "Autorizações de Compra",
    params(("id" = Uuid, Path, description = "ID da autorização")),
    responses(
        (status = 204, description = "Excluída"),
        (status = 403, description = "Somente o solicitante pode excluir"),
        (status = 409, description = "Já aprovada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_autorizacao(
    State(app_state): State<AppState>,
    RequirePermission(identidade, _): RequirePermission<PermAutorizacaoDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.autorizacao_service.delete(&identidade, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// PATCH /api/autorizacoes-compra/{id}/autorizar-controladoria
#[utoipa::path(
    patch,
    path = "/api/autorizacoes-compra/{id}/autorizar-controladoria",
    tag = "Autorizações de Compra",
    params(("id" = Uuid, Path, description = "ID da autorização")),
    responses(
        (status = 200, description = "Aprovada pela controladoria", body = AutorizacaoCompraResponse),
        (status = 403, description = "Nível sem acesso à controladoria ou sem permissão de edição")
    ),
    security(("api_jwt" = []))
)]
pub async fn autorizar_controladoria(
    State(app_state): State<AppState>,
    RequireLevel(aprovador, _): RequireLevel<Controladoria>,
    _perm: RequirePermission<PermAutorizacaoEdit>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let autorizacao = app_state
        .autorizacao_service
        .approve_controladoria(&aprovador, id)
        .await?;

    Ok((StatusCode::OK, Json(AutorizacaoCompraResponse::from(autorizacao))))
}

// PATCH /api/autorizacoes-compra/{id}/reverter-controladoria
#[utoipa::path(
    patch,
    path = "/api/autorizacoes-compra/{id}/reverter-controladoria",
    tag = "Autorizações de Compra",
    params(("id" = Uuid, Path, description = "ID da autorização")),
    responses(
        (status = 200, description = "Aprovação da controladoria desfeita", body = AutorizacaoCompraResponse),
        (status = 403, description = "Nível sem acesso à controladoria ou sem permissão de edição"),
        (status = 409, description = "Já liberada pela diretoria")
    ),
    security(("api_jwt" = []))
)]
pub async fn reverter_controladoria(
    State(app_state): State<AppState>,
    RequireLevel(quem, _): RequireLevel<Controladoria>,
    _perm: RequirePermission<PermAutorizacaoEdit>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let autorizacao = app_state
        .autorizacao_service
        .revert_controladoria(&quem, id)
        .await?;

    Ok((StatusCode::OK, Json(AutorizacaoCompraResponse::from(autorizacao))))
}

// PATCH /api/autorizacoes-compra/{id}/autorizar-diretoria
#[utoipa::path(
    patch,
    path = "/api/autorizacoes-compra/{id}/autorizar-diretoria",
    tag = "Autorizações de Compra",
    params(("id" = Uuid, Path, description = "ID da autorização")),
    responses(
        (status = 200, description = "Liberada pela diretoria", body = AutorizacaoCompraResponse),
        (status = 403, description = "Nível sem acesso à diretoria ou sem permissão de edição"),
        (status = 409, description = "Falta a aprovação da controladoria")
    ),
    security(("api_jwt" = []))
)]
pub async fn autorizar_diretoria(
    State(app_state): State<AppState>,
    RequireLevel(aprovador, _): RequireLevel<Diretoria>,
    _perm: RequirePermission<PermAutorizacaoEdit>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let autorizacao = app_state
        .autorizacao_service
        .approve_diretoria(&aprovador, id)
        .await?;

    Ok((StatusCode::OK, Json(AutorizacaoCompraResponse::from(autorizacao))))
}

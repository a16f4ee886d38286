// src/handlers/produtos.rs

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
        PermProdutoCreate, PermProdutoDelete, PermProdutoEdit, PermProdutoRead, RequirePermission,
    },
    models::produto::{
        BuscaCatalogo, CreateEtiquetaPayload, EtiquetaProduto, FiltroEtiquetas,
        ImportarEtiquetasPayload, ProdutoCatalogo, UpdateEtiquetaPayload,
    },
};

// GET /api/produtos/catalogo?busca=
#[utoipa::path(
    get,
    path = "/api/produtos/catalogo",
    tag = "Produtos",
    params(("busca" = Option<String>, Query, description = "Código ou parte da descrição")),
    responses((status = 200, description = "Produtos do cadastro (máx. 50)", body = [ProdutoCatalogo])),
    security(("api_jwt" = []))
)]
pub async fn search_catalog(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermProdutoRead>,
    Query(query): Query<BuscaCatalogo>,
) -> Result<impl IntoResponse, AppError> {
    let produtos = app_state
        .produto_service
        .search_catalog(query.busca.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(produtos)))
}

// GET /api/produtos/labels
#[utoipa::path(
    get,
    path = "/api/produtos/labels",
    tag = "Produtos",
    params(
        ("competencia" = Option<String>, Query, description = "AAAA-MM"),
        ("bandeira" = Option<String>, Query, description = "verde | vermelha"),
        ("busca" = Option<String>, Query, description = "Código ou descrição")
    ),
    responses((status = 200, description = "Etiquetas", body = [EtiquetaProduto])),
    security(("api_jwt" = []))
)]
pub async fn list_etiquetas(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermProdutoRead>,
    Query(filtro): Query<FiltroEtiquetas>,
) -> Result<impl IntoResponse, AppError> {
    let etiquetas = app_state.produto_service.list_etiquetas(&filtro).await?;
    Ok((StatusCode::OK, Json(etiquetas)))
}

// GET /api/produtos/labels/{id}
#[utoipa::path(
    get,
    path = "/api/produtos/labels/{id}",
    tag = "Produtos",
    params(("id" = Uuid, Path, description = "ID da etiqueta")),
    responses((status = 200, description = "Etiqueta", body = EtiquetaProduto)),
    security(("api_jwt" = []))
)]
pub async fn get_etiqueta(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermProdutoRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let etiqueta = app_state.produto_service.get_etiqueta(id).await?;
    Ok((StatusCode::OK, Json(etiqueta)))
}

// POST /api/produtos/labels
#[utoipa::path(
    post,
    path = "/api/produtos/labels",
    tag = "Produtos",
    request_body = CreateEtiquetaPayload,
    responses(
        (status = 201, description = "Etiqueta criada", body = EtiquetaProduto),
        (status = 409, description = "Produto já etiquetado na competência")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_etiqueta(
    State(app_state): State<AppState>,
    RequirePermission(identidade, _): RequirePermission<PermProdutoCreate>,
    Json(payload): Json<CreateEtiquetaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let etiqueta = app_state
        .produto_service
        .create_etiqueta(&identidade, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(etiqueta)))
}

// PUT /api/produtos/labels/{id}
#[utoipa::path(
    put,
    path = "/api/produtos/labels/{id}",
    tag = "Produtos",
    request_body = UpdateEtiquetaPayload,
    params(("id" = Uuid, Path, description = "ID da etiqueta")),
    responses((status = 200, description = "Etiqueta atualizada", body = EtiquetaProduto)),
    security(("api_jwt" = []))
)]
pub async fn update_etiqueta(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermProdutoEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEtiquetaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let etiqueta = app_state.produto_service.update_etiqueta(id, &payload).await?;
    Ok((StatusCode::OK, Json(etiqueta)))
}

// DELETE /api/produtos/labels/{id}
#[utoipa::path(
    delete,
    path = "/api/produtos/labels/{id}",
    tag = "Produtos",
    params(("id" = Uuid, Path, description = "ID da etiqueta")),
    responses((status = 204, description = "Etiqueta removida")),
    security(("api_jwt" = []))
)]
pub async fn delete_etiqueta(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermProdutoDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.produto_service.delete_etiqueta(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/produtos/labels/importar
#[utoipa::path(
    post,
    path = "/api/produtos/labels/importar",
    tag = "Produtos",
    request_body = ImportarEtiquetasPayload,
    responses(
        (status = 200, description = "Relatório da importação: { sucesso: [EtiquetaProduto], erros: [ImportErro] }")
    ),
    security(("api_jwt" = []))
)]
pub async fn importar_etiquetas(
    State(app_state): State<AppState>,
    RequirePermission(identidade, _): RequirePermission<PermProdutoCreate>,
    Json(payload): Json<ImportarEtiquetasPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let relatorio = app_state.produto_service.importar(&identidade, payload).await?;
    Ok((StatusCode::OK, Json(relatorio)))
}

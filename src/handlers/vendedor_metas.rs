// src/handlers/vendedor_metas.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{competencia::parse_competencia, error::AppError},
    config::AppState,
    middleware::rbac::{PermMetaCreate, PermMetaDelete, PermMetaEdit, PermMetaRead, RequirePermission},
    models::meta::{
        AcompanhamentoMeta, CreateMetaPayload, FiltroAcompanhamento, FiltroMetas,
        ImportarMetasPayload, MetaVendedor, UpdateMetaPayload,
    },
};

// GET /api/vendedor-metas
#[utoipa::path(
    get,
    path = "/api/vendedor-metas",
    tag = "Metas de Vendedores",
    params(
        ("competencia" = Option<String>, Query, description = "AAAA-MM"),
        ("codusur" = Option<i32>, Query, description = "Código do vendedor")
    ),
    responses((status = 200, description = "Metas", body = [MetaVendedor])),
    security(("api_jwt" = []))
)]
pub async fn list_metas(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermMetaRead>,
    Query(filtro): Query<FiltroMetas>,
) -> Result<impl IntoResponse, AppError> {
    let metas = app_state.meta_service.list(&filtro).await?;
    Ok((StatusCode::OK, Json(metas)))
}

// GET /api/vendedor-metas/{id}
#[utoipa::path(
    get,
    path = "/api/vendedor-metas/{id}",
    tag = "Metas de Vendedores",
    params(("id" = Uuid, Path, description = "ID da meta")),
    responses((status = 200, description = "Meta", body = MetaVendedor)),
    security(("api_jwt" = []))
)]
pub async fn get_meta(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermMetaRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let meta = app_state.meta_service.get(id).await?;
    Ok((StatusCode::OK, Json(meta)))
}

// POST /api/vendedor-metas
#[utoipa::path(
    post,
    path = "/api/vendedor-metas",
    tag = "Metas de Vendedores",
    request_body = CreateMetaPayload,
    responses(
        (status = 201, description = "Meta criada", body = MetaVendedor),
        (status = 409, description = "Vendedor já possui meta na competência")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_meta(
    State(app_state): State<AppState>,
    RequirePermission(identidade, _): RequirePermission<PermMetaCreate>,
    Json(payload): Json<CreateMetaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let meta = app_state.meta_service.create(&identidade, &payload).await?;
    Ok((StatusCode::CREATED, Json(meta)))
}

// PUT /api/vendedor-metas/{id}
#[utoipa::path(
    put,
    path = "/api/vendedor-metas/{id}",
    tag = "Metas de Vendedores",
    request_body = UpdateMetaPayload,
    params(("id" = Uuid, Path, description = "ID da meta")),
    responses((status = 200, description = "Meta atualizada", body = MetaVendedor)),
    security(("api_jwt" = []))
)]
pub async fn update_meta(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermMetaEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMetaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let meta = app_state.meta_service.update(id, &payload).await?;
    Ok((StatusCode::OK, Json(meta)))
}

// DELETE /api/vendedor-metas/{id}
#[utoipa::path(
    delete,
    path = "/api/vendedor-metas/{id}",
    tag = "Metas de Vendedores",
    params(("id" = Uuid, Path, description = "ID da meta")),
    responses((status = 204, description = "Meta removida")),
    security(("api_jwt" = []))
)]
pub async fn delete_meta(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermMetaDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.meta_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/vendedor-metas/importar
#[utoipa::path(
    post,
    path = "/api/vendedor-metas/importar",
    tag = "Metas de Vendedores",
    request_body = ImportarMetasPayload,
    responses(
        (status = 200, description = "Relatório da importação: { sucesso: [MetaVendedor], erros: [ImportErro] }")
    ),
    security(("api_jwt" = []))
)]
pub async fn importar_metas(
    State(app_state): State<AppState>,
    RequirePermission(identidade, _): RequirePermission<PermMetaCreate>,
    Json(payload): Json<ImportarMetasPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let relatorio = app_state.meta_service.importar(&identidade, payload).await?;
    Ok((StatusCode::OK, Json(relatorio)))
}

// GET /api/vendedor-metas/acompanhamento?competencia=
#[utoipa::path(
    get,
    path = "/api/vendedor-metas/acompanhamento",
    tag = "Metas de Vendedores",
    params(("competencia" = String, Query, description = "AAAA-MM")),
    responses(
        (status = 200, description = "Meta × realizado com a comissão calculada", body = [AcompanhamentoMeta]),
        (status = 400, description = "Competência inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn acompanhamento(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermMetaRead>,
    Query(filtro): Query<FiltroAcompanhamento>,
) -> Result<impl IntoResponse, AppError> {
    if parse_competencia(&filtro.competencia).is_none() {
        return Err(AppError::BadRequest(
            "Competência inválida; use o formato AAAA-MM.".into(),
        ));
    }

    let linhas = app_state.meta_service.acompanhamento(&filtro.competencia).await?;
    Ok((StatusCode::OK, Json(linhas)))
}

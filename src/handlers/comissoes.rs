// src/handlers/comissoes.rs

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
        PermComissaoCreate, PermComissaoDelete, PermComissaoEdit, PermComissaoRead,
        PermComissaoVendedorDelete, PermComissaoVendedorEdit, PermComissaoVendedorRead,
        RequirePermission,
    },
    models::comissao::{
        ComissaoVendedor, FaixaComissaoDetalhe, FiltroComissoesVendedores,
        SalvarComissaoVendedorPayload, SalvarFaixaPayload,
    },
};

// ---
// Esquemas de comissão
// ---

// GET /api/comissoes
#[utoipa::path(
    get,
    path = "/api/comissoes",
    tag = "Comissões",
    responses((status = 200, description = "Esquemas com percentuais", body = [FaixaComissaoDetalhe])),
    security(("api_jwt" = []))
)]
pub async fn list_faixas(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermComissaoRead>,
) -> Result<impl IntoResponse, AppError> {
    let faixas = app_state.comissao_service.list_faixas().await?;
    Ok((StatusCode::OK, Json(faixas)))
}

// GET /api/comissoes/{id}
#[utoipa::path(
    get,
    path = "/api/comissoes/{id}",
    tag = "Comissões",
    params(("id" = Uuid, Path, description = "ID do esquema")),
    responses((status = 200, description = "Esquema", body = FaixaComissaoDetalhe)),
    security(("api_jwt" = []))
)]
pub async fn get_faixa(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermComissaoRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let faixa = app_state.comissao_service.get_faixa(id).await?;
    Ok((StatusCode::OK, Json(faixa)))
}

// POST /api/comissoes
#[utoipa::path(
    post,
    path = "/api/comissoes",
    tag = "Comissões",
    request_body = SalvarFaixaPayload,
    responses(
        (status = 201, description = "Esquema criado", body = FaixaComissaoDetalhe),
        (status = 400, description = "Faixas sobrepostas ou percentual inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_faixa(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermComissaoCreate>,
    Json(payload): Json<SalvarFaixaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let faixa = app_state.comissao_service.create_faixa(&payload).await?;
    Ok((StatusCode::CREATED, Json(faixa)))
}

// PUT /api/comissoes/{id}
#[utoipa::path(
    put,
    path = "/api/comissoes/{id}",
    tag = "Comissões",
    request_body = SalvarFaixaPayload,
    params(("id" = Uuid, Path, description = "ID do esquema")),
    responses((status = 200, description = "Esquema atualizado", body = FaixaComissaoDetalhe)),
    security(("api_jwt" = []))
)]
pub async fn update_faixa(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermComissaoEdit>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SalvarFaixaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let faixa = app_state.comissao_service.update_faixa(id, &payload).await?;
    Ok((StatusCode::OK, Json(faixa)))
}

// DELETE /api/comissoes/{id}
#[utoipa::path(
    delete,
    path = "/api/comissoes/{id}",
    tag = "Comissões",
    params(("id" = Uuid, Path, description = "ID do esquema")),
    responses(
        (status = 204, description = "Esquema removido"),
        (status = 409, description = "Esquema vinculado a vendedores")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_faixa(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermComissaoDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.comissao_service.delete_faixa(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Vínculo vendedor → esquema
// ---

// GET /api/comissoes-vendedores
#[utoipa::path(
    get,
    path = "/api/comissoes-vendedores",
    tag = "Comissões",
    params(
        ("competencia" = Option<String>, Query, description = "AAAA-MM"),
        ("codusur" = Option<i32>, Query, description = "Código do vendedor")
    ),
    responses((status = 200, description = "Vínculos", body = [ComissaoVendedor])),
    security(("api_jwt" = []))
)]
pub async fn list_comissoes_vendedores(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermComissaoVendedorRead>,
    Query(filtro): Query<FiltroComissoesVendedores>,
) -> Result<impl IntoResponse, AppError> {
    let itens = app_state
        .comissao_service
        .list_comissoes_vendedores(&filtro)
        .await?;

    Ok((StatusCode::OK, Json(itens)))
}

// POST /api/comissoes-vendedores (substitui o vínculo da competência)
#[utoipa::path(
    post,
    path = "/api/comissoes-vendedores",
    tag = "Comissões",
    request_body = SalvarComissaoVendedorPayload,
    responses((status = 200, description = "Vínculo salvo", body = ComissaoVendedor)),
    security(("api_jwt" = []))
)]
pub async fn save_comissao_vendedor(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermComissaoVendedorEdit>,
    Json(payload): Json<SalvarComissaoVendedorPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let item = app_state.comissao_service.save_comissao_vendedor(&payload).await?;
    Ok((StatusCode::OK, Json(item)))
}

// DELETE /api/comissoes-vendedores/{id}
#[utoipa::path(
    delete,
    path = "/api/comissoes-vendedores/{id}",
    tag = "Comissões",
    params(("id" = Uuid, Path, description = "ID do vínculo")),
    responses((status = 204, description = "Vínculo removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_comissao_vendedor(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermComissaoVendedorDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.comissao_service.delete_comissao_vendedor(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// src/handlers/controle_acesso.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AdminAcesso, AuthenticatedUser, RequireLevel},
    models::acesso::{
        Acao, CreateModuloPayload, Modulo, NivelAcesso, Permissao, PermissaoModulo,
        SalvarNivelPayload, SalvarPermissoesPayload, UpdateModuloPayload, VerificacaoPermissao,
    },
};

// ---
// Consultas do próprio usuário (qualquer nível autenticado)
// ---

// GET /api/controle-acesso/minhas-permissoes
#[utoipa::path(
    get,
    path = "/api/controle-acesso/minhas-permissoes",
    tag = "Controle de Acesso",
    responses(
        (status = 200, description = "Módulos visíveis para o nível do usuário", body = [PermissaoModulo])
    ),
    security(("api_jwt" = []))
)]
pub async fn minhas_permissoes(
    State(app_state): State<AppState>,
    AuthenticatedUser(identidade): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let menu = app_state.acesso_service.menu_do_nivel(&identidade.nivel).await?;
    Ok((StatusCode::OK, Json(menu)))
}

// GET /api/controle-acesso/verificar/{modulo}/{acao}
#[utoipa::path(
    get,
    path = "/api/controle-acesso/verificar/{modulo}/{acao}",
    tag = "Controle de Acesso",
    params(
        ("modulo" = String, Path, description = "Chave do módulo"),
        ("acao" = String, Path, description = "visualizar | criar | editar | excluir")
    ),
    responses(
        (status = 200, description = "Resultado da verificação", body = VerificacaoPermissao),
        (status = 400, description = "Ação desconhecida")
    ),
    security(("api_jwt" = []))
)]
pub async fn verificar_permissao(
    State(app_state): State<AppState>,
    AuthenticatedUser(identidade): AuthenticatedUser,
    Path((modulo, acao)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let acao: Acao = acao.parse().map_err(AppError::BadRequest)?;

    let permitido = app_state
        .acesso_service
        .get_module_permission(&identidade.nivel, &modulo, acao)
        .await?;

    Ok((StatusCode::OK, Json(VerificacaoPermissao { modulo, acao, permitido })))
}

// ---
// Administração (restrita aos níveis administradores)
// ---

// GET /api/controle-acesso/niveis
#[utoipa::path(
    get,
    path = "/api/controle-acesso/niveis",
    tag = "Controle de Acesso",
    responses((status = 200, description = "Níveis de acesso", body = [NivelAcesso])),
    security(("api_jwt" = []))
)]
pub async fn list_niveis(
    State(app_state): State<AppState>,
    _admin: RequireLevel<AdminAcesso>,
) -> Result<impl IntoResponse, AppError> {
    let niveis = app_state.acesso_service.list_niveis().await?;
    Ok((StatusCode::OK, Json(niveis)))
}

// POST /api/controle-acesso/niveis (cria ou atualiza pelo código)
#[utoipa::path(
    post,
    path = "/api/controle-acesso/niveis",
    tag = "Controle de Acesso",
    request_body = SalvarNivelPayload,
    responses((status = 200, description = "Nível salvo", body = NivelAcesso)),
    security(("api_jwt" = []))
)]
pub async fn save_nivel(
    State(app_state): State<AppState>,
    _admin: RequireLevel<AdminAcesso>,
    Json(payload): Json<SalvarNivelPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let nivel = app_state.acesso_service.save_nivel(&payload).await?;
    Ok((StatusCode::OK, Json(nivel)))
}

// GET /api/controle-acesso/modulos
#[utoipa::path(
    get,
    path = "/api/controle-acesso/modulos",
    tag = "Controle de Acesso",
    responses((status = 200, description = "Módulos do sistema", body = [Modulo])),
    security(("api_jwt" = []))
)]
pub async fn list_modulos(
    State(app_state): State<AppState>,
    _admin: RequireLevel<AdminAcesso>,
) -> Result<impl IntoResponse, AppError> {
    let modulos = app_state.acesso_service.list_modulos().await?;
    Ok((StatusCode::OK, Json(modulos)))
}

// POST /api/controle-acesso/modulos
#[utoipa::path(
    post,
    path = "/api/controle-acesso/modulos",
    tag = "Controle de Acesso",
    request_body = CreateModuloPayload,
    responses(
        (status = 201, description = "Módulo criado", body = Modulo),
        (status = 409, description = "Chave já utilizada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_modulo(
    State(app_state): State<AppState>,
    _admin: RequireLevel<AdminAcesso>,
    Json(payload): Json<CreateModuloPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let modulo = app_state.acesso_service.create_modulo(&payload).await?;
    Ok((StatusCode::CREATED, Json(modulo)))
}

// PUT /api/controle-acesso/modulos/{id}
#[utoipa::path(
    put,
    path = "/api/controle-acesso/modulos/{id}",
    tag = "Controle de Acesso",
    request_body = UpdateModuloPayload,
    params(("id" = Uuid, Path, description = "ID do módulo")),
    responses(
        (status = 200, description = "Módulo atualizado", body = Modulo),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_modulo(
    State(app_state): State<AppState>,
    _admin: RequireLevel<AdminAcesso>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateModuloPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let modulo = app_state.acesso_service.update_modulo(id, &payload).await?;
    Ok((StatusCode::OK, Json(modulo)))
}

// DELETE /api/controle-acesso/modulos/{id}
#[utoipa::path(
    delete,
    path = "/api/controle-acesso/modulos/{id}",
    tag = "Controle de Acesso",
    params(("id" = Uuid, Path, description = "ID do módulo")),
    responses((status = 204, description = "Módulo removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_modulo(
    State(app_state): State<AppState>,
    _admin: RequireLevel<AdminAcesso>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.acesso_service.delete_modulo(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/controle-acesso/permissoes/{nivel}
#[utoipa::path(
    get,
    path = "/api/controle-acesso/permissoes/{nivel}",
    tag = "Controle de Acesso",
    params(("nivel" = String, Path, description = "Código do nível")),
    responses(
        (status = 200, description = "Todos os módulos com as permissões do nível", body = [PermissaoModulo])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_permissoes(
    State(app_state): State<AppState>,
    _admin: RequireLevel<AdminAcesso>,
    Path(nivel): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let permissoes = app_state.acesso_service.list_permissoes(&nivel).await?;
    Ok((StatusCode::OK, Json(permissoes)))
}

// PUT /api/controle-acesso/permissoes/{nivel}
#[utoipa::path(
    put,
    path = "/api/controle-acesso/permissoes/{nivel}",
    tag = "Controle de Acesso",
    request_body = SalvarPermissoesPayload,
    params(("nivel" = String, Path, description = "Código do nível")),
    responses((status = 200, description = "Permissões gravadas", body = [Permissao])),
    security(("api_jwt" = []))
)]
pub async fn save_permissoes(
    State(app_state): State<AppState>,
    RequireLevel(admin, _): RequireLevel<AdminAcesso>,
    Path(nivel): Path<String>,
    Json(payload): Json<SalvarPermissoesPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let salvas = app_state
        .acesso_service
        .salvar_permissoes(&nivel, &payload.permissoes)
        .await?;
    tracing::info!("🛡️ Permissões do nível {} alteradas por {}", nivel, admin.usuario);

    Ok((StatusCode::OK, Json(salvas)))
}

// DELETE /api/controle-acesso/permissoes/{nivel}/{modulo_id}
#[utoipa::path(
    delete,
    path = "/api/controle-acesso/permissoes/{nivel}/{modulo_id}",
    tag = "Controle de Acesso",
    params(
        ("nivel" = String, Path, description = "Código do nível"),
        ("modulo_id" = Uuid, Path, description = "ID do módulo")
    ),
    responses((status = 204, description = "Permissão removida (acesso volta a ser negado)")),
    security(("api_jwt" = []))
)]
pub async fn delete_permissao(
    State(app_state): State<AppState>,
    _admin: RequireLevel<AdminAcesso>,
    Path((nivel, modulo_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state.acesso_service.delete_permissao(&nivel, modulo_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("Nenhum campo para atualizar")]
    NoFieldsToUpdate,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token ausente")]
    MissingToken,

    #[error("Token mal formatado")]
    MalformedToken,

    #[error("Token inválido ou expirado")]
    InvalidOrExpiredToken,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Sem permissão '{acao}' no módulo '{modulo}'")]
    PermissionDenied { modulo: String, acao: String },

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Autorização da controladoria é obrigatória")]
    ControladoriaRequired,

    #[error("Autorização já liberada pela diretoria")]
    AlreadyReleased,

    #[error("Autorização já aprovada pela controladoria")]
    AlreadyApproved,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // `anyhow::Error` guarda o contexto do erro inesperado.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

/// Corpo JSON de erro devolvido por todas as rotas: `{ error, details? }`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: "Um ou mais campos são inválidos.".into(),
                    details: Some(json!(details)),
                }
            }
            AppError::BadRequest(msg) => ApiError::new(StatusCode::BAD_REQUEST, msg),
            AppError::NoFieldsToUpdate => {
                ApiError::new(StatusCode::BAD_REQUEST, "Nenhum campo informado para atualização.")
            }
            AppError::InvalidCredentials => {
                ApiError::new(StatusCode::UNAUTHORIZED, "Usuário ou senha inválidos.")
            }
            AppError::MissingToken => {
                ApiError::new(StatusCode::UNAUTHORIZED, "Token de autenticação não informado.")
            }
            AppError::MalformedToken => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "Cabeçalho Authorization mal formatado. Use 'Bearer <token>'.",
            ),
            AppError::InvalidOrExpiredToken => {
                ApiError::new(StatusCode::UNAUTHORIZED, "Token inválido ou expirado.")
            }
            AppError::Forbidden(msg) => ApiError::new(StatusCode::FORBIDDEN, msg),
            AppError::PermissionDenied { modulo, acao } => ApiError {
                status: StatusCode::FORBIDDEN,
                error: "Você não tem permissão para realizar esta ação.".into(),
                details: Some(json!({ "modulo": modulo, "acao": acao })),
            },
            AppError::ResourceNotFound(what) => {
                ApiError::new(StatusCode::NOT_FOUND, format!("{} não encontrado(a).", what))
            }
            AppError::ControladoriaRequired => ApiError::new(
                StatusCode::CONFLICT,
                "A autorização precisa ser aprovada pela controladoria antes da diretoria.",
            ),
            AppError::AlreadyReleased => ApiError::new(
                StatusCode::CONFLICT,
                "Autorização já liberada pela diretoria, não é possível reverter.",
            ),
            AppError::AlreadyApproved => ApiError::new(
                StatusCode::CONFLICT,
                "Autorização já aprovada pela controladoria, não pode ser alterada ou excluída.",
            ),
            AppError::UniqueConstraintViolation(msg) => ApiError::new(StatusCode::CONFLICT, msg),

            // Todos os outros erros (banco, JWT, interno) viram 500 sem vazar detalhes.
            ref e => {
                tracing::error!("🔥 Erro interno do servidor: {:?}", e);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        ApiError::from(err).status
    }

    #[test]
    fn maps_taxonomy_to_http_status() {
        assert_eq!(status_of(AppError::NoFieldsToUpdate), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AppError::MissingToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::InvalidOrExpiredToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::Forbidden("x".into())), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(AppError::ResourceNotFound("Autorização".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of(AppError::ControladoriaRequired), StatusCode::CONFLICT);
        assert_eq!(status_of(AppError::AlreadyReleased), StatusCode::CONFLICT);
        assert_eq!(
            status_of(AppError::InternalServerError(anyhow::anyhow!("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let body = ApiError::from(AppError::InternalServerError(anyhow::anyhow!("senha do banco")));
        assert_eq!(body.error, "Ocorreu um erro inesperado.");
        assert!(body.details.is_none());
    }

    #[test]
    fn permission_denied_carries_module_and_action() {
        let body = ApiError::from(AppError::PermissionDenied {
            modulo: "produtos".into(),
            acao: "excluir".into(),
        });
        let details = body.details.unwrap();
        assert_eq!(details["modulo"], "produtos");
        assert_eq!(details["acao"], "excluir");
    }
}

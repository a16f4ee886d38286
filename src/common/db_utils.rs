use crate::common::error::AppError;

// ---
// Helper: traduz violação de UNIQUE do Postgres para um erro 409 amigável.
// ---
pub(crate) fn map_unique_violation(e: sqlx::Error, mensagem: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(mensagem.to_string());
        }
    }
    e.into()
}

/// Converte o número de linhas afetadas em `NotFound` quando nada foi tocado.
pub(crate) fn ensure_affected(rows: u64, recurso: &str) -> Result<(), AppError> {
    if rows == 0 {
        return Err(AppError::ResourceNotFound(recurso.to_string()));
    }
    Ok(())
}

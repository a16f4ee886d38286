// src/db/user_repo.rs

use sqlx::PgPool;

use crate::{common::error::AppError, models::auth::UsuarioAcesso};

// Repositório de credenciais: lê a visão de usuários mantida pelo ERP.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Busca um usuário ativo pelo nome (já em maiúsculas) e hash de senha,
    /// restrito aos níveis que podem acessar o sistema.
    pub async fn find_by_credentials(
        &self,
        usuario: &str,
        senha_hash: &str,
        niveis_permitidos: &[String],
    ) -> Result<Option<UsuarioAcesso>, AppError> {
        let maybe_user = sqlx::query_as::<_, UsuarioAcesso>(
            r#"
            SELECT usuario, codusuario, nivel
            FROM usuarios_acesso
            WHERE usuario = $1
              AND senha_hash = $2
              AND ativo = true
              AND nivel = ANY($3)
            LIMIT 1
            "#,
        )
        .bind(usuario)
        .bind(senha_hash)
        .bind(niveis_permitidos)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe_user)
    }
}

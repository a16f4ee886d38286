// src/db/acesso_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_unique_violation, error::AppError},
    models::acesso::{
        CreateModuloPayload, Modulo, NivelAcesso, Permissao, PermissaoItem, PermissaoModulo,
        SalvarNivelPayload, UpdateModuloPayload,
    },
};

#[derive(Clone)]
pub struct AcessoRepository {
    pool: PgPool,
}

impl AcessoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CONSULTA DE PERMISSÃO
    // =========================================================================

    /// Linha de permissão do nível para o módulo identificado pela chave de rota.
    /// Módulos inativos contam como inexistentes.
    pub async fn find_permission(
        &self,
        nivel: &str,
        chave_modulo: &str,
    ) -> Result<Option<Permissao>, AppError> {
        let permissao = sqlx::query_as::<_, Permissao>(
            r#"
            SELECT p.nivel, p.modulo_id,
                   p.pode_visualizar, p.pode_criar, p.pode_editar, p.pode_excluir
            FROM permissoes p
            JOIN modulos m ON m.id = p.modulo_id
            WHERE p.nivel = $1
              AND m.chave = $2
              AND m.ativo = true
            "#,
        )
        .bind(nivel)
        .bind(chave_modulo)
        .fetch_optional(&self.pool)
        .await?;

        Ok(permissao)
    }

    // =========================================================================
    //  NÍVEIS
    // =========================================================================

    pub async fn list_niveis(&self) -> Result<Vec<NivelAcesso>, AppError> {
        let niveis = sqlx::query_as::<_, NivelAcesso>(
            "SELECT codigo, descricao, ativo FROM niveis_acesso ORDER BY codigo",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(niveis)
    }

    pub async fn upsert_nivel(&self, payload: &SalvarNivelPayload) -> Result<NivelAcesso, AppError> {
        let nivel = sqlx::query_as::<_, NivelAcesso>(
            r#"
            INSERT INTO niveis_acesso (codigo, descricao, ativo)
            VALUES ($1, $2, $3)
            ON CONFLICT (codigo) DO UPDATE
                SET descricao = EXCLUDED.descricao, ativo = EXCLUDED.ativo
            RETURNING codigo, descricao, ativo
            "#,
        )
        .bind(&payload.codigo)
        .bind(&payload.descricao)
        .bind(payload.ativo)
        .fetch_one(&self.pool)
        .await?;

        Ok(nivel)
    }

    // =========================================================================
    //  MÓDULOS
    // =========================================================================

    pub async fn list_modulos(&self) -> Result<Vec<Modulo>, AppError> {
        let modulos = sqlx::query_as::<_, Modulo>(
            "SELECT id, nome, chave, icone, ordem, ativo, criado_em FROM modulos ORDER BY ordem, nome",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(modulos)
    }

    pub async fn create_modulo(&self, payload: &CreateModuloPayload) -> Result<Modulo, AppError> {
        sqlx::query_as::<_, Modulo>(
            r#"
            INSERT INTO modulos (nome, chave, icone, ordem, ativo)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, nome, chave, icone, ordem, ativo, criado_em
            "#,
        )
        .bind(&payload.nome)
        .bind(&payload.chave)
        .bind(&payload.icone)
        .bind(payload.ordem)
        .bind(payload.ativo)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Já existe um módulo com essa chave."))
    }

    pub async fn update_modulo(
        &self,
        id: Uuid,
        patch: &UpdateModuloPayload,
    ) -> Result<Option<Modulo>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE modulos SET ");
        let mut campos = qb.separated(", ");
        if let Some(nome) = &patch.nome {
            campos.push("nome = ").push_bind_unseparated(nome);
        }
        if let Some(chave) = &patch.chave {
            campos.push("chave = ").push_bind_unseparated(chave);
        }
        if let Some(icone) = &patch.icone {
            campos.push("icone = ").push_bind_unseparated(icone);
        }
        if let Some(ordem) = patch.ordem {
            campos.push("ordem = ").push_bind_unseparated(ordem);
        }
        if let Some(ativo) = patch.ativo {
            campos.push("ativo = ").push_bind_unseparated(ativo);
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING id, nome, chave, icone, ordem, ativo, criado_em");

        qb.build_query_as::<Modulo>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "Já existe um módulo com essa chave."))
    }

    // As permissões do módulo caem junto (ON DELETE CASCADE)
    pub async fn delete_modulo(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM modulos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  PERMISSÕES
    // =========================================================================

    /// Todos os módulos com as permissões do nível (não configurado = tudo falso).
    pub async fn list_permissoes_nivel(
        &self,
        nivel: &str,
        somente_ativos: bool,
    ) -> Result<Vec<PermissaoModulo>, AppError> {
        let permissoes = sqlx::query_as::<_, PermissaoModulo>(
            r#"
            SELECT
                m.id   AS modulo_id,
                m.nome AS modulo_nome,
                m.chave AS modulo_chave,
                m.icone,
                m.ordem,
                (p.nivel IS NOT NULL)               AS configurada,
                COALESCE(p.pode_visualizar, false)  AS pode_visualizar,
                COALESCE(p.pode_criar, false)       AS pode_criar,
                COALESCE(p.pode_editar, false)      AS pode_editar,
                COALESCE(p.pode_excluir, false)     AS pode_excluir
            FROM modulos m
            LEFT JOIN permissoes p ON p.modulo_id = m.id AND p.nivel = $1
            WHERE ($2 = false OR m.ativo = true)
            ORDER BY m.ordem, m.nome
            "#,
        )
        .bind(nivel)
        .bind(somente_ativos)
        .fetch_all(&self.pool)
        .await?;

        Ok(permissoes)
    }

    // Uma linha por (nível, módulo): salvar sempre faz upsert
    pub async fn upsert_permissao<'e, E>(
        &self,
        executor: E,
        nivel: &str,
        item: &PermissaoItem,
    ) -> Result<Permissao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let permissao = sqlx::query_as::<_, Permissao>(
            r#"
            INSERT INTO permissoes (
                nivel, modulo_id, pode_visualizar, pode_criar, pode_editar, pode_excluir
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (nivel, modulo_id) DO UPDATE SET
                pode_visualizar = EXCLUDED.pode_visualizar,
                pode_criar      = EXCLUDED.pode_criar,
                pode_editar     = EXCLUDED.pode_editar,
                pode_excluir    = EXCLUDED.pode_excluir
            RETURNING nivel, modulo_id, pode_visualizar, pode_criar, pode_editar, pode_excluir
            "#,
        )
        .bind(nivel)
        .bind(item.modulo_id)
        .bind(item.pode_visualizar)
        .bind(item.pode_criar)
        .bind(item.pode_editar)
        .bind(item.pode_excluir)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::ResourceNotFound(format!(
                        "Nível {} ou módulo {}",
                        nivel, item.modulo_id
                    ));
                }
            }
            e.into()
        })?;

        Ok(permissao)
    }

    pub async fn delete_permissao(&self, nivel: &str, modulo_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM permissoes WHERE nivel = $1 AND modulo_id = $2")
            .bind(nivel)
            .bind(modulo_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

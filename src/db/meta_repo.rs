// src/db/meta_repo.rs

use std::collections::HashSet;

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_unique_violation, error::AppError},
    models::meta::{CreateMetaPayload, FiltroMetas, MetaRealizado, MetaVendedor},
};

const SELECT_META: &str = r#"
    SELECT m.id, m.codusur, v.nome AS nome_vendedor, m.competencia,
           m.valor_meta, m.usuario, m.criado_em
    FROM metas_vendedores m
    LEFT JOIN vendedores v ON v.codusur = m.codusur
"#;

#[derive(Clone)]
pub struct MetaRepository {
    pool: PgPool,
}

impl MetaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filtro: &FiltroMetas) -> Result<Vec<MetaVendedor>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_META);
        qb.push(" WHERE 1 = 1");
        if let Some(competencia) = &filtro.competencia {
            qb.push(" AND m.competencia = ").push_bind(competencia);
        }
        if let Some(codusur) = filtro.codusur {
            qb.push(" AND m.codusur = ").push_bind(codusur);
        }
        qb.push(" ORDER BY m.competencia DESC, v.nome");

        let metas = qb.build_query_as::<MetaVendedor>().fetch_all(&self.pool).await?;
        Ok(metas)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MetaVendedor>, AppError> {
        let sql = format!("{} WHERE m.id = $1", SELECT_META);
        let meta = sqlx::query_as::<_, MetaVendedor>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(meta)
    }

    /// Insere a meta; com `ignorar_conflito` a duplicidade devolve `None`
    /// (importação) em vez de erro 409.
    pub async fn insert<'e, E>(
        &self,
        executor: E,
        payload: &CreateMetaPayload,
        usuario: &str,
        ignorar_conflito: bool,
    ) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = if ignorar_conflito {
            r#"
            INSERT INTO metas_vendedores (codusur, competencia, valor_meta, usuario)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (codusur, competencia) DO NOTHING
            RETURNING id
            "#
        } else {
            r#"
            INSERT INTO metas_vendedores (codusur, competencia, valor_meta, usuario)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#
        };

        let id: Option<(Uuid,)> = sqlx::query_as(sql)
            .bind(payload.codusur)
            .bind(&payload.competencia)
            .bind(payload.valor_meta)
            .bind(usuario)
            .fetch_optional(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::ResourceNotFound(format!("Vendedor {}", payload.codusur));
                    }
                }
                map_unique_violation(e, "Já existe meta para este vendedor na competência.")
            })?;

        Ok(id.map(|(id,)| id))
    }

    pub async fn find_many<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<Vec<MetaVendedor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{} WHERE m.id = ANY($1) ORDER BY v.nome", SELECT_META);
        let metas = sqlx::query_as::<_, MetaVendedor>(&sql)
            .bind(ids)
            .fetch_all(executor)
            .await?;

        Ok(metas)
    }

    pub async fn update_valor(&self, id: Uuid, valor_meta: Decimal) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE metas_vendedores SET valor_meta = $2 WHERE id = $1")
            .bind(id)
            .bind(valor_meta)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM metas_vendedores WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // --- Apoio à importação ---

    pub async fn existing_sellers<'e, E>(&self, executor: E, codigos: &[i32]) -> Result<HashSet<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows: Vec<(i32,)> = sqlx::query_as(
            "SELECT codusur FROM vendedores WHERE ativo = true AND codusur = ANY($1)",
        )
        .bind(codigos)
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().map(|(c,)| c).collect())
    }

    pub async fn sellers_with_goal<'e, E>(
        &self,
        executor: E,
        competencia: &str,
        codigos: &[i32],
    ) -> Result<HashSet<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows: Vec<(i32,)> = sqlx::query_as(
            "SELECT codusur FROM metas_vendedores WHERE competencia = $1 AND codusur = ANY($2)",
        )
        .bind(competencia)
        .bind(codigos)
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().map(|(c,)| c).collect())
    }

    // --- Acompanhamento ---

    /// Meta × vendido na competência, com o esquema de comissão vinculado.
    pub async fn metas_com_realizado(&self, competencia: &str) -> Result<Vec<MetaRealizado>, AppError> {
        let linhas = sqlx::query_as::<_, MetaRealizado>(
            r#"
            SELECT
                m.codusur,
                v.nome AS nome_vendedor,
                m.valor_meta,
                COALESCE(vr.valor_vendido, 0) AS realizado,
                cv.faixa_id
            FROM metas_vendedores m
            LEFT JOIN vendedores v ON v.codusur = m.codusur
            LEFT JOIN vendas_resumo vr
                   ON vr.codusur = m.codusur AND vr.competencia = m.competencia
            LEFT JOIN comissoes_vendedores cv
                   ON cv.codusur = m.codusur AND cv.competencia = m.competencia
            WHERE m.competencia = $1
            ORDER BY v.nome, m.codusur
            "#,
        )
        .bind(competencia)
        .fetch_all(&self.pool)
        .await?;

        Ok(linhas)
    }
}

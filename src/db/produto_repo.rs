// src/db/produto_repo.rs

use std::collections::HashSet;

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_unique_violation, error::AppError},
    models::produto::{
        Bandeira, EtiquetaProduto, FiltroEtiquetas, ProdutoCatalogo, UpdateEtiquetaPayload,
    },
};

const SELECT_ETIQUETA: &str = r#"
    SELECT e.id, e.codprod, p.descricao, e.competencia, e.bandeira,
           e.observacao, e.usuario, e.criado_em
    FROM etiquetas_produto e
    LEFT JOIN produtos p ON p.codprod = e.codprod
"#;

#[derive(Clone)]
pub struct ProdutoRepository {
    pool: PgPool,
}

impl ProdutoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CATÁLOGO (ERP)
    // =========================================================================

    pub async fn search_catalog(&self, busca: Option<&str>) -> Result<Vec<ProdutoCatalogo>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT codprod, descricao, embalagem, ativo FROM produtos WHERE ativo = true",
        );
        if let Some(termo) = busca.map(str::trim).filter(|s| !s.is_empty()) {
            match termo.parse::<i32>() {
                Ok(codigo) => {
                    qb.push(" AND codprod = ").push_bind(codigo);
                }
                Err(_) => {
                    qb.push(" AND descricao ILIKE ").push_bind(format!("%{}%", termo));
                }
            }
        }
        qb.push(" ORDER BY descricao LIMIT 50");

        let produtos = qb
            .build_query_as::<ProdutoCatalogo>()
            .fetch_all(&self.pool)
            .await?;

        Ok(produtos)
    }

    /// Quais dos códigos informados existem (ativos) no cadastro.
    pub async fn existing_codes<'e, E>(&self, executor: E, codigos: &[i32]) -> Result<HashSet<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows: Vec<(i32,)> = sqlx::query_as(
            "SELECT codprod FROM produtos WHERE ativo = true AND codprod = ANY($1)",
        )
        .bind(codigos)
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().map(|(c,)| c).collect())
    }

    // =========================================================================
    //  ETIQUETAS / BANDEIRAS
    // =========================================================================

    pub async fn list_etiquetas(&self, filtro: &FiltroEtiquetas) -> Result<Vec<EtiquetaProduto>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_ETIQUETA);
        qb.push(" WHERE 1 = 1");
        if let Some(competencia) = &filtro.competencia {
            qb.push(" AND e.competencia = ").push_bind(competencia);
        }
        if let Some(bandeira) = filtro.bandeira {
            qb.push(" AND e.bandeira = ").push_bind(bandeira);
        }
        if let Some(termo) = filtro.busca.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            qb.push(" AND (p.descricao ILIKE ")
                .push_bind(format!("%{}%", termo))
                .push(" OR e.codprod::text = ")
                .push_bind(termo)
                .push(")");
        }
        qb.push(" ORDER BY e.competencia DESC, p.descricao");

        let etiquetas = qb
            .build_query_as::<EtiquetaProduto>()
            .fetch_all(&self.pool)
            .await?;

        Ok(etiquetas)
    }

    pub async fn find_etiqueta(&self, id: Uuid) -> Result<Option<EtiquetaProduto>, AppError> {
        let sql = format!("{} WHERE e.id = $1", SELECT_ETIQUETA);
        let etiqueta = sqlx::query_as::<_, EtiquetaProduto>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(etiqueta)
    }

    /// Códigos que já possuem etiqueta na competência.
    pub async fn codes_with_label<'e, E>(
        &self,
        executor: E,
        competencia: &str,
        codigos: &[i32],
    ) -> Result<HashSet<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows: Vec<(i32,)> = sqlx::query_as(
            "SELECT codprod FROM etiquetas_produto WHERE competencia = $1 AND codprod = ANY($2)",
        )
        .bind(competencia)
        .bind(codigos)
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().map(|(c,)| c).collect())
    }

    /// Insere a etiqueta; `None` se já existir para o produto na competência.
    pub async fn insert_etiqueta<'e, E>(
        &self,
        executor: E,
        codprod: i32,
        competencia: &str,
        bandeira: Bandeira,
        observacao: Option<&str>,
        usuario: &str,
    ) -> Result<Option<EtiquetaProduto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let etiqueta = sqlx::query_as::<_, EtiquetaProduto>(
            r#"
            WITH nova AS (
                INSERT INTO etiquetas_produto (codprod, competencia, bandeira, observacao, usuario)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (codprod, competencia) DO NOTHING
                RETURNING *
            )
            SELECT n.id, n.codprod, p.descricao, n.competencia, n.bandeira,
                   n.observacao, n.usuario, n.criado_em
            FROM nova n
            LEFT JOIN produtos p ON p.codprod = n.codprod
            "#,
        )
        .bind(codprod)
        .bind(competencia)
        .bind(bandeira)
        .bind(observacao)
        .bind(usuario)
        .fetch_optional(executor)
        .await?;

        Ok(etiqueta)
    }

    pub async fn update_etiqueta(
        &self,
        id: Uuid,
        patch: &UpdateEtiquetaPayload,
    ) -> Result<u64, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE etiquetas_produto SET ");
        let mut campos = qb.separated(", ");
        if let Some(bandeira) = patch.bandeira {
            campos.push("bandeira = ").push_bind_unseparated(bandeira);
        }
        if let Some(observacao) = &patch.observacao {
            campos.push("observacao = ").push_bind_unseparated(observacao);
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "Etiqueta duplicada para a competência."))?;

        Ok(result.rows_affected())
    }

    pub async fn delete_etiqueta(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM etiquetas_produto WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

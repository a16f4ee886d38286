// src/db/promocao_repo.rs

use std::collections::HashSet;

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_unique_violation, error::AppError},
    models::promocao::{
        CreatePromocaoPayload, FiltroPromocoes, ItemImportacaoPromocao, Promocao,
        UpdatePromocaoPayload,
    },
};

const RETURNING_PROMOCAO: &str = r#"
    id, codprod,
    (SELECT descricao FROM produtos p WHERE p.codprod = promocoes.codprod) AS descricao,
    competencia, preco_promocional, data_inicio, data_fim, ativa, usuario, criado_em
"#;

#[derive(Clone)]
pub struct PromocaoRepository {
    pool: PgPool,
}

impl PromocaoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filtro: &FiltroPromocoes) -> Result<Vec<Promocao>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM promocoes WHERE 1 = 1",
            RETURNING_PROMOCAO
        ));
        if let Some(competencia) = &filtro.competencia {
            qb.push(" AND competencia = ").push_bind(competencia);
        }
        if let Some(ativa) = filtro.ativa {
            qb.push(" AND ativa = ").push_bind(ativa);
        }
        if let Some(codprod) = filtro.codprod {
            qb.push(" AND codprod = ").push_bind(codprod);
        }
        qb.push(" ORDER BY competencia DESC, data_inicio, codprod");

        let promocoes = qb.build_query_as::<Promocao>().fetch_all(&self.pool).await?;
        Ok(promocoes)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Promocao>, AppError> {
        let sql = format!("SELECT {} FROM promocoes WHERE id = $1", RETURNING_PROMOCAO);
        let promocao = sqlx::query_as::<_, Promocao>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(promocao)
    }

    pub async fn insert(
        &self,
        payload: &CreatePromocaoPayload,
        usuario: &str,
    ) -> Result<Promocao, AppError> {
        let sql = format!(
            r#"
            INSERT INTO promocoes (
                codprod, competencia, preco_promocional, data_inicio, data_fim, ativa, usuario
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            RETURNING_PROMOCAO
        );

        sqlx::query_as::<_, Promocao>(&sql)
            .bind(payload.codprod)
            .bind(&payload.competencia)
            .bind(payload.preco_promocional)
            .bind(payload.data_inicio)
            .bind(payload.data_fim)
            .bind(payload.ativa)
            .bind(usuario)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "Já existe promoção para este produto na competência."))
    }

    // Versão para importação: conflito vira `None` e não aborta a transação.
    pub async fn insert_if_absent<'e, E>(
        &self,
        executor: E,
        competencia: &str,
        item: &ItemImportacaoPromocao,
        usuario: &str,
    ) -> Result<Option<Promocao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO promocoes (
                codprod, competencia, preco_promocional, data_inicio, data_fim, ativa, usuario
            )
            VALUES ($1, $2, $3, $4, $5, true, $6)
            ON CONFLICT (codprod, competencia) DO NOTHING
            RETURNING {}
            "#,
            RETURNING_PROMOCAO
        );

        let promocao = sqlx::query_as::<_, Promocao>(&sql)
            .bind(item.codprod)
            .bind(competencia)
            .bind(item.preco_promocional)
            .bind(item.data_inicio)
            .bind(item.data_fim)
            .bind(usuario)
            .fetch_optional(executor)
            .await?;

        Ok(promocao)
    }

    pub async fn codes_with_promotion<'e, E>(
        &self,
        executor: E,
        competencia: &str,
        codigos: &[i32],
    ) -> Result<HashSet<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows: Vec<(i32,)> = sqlx::query_as(
            "SELECT codprod FROM promocoes WHERE competencia = $1 AND codprod = ANY($2)",
        )
        .bind(competencia)
        .bind(codigos)
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().map(|(c,)| c).collect())
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: &UpdatePromocaoPayload,
    ) -> Result<Option<Promocao>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE promocoes SET ");
        let mut campos = qb.separated(", ");
        if let Some(preco) = patch.preco_promocional {
            campos.push("preco_promocional = ").push_bind_unseparated(preco);
        }
        if let Some(inicio) = patch.data_inicio {
            campos.push("data_inicio = ").push_bind_unseparated(inicio);
        }
        if let Some(fim) = patch.data_fim {
            campos.push("data_fim = ").push_bind_unseparated(fim);
        }
        if let Some(ativa) = patch.ativa {
            campos.push("ativa = ").push_bind_unseparated(ativa);
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {}", RETURNING_PROMOCAO));

        // O CHECK (data_fim >= data_inicio) da tabela cobre combinações com a linha atual
        qb.build_query_as::<Promocao>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_check_violation() {
                        return AppError::BadRequest(
                            "A data final deve ser igual ou posterior à data inicial.".into(),
                        );
                    }
                }
                e.into()
            })
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM promocoes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

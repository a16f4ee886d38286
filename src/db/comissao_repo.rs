// src/db/comissao_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_unique_violation, error::AppError},
    models::comissao::{
        ComissaoVendedor, FaixaComissao, FiltroComissoesVendedores, PercentualComissao,
        PercentualPayload, SalvarComissaoVendedorPayload,
    },
};

const SELECT_COMISSAO_VENDEDOR: &str = r#"
    SELECT cv.id, cv.codusur, v.nome AS nome_vendedor, cv.faixa_id,
           f.descricao AS faixa_descricao, cv.competencia, cv.criado_em
    FROM comissoes_vendedores cv
    LEFT JOIN vendedores v ON v.codusur = cv.codusur
    LEFT JOIN faixas_comissao f ON f.id = cv.faixa_id
"#;

#[derive(Clone)]
pub struct ComissaoRepository {
    pool: PgPool,
}

impl ComissaoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  FAIXAS (ESQUEMAS)
    // =========================================================================

    pub async fn list_faixas(&self) -> Result<Vec<FaixaComissao>, AppError> {
        let faixas = sqlx::query_as::<_, FaixaComissao>(
            "SELECT id, descricao, ativa, criado_em FROM faixas_comissao ORDER BY descricao",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(faixas)
    }

    pub async fn find_faixa(&self, id: Uuid) -> Result<Option<FaixaComissao>, AppError> {
        let faixa = sqlx::query_as::<_, FaixaComissao>(
            "SELECT id, descricao, ativa, criado_em FROM faixas_comissao WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(faixa)
    }

    pub async fn insert_faixa<'e, E>(
        &self,
        executor: E,
        descricao: &str,
        ativa: bool,
    ) -> Result<FaixaComissao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, FaixaComissao>(
            r#"
            INSERT INTO faixas_comissao (descricao, ativa)
            VALUES ($1, $2)
            RETURNING id, descricao, ativa, criado_em
            "#,
        )
        .bind(descricao)
        .bind(ativa)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "Já existe um esquema de comissão com essa descrição."))
    }

    pub async fn update_faixa<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        descricao: &str,
        ativa: bool,
    ) -> Result<Option<FaixaComissao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, FaixaComissao>(
            r#"
            UPDATE faixas_comissao SET descricao = $2, ativa = $3
            WHERE id = $1
            RETURNING id, descricao, ativa, criado_em
            "#,
        )
        .bind(id)
        .bind(descricao)
        .bind(ativa)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, "Já existe um esquema de comissão com essa descrição."))
    }

    pub async fn delete_faixa(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM faixas_comissao WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::UniqueConstraintViolation(
                            "Esquema em uso por vendedores; remova os vínculos antes.".into(),
                        );
                    }
                }
                AppError::from(e)
            })?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  PERCENTUAIS
    // =========================================================================

    pub async fn list_percentuais(&self, faixa_ids: &[Uuid]) -> Result<Vec<PercentualComissao>, AppError> {
        let percentuais = sqlx::query_as::<_, PercentualComissao>(
            r#"
            SELECT id, faixa_id, atingimento_min, atingimento_max, percentual
            FROM percentuais_comissao
            WHERE faixa_id = ANY($1)
            ORDER BY faixa_id, atingimento_min
            "#,
        )
        .bind(faixa_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(percentuais)
    }

    pub async fn delete_percentuais<'e, E>(&self, executor: E, faixa_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM percentuais_comissao WHERE faixa_id = $1")
            .bind(faixa_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    // Inserção em massa num único INSERT
    pub async fn insert_percentuais<'e, E>(
        &self,
        executor: E,
        faixa_id: Uuid,
        itens: &[PercentualPayload],
    ) -> Result<Vec<PercentualComissao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO percentuais_comissao (faixa_id, atingimento_min, atingimento_max, percentual) ",
        );
        qb.push_values(itens, |mut row, item| {
            row.push_bind(faixa_id)
                .push_bind(item.atingimento_min)
                .push_bind(item.atingimento_max)
                .push_bind(item.percentual);
        });
        qb.push(" RETURNING id, faixa_id, atingimento_min, atingimento_max, percentual");

        let mut percentuais = qb
            .build_query_as::<PercentualComissao>()
            .fetch_all(executor)
            .await?;
        percentuais.sort_by(|a, b| a.atingimento_min.cmp(&b.atingimento_min));

        Ok(percentuais)
    }

    // =========================================================================
    //  VÍNCULO VENDEDOR → ESQUEMA
    // =========================================================================

    pub async fn list_comissoes_vendedores(
        &self,
        filtro: &FiltroComissoesVendedores,
    ) -> Result<Vec<ComissaoVendedor>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_COMISSAO_VENDEDOR);
        qb.push(" WHERE 1 = 1");
        if let Some(competencia) = &filtro.competencia {
            qb.push(" AND cv.competencia = ").push_bind(competencia);
        }
        if let Some(codusur) = filtro.codusur {
            qb.push(" AND cv.codusur = ").push_bind(codusur);
        }
        qb.push(" ORDER BY cv.competencia DESC, v.nome");

        let itens = qb
            .build_query_as::<ComissaoVendedor>()
            .fetch_all(&self.pool)
            .await?;

        Ok(itens)
    }

    /// Um esquema por vendedor e competência: salvar substitui o anterior.
    pub async fn upsert_comissao_vendedor(
        &self,
        payload: &SalvarComissaoVendedorPayload,
    ) -> Result<ComissaoVendedor, AppError> {
        let id: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO comissoes_vendedores (codusur, faixa_id, competencia)
            VALUES ($1, $2, $3)
            ON CONFLICT (codusur, competencia) DO UPDATE SET faixa_id = EXCLUDED.faixa_id
            RETURNING id
            "#,
        )
        .bind(payload.codusur)
        .bind(payload.faixa_id)
        .bind(&payload.competencia)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::ResourceNotFound("Vendedor ou esquema de comissão".into());
                }
            }
            AppError::from(e)
        })?;

        let sql = format!("{} WHERE cv.id = $1", SELECT_COMISSAO_VENDEDOR);
        let item = sqlx::query_as::<_, ComissaoVendedor>(&sql)
            .bind(id.0)
            .fetch_one(&self.pool)
            .await?;

        Ok(item)
    }

    pub async fn delete_comissao_vendedor(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM comissoes_vendedores WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

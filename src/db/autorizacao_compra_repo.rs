// src/db/autorizacao_compra_repo.rs

use chrono::{NaiveDate, NaiveTime};
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::autorizacao_compra::{
        AtualizarAutorizacaoPayload, AutorizacaoCompra, CreateAutorizacaoPayload,
        FiltroAutorizacoes,
    },
};

const COLUNAS: &str = r#"
    id, loja, setor, fornecedor, valor, observacao, usuario,
    data_criacao, hora_criacao,
    autorizado_controladoria, data_autorizacao_controladoria, usuario_controladoria,
    autorizado_diretoria, data_autorizacao_diretoria, usuario_diretoria
"#;

#[derive(Clone)]
pub struct AutorizacaoCompraRepository {
    pool: PgPool,
}

impl AutorizacaoCompraRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        payload: &CreateAutorizacaoPayload,
        usuario: &str,
        data_criacao: NaiveDate,
        hora_criacao: NaiveTime,
    ) -> Result<AutorizacaoCompra, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO autorizacoes_compra (
                loja, setor, fornecedor, valor, observacao, usuario,
                data_criacao, hora_criacao,
                autorizado_controladoria, autorizado_diretoria
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, false, false)
            RETURNING {}
            "#,
            COLUNAS
        );

        let autorizacao = sqlx::query_as::<_, AutorizacaoCompra>(&sql)
            .bind(&payload.loja)
            .bind(&payload.setor)
            .bind(&payload.fornecedor)
            .bind(payload.valor)
            .bind(&payload.observacao)
            .bind(usuario)
            .bind(data_criacao)
            .bind(hora_criacao)
            .fetch_one(executor)
            .await?;

        Ok(autorizacao)
    }

    /// Lista com filtros opcionais. `solicitante = Some(..)` restringe aos
    /// registros do próprio usuário.
    pub async fn list(
        &self,
        filtro: &FiltroAutorizacoes,
        solicitante: Option<&str>,
    ) -> Result<Vec<AutorizacaoCompra>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM autorizacoes_compra WHERE 1 = 1",
            COLUNAS
        ));

        if let Some(usuario) = solicitante {
            qb.push(" AND usuario = ").push_bind(usuario);
        }
        if let Some(loja) = filtro.loja.as_deref().filter(|s| !s.is_empty()) {
            qb.push(" AND loja = ").push_bind(loja);
        }
        if let Some(setor) = filtro.setor.as_deref().filter(|s| !s.is_empty()) {
            qb.push(" AND setor = ").push_bind(setor);
        }
        if let Some(busca) = filtro.busca.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let termo = format!("%{}%", busca);
            qb.push(" AND (fornecedor ILIKE ")
                .push_bind(termo.clone())
                .push(" OR observacao ILIKE ")
                .push_bind(termo.clone())
                .push(" OR usuario ILIKE ")
                .push_bind(termo)
                .push(")");
        }
        if let Some(inicio) = filtro.data_inicio {
            qb.push(" AND data_criacao >= ").push_bind(inicio);
        }
        if let Some(fim) = filtro.data_fim {
            qb.push(" AND data_criacao <= ").push_bind(fim);
        }
        qb.push(" ORDER BY data_criacao DESC, hora_criacao DESC");

        let autorizacoes = qb
            .build_query_as::<AutorizacaoCompra>()
            .fetch_all(&self.pool)
            .await?;

        Ok(autorizacoes)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AutorizacaoCompra>, AppError> {
        let sql = format!("SELECT {} FROM autorizacoes_compra WHERE id = $1", COLUNAS);
        let autorizacao = sqlx::query_as::<_, AutorizacaoCompra>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(autorizacao)
    }

    // Trava a linha até o fim da transação
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<AutorizacaoCompra>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM autorizacoes_compra WHERE id = $1 FOR UPDATE",
            COLUNAS
        );
        let autorizacao = sqlx::query_as::<_, AutorizacaoCompra>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(autorizacao)
    }

    /// Grava o estado das duas aprovações (flags, datas e aprovadores).
    pub async fn save_aprovacoes<'e, E>(
        &self,
        executor: E,
        autorizacao: &AutorizacaoCompra,
    ) -> Result<AutorizacaoCompra, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE autorizacoes_compra SET
                autorizado_controladoria = $2,
                data_autorizacao_controladoria = $3,
                usuario_controladoria = $4,
                autorizado_diretoria = $5,
                data_autorizacao_diretoria = $6,
                usuario_diretoria = $7
            WHERE id = $1
            RETURNING {}
            "#,
            COLUNAS
        );

        let atualizada = sqlx::query_as::<_, AutorizacaoCompra>(&sql)
            .bind(autorizacao.id)
            .bind(autorizacao.autorizado_controladoria)
            .bind(autorizacao.data_autorizacao_controladoria)
            .bind(&autorizacao.usuario_controladoria)
            .bind(autorizacao.autorizado_diretoria)
            .bind(autorizacao.data_autorizacao_diretoria)
            .bind(&autorizacao.usuario_diretoria)
            .fetch_one(executor)
            .await?;

        Ok(atualizada)
    }

    /// Atualização parcial parametrizada; `None` quando o id não existe.
    pub async fn update_campos<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        patch: &AtualizarAutorizacaoPayload,
    ) -> Result<Option<AutorizacaoCompra>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if patch.is_empty() {
            return Err(AppError::NoFieldsToUpdate);
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE autorizacoes_compra SET ");
        let mut campos = qb.separated(", ");
        if let Some(loja) = &patch.loja {
            campos.push("loja = ").push_bind_unseparated(loja);
        }
        if let Some(setor) = &patch.setor {
            campos.push("setor = ").push_bind_unseparated(setor);
        }
        if let Some(fornecedor) = &patch.fornecedor {
            campos.push("fornecedor = ").push_bind_unseparated(fornecedor);
        }
        if let Some(valor) = patch.valor {
            campos.push("valor = ").push_bind_unseparated(valor);
        }
        if let Some(observacao) = &patch.observacao {
            campos.push("observacao = ").push_bind_unseparated(observacao);
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {}", COLUNAS));

        let atualizada = qb
            .build_query_as::<AutorizacaoCompra>()
            .fetch_optional(executor)
            .await?;

        Ok(atualizada)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM autorizacoes_compra WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}

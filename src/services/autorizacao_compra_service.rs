// src/services/autorizacao_compra_service.rs

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppConfig,
    db::AutorizacaoCompraRepository,
    models::{
        auth::Identidade,
        autorizacao_compra::{
            AtualizarAutorizacaoPayload, AutorizacaoCompra, CreateAutorizacaoPayload,
            FiltroAutorizacoes,
        },
    },
};

const RECURSO: &str = "Autorização de compra";

/// Escopo da listagem: `None` = todos os registros, `Some(usuario)` = só os próprios.
pub fn escopo_solicitante<'a>(identidade: &'a Identidade, config: &AppConfig) -> Option<&'a str> {
    if config.nivel_privilegiado(&identidade.nivel) {
        None
    } else {
        Some(identidade.usuario.as_str())
    }
}

/// `data_criacao`/`hora_criacao` são colunas sem fuso e guardam o relógio da
/// loja; as aprovações são `TIMESTAMPTZ`. Ambos saem do mesmo instante UTC.
pub fn carimbo_criacao(instante: DateTime<Utc>) -> (NaiveDate, NaiveTime) {
    let local = instante.with_timezone(&Local);
    (local.date_naive(), local.time())
}

#[derive(Clone)]
pub struct AutorizacaoCompraService {
    repo: AutorizacaoCompraRepository,
    pool: PgPool,
    config: Arc<AppConfig>,
}

impl AutorizacaoCompraService {
    pub fn new(repo: AutorizacaoCompraRepository, pool: PgPool, config: Arc<AppConfig>) -> Self {
        Self { repo, pool, config }
    }

    pub async fn create(
        &self,
        identidade: &Identidade,
        payload: &CreateAutorizacaoPayload,
    ) -> Result<AutorizacaoCompra, AppError> {
        let (data_criacao, hora_criacao) = carimbo_criacao(Utc::now());
        let mut tx = self.pool.begin().await?;

        let autorizacao = self
            .repo
            .insert(
                &mut *tx,
                payload,
                &identidade.usuario,
                data_criacao,
                hora_criacao,
            )
            .await?;

        tx.commit().await?;
        tracing::info!(
            "🧾 Autorização {} criada por {} (loja {}, valor {})",
            autorizacao.id,
            identidade.usuario,
            autorizacao.loja,
            autorizacao.valor
        );

        Ok(autorizacao)
    }

    pub async fn list_for(
        &self,
        identidade: &Identidade,
        filtro: &FiltroAutorizacoes,
    ) -> Result<Vec<AutorizacaoCompra>, AppError> {
        let escopo = escopo_solicitante(identidade, &self.config);
        self.repo.list(filtro, escopo).await
    }

    // Registro de outro solicitante é tratado como inexistente para quem não é privilegiado
    pub async fn get(&self, identidade: &Identidade, id: Uuid) -> Result<AutorizacaoCompra, AppError> {
        let autorizacao = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(RECURSO.into()))?;

        match escopo_solicitante(identidade, &self.config) {
            Some(usuario) if usuario != autorizacao.usuario => {
                Err(AppError::ResourceNotFound(RECURSO.into()))
            }
            _ => Ok(autorizacao),
        }
    }

    pub async fn approve_controladoria(
        &self,
        aprovador: &Identidade,
        id: Uuid,
    ) -> Result<AutorizacaoCompra, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut autorizacao = self
            .repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(RECURSO.into()))?;

        autorizacao.aprovar_controladoria(&aprovador.usuario, Utc::now());
        let salva = self.repo.save_aprovacoes(&mut *tx, &autorizacao).await?;
        tx.commit().await?;

        tracing::info!("✅ Autorização {} aprovada pela controladoria ({})", id, aprovador.usuario);
        Ok(salva)
    }

    pub async fn approve_diretoria(
        &self,
        aprovador: &Identidade,
        id: Uuid,
    ) -> Result<AutorizacaoCompra, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut autorizacao = self
            .repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(RECURSO.into()))?;

        // Se falhar aqui, o tx sofre rollback ao sair do escopo
        autorizacao.aprovar_diretoria(&aprovador.usuario, Utc::now())?;
        let salva = self.repo.save_aprovacoes(&mut *tx, &autorizacao).await?;
        tx.commit().await?;

        tracing::info!("✅ Autorização {} liberada pela diretoria ({})", id, aprovador.usuario);
        Ok(salva)
    }

    pub async fn revert_controladoria(
        &self,
        quem: &Identidade,
        id: Uuid,
    ) -> Result<AutorizacaoCompra, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut autorizacao = self
            .repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(RECURSO.into()))?;

        autorizacao.reverter_controladoria()?;
        let salva = self.repo.save_aprovacoes(&mut *tx, &autorizacao).await?;
        tx.commit().await?;

        tracing::info!("↩️ Aprovação da controladoria revertida na autorização {} ({})", id, quem.usuario);
        Ok(salva)
    }

    pub async fn update(
        &self,
        identidade: &Identidade,
        id: Uuid,
        patch: &AtualizarAutorizacaoPayload,
    ) -> Result<AutorizacaoCompra, AppError> {
        if patch.is_empty() {
            return Err(AppError::NoFieldsToUpdate);
        }

        let mut tx = self.pool.begin().await?;
        let atual = self
            .repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(RECURSO.into()))?;
        atual.verificar_alteracao_por(&identidade.usuario)?;

        let atualizada = self
            .repo
            .update_campos(&mut *tx, id, patch)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(RECURSO.into()))?;
        tx.commit().await?;

        Ok(atualizada)
    }

    pub async fn delete(&self, identidade: &Identidade, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let atual = self
            .repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(RECURSO.into()))?;
        atual.verificar_alteracao_por(&identidade.usuario)?;

        self.repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!("🗑️ Autorização {} excluída por {}", id, identidade.usuario);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/db".into()),
            "JWT_SECRET" | "PASSWORD_HASH_KEY" => Some("x".into()),
            _ => None,
        })
        .unwrap()
    }

    fn identidade(usuario: &str, nivel: &str) -> Identidade {
        Identidade {
            usuario: usuario.into(),
            codusuario: 1,
            nivel: nivel.into(),
        }
    }

    #[test]
    fn regular_users_only_see_their_own_requests() {
        let cfg = config();
        let joao = identidade("JOAO", "04");
        assert_eq!(escopo_solicitante(&joao, &cfg), Some("JOAO"));

        // admin de TI não é nível privilegiado para o fluxo de compras
        let admin = identidade("TI", "00");
        assert_eq!(escopo_solicitante(&admin, &cfg), Some("TI"));
    }

    #[test]
    fn controladoria_and_diretoria_see_everything() {
        let cfg = config();
        assert_eq!(escopo_solicitante(&identidade("ANA", "02"), &cfg), None);
        assert_eq!(escopo_solicitante(&identidade("CEO", "01"), &cfg), None);
    }

    #[test]
    fn creation_stamp_is_the_local_wall_clock_of_the_same_instant() {
        use chrono::TimeZone;

        let instante = Utc.with_ymd_and_hms(2026, 10, 16, 23, 30, 0).unwrap();
        let (data, hora) = carimbo_criacao(instante);

        assert_eq!(
            data.and_time(hora),
            instante.with_timezone(&Local).naive_local()
        );
    }
}

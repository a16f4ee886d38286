// src/services/produto_service.rs

use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::ensure_affected,
        error::AppError,
        import::{classificar, ImportErro, ImportPlan, ImportReport, MOTIVO_JA_EXISTE},
    },
    db::ProdutoRepository,
    models::{
        auth::Identidade,
        produto::{
            CreateEtiquetaPayload, EtiquetaProduto, FiltroEtiquetas, ImportarEtiquetasPayload,
            ProdutoCatalogo, UpdateEtiquetaPayload,
        },
    },
};

pub const MOTIVO_PRODUTO_INEXISTENTE: &str = "produto não encontrado no cadastro.";

/// Separa os códigos importáveis dos rejeitados (fora do cadastro ou já etiquetados).
pub fn planejar_etiquetas(
    codigos: Vec<i32>,
    cadastrados: &HashSet<i32>,
    etiquetados: &HashSet<i32>,
) -> ImportPlan<i32> {
    classificar(codigos, |c| *c, |c| {
        if !cadastrados.contains(c) {
            Err(MOTIVO_PRODUTO_INEXISTENTE.to_string())
        } else if etiquetados.contains(c) {
            Err(MOTIVO_JA_EXISTE.to_string())
        } else {
            Ok(())
        }
    })
}

#[derive(Clone)]
pub struct ProdutoService {
    repo: ProdutoRepository,
    pool: PgPool,
}

impl ProdutoService {
    pub fn new(repo: ProdutoRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn search_catalog(&self, busca: Option<&str>) -> Result<Vec<ProdutoCatalogo>, AppError> {
        self.repo.search_catalog(busca).await
    }

    pub async fn list_etiquetas(&self, filtro: &FiltroEtiquetas) -> Result<Vec<EtiquetaProduto>, AppError> {
        self.repo.list_etiquetas(filtro).await
    }

    pub async fn get_etiqueta(&self, id: Uuid) -> Result<EtiquetaProduto, AppError> {
        self.repo
            .find_etiqueta(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Etiqueta".into()))
    }

    pub async fn create_etiqueta(
        &self,
        identidade: &Identidade,
        payload: &CreateEtiquetaPayload,
    ) -> Result<EtiquetaProduto, AppError> {
        let mut tx = self.pool.begin().await?;

        let cadastrados = self.repo.existing_codes(&mut *tx, &[payload.codprod]).await?;
        if !cadastrados.contains(&payload.codprod) {
            return Err(AppError::ResourceNotFound(format!("Produto {}", payload.codprod)));
        }

        let etiqueta = self
            .repo
            .insert_etiqueta(
                &mut *tx,
                payload.codprod,
                &payload.competencia,
                payload.bandeira,
                payload.observacao.as_deref(),
                &identidade.usuario,
            )
            .await?
            .ok_or_else(|| {
                AppError::UniqueConstraintViolation(
                    "O produto já possui etiqueta nesta competência.".into(),
                )
            })?;

        tx.commit().await?;
        Ok(etiqueta)
    }

    pub async fn update_etiqueta(
        &self,
        id: Uuid,
        patch: &UpdateEtiquetaPayload,
    ) -> Result<EtiquetaProduto, AppError> {
        if patch.is_empty() {
            return Err(AppError::NoFieldsToUpdate);
        }
        ensure_affected(self.repo.update_etiqueta(id, patch).await?, "Etiqueta")?;
        self.get_etiqueta(id).await
    }

    pub async fn delete_etiqueta(&self, id: Uuid) -> Result<(), AppError> {
        ensure_affected(self.repo.delete_etiqueta(id).await?, "Etiqueta")
    }

    pub async fn importar(
        &self,
        identidade: &Identidade,
        payload: ImportarEtiquetasPayload,
    ) -> Result<ImportReport<EtiquetaProduto>, AppError> {
        let mut tx = self.pool.begin().await?;

        let cadastrados = self.repo.existing_codes(&mut *tx, &payload.codigos).await?;
        let etiquetados = self
            .repo
            .codes_with_label(&mut *tx, &payload.competencia, &payload.codigos)
            .await?;

        let mut plano = planejar_etiquetas(payload.codigos, &cadastrados, &etiquetados);
        let aceitos = std::mem::take(&mut plano.aceitos);

        let mut inseridos = Vec::with_capacity(aceitos.len());
        for codprod in aceitos {
            let etiqueta = self
                .repo
                .insert_etiqueta(
                    &mut *tx,
                    codprod,
                    &payload.competencia,
                    payload.bandeira,
                    payload.observacao.as_deref(),
                    &identidade.usuario,
                )
                .await?;

            match etiqueta {
                Some(e) => inseridos.push(e),
                // Inserida por outra requisição entre a leitura e o INSERT
                None => plano.erros.push(ImportErro {
                    item: codprod.to_string(),
                    motivo: MOTIVO_JA_EXISTE.to_string(),
                }),
            }
        }

        tx.commit().await?;
        tracing::info!(
            "📦 Importação de etiquetas {}: {} inseridas, {} rejeitadas",
            payload.competencia,
            inseridos.len(),
            plano.erros.len()
        );

        Ok(plano.into_report(inseridos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_reports_missing_and_already_labelled_products() {
        let cadastrados: HashSet<i32> = [1, 2, 3].into_iter().collect();
        let etiquetados: HashSet<i32> = [2].into_iter().collect();

        let plano = planejar_etiquetas(vec![1, 2, 3, 99], &cadastrados, &etiquetados);

        assert_eq!(plano.aceitos, vec![1, 3]);
        assert_eq!(plano.erros.len(), 2);
        assert_eq!(plano.erros[0].item, "2");
        assert_eq!(plano.erros[0].motivo, MOTIVO_JA_EXISTE);
        assert_eq!(plano.erros[1].item, "99");
        assert_eq!(plano.erros[1].motivo, MOTIVO_PRODUTO_INEXISTENTE);
    }
}

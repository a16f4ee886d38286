// src/services/comissao_service.rs

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::ensure_affected, error::AppError},
    db::ComissaoRepository,
    models::comissao::{
        validar_percentuais, ComissaoVendedor, FaixaComissao, FaixaComissaoDetalhe,
        FiltroComissoesVendedores, PercentualComissao, SalvarComissaoVendedorPayload,
        SalvarFaixaPayload,
    },
};

/// Junta cada esquema com os seus percentuais.
pub fn agrupar_percentuais(
    faixas: Vec<FaixaComissao>,
    percentuais: Vec<PercentualComissao>,
) -> Vec<FaixaComissaoDetalhe> {
    let mut por_faixa: HashMap<Uuid, Vec<PercentualComissao>> = HashMap::new();
    for p in percentuais {
        por_faixa.entry(p.faixa_id).or_default().push(p);
    }

    faixas
        .into_iter()
        .map(|faixa| {
            let mut percentuais = por_faixa.remove(&faixa.id).unwrap_or_default();
            percentuais.sort_by(|a, b| a.atingimento_min.cmp(&b.atingimento_min));
            FaixaComissaoDetalhe { faixa, percentuais }
        })
        .collect()
}

#[derive(Clone)]
pub struct ComissaoService {
    repo: ComissaoRepository,
    pool: PgPool,
}

impl ComissaoService {
    pub fn new(repo: ComissaoRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // --- ESQUEMAS ---

    pub async fn list_faixas(&self) -> Result<Vec<FaixaComissaoDetalhe>, AppError> {
        let faixas = self.repo.list_faixas().await?;
        let ids: Vec<Uuid> = faixas.iter().map(|f| f.id).collect();
        let percentuais = self.repo.list_percentuais(&ids).await?;
        Ok(agrupar_percentuais(faixas, percentuais))
    }

    pub async fn get_faixa(&self, id: Uuid) -> Result<FaixaComissaoDetalhe, AppError> {
        let faixa = self
            .repo
            .find_faixa(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Esquema de comissão".into()))?;
        let percentuais = self.repo.list_percentuais(&[id]).await?;
        Ok(FaixaComissaoDetalhe { faixa, percentuais })
    }

    pub async fn create_faixa(&self, payload: &SalvarFaixaPayload) -> Result<FaixaComissaoDetalhe, AppError> {
        validar_percentuais(&payload.percentuais).map_err(AppError::BadRequest)?;

        let mut tx = self.pool.begin().await?;
        let faixa = self
            .repo
            .insert_faixa(&mut *tx, &payload.descricao, payload.ativa)
            .await?;
        let percentuais = self
            .repo
            .insert_percentuais(&mut *tx, faixa.id, &payload.percentuais)
            .await?;
        tx.commit().await?;

        tracing::info!("💰 Esquema de comissão '{}' criado", faixa.descricao);
        Ok(FaixaComissaoDetalhe { faixa, percentuais })
    }

    /// Atualiza o esquema e substitui todos os percentuais.
    pub async fn update_faixa(
        &self,
        id: Uuid,
        payload: &SalvarFaixaPayload,
    ) -> Result<FaixaComissaoDetalhe, AppError> {
        validar_percentuais(&payload.percentuais).map_err(AppError::BadRequest)?;

        let mut tx = self.pool.begin().await?;
        let faixa = self
            .repo
            .update_faixa(&mut *tx, id, &payload.descricao, payload.ativa)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Esquema de comissão".into()))?;

        self.repo.delete_percentuais(&mut *tx, id).await?;
        let percentuais = self
            .repo
            .insert_percentuais(&mut *tx, id, &payload.percentuais)
            .await?;
        tx.commit().await?;

        Ok(FaixaComissaoDetalhe { faixa, percentuais })
    }

    pub async fn delete_faixa(&self, id: Uuid) -> Result<(), AppError> {
        ensure_affected(self.repo.delete_faixa(id).await?, "Esquema de comissão")
    }

    // --- VENDEDORES ---

    pub async fn list_comissoes_vendedores(
        &self,
        filtro: &FiltroComissoesVendedores,
    ) -> Result<Vec<ComissaoVendedor>, AppError> {
        self.repo.list_comissoes_vendedores(filtro).await
    }

    pub async fn save_comissao_vendedor(
        &self,
        payload: &SalvarComissaoVendedorPayload,
    ) -> Result<ComissaoVendedor, AppError> {
        let item = self.repo.upsert_comissao_vendedor(payload).await?;
        tracing::info!(
            "💰 Vendedor {} vinculado ao esquema {} em {}",
            item.codusur,
            item.faixa_id,
            item.competencia
        );
        Ok(item)
    }

    pub async fn delete_comissao_vendedor(&self, id: Uuid) -> Result<(), AppError> {
        ensure_affected(
            self.repo.delete_comissao_vendedor(id).await?,
            "Comissão do vendedor",
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;

    fn faixa(descricao: &str) -> FaixaComissao {
        FaixaComissao {
            id: Uuid::new_v4(),
            descricao: descricao.into(),
            ativa: true,
            criado_em: Utc::now(),
        }
    }

    fn percentual(faixa_id: Uuid, min: i64) -> PercentualComissao {
        PercentualComissao {
            id: Uuid::new_v4(),
            faixa_id,
            atingimento_min: Decimal::from(min),
            atingimento_max: None,
            percentual: Decimal::ONE,
        }
    }

    #[test]
    fn groups_percentages_by_scheme_sorted_by_minimum() {
        let a = faixa("A");
        let b = faixa("B");
        let sem = faixa("Sem faixas");
        let percentuais = vec![percentual(a.id, 100), percentual(b.id, 0), percentual(a.id, 0)];
        let (id_a, id_b) = (a.id, b.id);

        let detalhes = agrupar_percentuais(vec![a, b, sem], percentuais);

        assert_eq!(detalhes.len(), 3);
        assert_eq!(detalhes[0].faixa.id, id_a);
        let mins: Vec<Decimal> = detalhes[0].percentuais.iter().map(|p| p.atingimento_min).collect();
        assert_eq!(mins, vec![Decimal::ZERO, Decimal::from(100)]);
        assert_eq!(detalhes[1].faixa.id, id_b);
        assert_eq!(detalhes[1].percentuais.len(), 1);
        assert!(detalhes[2].percentuais.is_empty());
    }
}

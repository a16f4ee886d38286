// src/services/promocao_service.rs

use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::ensure_affected,
        error::AppError,
        import::{classificar, ImportErro, ImportPlan, ImportReport, MOTIVO_JA_EXISTE},
        valor::checar_valor,
    },
    db::{ProdutoRepository, PromocaoRepository},
    models::{
        auth::Identidade,
        promocao::{
            periodo_valido, CreatePromocaoPayload, FiltroPromocoes, ImportarPromocoesPayload,
            ItemImportacaoPromocao, Promocao, UpdatePromocaoPayload,
        },
    },
    services::produto_service::MOTIVO_PRODUTO_INEXISTENTE,
};

const MSG_PERIODO: &str = "A data final deve ser igual ou posterior à data inicial.";

/// Valida os itens da planilha contra o cadastro e as promoções já lançadas.
pub fn planejar_promocoes(
    itens: Vec<ItemImportacaoPromocao>,
    cadastrados: &HashSet<i32>,
    com_promocao: &HashSet<i32>,
) -> ImportPlan<ItemImportacaoPromocao> {
    classificar(itens, |i| i.codprod, |i| {
        checar_valor(i.preco_promocional, "preço promocional")?;
        if !periodo_valido(i.data_inicio, i.data_fim) {
            Err("data final anterior à data inicial.".to_string())
        } else if !cadastrados.contains(&i.codprod) {
            Err(MOTIVO_PRODUTO_INEXISTENTE.to_string())
        } else if com_promocao.contains(&i.codprod) {
            Err(MOTIVO_JA_EXISTE.to_string())
        } else {
            Ok(())
        }
    })
}

#[derive(Clone)]
pub struct PromocaoService {
    repo: PromocaoRepository,
    produto_repo: ProdutoRepository,
    pool: PgPool,
}

impl PromocaoService {
    pub fn new(repo: PromocaoRepository, produto_repo: ProdutoRepository, pool: PgPool) -> Self {
        Self {
            repo,
            produto_repo,
            pool,
        }
    }

    pub async fn list(&self, filtro: &FiltroPromocoes) -> Result<Vec<Promocao>, AppError> {
        self.repo.list(filtro).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Promocao, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Promoção".into()))
    }

    pub async fn create(
        &self,
        identidade: &Identidade,
        payload: &CreatePromocaoPayload,
    ) -> Result<Promocao, AppError> {
        if !periodo_valido(payload.data_inicio, payload.data_fim) {
            return Err(AppError::BadRequest(MSG_PERIODO.into()));
        }

        let cadastrados = self
            .produto_repo
            .existing_codes(&self.pool, &[payload.codprod])
            .await?;
        if !cadastrados.contains(&payload.codprod) {
            return Err(AppError::ResourceNotFound(format!("Produto {}", payload.codprod)));
        }

        let promocao = self.repo.insert(payload, &identidade.usuario).await?;
        tracing::info!(
            "🏷️ Promoção do produto {} ({}) criada por {}",
            promocao.codprod,
            promocao.competencia,
            identidade.usuario
        );
        Ok(promocao)
    }

    pub async fn update(&self, id: Uuid, patch: &UpdatePromocaoPayload) -> Result<Promocao, AppError> {
        if patch.is_empty() {
            return Err(AppError::NoFieldsToUpdate);
        }
        if let (Some(inicio), Some(fim)) = (patch.data_inicio, patch.data_fim) {
            if !periodo_valido(inicio, fim) {
                return Err(AppError::BadRequest(MSG_PERIODO.into()));
            }
        }

        self.repo
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Promoção".into()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        ensure_affected(self.repo.delete(id).await?, "Promoção")
    }

    pub async fn importar(
        &self,
        identidade: &Identidade,
        payload: ImportarPromocoesPayload,
    ) -> Result<ImportReport<Promocao>, AppError> {
        let codigos: Vec<i32> = payload.itens.iter().map(|i| i.codprod).collect();
        let mut tx = self.pool.begin().await?;

        let cadastrados = self.produto_repo.existing_codes(&mut *tx, &codigos).await?;
        let com_promocao = self
            .repo
            .codes_with_promotion(&mut *tx, &payload.competencia, &codigos)
            .await?;

        let mut plano = planejar_promocoes(payload.itens, &cadastrados, &com_promocao);
        let aceitos = std::mem::take(&mut plano.aceitos);

        let mut inseridas = Vec::with_capacity(aceitos.len());
        for item in aceitos {
            match self
                .repo
                .insert_if_absent(&mut *tx, &payload.competencia, &item, &identidade.usuario)
                .await?
            {
                Some(p) => inseridas.push(p),
                None => plano.erros.push(ImportErro {
                    item: item.codprod.to_string(),
                    motivo: MOTIVO_JA_EXISTE.to_string(),
                }),
            }
        }

        tx.commit().await?;
        tracing::info!(
            "📦 Importação de promoções {}: {} inseridas, {} rejeitadas",
            payload.competencia,
            inseridas.len(),
            plano.erros.len()
        );

        Ok(plano.into_report(inseridas))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn item(codprod: i32, preco: &str, inicio: u32, fim: u32) -> ItemImportacaoPromocao {
        ItemImportacaoPromocao {
            codprod,
            preco_promocional: preco.parse().unwrap(),
            data_inicio: NaiveDate::from_ymd_opt(2026, 10, inicio).unwrap(),
            data_fim: NaiveDate::from_ymd_opt(2026, 10, fim).unwrap(),
        }
    }

    #[test]
    fn classifies_each_item_with_its_own_reason() {
        let cadastrados: HashSet<i32> = [1, 2, 3, 4].into_iter().collect();
        let com_promocao: HashSet<i32> = [4].into_iter().collect();

        let plano = planejar_promocoes(
            vec![
                item(1, "9.90", 1, 31),
                item(2, "0", 1, 31),
                item(3, "5.00", 20, 10),
                item(4, "5.00", 1, 31),
                item(77, "5.00", 1, 31),
            ],
            &cadastrados,
            &com_promocao,
        );

        assert_eq!(plano.aceitos.len(), 1);
        assert_eq!(plano.aceitos[0].codprod, 1);

        let motivos: Vec<(&str, &str)> = plano
            .erros
            .iter()
            .map(|e| (e.item.as_str(), e.motivo.as_str()))
            .collect();
        assert_eq!(
            motivos,
            vec![
                ("2", "preço promocional deve ser maior que zero."),
                ("3", "data final anterior à data inicial."),
                ("4", MOTIVO_JA_EXISTE),
                ("77", MOTIVO_PRODUTO_INEXISTENTE),
            ]
        );
    }

    #[test]
    fn price_beyond_column_precision_is_rejected_per_item() {
        let cadastrados: HashSet<i32> = [1, 2].into_iter().collect();
        let plano = planejar_promocoes(
            vec![item(1, "9.90", 1, 31), item(2, "1000000000000", 1, 31)],
            &cadastrados,
            &HashSet::new(),
        );

        assert_eq!(plano.aceitos.len(), 1);
        assert_eq!(plano.erros[0].item, "2");
        assert!(plano.erros[0].motivo.starts_with("preço promocional excede"));
    }

    #[test]
    fn single_day_promotion_is_valid() {
        let cadastrados: HashSet<i32> = [1].into_iter().collect();
        let plano = planejar_promocoes(vec![item(1, "1.00", 15, 15)], &cadastrados, &HashSet::new());
        assert!(plano.erros.is_empty());
    }
}

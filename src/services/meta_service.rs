// src/services/meta_service.rs

use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::ensure_affected,
        error::AppError,
        import::{classificar, ImportErro, ImportPlan, ImportReport, MOTIVO_JA_EXISTE},
        valor::checar_valor,
    },
    db::{ComissaoRepository, MetaRepository},
    models::{
        auth::Identidade,
        comissao::PercentualComissao,
        meta::{
            calcular_comissao, AcompanhamentoMeta, CreateMetaPayload, FiltroMetas,
            ImportarMetasPayload, ItemImportacaoMeta, MetaRealizado, MetaVendedor,
            UpdateMetaPayload,
        },
    },
};

pub const MOTIVO_VENDEDOR_INEXISTENTE: &str = "vendedor não encontrado ou inativo.";

pub fn planejar_metas(
    itens: Vec<ItemImportacaoMeta>,
    vendedores: &HashSet<i32>,
    com_meta: &HashSet<i32>,
) -> ImportPlan<ItemImportacaoMeta> {
    classificar(itens, |i| i.codusur, |i| {
        checar_valor(i.valor_meta, "valor da meta")?;
        if !vendedores.contains(&i.codusur) {
            Err(MOTIVO_VENDEDOR_INEXISTENTE.to_string())
        } else if com_meta.contains(&i.codusur) {
            Err(MOTIVO_JA_EXISTE.to_string())
        } else {
            Ok(())
        }
    })
}

/// Aplica a tabela de percentuais do esquema de cada vendedor ao realizado.
pub fn montar_acompanhamento(
    competencia: &str,
    linhas: Vec<MetaRealizado>,
    percentuais: &HashMap<Uuid, Vec<PercentualComissao>>,
) -> Vec<AcompanhamentoMeta> {
    linhas
        .into_iter()
        .map(|linha| {
            let faixas = linha
                .faixa_id
                .and_then(|id| percentuais.get(&id))
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let calculo = calcular_comissao(linha.valor_meta, linha.realizado, faixas);

            AcompanhamentoMeta {
                codusur: linha.codusur,
                nome_vendedor: linha.nome_vendedor,
                competencia: competencia.to_string(),
                valor_meta: linha.valor_meta,
                realizado: linha.realizado,
                atingimento: calculo.atingimento,
                percentual_comissao: calculo.percentual,
                valor_comissao: calculo.comissao,
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct MetaService {
    repo: MetaRepository,
    comissao_repo: ComissaoRepository,
    pool: PgPool,
}

impl MetaService {
    pub fn new(repo: MetaRepository, comissao_repo: ComissaoRepository, pool: PgPool) -> Self {
        Self {
            repo,
            comissao_repo,
            pool,
        }
    }

    pub async fn list(&self, filtro: &FiltroMetas) -> Result<Vec<MetaVendedor>, AppError> {
        self.repo.list(filtro).await
    }

    pub async fn get(&self, id: Uuid) -> Result<MetaVendedor, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Meta".into()))
    }

    pub async fn create(
        &self,
        identidade: &Identidade,
        payload: &CreateMetaPayload,
    ) -> Result<MetaVendedor, AppError> {
        let id = self
            .repo
            .insert(&self.pool, payload, &identidade.usuario, false)
            .await?
            .ok_or_else(|| {
                AppError::UniqueConstraintViolation(
                    "Já existe meta para este vendedor na competência.".into(),
                )
            })?;

        tracing::info!(
            "🎯 Meta do vendedor {} ({}) criada por {}",
            payload.codusur,
            payload.competencia,
            identidade.usuario
        );
        self.get(id).await
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateMetaPayload) -> Result<MetaVendedor, AppError> {
        ensure_affected(self.repo.update_valor(id, payload.valor_meta).await?, "Meta")?;
        self.get(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        ensure_affected(self.repo.delete(id).await?, "Meta")
    }

    pub async fn importar(
        &self,
        identidade: &Identidade,
        payload: ImportarMetasPayload,
    ) -> Result<ImportReport<MetaVendedor>, AppError> {
        let codigos: Vec<i32> = payload.itens.iter().map(|i| i.codusur).collect();
        let mut tx = self.pool.begin().await?;

        let vendedores = self.repo.existing_sellers(&mut *tx, &codigos).await?;
        let com_meta = self
            .repo
            .sellers_with_goal(&mut *tx, &payload.competencia, &codigos)
            .await?;

        let mut plano = planejar_metas(payload.itens, &vendedores, &com_meta);
        let aceitos = std::mem::take(&mut plano.aceitos);

        let mut ids = Vec::with_capacity(aceitos.len());
        for item in aceitos {
            let meta = CreateMetaPayload {
                codusur: item.codusur,
                competencia: payload.competencia.clone(),
                valor_meta: item.valor_meta,
            };
            match self
                .repo
                .insert(&mut *tx, &meta, &identidade.usuario, true)
                .await?
            {
                Some(id) => ids.push(id),
                None => plano.erros.push(ImportErro {
                    item: item.codusur.to_string(),
                    motivo: MOTIVO_JA_EXISTE.to_string(),
                }),
            }
        }

        let inseridas = self.repo.find_many(&mut *tx, &ids).await?;
        tx.commit().await?;

        tracing::info!(
            "📦 Importação de metas {}: {} inseridas, {} rejeitadas",
            payload.competencia,
            inseridas.len(),
            plano.erros.len()
        );

        Ok(plano.into_report(inseridas))
    }

    pub async fn acompanhamento(&self, competencia: &str) -> Result<Vec<AcompanhamentoMeta>, AppError> {
        let linhas = self.repo.metas_com_realizado(competencia).await?;

        let faixa_ids: Vec<Uuid> = linhas
            .iter()
            .filter_map(|l| l.faixa_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let mut percentuais: HashMap<Uuid, Vec<PercentualComissao>> = HashMap::new();
        if !faixa_ids.is_empty() {
            for p in self.comissao_repo.list_percentuais(&faixa_ids).await? {
                percentuais.entry(p.faixa_id).or_default().push(p);
            }
        }

        Ok(montar_acompanhamento(competencia, linhas, &percentuais))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn item(codusur: i32, valor: i64) -> ItemImportacaoMeta {
        ItemImportacaoMeta {
            codusur,
            valor_meta: Decimal::from(valor),
        }
    }

    #[test]
    fn import_plan_rejects_unknown_sellers_and_existing_goals() {
        let vendedores: HashSet<i32> = [10, 20, 30].into_iter().collect();
        let com_meta: HashSet<i32> = [20].into_iter().collect();

        let plano = planejar_metas(
            vec![item(10, 1000), item(20, 1000), item(30, 0), item(40, 500), item(10, 9)],
            &vendedores,
            &com_meta,
        );

        assert_eq!(plano.aceitos.len(), 1);
        assert_eq!(plano.aceitos[0].codusur, 10);
        let rejeitados: Vec<&str> = plano.erros.iter().map(|e| e.item.as_str()).collect();
        assert_eq!(rejeitados, vec!["20", "30", "40", "10"]);
        assert_eq!(plano.erros[2].motivo, MOTIVO_VENDEDOR_INEXISTENTE);
    }

    #[test]
    fn goal_beyond_column_precision_is_rejected_per_item() {
        let vendedores: HashSet<i32> = [10, 20].into_iter().collect();

        let plano = planejar_metas(
            vec![item(10, 1000), item(20, 1_000_000_000_000_000)],
            &vendedores,
            &HashSet::new(),
        );

        assert_eq!(plano.aceitos.len(), 1);
        assert_eq!(plano.aceitos[0].codusur, 10);
        assert_eq!(plano.erros.len(), 1);
        assert_eq!(plano.erros[0].item, "20");
        assert!(plano.erros[0].motivo.starts_with("valor da meta excede"));
    }

    #[test]
    fn tracking_uses_each_sellers_scheme() {
        let faixa = Uuid::new_v4();
        let mut percentuais = HashMap::new();
        percentuais.insert(
            faixa,
            vec![PercentualComissao {
                id: Uuid::new_v4(),
                faixa_id: faixa,
                atingimento_min: Decimal::ZERO,
                atingimento_max: None,
                percentual: Decimal::from(2),
            }],
        );

        let linhas = vec![
            MetaRealizado {
                codusur: 1,
                nome_vendedor: Some("ANA".into()),
                valor_meta: Decimal::from(1000),
                realizado: Decimal::from(500),
                faixa_id: Some(faixa),
            },
            MetaRealizado {
                codusur: 2,
                nome_vendedor: None,
                valor_meta: Decimal::from(1000),
                realizado: Decimal::from(2000),
                faixa_id: None,
            },
        ];

        let resultado = montar_acompanhamento("2026-10", linhas, &percentuais);

        assert_eq!(resultado[0].atingimento, Decimal::from(50));
        assert_eq!(resultado[0].valor_comissao, Decimal::from(10));
        assert_eq!(resultado[0].competencia, "2026-10");
        assert_eq!(resultado[1].atingimento, Decimal::from(200));
        assert_eq!(resultado[1].valor_comissao, Decimal::ZERO);
    }
}

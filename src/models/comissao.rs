// src/models/comissao.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::competencia::validar_competencia;

/// Esquema de comissão (faixas de atingimento de meta → percentual).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct FaixaComissao {
    pub id: Uuid,
    #[schema(example = "Padrão varejo")]
    pub descricao: String,
    pub ativa: bool,
    pub criado_em: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct PercentualComissao {
    pub id: Uuid,
    pub faixa_id: Uuid,
    #[schema(example = "80.00")]
    pub atingimento_min: Decimal,
    /// `None` = faixa aberta (sem teto)
    #[schema(example = "100.00")]
    pub atingimento_max: Option<Decimal>,
    #[schema(example = "1.50")]
    pub percentual: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FaixaComissaoDetalhe {
    #[serde(flatten)]
    pub faixa: FaixaComissao,
    pub percentuais: Vec<PercentualComissao>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PercentualPayload {
    pub atingimento_min: Decimal,
    pub atingimento_max: Option<Decimal>,
    pub percentual: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SalvarFaixaPayload {
    #[validate(length(min = 1, max = 120, message = "A descrição é obrigatória."))]
    pub descricao: String,
    #[serde(default = "default_true")]
    pub ativa: bool,
    #[validate(length(min = 1, message = "Informe ao menos um percentual."))]
    pub percentuais: Vec<PercentualPayload>,
}

/// Vínculo vendedor → esquema de comissão numa competência.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ComissaoVendedor {
    pub id: Uuid,
    pub codusur: i32,
    pub nome_vendedor: Option<String>,
    pub faixa_id: Uuid,
    pub faixa_descricao: Option<String>,
    #[schema(example = "2026-10")]
    pub competencia: String,
    pub criado_em: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SalvarComissaoVendedorPayload {
    #[validate(range(min = 1, message = "Código de vendedor inválido."))]
    pub codusur: i32,
    pub faixa_id: Uuid,
    #[validate(custom(function = "validar_competencia"))]
    pub competencia: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FiltroComissoesVendedores {
    pub competencia: Option<String>,
    pub codusur: Option<i32>,
}

/// Valida as faixas de percentual: limites coerentes, percentuais entre 0 e 100,
/// sem sobreposição e apenas a última faixa aberta.
pub fn validar_percentuais(itens: &[PercentualPayload]) -> Result<(), String> {
    let cem = Decimal::from(100);
    let mut ordenados: Vec<&PercentualPayload> = itens.iter().collect();
    ordenados.sort_by(|a, b| a.atingimento_min.cmp(&b.atingimento_min));

    for (i, p) in ordenados.iter().enumerate() {
        if p.percentual < Decimal::ZERO || p.percentual > cem {
            return Err(format!(
                "Percentual {} fora do intervalo 0 a 100.",
                p.percentual
            ));
        }
        if p.atingimento_min < Decimal::ZERO {
            return Err("O atingimento mínimo não pode ser negativo.".into());
        }
        match (p.atingimento_max, ordenados.get(i + 1)) {
            (Some(max), _) if max <= p.atingimento_min => {
                return Err(format!(
                    "Faixa {}–{} inválida: o máximo deve ser maior que o mínimo.",
                    p.atingimento_min, max
                ));
            }
            (Some(max), Some(prox)) if prox.atingimento_min < max => {
                return Err(format!(
                    "As faixas iniciando em {} e {} se sobrepõem.",
                    p.atingimento_min, prox.atingimento_min
                ));
            }
            (None, Some(_)) => {
                return Err("Apenas a última faixa pode ficar sem atingimento máximo.".into());
            }
            _ => {}
        }
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(min: i64, max: Option<i64>, pct: i64) -> PercentualPayload {
        PercentualPayload {
            atingimento_min: Decimal::from(min),
            atingimento_max: max.map(Decimal::from),
            percentual: Decimal::from(pct),
        }
    }

    #[test]
    fn accepts_contiguous_ranges_in_any_order() {
        let itens = vec![p(100, None, 3), p(0, Some(80), 0), p(80, Some(100), 1)];
        assert!(validar_percentuais(&itens).is_ok());
    }

    #[test]
    fn rejects_overlap() {
        let itens = vec![p(0, Some(90), 1), p(80, None, 2)];
        assert!(validar_percentuais(&itens).unwrap_err().contains("sobrepõem"));
    }

    #[test]
    fn rejects_open_range_in_the_middle() {
        let itens = vec![p(0, None, 1), p(80, Some(100), 2)];
        assert!(validar_percentuais(&itens).is_err());
    }

    #[test]
    fn rejects_out_of_bounds_percentage() {
        assert!(validar_percentuais(&[p(0, None, 101)]).is_err());
        assert!(validar_percentuais(&[p(50, Some(50), 1)]).is_err());
    }
}

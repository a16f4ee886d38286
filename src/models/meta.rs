// src/models/meta.rs

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{
        competencia::validar_competencia,
        valor::{checar_valor, erro_de_faixa},
    },
    models::comissao::PercentualComissao,
};

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct MetaVendedor {
    pub id: Uuid,
    pub codusur: i32,
    pub nome_vendedor: Option<String>,
    #[schema(example = "2026-10")]
    pub competencia: String,
    #[schema(example = "150000.00")]
    pub valor_meta: Decimal,
    pub usuario: String,
    pub criado_em: DateTime<Utc>,
}

fn validate_meta(val: &Decimal) -> Result<(), ValidationError> {
    checar_valor(*val, "O valor da meta").map_err(erro_de_faixa)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMetaPayload {
    #[validate(range(min = 1, message = "Código de vendedor inválido."))]
    pub codusur: i32,
    #[validate(custom(function = "validar_competencia"))]
    pub competencia: String,
    #[validate(custom(function = "validate_meta"))]
    pub valor_meta: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMetaPayload {
    #[validate(custom(function = "validate_meta"))]
    pub valor_meta: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemImportacaoMeta {
    pub codusur: i32,
    pub valor_meta: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ImportarMetasPayload {
    #[validate(custom(function = "validar_competencia"))]
    pub competencia: String,
    #[validate(length(min = 1, message = "Informe ao menos um item."))]
    pub itens: Vec<ItemImportacaoMeta>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FiltroMetas {
    pub competencia: Option<String>,
    pub codusur: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct FiltroAcompanhamento {
    pub competencia: String,
}

// Linha bruta: meta + realizado + esquema vinculado (se houver)
#[derive(Debug, Clone, FromRow)]
pub struct MetaRealizado {
    pub codusur: i32,
    pub nome_vendedor: Option<String>,
    pub valor_meta: Decimal,
    pub realizado: Decimal,
    pub faixa_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AcompanhamentoMeta {
    pub codusur: i32,
    pub nome_vendedor: Option<String>,
    pub competencia: String,
    pub valor_meta: Decimal,
    pub realizado: Decimal,
    /// Percentual da meta atingido (0–100+)
    pub atingimento: Decimal,
    pub percentual_comissao: Decimal,
    pub valor_comissao: Decimal,
}

/// Resultado do cálculo de comissão para uma meta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculoComissao {
    pub atingimento: Decimal,
    pub percentual: Decimal,
    pub comissao: Decimal,
}

/// Atingimento = realizado / meta × 100. O percentual é o da faixa cujo
/// intervalo `[min, max)` contém o atingimento; sem faixa, comissão zero.
pub fn calcular_comissao(
    valor_meta: Decimal,
    realizado: Decimal,
    faixas: &[PercentualComissao],
) -> CalculoComissao {
    let cem = Decimal::from(100);
    let atingimento = if valor_meta > Decimal::ZERO {
        (realizado / valor_meta * cem).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    } else {
        Decimal::ZERO
    };

    let percentual = faixas
        .iter()
        .find(|f| {
            atingimento >= f.atingimento_min
                && f.atingimento_max.is_none_or(|max| atingimento < max)
        })
        .map(|f| f.percentual)
        .unwrap_or(Decimal::ZERO);

    let comissao = (realizado * percentual / cem)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    CalculoComissao {
        atingimento,
        percentual,
        comissao,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_payload_needs_at_least_one_item() {
        let vazio = ImportarMetasPayload {
            competencia: "2026-10".into(),
            itens: vec![],
        };
        assert!(vazio.validate().unwrap_err().field_errors().contains_key("itens"));

        let um = ImportarMetasPayload {
            competencia: "2026-10".into(),
            itens: vec![ItemImportacaoMeta { codusur: 10, valor_meta: Decimal::from(1000) }],
        };
        assert!(um.validate().is_ok());
    }

    #[test]
    fn goal_payload_rejects_values_the_column_cannot_hold() {
        let ok = UpdateMetaPayload { valor_meta: Decimal::from(150_000) };
        assert!(ok.validate().is_ok());

        let grande = UpdateMetaPayload { valor_meta: Decimal::from(1_000_000_000_000i64) };
        let errors = grande.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("valor_meta"));
    }

    fn faixa(min: i64, max: Option<i64>, pct: &str) -> PercentualComissao {
        PercentualComissao {
            id: Uuid::new_v4(),
            faixa_id: Uuid::nil(),
            atingimento_min: Decimal::from(min),
            atingimento_max: max.map(Decimal::from),
            percentual: pct.parse().unwrap(),
        }
    }

    fn tabela() -> Vec<PercentualComissao> {
        vec![
            faixa(0, Some(80), "0"),
            faixa(80, Some(100), "1.5"),
            faixa(100, None, "2.5"),
        ]
    }

    #[test]
    fn picks_range_by_attainment() {
        let c = calcular_comissao(Decimal::from(10_000), Decimal::from(9_000), &tabela());
        assert_eq!(c.atingimento, Decimal::from(90));
        assert_eq!(c.percentual, "1.5".parse().unwrap());
        assert_eq!(c.comissao, Decimal::from(135));
    }

    #[test]
    fn upper_bound_is_exclusive() {
        let c = calcular_comissao(Decimal::from(10_000), Decimal::from(10_000), &tabela());
        assert_eq!(c.atingimento, Decimal::from(100));
        assert_eq!(c.percentual, "2.5".parse().unwrap());
        assert_eq!(c.comissao, Decimal::from(250));
    }

    #[test]
    fn no_scheme_or_zero_goal_means_no_commission() {
        let c = calcular_comissao(Decimal::from(10_000), Decimal::from(12_000), &[]);
        assert_eq!(c.atingimento, Decimal::from(120));
        assert_eq!(c.comissao, Decimal::ZERO);

        let c = calcular_comissao(Decimal::ZERO, Decimal::from(500), &tabela());
        assert_eq!(c.atingimento, Decimal::ZERO);
        assert_eq!(c.percentual, Decimal::ZERO);
    }
}

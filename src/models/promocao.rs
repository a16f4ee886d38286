// src/models/promocao.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::{
    competencia::validar_competencia,
    valor::{checar_valor, erro_de_faixa},
};

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Promocao {
    pub id: Uuid,
    pub codprod: i32,
    pub descricao: Option<String>,
    #[schema(example = "2026-10")]
    pub competencia: String,
    #[schema(example = "9.90")]
    pub preco_promocional: Decimal,
    pub data_inicio: NaiveDate,
    pub data_fim: NaiveDate,
    pub ativa: bool,
    pub usuario: String,
    pub criado_em: DateTime<Utc>,
}

fn validate_price(val: &Decimal) -> Result<(), ValidationError> {
    checar_valor(*val, "O preço promocional").map_err(erro_de_faixa)
}

/// Verifica a consistência do período da promoção.
pub fn periodo_valido(inicio: NaiveDate, fim: NaiveDate) -> bool {
    fim >= inicio
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePromocaoPayload {
    #[validate(range(min = 1, message = "Código de produto inválido."))]
    pub codprod: i32,
    #[validate(custom(function = "validar_competencia"))]
    pub competencia: String,
    #[validate(custom(function = "validate_price"))]
    pub preco_promocional: Decimal,
    pub data_inicio: NaiveDate,
    pub data_fim: NaiveDate,
    #[serde(default = "default_true")]
    pub ativa: bool,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePromocaoPayload {
    #[validate(custom(function = "validate_price"))]
    pub preco_promocional: Option<Decimal>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
    pub ativa: Option<bool>,
}

impl UpdatePromocaoPayload {
    pub fn is_empty(&self) -> bool {
        self.preco_promocional.is_none()
            && self.data_inicio.is_none()
            && self.data_fim.is_none()
            && self.ativa.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemImportacaoPromocao {
    pub codprod: i32,
    pub preco_promocional: Decimal,
    pub data_inicio: NaiveDate,
    pub data_fim: NaiveDate,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ImportarPromocoesPayload {
    #[validate(custom(function = "validar_competencia"))]
    pub competencia: String,
    #[validate(length(min = 1, message = "Informe ao menos um item."))]
    pub itens: Vec<ItemImportacaoPromocao>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FiltroPromocoes {
    pub competencia: Option<String>,
    pub ativa: Option<bool>,
    pub codprod: Option<i32>,
}

fn default_true() -> bool {
    true
}

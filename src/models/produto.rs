// src/models/produto.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::competencia::validar_competencia;

// Cadastro de produtos do ERP (somente leitura)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ProdutoCatalogo {
    #[schema(example = 12345)]
    pub codprod: i32,
    #[schema(example = "ARROZ TIPO 1 5KG")]
    pub descricao: String,
    pub embalagem: Option<String>,
    pub ativo: bool,
}

/// Bandeira/etiqueta de cor aplicada ao produto numa competência.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum Bandeira {
    Verde,
    Vermelha,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct EtiquetaProduto {
    pub id: Uuid,
    pub codprod: i32,
    /// Vem do cadastro de produtos (LEFT JOIN)
    pub descricao: Option<String>,
    #[schema(example = "2026-10")]
    pub competencia: String,
    pub bandeira: Bandeira,
    pub observacao: Option<String>,
    pub usuario: String,
    pub criado_em: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEtiquetaPayload {
    #[validate(range(min = 1, message = "Código de produto inválido."))]
    pub codprod: i32,
    #[validate(custom(function = "validar_competencia"))]
    pub competencia: String,
    pub bandeira: Bandeira,
    pub observacao: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEtiquetaPayload {
    pub bandeira: Option<Bandeira>,
    pub observacao: Option<String>,
}

impl UpdateEtiquetaPayload {
    pub fn is_empty(&self) -> bool {
        self.bandeira.is_none() && self.observacao.is_none()
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ImportarEtiquetasPayload {
    #[validate(custom(function = "validar_competencia"))]
    pub competencia: String,
    pub bandeira: Bandeira,
    #[validate(length(min = 1, message = "Informe ao menos um código de produto."))]
    pub codigos: Vec<i32>,
    pub observacao: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FiltroEtiquetas {
    pub competencia: Option<String>,
    pub bandeira: Option<Bandeira>,
    pub busca: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BuscaCatalogo {
    pub busca: Option<String>,
}

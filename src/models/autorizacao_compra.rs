// src/models/autorizacao_compra.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::{
    error::AppError,
    valor::{checar_valor, erro_de_faixa},
};

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AutorizacaoCompra {
    pub id: Uuid,
    #[schema(example = "01")]
    pub loja: String,
    #[schema(example = "A")]
    pub setor: String,
    #[schema(example = "Distribuidora X")]
    pub fornecedor: String,
    #[schema(example = "100.00")]
    pub valor: Decimal,
    pub observacao: Option<String>,
    /// Solicitante
    #[schema(example = "JOAO")]
    pub usuario: String,
    pub data_criacao: NaiveDate,
    #[schema(value_type = String, example = "14:30:00")]
    pub hora_criacao: NaiveTime,
    pub autorizado_controladoria: bool,
    pub data_autorizacao_controladoria: Option<DateTime<Utc>>,
    pub usuario_controladoria: Option<String>,
    pub autorizado_diretoria: bool,
    pub data_autorizacao_diretoria: Option<DateTime<Utc>>,
    pub usuario_diretoria: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SituacaoAutorizacao {
    Pendente,
    AprovadaControladoria,
    Liberada,
}

impl AutorizacaoCompra {
    pub fn liberada(&self) -> bool {
        self.autorizado_controladoria && self.autorizado_diretoria
    }

    pub fn situacao(&self) -> SituacaoAutorizacao {
        match (self.autorizado_controladoria, self.autorizado_diretoria) {
            (true, true) => SituacaoAutorizacao::Liberada,
            (true, false) => SituacaoAutorizacao::AprovadaControladoria,
            _ => SituacaoAutorizacao::Pendente,
        }
    }

    // Sem pré-condição sobre a diretoria: reaprovar só renova carimbo e aprovador.
    pub fn aprovar_controladoria(&mut self, aprovador: &str, quando: DateTime<Utc>) {
        self.autorizado_controladoria = true;
        self.data_autorizacao_controladoria = Some(quando);
        self.usuario_controladoria = Some(aprovador.to_string());
    }

    pub fn aprovar_diretoria(&mut self, aprovador: &str, quando: DateTime<Utc>) -> Result<(), AppError> {
        if !self.autorizado_controladoria {
            return Err(AppError::ControladoriaRequired);
        }
        self.autorizado_diretoria = true;
        self.data_autorizacao_diretoria = Some(quando);
        self.usuario_diretoria = Some(aprovador.to_string());
        Ok(())
    }

    pub fn reverter_controladoria(&mut self) -> Result<(), AppError> {
        if self.autorizado_diretoria {
            return Err(AppError::AlreadyReleased);
        }
        self.autorizado_controladoria = false;
        self.data_autorizacao_controladoria = None;
        self.usuario_controladoria = None;
        Ok(())
    }

    /// Edição e exclusão: só o solicitante, e só antes de qualquer aprovação.
    pub fn verificar_alteracao_por(&self, usuario: &str) -> Result<(), AppError> {
        if self.usuario != usuario {
            return Err(AppError::Forbidden(
                "Apenas o solicitante pode alterar ou excluir esta autorização.".into(),
            ));
        }
        if self.autorizado_controladoria || self.autorizado_diretoria {
            return Err(AppError::AlreadyApproved);
        }
        Ok(())
    }
}

/// Representação enviada ao frontend, com os campos derivados.
#[derive(Debug, Serialize, ToSchema)]
pub struct AutorizacaoCompraResponse {
    #[serde(flatten)]
    pub autorizacao: AutorizacaoCompra,
    pub liberada: bool,
    pub situacao: SituacaoAutorizacao,
}

impl From<AutorizacaoCompra> for AutorizacaoCompraResponse {
    fn from(autorizacao: AutorizacaoCompra) -> Self {
        Self {
            liberada: autorizacao.liberada(),
            situacao: autorizacao.situacao(),
            autorizacao,
        }
    }
}

fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    checar_valor(*val, "O valor").map_err(erro_de_faixa)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAutorizacaoPayload {
    #[validate(length(min = 1, max = 10, message = "A loja é obrigatória."))]
    #[schema(example = "01")]
    pub loja: String,
    #[validate(length(min = 1, max = 60, message = "O setor é obrigatório."))]
    #[schema(example = "A")]
    pub setor: String,
    #[validate(length(min = 1, max = 120, message = "O fornecedor é obrigatório."))]
    #[schema(example = "Distribuidora X")]
    pub fornecedor: String,
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "100.00")]
    pub valor: Decimal,
    pub observacao: Option<String>,
}

/// Atualização parcial: apenas os campos presentes são gravados.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AtualizarAutorizacaoPayload {
    #[validate(length(min = 1, max = 10, message = "A loja não pode ser vazia."))]
    pub loja: Option<String>,
    #[validate(length(min = 1, max = 60, message = "O setor não pode ser vazio."))]
    pub setor: Option<String>,
    #[validate(length(min = 1, max = 120, message = "O fornecedor não pode ser vazio."))]
    pub fornecedor: Option<String>,
    #[validate(custom(function = "validate_positive"))]
    pub valor: Option<Decimal>,
    pub observacao: Option<String>,
}

impl AtualizarAutorizacaoPayload {
    pub fn is_empty(&self) -> bool {
        self.loja.is_none()
            && self.setor.is_none()
            && self.fornecedor.is_none()
            && self.valor.is_none()
            && self.observacao.is_none()
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FiltroAutorizacoes {
    pub loja: Option<String>,
    pub setor: Option<String>,
    /// Busca em fornecedor, observação e solicitante
    pub busca: Option<String>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn nova(usuario: &str) -> AutorizacaoCompra {
        let agora = Local::now();
        AutorizacaoCompra {
            id: Uuid::new_v4(),
            loja: "01".into(),
            setor: "A".into(),
            fornecedor: "X".into(),
            valor: Decimal::from(100),
            observacao: None,
            usuario: usuario.into(),
            data_criacao: agora.date_naive(),
            hora_criacao: agora.time(),
            autorizado_controladoria: false,
            data_autorizacao_controladoria: None,
            usuario_controladoria: None,
            autorizado_diretoria: false,
            data_autorizacao_diretoria: None,
            usuario_diretoria: None,
        }
    }

    fn instante() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn full_release_flow() {
        let mut a = nova("JOAO");
        assert!(!a.autorizado_controladoria);
        assert!(!a.autorizado_diretoria);
        assert!(!a.liberada());
        assert_eq!(a.situacao(), SituacaoAutorizacao::Pendente);

        // diretoria antes da controladoria falha e não altera nada
        assert!(matches!(
            a.aprovar_diretoria("DIRETOR", instante()),
            Err(AppError::ControladoriaRequired)
        ));
        assert!(!a.autorizado_diretoria);
        assert!(a.usuario_diretoria.is_none());

        a.aprovar_controladoria("CONTROLLER", instante());
        assert!(a.autorizado_controladoria);
        assert_eq!(a.usuario_controladoria.as_deref(), Some("CONTROLLER"));
        assert!(!a.liberada());

        a.aprovar_diretoria("DIRETOR", instante()).unwrap();
        assert!(a.liberada());
        assert_eq!(a.situacao(), SituacaoAutorizacao::Liberada);
    }

    #[test]
    fn revert_clears_controladoria_stamp() {
        let mut a = nova("JOAO");
        a.aprovar_controladoria("CONTROLLER", instante());
        a.reverter_controladoria().unwrap();
        assert!(!a.autorizado_controladoria);
        assert!(a.data_autorizacao_controladoria.is_none());
        assert!(a.usuario_controladoria.is_none());
        assert_eq!(a.situacao(), SituacaoAutorizacao::Pendente);
    }

    #[test]
    fn revert_after_release_fails() {
        let mut a = nova("JOAO");
        a.aprovar_controladoria("CONTROLLER", instante());
        a.aprovar_diretoria("DIRETOR", instante()).unwrap();
        assert!(matches!(a.reverter_controladoria(), Err(AppError::AlreadyReleased)));
        assert!(a.autorizado_controladoria);
        assert!(a.liberada());
    }

    #[test]
    fn liberada_matches_both_flags() {
        for (c, d) in [(false, false), (true, false), (false, true), (true, true)] {
            let mut a = nova("JOAO");
            a.autorizado_controladoria = c;
            a.autorizado_diretoria = d;
            assert_eq!(a.liberada(), c && d);
            let resp = AutorizacaoCompraResponse::from(a);
            assert_eq!(resp.liberada, c && d);
        }
    }

    #[test]
    fn only_requester_can_change_before_approval() {
        let mut a = nova("JOAO");
        assert!(a.verificar_alteracao_por("JOAO").is_ok());
        assert!(matches!(a.verificar_alteracao_por("MARIA"), Err(AppError::Forbidden(_))));

        a.aprovar_controladoria("CONTROLLER", instante());
        assert!(matches!(a.verificar_alteracao_por("JOAO"), Err(AppError::AlreadyApproved)));
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(AtualizarAutorizacaoPayload::default().is_empty());
        let patch = AtualizarAutorizacaoPayload {
            observacao: Some("urgente".into()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn create_payload_requires_positive_value() {
        let payload: CreateAutorizacaoPayload = serde_json::from_value(serde_json::json!({
            "loja": "01", "setor": "A", "fornecedor": "X", "valor": 0
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("valor"));
    }

    #[test]
    fn value_beyond_column_precision_is_a_validation_error() {
        let payload: CreateAutorizacaoPayload = serde_json::from_value(serde_json::json!({
            "loja": "01", "setor": "A", "fornecedor": "X", "valor": 1_000_000_000_000_000u64
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("valor"));

        let patch = AtualizarAutorizacaoPayload {
            valor: Some(Decimal::from(1_000_000_000_000i64)),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}

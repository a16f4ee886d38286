// src/common/valor.rs

use rust_decimal::Decimal;
use validator::ValidationError;

/// Teto exclusivo das colunas monetárias `NUMERIC(14,2)`: 12 dígitos inteiros.
pub fn valor_maximo() -> Decimal {
    Decimal::from(1_000_000_000_000i64)
}

/// Valor monetário gravável: positivo e abaixo do teto da coluna.
/// `campo` abre a mensagem de recusa ("preço promocional deve ...").
pub fn checar_valor(valor: Decimal, campo: &str) -> Result<(), String> {
    if valor <= Decimal::ZERO {
        Err(format!("{} deve ser maior que zero.", campo))
    } else if valor >= valor_maximo() {
        Err(format!("{} excede o máximo permitido (999999999999.99).", campo))
    } else {
        Ok(())
    }
}

/// Adapta `checar_valor` ao `#[validate(custom(...))]`.
pub fn erro_de_faixa(mensagem: String) -> ValidationError {
    let mut err = ValidationError::new("range");
    err.message = Some(mensagem.into());
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_follow_the_column_precision() {
        assert!(checar_valor(Decimal::new(1, 2), "valor").is_ok());
        assert!(checar_valor("999999999999.99".parse().unwrap(), "valor").is_ok());

        assert_eq!(
            checar_valor(Decimal::ZERO, "valor").unwrap_err(),
            "valor deve ser maior que zero."
        );
        let err = checar_valor(valor_maximo(), "valor da meta").unwrap_err();
        assert!(err.starts_with("valor da meta excede"));
        assert!(checar_valor(Decimal::from(1_000_000_000_000_000i64), "valor").is_err());
    }
}

// src/common/competencia.rs

use chrono::NaiveDate;
use validator::ValidationError;

/// Competência é o mês de referência no formato `YYYY-MM`.
pub fn parse_competencia(valor: &str) -> Option<NaiveDate> {
    if valor.len() != 7 || valor.as_bytes().get(4) != Some(&b'-') {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{}-01", valor), "%Y-%m-%d").ok()
}

// Usado pelos payloads: #[validate(custom(function = "validar_competencia"))]
pub fn validar_competencia(valor: &str) -> Result<(), ValidationError> {
    if parse_competencia(valor).is_none() {
        let mut err = ValidationError::new("competencia");
        err.message = Some("A competência deve estar no formato YYYY-MM.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_year_month() {
        assert!(validar_competencia("2026-10").is_ok());
        assert!(validar_competencia("2026-1").is_err());
        assert!(validar_competencia("2026-13").is_err());
        assert!(validar_competencia("10/2026").is_err());
        assert!(validar_competencia("").is_err());
        assert_eq!(
            parse_competencia("2026-02"),
            NaiveDate::from_ymd_opt(2026, 2, 1)
        );
    }
}

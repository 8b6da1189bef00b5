// src/common/validation.rs
//
// Validações customizadas usadas pelos payloads (validator::custom).

use rust_decimal::Decimal;
use validator::ValidationError;

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("exclusive_min".into(), &0.0);
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

// Casas decimais aceitas em nilai (coluna NUMERIC(5, 2))
pub const NILAI_MAX_SCALE: u32 = 2;

/// Nilai vai de 0 a 100, inclusive, com no máximo duas casas decimais.
pub fn nilai_in_domain(val: Decimal) -> bool {
    val >= Decimal::ZERO && val <= Decimal::ONE_HUNDRED && val.normalize().scale() <= NILAI_MAX_SCALE
}

pub fn validate_nilai(val: &Decimal) -> Result<(), ValidationError> {
    if !nilai_in_domain(*val) {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.add_param("max".into(), &100.0);
        err.message = Some("A nota deve estar entre 0 e 100, com no máximo duas casas decimais.".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_minutes(val: i32) -> Result<(), ValidationError> {
    if val < 0 {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0);
        err.message = Some("O limite em minutos não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nilai_bounds_are_inclusive() {
        assert!(validate_nilai(&Decimal::ZERO).is_ok());
        assert!(validate_nilai(&Decimal::ONE_HUNDRED).is_ok());
        assert!(validate_nilai(&Decimal::new(875, 1)).is_ok());
        assert!(validate_nilai(&Decimal::new(1001, 1)).is_err());
        assert!(validate_nilai(&Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn nilai_with_more_than_two_decimals_is_rejected() {
        assert!(validate_nilai(&Decimal::new(85_555, 3)).is_err());
        assert!(validate_nilai(&Decimal::new(8_556, 2)).is_ok());
        // Zeros à direita não contam
        assert!(validate_nilai(&Decimal::new(85_500, 3)).is_ok());
    }

    #[test]
    fn positive_rejects_zero() {
        assert!(validate_positive(&Decimal::ZERO).is_err());
        assert!(validate_positive(&Decimal::new(1, 2)).is_ok());
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&Decimal::new(-5, 0)).is_err());
    }
}

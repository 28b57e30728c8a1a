// src/models.rs

use rust_decimal::Decimal;
use validator::ValidationError;

pub mod auth;
pub mod crm;
pub mod dashboard;
pub mod deals;
pub mod export;
pub mod finance;
pub mod settings;
pub mod tasks;
pub mod tenancy;

// Valores monetários nunca são negativos; o sinal vem do tipo do lançamento.
pub(crate) fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut e = ValidationError::new("range");
        e.message = Some("invalid_amount".into());
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(validate_non_negative(&Decimal::new(-1, 2)).is_err());
        assert!(validate_non_negative(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative(&Decimal::new(15000, 2)).is_ok());
    }
}

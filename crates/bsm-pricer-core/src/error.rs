use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error(
        "Market price out of bounds: {market_price} is outside the no-arbitrage range [{lower}, {upper}]"
    )]
    OutOfBounds {
        market_price: f64,
        lower: f64,
        upper: f64,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PricingError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        PricingError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PricingError {
    fn from(e: serde_json::Error) -> Self {
        PricingError::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_display() {
        let err = PricingError::invalid("spot", "must be positive");
        assert_eq!(err.to_string(), "Invalid input: spot - must be positive");
    }

    #[test]
    fn test_out_of_bounds_display_names_bounds() {
        let err = PricingError::OutOfBounds {
            market_price: 0.01,
            lower: 52.5,
            upper: 100.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("0.01"));
        assert!(msg.contains("52.5"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<f64>("not json").unwrap_err();
        let err: PricingError = json_err.into();
        assert!(matches!(err, PricingError::SerializationError(_)));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PricingError>();
    }
}

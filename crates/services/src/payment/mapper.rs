use config::PaymentConfig;

use super::ports::{DepositInitResponse, PaymentOrder};

/// Minor units per major unit. Assumes a two-decimal currency.
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// ISO 4217 currencies without a minor unit
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "JPY", "KMF", "KRW", "MGA", "PYG", "RWF", "UGX", "VND", "VUV",
    "XAF", "XOF", "XPF",
];

pub fn is_zero_decimal_currency(currency: &str) -> bool {
    ZERO_DECIMAL_CURRENCIES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(currency))
}

/// Build the client checkout response for a gateway order.
///
/// The amount is always divided by [`MINOR_UNITS_PER_MAJOR`]. For zero-decimal currencies
/// that is wrong; it is logged, not corrected.
pub fn to_deposit_init_response(order: &PaymentOrder, config: &PaymentConfig) -> DepositInitResponse {
    if is_zero_decimal_currency(&order.currency) {
        tracing::warn!(
            "Converting amount for zero-decimal currency {} with /{}: order_id={}",
            order.currency,
            MINOR_UNITS_PER_MAJOR,
            order.id
        );
    }

    DepositInitResponse {
        success: true,
        order_id: order.id.clone(),
        amount: order.amount as f64 / MINOR_UNITS_PER_MAJOR as f64,
        currency: order.currency.clone(),
        key: config.public_key.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PaymentConfig {
        PaymentConfig {
            public_key: "rzp_test_key".to_string(),
        }
    }

    fn order(amount: i64, currency: &str) -> PaymentOrder {
        PaymentOrder {
            id: "order_1".to_string(),
            amount,
            currency: currency.to_string(),
            receipt: None,
            status: Some("created".to_string()),
        }
    }

    #[test]
    fn test_converts_minor_to_major_units() {
        let response = to_deposit_init_response(&order(10000, "INR"), &config());
        assert_eq!(
            response,
            DepositInitResponse {
                success: true,
                order_id: "order_1".to_string(),
                amount: 100.0,
                currency: "INR".to_string(),
                key: "rzp_test_key".to_string(),
            }
        );
    }

    #[test]
    fn test_keeps_fractional_major_units() {
        let response = to_deposit_init_response(&order(12345, "USD"), &config());
        assert_eq!(response.amount, 123.45);
    }

    #[test]
    fn test_zero_decimal_currency_is_still_divided() {
        let response = to_deposit_init_response(&order(500, "JPY"), &config());
        assert_eq!(response.amount, 5.0);
        assert!(is_zero_decimal_currency("jpy"));
        assert!(!is_zero_decimal_currency("INR"));
    }

    #[test]
    fn test_json_uses_camel_case() {
        let json = serde_json::to_value(to_deposit_init_response(&order(10000, "INR"), &config()))
            .unwrap();
        assert_eq!(json["orderId"], "order_1");
        assert_eq!(json["amount"], 100.0);
        assert_eq!(json["success"], true);
        assert_eq!(json["key"], "rzp_test_key");
    }

    #[test]
    fn test_gateway_order_deserializes() {
        let order: PaymentOrder =
            serde_json::from_str(r#"{"id":"order_1","amount":10000,"currency":"INR"}"#).unwrap();
        assert_eq!(order.amount, 10000);
        assert_eq!(order.receipt, None);
    }
}

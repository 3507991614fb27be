use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct LatestRatesResponse {
    /// `"success"` or `"error"`.
    pub result: String,
    #[serde(default)]
    pub base_code: Option<String>,
    #[serde(default)]
    pub time_last_update_utc: Option<String>,
    #[serde(default)]
    pub rates: HashMap<String, f64>,
    #[serde(default, rename = "error-type")]
    pub error_type: Option<String>,
}

impl LatestRatesResponse {
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_success_payload() {
        let body = r#"{
            "result": "success",
            "base_code": "USD",
            "time_last_update_utc": "Sat, 18 Oct 2026 00:02:31 +0000",
            "rates": {"USD": 1, "EUR": 0.92, "NGN": 1532.5}
        }"#;

        let parsed: LatestRatesResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.is_success());
        assert_eq!(parsed.base_code.as_deref(), Some("USD"));
        assert_eq!(parsed.rates.get("USD"), Some(&1.0));
        assert_eq!(parsed.rates.get("NGN"), Some(&1532.5));
    }

    #[test]
    fn parses_error_payload() {
        let body = r#"{"result": "error", "error-type": "unsupported-code"}"#;

        let parsed: LatestRatesResponse = serde_json::from_str(body).unwrap();
        assert!(!parsed.is_success());
        assert_eq!(parsed.error_type.as_deref(), Some("unsupported-code"));
        assert!(parsed.rates.is_empty());
    }
}

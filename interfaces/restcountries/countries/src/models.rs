use serde::Deserialize;
use serde_json::{Map, Value};

/// One entry of the `/v3.1/all` response, restricted to the requested fields.
#[derive(Debug, Clone, Deserialize)]
pub struct RestCountry {
    #[serde(default)]
    pub name: Option<RestCountryName>,
    #[serde(default)]
    pub capital: Vec<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub population: Option<u64>,
    /// Keyed by ISO 4217 code, in upstream order.
    #[serde(default)]
    pub currencies: Option<Map<String, Value>>,
    #[serde(default)]
    pub flags: Option<RestCountryFlags>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestCountryName {
    #[serde(default)]
    pub common: Option<String>,
    #[serde(default)]
    pub official: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestCountryFlags {
    #[serde(default)]
    pub png: Option<String>,
    #[serde(default)]
    pub svg: Option<String>,
}

impl RestCountry {
    pub fn common_name(&self) -> Option<&str> {
        self.name.as_ref().and_then(|n| n.common.as_deref())
    }

    pub fn currency_codes(&self) -> Vec<String> {
        self.currencies
            .as_ref()
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn first_capital(&self) -> Option<&str> {
        self.capital.first().map(String::as_str)
    }
}

//! Calculator configuration.
//!
//! Every field is optional. Load from JSON, from environment variables, or
//! construct directly.

use serde::{Deserialize, Serialize};

use super::countries::normalize_country_code;
use super::error::VatError;

/// Settings applied by `VatCalculator::from_config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Country the seller is established in. When set, B2B sales into the
    /// same country are charged VAT; otherwise every B2B sale is reverse-charged.
    pub business_country_code: Option<String>,
    /// Seller VAT number, sent as requester on registry checks.
    pub business_vat_number: Option<String>,
    /// Stock countries to add to the table at startup (e.g. `["NO", "GB"]`).
    pub extra_countries: Vec<String>,
    /// IANA time zone overriding the rate data's reference zone.
    pub timezone: Option<String>,
}

impl CalculatorConfig {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self, VatError> {
        serde_json::from_str(json).map_err(|e| VatError::Config(e.to_string()))
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `VATCALC_BUSINESS_COUNTRY`
    /// - `VATCALC_BUSINESS_VAT_NUMBER`
    /// - `VATCALC_EXTRA_COUNTRIES` (comma-separated, e.g. `NO,GB`)
    /// - `VATCALC_TIMEZONE` (e.g. `Europe/Berlin`)
    pub fn from_env() -> Result<Self, VatError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, VatError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let business_country_code = non_empty("VATCALC_BUSINESS_COUNTRY")
            .map(|v| normalize_country_code(&v));
        if let Some(code) = &business_country_code {
            if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(VatError::Config(format!(
                    "VATCALC_BUSINESS_COUNTRY must be a 2-letter country code, got '{code}'"
                )));
            }
        }

        let extra_countries = non_empty("VATCALC_EXTRA_COUNTRIES")
            .map(|v| {
                v.split(',')
                    .map(normalize_country_code)
                    .filter(|c| !c.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            business_country_code,
            business_vat_number: non_empty("VATCALC_BUSINESS_VAT_NUMBER"),
            extra_countries,
            timezone: non_empty("VATCALC_TIMEZONE"),
        })
    }
}

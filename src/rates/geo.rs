//! Postal-code exceptions: territories excluded from VAT, enclaves taxed
//! under a neighbour's regime, and regions with their own rates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::normalize_country_code;

/// How a postal code is matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostalPattern {
    /// Whole code, case-insensitive.
    Exact(String),
    /// Leading characters, case-insensitive (e.g. `BFPO58`, `35`).
    Prefix(String),
    /// Leading digits within an inclusive numeric range. Both bounds have the
    /// same number of digits, which is the number of leading characters
    /// compared (e.g. `9000..=9385` matches `9122` and `9000-123`).
    Range { from: String, to: String },
}

impl PostalPattern {
    /// Whether `postal_code` (already stripped of whitespace) matches.
    pub fn matches(&self, postal_code: &str) -> bool {
        match self {
            Self::Exact(code) => postal_code.eq_ignore_ascii_case(code),
            Self::Prefix(prefix) => postal_code
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix)),
            Self::Range { from, to } => postal_code.get(..from.len()).is_some_and(|head| {
                // equal-length digit strings order like their numeric values
                head.bytes().all(|b| b.is_ascii_digit())
                    && head >= from.as_str()
                    && head <= to.as_str()
            }),
        }
    }

    /// Check the pattern is well formed.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Exact(code) | Self::Prefix(code) => {
                if code.is_empty() || code.chars().any(char::is_whitespace) {
                    return Err(format!("pattern '{code}' must be non-empty without whitespace"));
                }
            }
            Self::Range { from, to } => {
                let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
                if !digits(from) || !digits(to) || from.len() != to.len() {
                    return Err(format!(
                        "range {from}..{to} needs equal-length digit bounds"
                    ));
                }
                if from > to {
                    return Err(format!("range {from}..{to} is reversed"));
                }
            }
        }
        Ok(())
    }
}

/// What a matching exception does to the rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoEffect {
    /// Outside the VAT area: rate is zero.
    ExcludeFromVat,
    /// Taxed under another country's rate table.
    SubstituteCountry(String),
    /// Taxed with a named regional schedule of the same country.
    Region(String),
}

/// One postal-code exception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoException {
    /// Territory name, for logs.
    #[serde(default)]
    pub name: String,
    #[serde(rename = "match")]
    pub pattern: PostalPattern,
    pub effect: GeoEffect,
}

impl GeoException {
    pub fn new(name: impl Into<String>, pattern: PostalPattern, effect: GeoEffect) -> Self {
        Self {
            name: name.into(),
            pattern,
            effect,
        }
    }
}

/// Strip whitespace and uppercase a postal code.
pub fn normalize_postal_code(postal_code: &str) -> String {
    postal_code
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Per-country postal exceptions. First match wins.
#[derive(Debug, Clone, Default)]
pub struct GeoExceptionResolver {
    active: BTreeMap<String, Vec<GeoException>>,
    stock: BTreeMap<String, Vec<GeoException>>,
}

impl GeoExceptionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the active exceptions of `code`, replacing previous ones.
    pub fn define(&mut self, code: &str, exceptions: Vec<GeoException>) {
        let code = normalize_country_code(code);
        if exceptions.is_empty() {
            self.active.remove(&code);
        } else {
            self.active.insert(code, exceptions);
        }
    }

    /// Register the exceptions that become active when `code` is added.
    pub fn define_stock(&mut self, code: &str, exceptions: Vec<GeoException>) {
        self.stock.insert(normalize_country_code(code), exceptions);
    }

    /// Activate the stock exceptions of `code`. Returns how many became active.
    pub fn activate(&mut self, code: &str) -> usize {
        let code = normalize_country_code(code);
        let exceptions = self.stock.get(&code).cloned().unwrap_or_default();
        let count = exceptions.len();
        self.define(&code, exceptions);
        count
    }

    /// Active exceptions of `code`, in match order.
    pub fn exceptions(&self, code: &str) -> &[GeoException] {
        self.active
            .get(&normalize_country_code(code))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First exception of `country` matching `postal_code`.
    ///
    /// Absent or blank postal codes never match. Matching is case-insensitive;
    /// whitespace is expected to be stripped already (see
    /// [`normalize_postal_code`]).
    pub fn match_postal_code(
        &self,
        country: &str,
        postal_code: Option<&str>,
    ) -> Option<&GeoException> {
        let postal_code = postal_code.map(str::trim).filter(|p| !p.is_empty())?;
        self.exceptions(country)
            .iter()
            .find(|e| e.pattern.matches(postal_code))
    }
}

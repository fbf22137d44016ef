use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of VAT rate as defined by each jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateClass {
    /// Shorthand for the country's currently designated default class
    /// (normally [`RateClass::Standard`]).
    General,
    /// Standard rate.
    Standard,
    /// (First) reduced rate.
    Reduced,
    /// Second reduced rate, where a jurisdiction has two (e.g. AT 13 %, FR 5.5 %).
    SecondReduced,
    /// Super-reduced rate (below 5 %).
    SuperReduced,
    /// Parking rate (transitional, not below 12 %).
    Parking,
}

impl RateClass {
    /// Snake-case name as used in the rate data file.
    pub fn code(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Standard => "standard",
            Self::Reduced => "reduced",
            Self::SecondReduced => "second_reduced",
            Self::SuperReduced => "super_reduced",
            Self::Parking => "parking",
        }
    }
}

impl fmt::Display for RateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A rate in force from `effective_from` until the next entry of the same series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEntry {
    /// First instant at which the rate applies.
    pub effective_from: DateTime<Utc>,
    /// Rate as a fraction, e.g. `0.19` for 19 %.
    pub rate: Decimal,
}

/// Why a resolved rate has the value it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateBasis {
    /// B2B cross-border sale, the buyer self-assesses VAT.
    ReverseCharge,
    /// The postal code lies in a territory excluded from VAT.
    Excluded,
    /// Country rate table (possibly of a substitute country).
    Table,
    /// A named region schedule of the country (e.g. Madeira).
    Region(String),
    /// The country is not collected or has no rate for the class at that time.
    NotCollected,
}

/// The outcome of a rate resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateResolution {
    /// Rate as a fraction.
    pub rate: Decimal,
    /// Class the rate was looked up for, with `General` already replaced by
    /// the country's default class where the country is known.
    pub rate_class: RateClass,
    /// Country whose rules were applied. Differs from the requested country
    /// when a geographic exception substitutes a neighbour's regime.
    pub source_country: String,
    /// Why this rate applies.
    pub basis: RateBasis,
}

impl RateResolution {
    /// A zero rate for the given reason.
    pub fn zero(
        rate_class: RateClass,
        source_country: impl Into<String>,
        basis: RateBasis,
    ) -> Self {
        Self {
            rate: Decimal::ZERO,
            rate_class,
            source_country: source_country.into(),
            basis,
        }
    }

    /// Whether VAT is charged at all.
    pub fn is_collected(&self) -> bool {
        !self.rate.is_zero()
    }
}

/// Price breakdown for one amount at one rate.
///
/// No rounding is applied; round for display at the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Gross price (net + tax).
    pub price: Decimal,
    /// Net price.
    pub net_price: Decimal,
    /// Rate applied, as a fraction.
    pub tax_rate: Decimal,
    /// Tax amount.
    pub tax_value: Decimal,
}

//! # vatcalc
//!
//! EU VAT rate resolution and VAT number validation.
//!
//! - time-aware rate table with historical rate changes
//! - postal-code exceptions (excluded territories, enclaves, regional rates)
//! - B2B reverse charge
//! - VAT number validation with a pluggable registry (VIES)
//!
//! All monetary values and rates use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use rust_decimal_macros::dec;
//! use vatcalc::rates::RateQuery;
//! use vatcalc::vat::{OfflineChecker, VatCalculator};
//! use vatcalc::FixedClock;
//!
//! let now = chrono_tz::Europe::Berlin
//!     .with_ymd_and_hms(2020, 6, 30, 23, 59, 59)
//!     .unwrap()
//!     .with_timezone(&Utc);
//! let calc = VatCalculator::embedded(OfflineChecker)
//!     .unwrap()
//!     .with_clock(FixedClock::new(now));
//!
//! let result = calc.calculate(dec!(24.00), &RateQuery::new("DE"));
//! assert_eq!(result.tax_rate, dec!(0.19));
//! assert_eq!(result.price.round_dp(2), dec!(28.56));
//!
//! // B2B cross-border: reverse charge
//! let result = calc.calculate(dec!(24.00), &RateQuery::new("DE").business(true));
//! assert_eq!(result.price, dec!(24.00));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Types, errors, clock, gross/net arithmetic, configuration |
//! | `rates` (default) | Embedded rate data, rate table, postal exceptions, resolver |
//! | `vat` (default) | VAT number validation, `VatCalculator` |
//! | `vies` | Blocking VIES REST client |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "rates")]
pub mod rates;

#[cfg(feature = "vat")]
pub mod vat;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;

#[cfg(feature = "vat")]
pub use crate::vat::VatCalculator;

//! VAT number validation and the combined calculator.
//!
//! Validates VAT numbers locally (characters, EU prefix) and via a
//! [`VatChecker`] such as the VIES client (feature `vies`).
//!
//! # Example
//!
//! ```
//! use vatcalc::core::{CheckerError, VatError};
//! use vatcalc::vat::*;
//!
//! let registry = |req: &CheckVatRequest| -> Result<VatNumberCheckResult, CheckerError> {
//!     Ok(VatNumberCheckResult {
//!         valid: req.vat_number == "190098891",
//!         country_code: req.country_code.clone(),
//!         vat_number: req.vat_number.clone(),
//!         request_identifier: None,
//!     })
//! };
//! let calc = VatCalculator::embedded(registry).unwrap();
//!
//! assert!(calc.is_valid_vat_number("DE 190 098 891").unwrap());
//! assert!(matches!(
//!     calc.is_valid_vat_number("US123"),
//!     Err(VatError::UnsupportedCountry(_))
//! ));
//! ```

mod calculator;
mod checker;
mod number;
mod validator;
#[cfg(feature = "vies")]
mod vies;

pub use calculator::VatCalculator;
pub use checker::{CheckVatRequest, OfflineChecker, VatChecker, VatNumberCheckResult};
pub use number::{SEPARATORS, VatNumber};
pub use validator::{VatNumberDetails, VatNumberValidator};
#[cfg(feature = "vies")]
pub use vies::ViesClient;

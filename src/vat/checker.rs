//! Contract of the remote VAT registry.

use serde::{Deserialize, Serialize};

use crate::core::CheckerError;

/// Request sent to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckVatRequest {
    /// Uppercased VAT prefix (e.g. "DE", "EL"), whatever case the caller
    /// typed. VIES rejects lowercase codes. `GR` is sent as `EL`.
    pub country_code: String,
    /// Local number, separators removed.
    pub vat_number: String,
    /// Prefix of the requesting business, if configured. Normalised like
    /// `country_code`.
    pub requester_country_code: Option<String>,
    /// Local number of the requesting business, if configured.
    pub requester_vat_number: Option<String>,
}

/// Registry answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatNumberCheckResult {
    /// Whether the number is currently registered.
    pub valid: bool,
    pub country_code: String,
    pub vat_number: String,
    /// Consultation number, returned when a requester was given.
    pub request_identifier: Option<String>,
}

/// A VAT registry (VIES or a stand-in).
///
/// Implementations signal transport or service failures through
/// [`CheckerError`]; a number that is simply not registered is
/// `Ok` with `valid == false`.
pub trait VatChecker {
    fn check_vat(&self, request: &CheckVatRequest) -> Result<VatNumberCheckResult, CheckerError>;
}

impl<F> VatChecker for F
where
    F: Fn(&CheckVatRequest) -> Result<VatNumberCheckResult, CheckerError>,
{
    fn check_vat(&self, request: &CheckVatRequest) -> Result<VatNumberCheckResult, CheckerError> {
        self(request)
    }
}

/// Checker for setups without registry access. Every check is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineChecker;

impl VatChecker for OfflineChecker {
    fn check_vat(&self, _request: &CheckVatRequest) -> Result<VatNumberCheckResult, CheckerError> {
        Err(CheckerError::Service("no VAT registry configured".into()))
    }
}

//! VAT number validation pipeline.
//!
//! Three checks, stopping at the first failure:
//! 1. character set (all offending characters are reported together)
//! 2. prefix names an EU member state collected by the rate table
//! 3. registry check through a [`VatChecker`]
//!
//! Steps 1 and 2 are local; no request is sent when they fail.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::checker::{CheckVatRequest, VatChecker};
use super::number::VatNumber;
use crate::core::{VatError, vat_prefix_for_country};
use crate::rates::RateTable;

/// Outcome of a registry check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatNumberDetails {
    /// Whether the number is registered.
    pub valid: bool,
    /// Uppercased country prefix.
    pub country_code: String,
    /// Local number as reported by the registry.
    pub vat_number: String,
    /// Consultation number for audit trails, if the registry issued one.
    pub request_id: Option<String>,
}

impl VatNumberDetails {
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Validates VAT numbers, optionally on behalf of a requesting business.
#[derive(Debug, Clone)]
pub struct VatNumberValidator<C> {
    checker: C,
    requester: Option<VatNumber>,
}

impl<C: VatChecker> VatNumberValidator<C> {
    pub fn new(checker: C) -> Self {
        Self {
            checker,
            requester: None,
        }
    }

    /// Send `vat_number` as requester on every check.
    pub fn with_requester(mut self, vat_number: &str) -> Result<Self, VatError> {
        self.set_requester(Some(vat_number))?;
        Ok(self)
    }

    /// Set or clear the requester. The number is parsed like any VAT number.
    pub fn set_requester(&mut self, vat_number: Option<&str>) -> Result<(), VatError> {
        self.requester = vat_number.map(VatNumber::parse).transpose()?;
        Ok(())
    }

    pub fn requester(&self) -> Option<&VatNumber> {
        self.requester.as_ref()
    }

    pub fn checker(&self) -> &C {
        &self.checker
    }

    /// Run the local checks (characters, country support).
    pub fn parse_supported(&self, table: &RateTable, raw: &str) -> Result<VatNumber, VatError> {
        let number = VatNumber::parse(raw)?;
        if !table.should_collect_eu_vat(&number.iso_country()) {
            return Err(VatError::UnsupportedCountry(number.prefix().to_string()));
        }
        Ok(number)
    }

    /// Validate `raw` and query the registry with the configured requester.
    pub fn vat_details(&self, table: &RateTable, raw: &str) -> Result<VatNumberDetails, VatError> {
        let number = self.parse_supported(table, raw)?;
        self.check(&number, self.requester.as_ref())
    }

    /// Like [`vat_details`](Self::vat_details) with a one-off requester.
    pub fn vat_details_for_requester(
        &self,
        table: &RateTable,
        raw: &str,
        requester: &str,
    ) -> Result<VatNumberDetails, VatError> {
        let number = self.parse_supported(table, raw)?;
        let requester = VatNumber::parse(requester)?;
        self.check(&number, Some(&requester))
    }

    /// Registry validity only. Errors still propagate.
    pub fn is_valid(&self, table: &RateTable, raw: &str) -> Result<bool, VatError> {
        self.vat_details(table, raw).map(|d| d.valid)
    }

    fn check(
        &self,
        number: &VatNumber,
        requester: Option<&VatNumber>,
    ) -> Result<VatNumberDetails, VatError> {
        let request = CheckVatRequest {
            country_code: vat_prefix_for_country(&number.country_code()),
            vat_number: number.local_number().to_string(),
            requester_country_code: requester
                .map(|r| vat_prefix_for_country(&r.country_code())),
            requester_vat_number: requester.map(|r| r.local_number().to_string()),
        };
        debug!(
            country = %request.country_code,
            number = %request.vat_number,
            requester = ?requester.map(ToString::to_string),
            "checking VAT number"
        );

        let result = self.checker.check_vat(&request).map_err(|e| {
            warn!(vat_number = %number, error = %e, "VAT registry check unavailable");
            VatError::VatCheckUnavailable(e)
        })?;

        Ok(VatNumberDetails {
            valid: result.valid,
            country_code: result.country_code.to_ascii_uppercase(),
            vat_number: result.vat_number,
            request_id: result.request_identifier.filter(|id| !id.is_empty()),
        })
    }
}

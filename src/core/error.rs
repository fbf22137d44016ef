use std::fmt;
use thiserror::Error;

/// Errors raised by rate table setup and VAT number validation.
///
/// Rate resolution itself never fails: missing data degrades to a zero rate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VatError {
    /// No stock rate definition exists for the country.
    #[error("no VAT rules known for country {0}")]
    NoVatRulesForCountry(String),

    /// The country is not configured for collection (or, for VAT numbers,
    /// is not an EU member state). Carries the code as given.
    #[error("Unsupported/non-EU country {0}")]
    UnsupportedCountry(String),

    /// The VAT number contains characters other than ASCII letters, digits and
    /// the separators space, dot and hyphen.
    #[error("VAT number {vat_number} contains invalid characters: {}", join_invalid(.invalid))]
    InvalidCharsInVatNumber {
        /// The input exactly as given.
        vat_number: String,
        /// Every offending character, in order of appearance.
        invalid: Vec<InvalidChar>,
    },

    /// The registry check failed at transport or service level.
    #[error("VAT number check unavailable: {0}")]
    VatCheckUnavailable(#[from] CheckerError),

    /// The rate data document is malformed or inconsistent.
    #[error("rate data error: {0}")]
    RateData(String),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

/// One offending character of a VAT number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidChar {
    /// The character.
    pub ch: char,
    /// Zero-based byte offset in the original input.
    pub offset: usize,
}

impl fmt::Display for InvalidChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0u8; 4];
        let hex: String = self
            .ch
            .encode_utf8(&mut buf)
            .bytes()
            .map(|b| format!("{b:02x}"))
            .collect();
        write!(f, "{} (0x{hex}) at offset {}", self.ch, self.offset)
    }
}

fn join_invalid(invalid: &[InvalidChar]) -> String {
    invalid
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure signalled by a [`VatChecker`](crate::vat::VatChecker) implementation.
///
/// A well-formed "not registered" answer is not an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum CheckerError {
    /// Connection, timeout, or unreadable response.
    #[error("transport error: {0}")]
    Transport(String),
    /// The registry answered with an error (e.g. member state unavailable).
    #[error("service error: {0}")]
    Service(String),
}

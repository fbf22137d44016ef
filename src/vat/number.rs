//! VAT number normalisation and character validation.

use std::fmt;

use crate::core::{InvalidChar, VatError, country_for_vat_prefix};

/// Characters stripped before validation.
pub const SEPARATORS: &[char] = &[' ', '.', '-'];

/// A VAT number split into country prefix and local number.
///
/// Only the character set is checked here; whether the prefix is a supported
/// country is decided by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VatNumber {
    raw: String,
    prefix: String,
    local_number: String,
}

impl VatNumber {
    /// Strip separators and split off the two-letter prefix.
    ///
    /// Every character other than an ASCII letter, digit or separator is
    /// reported, with its byte offset in `raw`, in a single
    /// [`VatError::InvalidCharsInVatNumber`].
    ///
    /// ```
    /// use vatcalc::vat::VatNumber;
    ///
    /// let n = VatNumber::parse("DE 190.098-891").unwrap();
    /// assert_eq!(n.country_code(), "DE");
    /// assert_eq!(n.local_number(), "190098891");
    /// assert!(VatNumber::parse("CY123Μ456_789").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, VatError> {
        let mut cleaned = String::with_capacity(raw.len());
        let mut invalid = Vec::new();
        for (offset, ch) in raw.char_indices() {
            if SEPARATORS.contains(&ch) {
                continue;
            }
            if ch.is_ascii_alphanumeric() {
                cleaned.push(ch);
            } else {
                invalid.push(InvalidChar { ch, offset });
            }
        }
        if !invalid.is_empty() {
            return Err(VatError::InvalidCharsInVatNumber {
                vat_number: raw.to_string(),
                invalid,
            });
        }

        // ASCII only from here, so byte indexing is safe
        let (prefix, local_number) = cleaned.split_at(cleaned.len().min(2));
        Ok(Self {
            raw: raw.to_string(),
            prefix: prefix.to_string(),
            local_number: local_number.to_string(),
        })
    }

    /// Input exactly as given.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// First two characters in their original case.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Uppercased prefix (`EL` for Greece, as used on VAT numbers).
    pub fn country_code(&self) -> String {
        self.prefix.to_ascii_uppercase()
    }

    /// ISO country the prefix denotes (`EL` maps to `GR`).
    pub fn iso_country(&self) -> String {
        country_for_vat_prefix(&self.prefix)
    }

    /// Everything after the prefix, separators removed.
    pub fn local_number(&self) -> &str {
        &self.local_number
    }
}

impl fmt::Display for VatNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.country_code(), self.local_number)
    }
}

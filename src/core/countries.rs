//! Country code helpers.
//!
//! The rate data carries each country's EU membership flag; the list here is
//! the reference set that data is checked against in tests.

/// EU member state country codes (ISO 3166-1 alpha-2). Sorted for binary search.
pub const EU_MEMBER_STATES: &[&str] = &[
    "AT", "BE", "BG", "CY", "CZ", "DE", "DK", "EE", "ES", "FI", "FR", "GR", "HR", "HU", "IE", "IT",
    "LT", "LU", "LV", "MT", "NL", "PL", "PT", "RO", "SE", "SI", "SK",
];

/// Whether `code` (any case) is an EU member state.
pub fn is_eu_member_state(code: &str) -> bool {
    EU_MEMBER_STATES
        .binary_search(&normalize_country_code(code).as_str())
        .is_ok()
}

/// Trim and uppercase a country code.
pub fn normalize_country_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Map a VAT number prefix to its ISO country code.
///
/// Greece uses `EL` on VAT numbers; every other member state uses its ISO code.
pub fn country_for_vat_prefix(prefix: &str) -> String {
    let upper = normalize_country_code(prefix);
    match upper.as_str() {
        "EL" => "GR".to_string(),
        _ => upper,
    }
}

/// Map an ISO country code to the prefix the VAT registry expects.
///
/// Inverse of [`country_for_vat_prefix`]: `GR` becomes `EL`.
pub fn vat_prefix_for_country(code: &str) -> String {
    let upper = normalize_country_code(code);
    match upper.as_str() {
        "GR" => "EL".to_string(),
        _ => upper,
    }
}

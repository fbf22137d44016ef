//! Boundary and corner cases across rate data, resolution and validation.

#![cfg(feature = "vat")]

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal_macros::dec;
use vatcalc::core::*;
use vatcalc::rates::*;
use vatcalc::vat::*;

fn berlin(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    chrono_tz::Europe::Berlin
        .with_ymd_and_hms(y, m, d, h, mi, s)
        .unwrap()
        .with_timezone(&Utc)
}

fn resolver() -> RateResolver {
    RateResolver::embedded()
        .unwrap()
        .with_clock(FixedClock::new(berlin(2024, 6, 15, 12, 0, 0)))
}

// ---------------------------------------------------------------------------
// Country coverage
// ---------------------------------------------------------------------------

#[test]
fn every_member_state_is_collected() {
    let r = resolver();
    for code in EU_MEMBER_STATES {
        assert!(r.should_collect_vat(code), "{code}");
        assert!(r.should_collect_eu_vat(code), "{code}");
        assert!(r.rate(&RateQuery::new(*code)) > dec!(0), "{code}");
    }
}

#[test]
fn eu_flag_in_data_matches_member_list() {
    let table = RateTable::embedded().unwrap();
    let eu: Vec<&str> = table
        .countries()
        .filter(|c| table.should_collect_eu_vat(c))
        .collect();
    assert_eq!(eu, EU_MEMBER_STATES.to_vec());
}

#[test]
fn stock_countries_are_not_collected_until_added() {
    let table = RateTable::embedded().unwrap();
    let stock: Vec<&str> = table.stock_countries().collect();
    for code in ["CH", "GB", "NO"] {
        assert!(stock.contains(&code), "{code}");
        assert!(!table.should_collect_vat(code), "{code}");
    }
}

#[test]
fn country_codes_are_case_and_space_insensitive() {
    let r = resolver();
    assert_eq!(r.rate(&RateQuery::new(" de ")), dec!(0.19));
    assert_eq!(r.rate(&RateQuery::new("dE")), dec!(0.19));
    assert!(r.should_collect_vat("fr"));
}

#[test]
fn empty_country_is_zero() {
    let res = resolver().resolve(&RateQuery::new(""));
    assert_eq!(res.rate, dec!(0));
    assert_eq!(res.basis, RateBasis::NotCollected);
}

// ---------------------------------------------------------------------------
// Rate classes
// ---------------------------------------------------------------------------

#[test]
fn general_means_standard() {
    let r = resolver();
    let general = r.resolve(&RateQuery::new("DE").rate_class(RateClass::General));
    let standard = r.resolve(&RateQuery::new("DE").rate_class(RateClass::Standard));
    assert_eq!(general.rate, standard.rate);
    assert_eq!(general.rate_class, RateClass::Standard);
}

#[test]
fn general_on_unknown_country_reports_standard() {
    let res = resolver().resolve(&RateQuery::new("XX"));
    assert_eq!(res.rate_class, RateClass::Standard);
}

#[test]
fn rate_class_codes() {
    assert_eq!(RateClass::General.code(), "general");
    assert_eq!(RateClass::SuperReduced.to_string(), "super_reduced");
    assert_eq!(RateClass::SecondReduced.to_string(), "second_reduced");
}

// ---------------------------------------------------------------------------
// Time boundaries
// ---------------------------------------------------------------------------

#[test]
fn boundary_is_half_open() {
    let r = resolver();
    let boundary = berlin(2021, 1, 1, 0, 0, 0);
    let q = |at| RateQuery::new("DE").as_of(at);
    assert_eq!(r.rate(&q(boundary - Duration::nanoseconds(1))), dec!(0.16));
    assert_eq!(r.rate(&q(boundary)), dec!(0.19));
}

#[test]
fn far_past_and_future_use_first_and_last_entry() {
    let r = resolver();
    let past = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
    let future = Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(r.rate(&RateQuery::new("DE").as_of(past)), dec!(0.19));
    assert_eq!(r.rate(&RateQuery::new("DE").as_of(future)), dec!(0.19));
    assert_eq!(r.rate(&RateQuery::new("FI").as_of(future)), dec!(0.255));
}

#[test]
fn series_before_first_entry_is_none() {
    let start = berlin(2020, 1, 1, 0, 0, 0);
    let series = RateSeries::new(vec![RateEntry {
        effective_from: start,
        rate: dec!(0.10),
    }])
    .unwrap();
    assert!(series.at(start - Duration::seconds(1)).is_none());
    assert_eq!(series.at(start).map(|e| e.rate), Some(dec!(0.10)));
}

#[test]
fn series_rejects_unordered_entries() {
    let a = berlin(2021, 1, 1, 0, 0, 0);
    let b = berlin(2020, 1, 1, 0, 0, 0);
    let entries = vec![
        RateEntry {
            effective_from: a,
            rate: dec!(0.19),
        },
        RateEntry {
            effective_from: b,
            rate: dec!(0.16),
        },
    ];
    assert!(RateSeries::new(entries).is_err());
    assert!(RateSeries::new(Vec::new()).is_err());
}

// ---------------------------------------------------------------------------
// Postal codes
// ---------------------------------------------------------------------------

#[test]
fn missing_or_blank_postal_code_uses_country_rate() {
    let r = resolver();
    assert_eq!(r.rate(&RateQuery::new("DE").maybe_postal_code(None)), dec!(0.19));
    assert_eq!(r.rate(&RateQuery::new("DE").postal_code("")), dec!(0.19));
    assert_eq!(r.rate(&RateQuery::new("DE").postal_code("   ")), dec!(0.19));
}

#[test]
fn postal_code_whitespace_is_ignored() {
    let r = resolver();
    assert_eq!(r.rate(&RateQuery::new("DE").postal_code(" 27 498 ")), dec!(0));
}

#[test]
fn exact_pattern_needs_whole_code() {
    let r = resolver();
    assert_eq!(r.rate(&RateQuery::new("DE").postal_code("274980")), dec!(0.19));
    assert_eq!(r.rate(&RateQuery::new("DE").postal_code("2749")), dec!(0.19));
}

#[test]
fn range_bounds_are_inclusive() {
    let r = resolver();
    assert_eq!(r.rate(&RateQuery::new("PT").postal_code("9000")), dec!(0.22));
    assert_eq!(r.rate(&RateQuery::new("PT").postal_code("9385")), dec!(0.22));
    assert_eq!(r.rate(&RateQuery::new("PT").postal_code("9386")), dec!(0.23));
    assert_eq!(r.rate(&RateQuery::new("PT").postal_code("8999")), dec!(0.23));
}

#[test]
fn non_ascii_postal_code_does_not_panic() {
    let r = resolver();
    assert_eq!(r.rate(&RateQuery::new("PT").postal_code("9ü")), dec!(0.23));
    assert_eq!(r.rate(&RateQuery::new("GB").postal_code("ΒFPO58")), dec!(0));
}

#[test]
fn prefix_pattern_is_case_insensitive() {
    let mut r = resolver();
    r.add_country("GB").unwrap();
    assert_eq!(r.rate(&RateQuery::new("GB").postal_code("bfpo57")), dec!(0.19));
}

#[test]
fn geo_resolver_without_code_matches_nothing() {
    let r = resolver();
    assert!(r.geo().match_postal_code("DE", None).is_none());
    assert_eq!(
        r.geo().match_postal_code("de", Some("27498")).map(|e| e.name.as_str()),
        Some("Heligoland")
    );
}

// ---------------------------------------------------------------------------
// Rate data loading
// ---------------------------------------------------------------------------

#[test]
fn custom_rate_document() {
    let json = r#"{
        "timezone": "UTC",
        "countries": [
            {"code": "xa", "eu": false, "rates": [
                {"class": "standard", "history": [
                    {"rate": "0.10"},
                    {"since": "2030-01-01", "rate": "0.12"}
                ]}
            ]}
        ]
    }"#;
    let (table, geo) = RateData::from_json(json).unwrap().build().unwrap();
    let r = RateResolver::new(table, geo);
    let q = |at| RateQuery::new("XA").as_of(at);
    assert_eq!(r.rate(&q(Utc.with_ymd_and_hms(2029, 12, 31, 23, 59, 59).unwrap())), dec!(0.10));
    assert_eq!(r.rate(&q(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())), dec!(0.12));
}

#[test]
fn rate_document_rejects_rate_of_one() {
    let json = r#"{"countries": [{"code": "XA", "rates": [
        {"class": "standard", "history": [{"rate": "1"}]}
    ]}]}"#;
    assert!(matches!(RateData::from_json(json), Err(VatError::RateData(_))));
}

#[test]
fn rate_document_rejects_unknown_substitute() {
    let json = r#"{"countries": [{"code": "XA", "rates": [
        {"class": "standard", "history": [{"rate": "0.1"}]}
    ], "postal_exceptions": [
        {"match": {"exact": "1"}, "effect": {"substitute_country": "ZZ"}}
    ]}]}"#;
    assert!(RateData::from_json(json).is_err());
}

#[test]
fn rate_document_rejects_malformed_json() {
    assert!(matches!(RateData::from_json("{"), Err(VatError::RateData(_))));
}

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

#[test]
fn zero_amounts() {
    let r = from_net(dec!(0), dec!(0.19));
    assert_eq!(r.price, dec!(0));
    assert_eq!(r.tax_value, dec!(0));
    let r = from_gross(dec!(0), dec!(0.19));
    assert_eq!(r.net_price, dec!(0));
}

#[test]
fn amounts_are_not_rounded() {
    let r = from_net(dec!(0.01), dec!(0.19));
    assert_eq!(r.tax_value, dec!(0.0019));
    assert_eq!(r.price, dec!(0.0119));
}

#[test]
fn gross_net_gross_round_trip() {
    let gross = dec!(99.99);
    let net = from_gross(gross, dec!(0.21)).net_price;
    let back = from_net(net, dec!(0.21)).price;
    assert!((back - gross).abs() < dec!(0.0000000001));
}

// ---------------------------------------------------------------------------
// VAT numbers
// ---------------------------------------------------------------------------

#[test]
fn single_char_and_empty_vat_numbers() {
    let n = VatNumber::parse("D").unwrap();
    assert_eq!(n.prefix(), "D");
    assert_eq!(n.local_number(), "");

    let calc = VatCalculator::embedded(OfflineChecker).unwrap();
    assert!(matches!(
        calc.vat_details(""),
        Err(VatError::UnsupportedCountry(ref p)) if p.is_empty()
    ));
}

#[test]
fn separators_inside_prefix() {
    let n = VatNumber::parse("D E123").unwrap();
    assert_eq!(n.prefix(), "DE");
    assert_eq!(n.local_number(), "123");
}

#[test]
fn uk_vat_number_is_unsupported_even_when_collected() {
    let mut calc = VatCalculator::embedded(OfflineChecker).unwrap();
    calc.add_country("GB").unwrap();
    assert!(matches!(
        calc.vat_details("GB123456789"),
        Err(VatError::UnsupportedCountry(_))
    ));
}

fn greek_registry(req: &CheckVatRequest) -> Result<VatNumberCheckResult, CheckerError> {
    Ok(VatNumberCheckResult {
        valid: req.country_code == "EL",
        country_code: req.country_code.clone(),
        vat_number: req.vat_number.clone(),
        request_identifier: None,
    })
}

#[test]
fn greek_numbers_use_el_prefix() {
    let calc = VatCalculator::embedded(greek_registry).unwrap();
    assert!(calc.is_valid_vat_number("el094259216").unwrap());
    assert!(calc.is_valid_vat_number("GR094259216").unwrap());
}

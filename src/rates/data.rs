//! Declarative rate data: parsing and validation of `data/rates.json`.
//!
//! The document is kept in its dated (naive) form until [`RateData::build`],
//! which converts every `since` date to an instant at local midnight in the
//! reference time zone.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeSet;

use super::geo::{GeoEffect, GeoException, GeoExceptionResolver};
use super::table::{CountryRateSet, RateSchedule, RateSeries, RateTable};
use crate::core::{RateClass, RateEntry, VatError, normalize_country_code};

const EMBEDDED_RATES: &str = include_str!("../../data/rates.json");

const DEFAULT_TIMEZONE: &str = "Europe/Berlin";

#[derive(Debug, Clone, Deserialize)]
struct RateDocument {
    #[serde(default = "default_timezone")]
    timezone: String,
    countries: Vec<CountryDoc>,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_preloaded() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
struct CountryDoc {
    code: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    eu: bool,
    #[serde(default = "default_preloaded")]
    preloaded: bool,
    #[serde(default)]
    default_class: Option<RateClass>,
    rates: Vec<ClassDoc>,
    #[serde(default)]
    regions: Vec<RegionDoc>,
    #[serde(default)]
    postal_exceptions: Vec<GeoException>,
}

#[derive(Debug, Clone, Deserialize)]
struct ClassDoc {
    class: RateClass,
    history: Vec<EntryDoc>,
}

#[derive(Debug, Clone, Deserialize)]
struct EntryDoc {
    #[serde(default)]
    since: Option<NaiveDate>,
    rate: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
struct RegionDoc {
    name: String,
    rates: Vec<ClassDoc>,
}

/// Parsed and validated rate data, ready to build a [`RateTable`] and a
/// [`GeoExceptionResolver`].
#[derive(Debug, Clone)]
pub struct RateData {
    timezone: Tz,
    countries: Vec<CountryDoc>,
}

impl RateData {
    /// The rate data shipped with the crate.
    pub fn embedded() -> Result<Self, VatError> {
        Self::from_json(EMBEDDED_RATES)
    }

    /// Parse and validate a rate data document.
    pub fn from_json(json: &str) -> Result<Self, VatError> {
        let doc: RateDocument =
            serde_json::from_str(json).map_err(|e| VatError::RateData(e.to_string()))?;
        let timezone = parse_timezone(&doc.timezone)?;
        let mut countries = doc.countries;
        for country in &mut countries {
            country.code = normalize_country_code(&country.code);
        }
        validate(&countries)?;
        Ok(Self {
            timezone,
            countries,
        })
    }

    /// Override the reference time zone used to interpret `since` dates.
    pub fn set_timezone(&mut self, name: &str) -> Result<(), VatError> {
        self.timezone = parse_timezone(name)?;
        Ok(())
    }

    /// Reference time zone.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Codes of all countries in the document, preloaded or stock.
    pub fn country_codes(&self) -> impl Iterator<Item = &str> {
        self.countries.iter().map(|c| c.code.as_str())
    }

    /// Build the rate table and exception resolver.
    ///
    /// Every country becomes a stock definition; preloaded ones are also
    /// active from the start.
    pub fn build(self) -> Result<(RateTable, GeoExceptionResolver), VatError> {
        let tz = self.timezone;
        let mut table = RateTable::new(tz);
        let mut geo = GeoExceptionResolver::new();

        for country in self.countries {
            let mut rates = RateSchedule::new();
            for class in &country.rates {
                rates.insert(class.class, convert_series(tz, &country.code, class)?);
            }
            let mut regions = Vec::with_capacity(country.regions.len());
            for region in &country.regions {
                let mut schedule = RateSchedule::new();
                for class in &region.rates {
                    schedule.insert(class.class, convert_series(tz, &country.code, class)?);
                }
                regions.push((region.name.clone(), schedule));
            }

            let set = CountryRateSet {
                name: country.name,
                eu_member: country.eu,
                default_class: country.default_class.unwrap_or(RateClass::Standard),
                rates,
                regions,
            };

            geo.define_stock(&country.code, country.postal_exceptions.clone());
            if country.preloaded {
                geo.define(&country.code, country.postal_exceptions);
                table.define(&country.code, set.clone());
            }
            table.define_stock(&country.code, set);
        }

        Ok((table, geo))
    }
}

fn parse_timezone(name: &str) -> Result<Tz, VatError> {
    name.parse::<Tz>()
        .map_err(|e| VatError::RateData(format!("unknown time zone '{name}': {e}")))
}

/// Local midnight of `date` in `tz`, as a UTC instant.
///
/// Where midnight falls into a DST gap the earliest valid local time is used.
pub(crate) fn local_midnight(tz: Tz, date: NaiveDate) -> Result<DateTime<Utc>, VatError> {
    let naive = date.and_time(NaiveTime::MIN);
    let local = tz
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            naive
                .checked_add_signed(chrono::Duration::hours(1))
                .and_then(|shifted| tz.from_local_datetime(&shifted).earliest())
        })
        .ok_or_else(|| VatError::RateData(format!("no local midnight on {date} in {tz}")))?;
    Ok(local.with_timezone(&Utc))
}

fn convert_series(tz: Tz, country: &str, class: &ClassDoc) -> Result<RateSeries, VatError> {
    let mut entries = Vec::with_capacity(class.history.len());
    for entry in &class.history {
        let effective_from = match entry.since {
            Some(date) => local_midnight(tz, date)?,
            None => DateTime::<Utc>::MIN_UTC,
        };
        entries.push(RateEntry {
            effective_from,
            rate: entry.rate,
        });
    }
    RateSeries::new(entries)
        .map_err(|e| VatError::RateData(format!("{country} {}: {e}", class.class)))
}

fn validate(countries: &[CountryDoc]) -> Result<(), VatError> {
    let mut codes = BTreeSet::new();
    for country in countries {
        if country.code.len() != 2 || !country.code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(VatError::RateData(format!(
                "invalid country code '{}'",
                country.code
            )));
        }
        if !codes.insert(country.code.as_str()) {
            return Err(VatError::RateData(format!(
                "duplicate country {}",
                country.code
            )));
        }
    }

    for country in countries {
        let code = &country.code;
        if country.rates.is_empty() {
            return Err(VatError::RateData(format!("{code}: no rate classes defined")));
        }
        if country.default_class == Some(RateClass::General) {
            return Err(VatError::RateData(format!(
                "{code}: default class cannot be 'general'"
            )));
        }
        validate_classes(code, &country.rates)?;
        for region in &country.regions {
            validate_classes(&format!("{code}/{}", region.name), &region.rates)?;
        }

        for exception in &country.postal_exceptions {
            exception
                .pattern
                .validate()
                .map_err(|e| VatError::RateData(format!("{code} '{}': {e}", exception.name)))?;
            match &exception.effect {
                GeoEffect::ExcludeFromVat => {}
                GeoEffect::SubstituteCountry(target) => {
                    let target = normalize_country_code(target);
                    if target == *code || !codes.contains(target.as_str()) {
                        return Err(VatError::RateData(format!(
                            "{code} '{}': substitute country {target} is not defined",
                            exception.name
                        )));
                    }
                }
                GeoEffect::Region(region) => {
                    if !country.regions.iter().any(|r| &r.name == region) {
                        return Err(VatError::RateData(format!(
                            "{code} '{}': region '{region}' is not defined",
                            exception.name
                        )));
                    }
                }
            }
        }
    }
    Ok(())
}

fn validate_classes(owner: &str, classes: &[ClassDoc]) -> Result<(), VatError> {
    let mut seen = BTreeSet::new();
    for class in classes {
        if class.class == RateClass::General {
            return Err(VatError::RateData(format!(
                "{owner}: 'general' is not a storable rate class"
            )));
        }
        if !seen.insert(class.class) {
            return Err(VatError::RateData(format!(
                "{owner}: class {} defined twice",
                class.class
            )));
        }
        if class.history.is_empty() {
            return Err(VatError::RateData(format!(
                "{owner} {}: empty history",
                class.class
            )));
        }
        for (i, entry) in class.history.iter().enumerate() {
            if entry.rate < Decimal::ZERO || entry.rate >= Decimal::ONE {
                return Err(VatError::RateData(format!(
                    "{owner} {}: rate {} outside [0, 1)",
                    class.class, entry.rate
                )));
            }
            if i > 0 && entry.since.is_none() {
                return Err(VatError::RateData(format!(
                    "{owner} {}: only the first entry may omit 'since'",
                    class.class
                )));
            }
        }
        for pair in class.history.windows(2) {
            if let (Some(a), Some(b)) = (pair[0].since, pair[1].since) {
                if a >= b {
                    return Err(VatError::RateData(format!(
                        "{owner} {}: 'since' dates not increasing ({a} >= {b})",
                        class.class
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(countries: &str) -> String {
        format!(r#"{{"timezone": "Europe/Berlin", "countries": [{countries}]}}"#)
    }

    #[test]
    fn embedded_data_loads() {
        let data = RateData::embedded().unwrap();
        assert_eq!(data.timezone(), chrono_tz::Europe::Berlin);
        assert!(data.country_codes().any(|c| c == "DE"));
        assert!(data.country_codes().any(|c| c == "NO"));
        data.build().unwrap();
    }

    #[test]
    fn local_midnight_follows_dst() {
        let tz = chrono_tz::Europe::Berlin;
        let summer = local_midnight(tz, NaiveDate::from_ymd_opt(2020, 7, 1).unwrap()).unwrap();
        assert_eq!(summer.to_rfc3339(), "2020-06-30T22:00:00+00:00");
        let winter = local_midnight(tz, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()).unwrap();
        assert_eq!(winter.to_rfc3339(), "2020-12-31T23:00:00+00:00");
    }

    #[test]
    fn rejects_unknown_timezone() {
        let json = r#"{"timezone": "Mars/Olympus", "countries": []}"#;
        assert!(matches!(RateData::from_json(json), Err(VatError::RateData(_))));
    }

    #[test]
    fn rejects_unordered_history() {
        let json = doc(
            r#"{"code": "DE", "rates": [{"class": "standard", "history": [
                {"since": "2021-01-01", "rate": "0.19"},
                {"since": "2020-07-01", "rate": "0.16"}]}]}"#,
        );
        let err = RateData::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("not increasing"));
    }

    #[test]
    fn rejects_late_open_entry() {
        let json = doc(
            r#"{"code": "DE", "rates": [{"class": "standard", "history": [
                {"since": "2021-01-01", "rate": "0.19"},
                {"rate": "0.16"}]}]}"#,
        );
        assert!(RateData::from_json(&json).is_err());
    }

    #[test]
    fn rejects_out_of_range_rate() {
        let json = doc(
            r#"{"code": "DE", "rates": [{"class": "standard", "history": [{"rate": "1.5"}]}]}"#,
        );
        let err = RateData::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn rejects_unknown_substitute() {
        let json = doc(
            r#"{"code": "AT", "rates": [{"class": "standard", "history": [{"rate": "0.20"}]}],
                "postal_exceptions": [{
                    "name": "Jungholz",
                    "match": {"exact": "6691"},
                    "effect": {"substitute_country": "DE"}
                }]}"#,
        );
        let err = RateData::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("substitute country DE"));
    }

    #[test]
    fn rejects_unknown_region() {
        let json = doc(
            r#"{"code": "PT", "rates": [{"class": "standard", "history": [{"rate": "0.23"}]}],
                "postal_exceptions": [{
                    "name": "Madeira",
                    "match": {"prefix": "90"},
                    "effect": {"region": "Madeira"}
                }]}"#,
        );
        assert!(RateData::from_json(&json).is_err());
    }

    #[test]
    fn rejects_duplicate_country() {
        let one =
            r#"{"code": "DE", "rates": [{"class": "standard", "history": [{"rate": "0.19"}]}]}"#;
        let json = doc(&format!("{one}, {one}"));
        let err = RateData::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_general_class() {
        let json = doc(
            r#"{"code": "DE", "rates": [{"class": "general", "history": [{"rate": "0.19"}]}]}"#,
        );
        assert!(RateData::from_json(&json).is_err());
    }

    #[test]
    fn stock_country_is_not_active() {
        let json = doc(
            r#"{"code": "NO", "preloaded": false,
                "rates": [{"class": "standard", "history": [{"rate": "0.25"}]}]}"#,
        );
        let (table, _) = RateData::from_json(&json).unwrap().build().unwrap();
        assert!(!table.should_collect_vat("NO"));
    }

    #[test]
    fn codes_are_normalized() {
        let json = doc(
            r#"{"code": "de", "rates": [{"class": "standard", "history": [{"rate": "0.19"}]}]}"#,
        );
        let (table, _) = RateData::from_json(&json).unwrap().build().unwrap();
        assert!(table.should_collect_vat("DE"));
    }
}

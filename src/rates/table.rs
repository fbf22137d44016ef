//! Time-aware rate table keyed by country and rate class.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::core::{RateClass, RateEntry, VatError, normalize_country_code};

/// Chronologically ordered rates of one class.
///
/// Entries are strictly increasing by `effective_from`; each applies until the
/// next one starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateSeries {
    entries: Vec<RateEntry>,
}

impl RateSeries {
    /// Build a series, rejecting empty or unordered input.
    pub fn new(entries: Vec<RateEntry>) -> Result<Self, String> {
        if entries.is_empty() {
            return Err("empty rate history".into());
        }
        if let Some(pair) = entries
            .windows(2)
            .find(|w| w[0].effective_from >= w[1].effective_from)
        {
            return Err(format!(
                "entries not strictly ordered: {} >= {}",
                pair[0].effective_from, pair[1].effective_from
            ));
        }
        Ok(Self { entries })
    }

    /// A series with a single rate in force since the beginning of time.
    pub fn constant(rate: Decimal) -> Self {
        Self {
            entries: vec![RateEntry {
                effective_from: DateTime::<Utc>::MIN_UTC,
                rate,
            }],
        }
    }

    pub fn entries(&self) -> &[RateEntry] {
        &self.entries
    }

    /// Index of the entry in force at `as_of`: the greatest `effective_from`
    /// not after `as_of`.
    pub fn index_at(&self, as_of: DateTime<Utc>) -> Option<usize> {
        self.entries
            .partition_point(|e| e.effective_from <= as_of)
            .checked_sub(1)
    }

    /// Entry in force at `as_of`, or `None` if `as_of` precedes every entry.
    pub fn at(&self, as_of: DateTime<Utc>) -> Option<&RateEntry> {
        self.index_at(as_of).map(|i| &self.entries[i])
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&RateEntry> {
        self.entries.last()
    }
}

/// Rate series per class, in definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateSchedule {
    classes: Vec<(RateClass, RateSeries)>,
}

impl RateSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define or redefine a class. Redefinition keeps the class's position.
    pub fn insert(&mut self, class: RateClass, series: RateSeries) {
        match self.classes.iter_mut().find(|(c, _)| *c == class) {
            Some((_, existing)) => *existing = series,
            None => self.classes.push((class, series)),
        }
    }

    pub fn series(&self, class: RateClass) -> Option<&RateSeries> {
        self.classes
            .iter()
            .find(|(c, _)| *c == class)
            .map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RateClass, &RateSeries)> {
        self.classes.iter().map(|(c, s)| (*c, s))
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Everything the table knows about one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRateSet {
    /// Display name.
    pub name: String,
    /// EU member state flag.
    pub eu_member: bool,
    /// Class that [`RateClass::General`] stands for.
    pub default_class: RateClass,
    /// Country-level rates.
    pub rates: RateSchedule,
    /// Named regional schedules referenced by geographic exceptions.
    pub regions: Vec<(String, RateSchedule)>,
}

impl CountryRateSet {
    /// A country with just a standard rate schedule.
    pub fn new(name: impl Into<String>, eu_member: bool, rates: RateSchedule) -> Self {
        Self {
            name: name.into(),
            eu_member,
            default_class: RateClass::Standard,
            rates,
            regions: Vec::new(),
        }
    }

    pub fn region(&self, name: &str) -> Option<&RateSchedule> {
        self.regions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    fn resolve_class(&self, class: RateClass) -> RateClass {
        match class {
            RateClass::General => self.default_class,
            other => other,
        }
    }
}

/// Rates per country and class, plus stock definitions that can be added on
/// demand.
///
/// All instants are UTC. `since` dates from the rate data were converted at
/// load time using [`RateTable::timezone`], so boundaries do not depend on the
/// caller's time zone.
#[derive(Debug, Clone)]
pub struct RateTable {
    timezone: Tz,
    countries: BTreeMap<String, CountryRateSet>,
    stock: BTreeMap<String, CountryRateSet>,
}

impl RateTable {
    /// An empty table.
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            countries: BTreeMap::new(),
            stock: BTreeMap::new(),
        }
    }

    /// Table built from the embedded rate data.
    pub fn embedded() -> Result<Self, VatError> {
        super::RateData::embedded()?.build().map(|(table, _)| table)
    }

    /// Reference time zone the rate data was interpreted in.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Make `code` collectable with the given rates, replacing any previous set.
    pub fn define(&mut self, code: &str, set: CountryRateSet) {
        self.countries.insert(normalize_country_code(code), set);
    }

    /// Register a stock definition for [`RateTable::add_country`].
    pub fn define_stock(&mut self, code: &str, set: CountryRateSet) {
        self.stock.insert(normalize_country_code(code), set);
    }

    /// Activate the stock definition of `code`. Re-adding redefines the
    /// entries from stock.
    pub fn add_country(&mut self, code: &str) -> Result<(), VatError> {
        let code = normalize_country_code(code);
        let set = self
            .stock
            .get(&code)
            .cloned()
            .ok_or_else(|| VatError::NoVatRulesForCountry(code.clone()))?;
        self.countries.insert(code, set);
        Ok(())
    }

    /// Whether VAT is collected for `code`. Unknown or empty codes are `false`.
    pub fn should_collect_vat(&self, code: &str) -> bool {
        self.country(code).is_some()
    }

    /// Whether `code` is collected and an EU member state.
    pub fn should_collect_eu_vat(&self, code: &str) -> bool {
        self.country(code).is_some_and(|c| c.eu_member)
    }

    pub fn country(&self, code: &str) -> Option<&CountryRateSet> {
        self.countries.get(&normalize_country_code(code))
    }

    /// Codes of collected countries, sorted.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.countries.keys().map(String::as_str)
    }

    /// Codes with a stock definition, sorted.
    pub fn stock_countries(&self) -> impl Iterator<Item = &str> {
        self.stock.keys().map(String::as_str)
    }

    /// `class` with `General` replaced by the country's default class.
    /// Unknown countries resolve `General` to `Standard`.
    pub fn resolve_class(&self, code: &str, class: RateClass) -> RateClass {
        match self.country(code) {
            Some(set) => set.resolve_class(class),
            None if class == RateClass::General => RateClass::Standard,
            None => class,
        }
    }

    /// Rate of `class` in force at `as_of`.
    ///
    /// `None` means no applicable rate (unknown country, undefined class, or
    /// `as_of` before the first entry); callers treat it as zero.
    pub fn lookup(&self, code: &str, class: RateClass, as_of: DateTime<Utc>) -> Option<Decimal> {
        let set = self.country(code)?;
        set.rates
            .series(set.resolve_class(class))?
            .at(as_of)
            .map(|e| e.rate)
    }

    /// Rate of `class` in the named region of `code` at `as_of`. `None` when
    /// the region does not define the class.
    pub fn region_lookup(
        &self,
        code: &str,
        region: &str,
        class: RateClass,
        as_of: DateTime<Utc>,
    ) -> Option<Decimal> {
        let set = self.country(code)?;
        set.region(region)?
            .series(set.resolve_class(class))?
            .at(as_of)
            .map(|e| e.rate)
    }

    /// Latest rate of every class defined for `code`, in definition order.
    pub fn list_all_rates(&self, code: &str) -> Result<Vec<Decimal>, VatError> {
        let set = self.require(code)?;
        Ok(set
            .rates
            .iter()
            .filter_map(|(_, series)| series.latest().map(|e| e.rate))
            .collect())
    }

    /// Every distinct rate ever defined for `code`, including region rates,
    /// in first-seen order. Rates coming from postal exceptions are added by
    /// [`RateResolver::all_known_rates`](super::RateResolver::all_known_rates).
    pub fn all_known_rates(&self, code: &str) -> Result<Vec<Decimal>, VatError> {
        let set = self.require(code)?;
        let schedules = std::iter::once(&set.rates).chain(set.regions.iter().map(|(_, s)| s));
        let mut rates: Vec<Decimal> = Vec::new();
        for schedule in schedules {
            for (_, series) in schedule.iter() {
                for entry in series.entries() {
                    if !rates.contains(&entry.rate) {
                        rates.push(entry.rate);
                    }
                }
            }
        }
        Ok(rates)
    }

    fn require(&self, code: &str) -> Result<&CountryRateSet, VatError> {
        self.country(code)
            .ok_or_else(|| VatError::UnsupportedCountry(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn series() -> RateSeries {
        RateSeries::new(vec![
            RateEntry {
                effective_from: at(2000, 1, 1),
                rate: dec!(0.19),
            },
            RateEntry {
                effective_from: at(2020, 7, 1),
                rate: dec!(0.16),
            },
            RateEntry {
                effective_from: at(2021, 1, 1),
                rate: dec!(0.19),
            },
        ])
        .unwrap()
    }

    fn table() -> RateTable {
        let mut rates = RateSchedule::new();
        rates.insert(RateClass::Standard, series());
        rates.insert(RateClass::Reduced, RateSeries::constant(dec!(0.07)));
        let mut table = RateTable::new(chrono_tz::Europe::Berlin);
        table.define("de", CountryRateSet::new("Germany", true, rates));

        let mut stock = RateSchedule::new();
        stock.insert(RateClass::Standard, RateSeries::constant(dec!(0.25)));
        table.define_stock("NO", CountryRateSet::new("Norway", false, stock));
        table
    }

    #[test]
    fn series_lookup_picks_latest_not_after() {
        let s = series();
        assert_eq!(s.at(at(2020, 6, 30)).unwrap().rate, dec!(0.19));
        assert_eq!(s.at(at(2020, 7, 1)).unwrap().rate, dec!(0.16));
        assert_eq!(s.at(at(2020, 12, 31)).unwrap().rate, dec!(0.16));
        assert_eq!(s.at(at(2021, 1, 1)).unwrap().rate, dec!(0.19));
    }

    #[test]
    fn series_before_first_entry() {
        assert!(series().at(at(1999, 12, 31)).is_none());
        assert_eq!(series().index_at(at(1999, 12, 31)), None);
    }

    #[test]
    fn series_rejects_unordered() {
        let err = RateSeries::new(vec![
            RateEntry {
                effective_from: at(2021, 1, 1),
                rate: dec!(0.19),
            },
            RateEntry {
                effective_from: at(2021, 1, 1),
                rate: dec!(0.16),
            },
        ])
        .unwrap_err();
        assert!(err.contains("strictly ordered"));
        assert!(RateSeries::new(Vec::new()).is_err());
    }

    #[test]
    fn general_uses_default_class() {
        let t = table();
        assert_eq!(t.lookup("DE", RateClass::General, at(2024, 1, 1)), Some(dec!(0.19)));
        assert_eq!(t.resolve_class("DE", RateClass::General), RateClass::Standard);
        assert_eq!(t.resolve_class("XX", RateClass::General), RateClass::Standard);
    }

    #[test]
    fn undefined_class_has_no_rate() {
        let t = table();
        assert_eq!(t.lookup("DE", RateClass::Parking, at(2024, 1, 1)), None);
        assert_eq!(t.lookup("XX", RateClass::Standard, at(2024, 1, 1)), None);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let t = table();
        assert_eq!(t.lookup("de", RateClass::Reduced, at(2024, 1, 1)), Some(dec!(0.07)));
        assert!(t.should_collect_vat(" De "));
    }

    #[test]
    fn add_country_from_stock() {
        let mut t = table();
        assert!(!t.should_collect_vat("NO"));
        t.add_country("no").unwrap();
        assert!(t.should_collect_vat("NO"));
        assert!(!t.should_collect_eu_vat("NO"));
        // idempotent
        t.add_country("NO").unwrap();
        assert_eq!(t.lookup("NO", RateClass::General, at(2024, 1, 1)), Some(dec!(0.25)));
    }

    #[test]
    fn add_unknown_country_fails() {
        let mut t = table();
        let err = t.add_country("yEs").unwrap_err();
        assert!(matches!(err, VatError::NoVatRulesForCountry(ref c) if c == "YES"));
        assert!(!t.should_collect_vat("YES"));
    }

    #[test]
    fn list_all_rates_in_definition_order() {
        let t = table();
        assert_eq!(t.list_all_rates("DE").unwrap(), vec![dec!(0.19), dec!(0.07)]);
        assert_eq!(
            t.all_known_rates("DE").unwrap(),
            vec![dec!(0.19), dec!(0.16), dec!(0.07)]
        );
        assert!(matches!(t.list_all_rates("XX"), Err(VatError::UnsupportedCountry(_))));
    }

    #[test]
    fn schedule_redefinition_keeps_position() {
        let mut s = RateSchedule::new();
        s.insert(RateClass::Standard, RateSeries::constant(dec!(0.20)));
        s.insert(RateClass::Reduced, RateSeries::constant(dec!(0.10)));
        s.insert(RateClass::Standard, RateSeries::constant(dec!(0.21)));
        let classes: Vec<RateClass> = s.iter().map(|(c, _)| c).collect();
        assert_eq!(classes, vec![RateClass::Standard, RateClass::Reduced]);
        assert_eq!(s.series(RateClass::Standard).unwrap().latest().unwrap().rate, dec!(0.21));
    }
}

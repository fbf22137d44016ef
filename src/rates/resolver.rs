//! Rate resolution: reverse charge, then postal exceptions, then the table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::geo::{GeoEffect, GeoExceptionResolver, normalize_postal_code};
use super::table::RateTable;
use crate::core::{
    CalculationResult, Clock, RateBasis, RateClass, RateResolution, SystemClock, VatError,
    from_gross, from_net, normalize_country_code,
};

/// Inputs of one rate resolution.
///
/// ```
/// use vatcalc::rates::RateQuery;
/// use vatcalc::core::RateClass;
///
/// let query = RateQuery::new("PT")
///     .postal_code("9000-123")
///     .rate_class(RateClass::Reduced);
/// assert_eq!(query.postal_code.as_deref(), Some("9000-123"));
/// assert!(!query.is_business);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateQuery {
    /// Buyer country (ISO 3166-1 alpha-2, any case).
    pub country: String,
    pub postal_code: Option<String>,
    /// Buyer is a business (B2B sale).
    pub is_business: bool,
    pub rate_class: RateClass,
    /// Instant the rate is wanted for; `None` means the resolver's clock.
    pub as_of: Option<DateTime<Utc>>,
}

impl RateQuery {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            postal_code: None,
            is_business: false,
            rate_class: RateClass::General,
            as_of: None,
        }
    }

    pub fn postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    pub fn maybe_postal_code(mut self, postal_code: Option<&str>) -> Self {
        self.postal_code = postal_code.map(str::to_string);
        self
    }

    pub fn business(mut self, is_business: bool) -> Self {
        self.is_business = is_business;
        self
    }

    pub fn rate_class(mut self, rate_class: RateClass) -> Self {
        self.rate_class = rate_class;
        self
    }

    pub fn as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = Some(as_of);
        self
    }
}

/// Resolves the VAT rate for a transaction.
///
/// Order of precedence:
/// 1. B2B sale to a country other than the seller's: reverse charge, zero.
/// 2. Matching postal exception: excluded (zero), substitute country's
///    table, or regional schedule.
/// 3. The country's rate table; no applicable rate means zero.
///
/// Resolution never fails.
pub struct RateResolver {
    table: RateTable,
    geo: GeoExceptionResolver,
    clock: Box<dyn Clock>,
    business_country: Option<String>,
}

impl std::fmt::Debug for RateResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateResolver")
            .field("countries", &self.table.countries().collect::<Vec<_>>())
            .field("timezone", &self.table.timezone())
            .field("business_country", &self.business_country)
            .finish_non_exhaustive()
    }
}

impl RateResolver {
    pub fn new(table: RateTable, geo: GeoExceptionResolver) -> Self {
        Self {
            table,
            geo,
            clock: Box::new(SystemClock),
            business_country: None,
        }
    }

    /// Resolver over the embedded rate data.
    pub fn embedded() -> Result<Self, VatError> {
        let (table, geo) = super::RateData::embedded()?.build()?;
        Ok(Self::new(table, geo))
    }

    /// Replace the clock used when a query has no `as_of`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_business_country(mut self, code: &str) -> Self {
        self.set_business_country(Some(code));
        self
    }

    /// Set the seller's country. B2B sales into it are charged VAT.
    pub fn set_business_country(&mut self, code: Option<&str>) {
        self.business_country = code.map(normalize_country_code).filter(|c| !c.is_empty());
    }

    pub fn business_country(&self) -> Option<&str> {
        self.business_country.as_deref()
    }

    pub fn table(&self) -> &RateTable {
        &self.table
    }

    pub fn geo(&self) -> &GeoExceptionResolver {
        &self.geo
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn should_collect_vat(&self, country: &str) -> bool {
        self.table.should_collect_vat(country)
    }

    pub fn should_collect_eu_vat(&self, country: &str) -> bool {
        self.table.should_collect_eu_vat(country)
    }

    /// Add a stock country and activate its postal exceptions.
    pub fn add_country(&mut self, code: &str) -> Result<(), VatError> {
        self.table.add_country(code)?;
        let exceptions = self.geo.activate(code);
        info!(country = %normalize_country_code(code), exceptions, "added VAT country");
        Ok(())
    }

    /// Every distinct rate a sale into `code` can be charged, in first-seen
    /// order: the table's rates (see [`RateTable::all_known_rates`]), then 0
    /// for excluded territories and the substitute country's rates for
    /// enclaves.
    pub fn all_known_rates(&self, code: &str) -> Result<Vec<Decimal>, VatError> {
        let mut rates = self.table.all_known_rates(code)?;
        let mut push = |rate: Decimal| {
            if !rates.contains(&rate) {
                rates.push(rate);
            }
        };
        for exception in self.geo.exceptions(code) {
            match &exception.effect {
                GeoEffect::ExcludeFromVat => push(Decimal::ZERO),
                GeoEffect::SubstituteCountry(substitute) => {
                    // a substitute that is not collected contributes nothing
                    for rate in self.table.all_known_rates(substitute).unwrap_or_default() {
                        push(rate);
                    }
                }
                GeoEffect::Region(_) => {}
            }
        }
        Ok(rates)
    }

    fn is_reverse_charge(&self, country: &str) -> bool {
        match &self.business_country {
            Some(own) => own != country,
            None => true,
        }
    }

    /// Resolve the rate for `query`.
    pub fn resolve(&self, query: &RateQuery) -> RateResolution {
        let country = normalize_country_code(&query.country);
        let as_of = query.as_of.unwrap_or_else(|| self.clock.now());
        let class = self.table.resolve_class(&country, query.rate_class);

        let resolution = if query.is_business && self.is_reverse_charge(&country) {
            RateResolution::zero(class, &country, RateBasis::ReverseCharge)
        } else {
            let postal = query.postal_code.as_deref().map(normalize_postal_code);
            match self.geo.match_postal_code(&country, postal.as_deref()) {
                Some(exception) => {
                    debug!(
                        country = %country,
                        territory = %exception.name,
                        "postal exception applies"
                    );
                    match &exception.effect {
                        GeoEffect::ExcludeFromVat => {
                            RateResolution::zero(class, &country, RateBasis::Excluded)
                        }
                        GeoEffect::SubstituteCountry(substitute) => {
                            let substitute = normalize_country_code(substitute);
                            self.from_table(&substitute, query.rate_class, as_of)
                        }
                        GeoEffect::Region(region) => {
                            match self.table.region_lookup(&country, region, class, as_of) {
                                Some(rate) => RateResolution {
                                    rate,
                                    rate_class: class,
                                    source_country: country.clone(),
                                    basis: RateBasis::Region(region.clone()),
                                },
                                None => self.from_table(&country, query.rate_class, as_of),
                            }
                        }
                    }
                }
                None => self.from_table(&country, query.rate_class, as_of),
            }
        };

        debug!(
            country = %country,
            source = %resolution.source_country,
            class = %resolution.rate_class,
            rate = %resolution.rate,
            basis = ?resolution.basis,
            "resolved VAT rate"
        );
        resolution
    }

    fn from_table(&self, country: &str, class: RateClass, as_of: DateTime<Utc>) -> RateResolution {
        let resolved = self.table.resolve_class(country, class);
        match self.table.lookup(country, class, as_of) {
            Some(rate) => RateResolution {
                rate,
                rate_class: resolved,
                source_country: country.to_string(),
                basis: RateBasis::Table,
            },
            None => RateResolution::zero(resolved, country, RateBasis::NotCollected),
        }
    }

    /// Resolved rate only.
    pub fn rate(&self, query: &RateQuery) -> Decimal {
        self.resolve(query).rate
    }

    /// Price breakdown for a net amount. Panics on `Decimal` overflow like
    /// [`from_net`](crate::core::from_net).
    pub fn calculate(&self, net: Decimal, query: &RateQuery) -> CalculationResult {
        from_net(net, self.rate(query))
    }

    /// Price breakdown for a gross amount. Panics on `Decimal` overflow like
    /// [`from_gross`](crate::core::from_gross).
    pub fn calculate_net(&self, gross: Decimal, query: &RateQuery) -> CalculationResult {
        from_gross(gross, self.rate(query))
    }
}

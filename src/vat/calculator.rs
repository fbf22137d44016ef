//! One entry point for pricing and VAT number checks.

use rust_decimal::Decimal;

use super::checker::VatChecker;
use super::validator::{VatNumberDetails, VatNumberValidator};
use crate::core::{CalculationResult, CalculatorConfig, Clock, RateResolution, VatError};
use crate::rates::{RateData, RateQuery, RateResolver};

/// Rate resolution plus VAT number validation against one rate table.
///
/// ```
/// use rust_decimal_macros::dec;
/// use vatcalc::rates::RateQuery;
/// use vatcalc::vat::{OfflineChecker, VatCalculator};
///
/// let mut calc = VatCalculator::embedded(OfflineChecker).unwrap();
/// assert!(!calc.should_collect_vat("NO"));
/// calc.add_country("NO").unwrap();
/// assert!(calc.should_collect_vat("NO"));
/// assert!(!calc.should_collect_eu_vat("NO"));
///
/// let result = calc.calculate(dec!(100), &RateQuery::new("NO"));
/// assert_eq!(result.price, dec!(125.00));
/// ```
#[derive(Debug)]
pub struct VatCalculator<C> {
    resolver: RateResolver,
    validator: VatNumberValidator<C>,
}

impl<C: VatChecker> VatCalculator<C> {
    pub fn new(resolver: RateResolver, checker: C) -> Self {
        Self {
            resolver,
            validator: VatNumberValidator::new(checker),
        }
    }

    /// Calculator over the embedded rate data.
    pub fn embedded(checker: C) -> Result<Self, VatError> {
        Ok(Self::new(RateResolver::embedded()?, checker))
    }

    /// Calculator over the embedded rate data with `config` applied.
    pub fn from_config(config: &CalculatorConfig, checker: C) -> Result<Self, VatError> {
        let mut data = RateData::embedded()?;
        if let Some(tz) = &config.timezone {
            data.set_timezone(tz)?;
        }
        let (table, geo) = data.build()?;
        let mut calc = Self::new(RateResolver::new(table, geo), checker);
        for code in &config.extra_countries {
            calc.add_country(code)?;
        }
        if let Some(code) = &config.business_country_code {
            calc.set_business_country_code(code);
        }
        if let Some(vat_number) = &config.business_vat_number {
            calc.set_business_vat_number(vat_number)?;
        }
        Ok(calc)
    }

    /// Replace the clock used for queries without `as_of`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.resolver = self.resolver.with_clock(clock);
        self
    }

    pub fn resolver(&self) -> &RateResolver {
        &self.resolver
    }

    pub fn validator(&self) -> &VatNumberValidator<C> {
        &self.validator
    }

    /// Price breakdown for a net amount. Panics on `Decimal` overflow like
    /// [`from_net`](crate::core::from_net).
    pub fn calculate(&self, net: Decimal, query: &RateQuery) -> CalculationResult {
        self.resolver.calculate(net, query)
    }

    /// Price breakdown for a gross amount. Panics on `Decimal` overflow like
    /// [`from_gross`](crate::core::from_gross).
    pub fn calculate_net(&self, gross: Decimal, query: &RateQuery) -> CalculationResult {
        self.resolver.calculate_net(gross, query)
    }

    pub fn tax_rate_for_location(&self, query: &RateQuery) -> Decimal {
        self.resolver.rate(query)
    }

    pub fn resolve(&self, query: &RateQuery) -> RateResolution {
        self.resolver.resolve(query)
    }

    pub fn should_collect_vat(&self, country: &str) -> bool {
        self.resolver.should_collect_vat(country)
    }

    pub fn should_collect_eu_vat(&self, country: &str) -> bool {
        self.resolver.should_collect_eu_vat(country)
    }

    pub fn add_country(&mut self, code: &str) -> Result<(), VatError> {
        self.resolver.add_country(code)
    }

    /// Every rate a sale into `code` can be charged, postal exceptions included.
    pub fn all_known_rates(&self, code: &str) -> Result<Vec<Decimal>, VatError> {
        self.resolver.all_known_rates(code)
    }

    /// Seller's country of establishment, for the reverse-charge decision.
    pub fn set_business_country_code(&mut self, code: &str) {
        self.resolver.set_business_country(Some(code));
    }

    /// Seller's VAT number, sent as requester on registry checks.
    pub fn set_business_vat_number(&mut self, vat_number: &str) -> Result<(), VatError> {
        self.validator.set_requester(Some(vat_number))
    }

    pub fn vat_details(&self, vat_number: &str) -> Result<VatNumberDetails, VatError> {
        self.validator.vat_details(self.resolver.table(), vat_number)
    }

    pub fn vat_details_for_requester(
        &self,
        vat_number: &str,
        requester: &str,
    ) -> Result<VatNumberDetails, VatError> {
        self.validator
            .vat_details_for_requester(self.resolver.table(), vat_number, requester)
    }

    pub fn is_valid_vat_number(&self, vat_number: &str) -> Result<bool, VatError> {
        self.validator.is_valid(self.resolver.table(), vat_number)
    }
}

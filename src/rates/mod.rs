//! VAT rate data, postal exceptions, and rate resolution.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use chrono_tz::Europe::Berlin;
//! use rust_decimal_macros::dec;
//! use vatcalc::rates::{RateQuery, RateResolver};
//!
//! let resolver = RateResolver::embedded().unwrap();
//! let before = Berlin.with_ymd_and_hms(2020, 6, 30, 23, 59, 59).unwrap().with_timezone(&Utc);
//! let after = Berlin.with_ymd_and_hms(2020, 7, 1, 0, 0, 0).unwrap().with_timezone(&Utc);
//!
//! assert_eq!(resolver.rate(&RateQuery::new("DE").as_of(before)), dec!(0.19));
//! assert_eq!(resolver.rate(&RateQuery::new("DE").as_of(after)), dec!(0.16));
//! // Heligoland is outside the VAT area
//! assert_eq!(resolver.rate(&RateQuery::new("DE").postal_code("27498").as_of(after)), dec!(0));
//! ```

mod data;
mod geo;
mod resolver;
mod table;

pub use data::RateData;
pub use geo::{GeoEffect, GeoException, GeoExceptionResolver, PostalPattern, normalize_postal_code};
pub use resolver::{RateQuery, RateResolver};
pub use table::{CountryRateSet, RateSchedule, RateSeries, RateTable};

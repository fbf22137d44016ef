//! Core types, errors, clock, amount arithmetic, and configuration.
//!
//! Everything here is independent of the rate data and of the VAT registry.

pub mod amount;
mod clock;
mod config;
pub mod countries;
mod error;
mod types;

pub use amount::{checked_from_gross, checked_from_net, from_gross, from_net};
pub use clock::*;
pub use config::*;
pub use countries::{
    EU_MEMBER_STATES, country_for_vat_prefix, is_eu_member_state, normalize_country_code,
    vat_prefix_for_country,
};
pub use error::*;
pub use types::*;

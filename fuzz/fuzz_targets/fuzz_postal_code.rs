#![no_main]

use libfuzzer_sys::fuzz_target;
use vatcalc::rates::{RateQuery, RateResolver};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(resolver) = RateResolver::embedded() else {
        return;
    };
    let (country, postal) = s.split_at(s.char_indices().nth(2).map_or(s.len(), |(i, _)| i));
    let rate = resolver.rate(&RateQuery::new(country).postal_code(postal));
    assert!(!rate.is_sign_negative());
});

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // errors are fine, panics are bugs
        if let Ok(doc) = vatcalc::rates::RateData::from_json(s) {
            let _ = doc.build();
        }
    }
});

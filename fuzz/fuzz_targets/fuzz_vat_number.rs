#![no_main]

use libfuzzer_sys::fuzz_target;
use vatcalc::VatError;
use vatcalc::vat::VatNumber;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        match VatNumber::parse(s) {
            Ok(n) => assert!(n.prefix().len() <= 2),
            Err(VatError::InvalidCharsInVatNumber { invalid, .. }) => {
                assert!(!invalid.is_empty());
                for c in &invalid {
                    assert!(s[c.offset..].starts_with(c.ch));
                }
            }
            Err(_) => {}
        }
    }
});

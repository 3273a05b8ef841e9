#![no_main]

use gate_types::{Survey, WalletAddress};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Survey documents from untrusted JSON: validation must never panic.
    if let Ok(survey) = serde_json::from_slice::<Survey>(data) {
        let _ = survey.validate();
        let _ = survey.access.is_open();
    }

    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(wallet) = WalletAddress::new(text) {
            assert!(wallet.matches(&wallet));
        }
    }
});

//! Fuzz target for CTCP body parsing

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_conn::Ctcp;

fuzz_target!(|data: &[u8]| {
    if let Ok(body) = std::str::from_utf8(data) {
        if let Some(ctcp) = Ctcp::parse(body) {
            assert!(!ctcp.sub.contains(' '));
        }
    }
});

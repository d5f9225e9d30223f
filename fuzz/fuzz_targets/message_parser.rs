//! Fuzz target for IRC message decoding
//!
//! Anything that decodes must encode again (or be rejected with an error),
//! and re-decoding the encoded line must give back the same message.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_conn::{IrcEncode, Message};
use std::str;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = str::from_utf8(data) else {
        return;
    };
    if input.contains(['\r', '\n', '\0']) {
        return;
    }

    let Ok(msg) = input.parse::<Message>() else {
        return;
    };
    // middle parameters with a leading ':' or an empty command are legal
    // to decode but not to encode
    if let Ok(bytes) = msg.to_bytes() {
        let line = str::from_utf8(&bytes).expect("encoder writes UTF-8");
        let again: Message = line.parse().expect("encoded line decodes");
        assert_eq!(msg, again);
    }
});

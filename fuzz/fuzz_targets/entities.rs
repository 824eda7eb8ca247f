#![no_main]

use html::{decode_entities, encode_entities};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let decoded = decode_entities(text);
    assert_eq!(decode_entities(&encode_entities(&decoded)), decoded);
});

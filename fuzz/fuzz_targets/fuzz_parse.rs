#![no_main]
use libfuzzer_sys::fuzz_target;
use xmltrip::{parse_bytes, Config};

fuzz_target!(|data: &[u8]| {
    // Parsing arbitrary bytes and serializing in every mode should never panic.
    if let Ok(doc) = parse_bytes(data) {
        let _ = doc.to_xml_with(&Config::pretty());
        let _ = doc.to_xml_with(&Config::minimal());
        let mut out = Vec::new();
        let _ = doc.write_bytes(&mut out, None);
    }
});

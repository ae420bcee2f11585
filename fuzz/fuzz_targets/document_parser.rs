#![no_main]
use libfuzzer_sys::fuzz_target;
use panconf::Document;

fuzz_target!(|data: &[u8]| {
    if let Ok(doc) = Document::parse_bytes(data) {
        let _ = doc.version();
        let _ = doc.is_centralized_management();
        let _ = doc.is_multi_tenant();
    }
});

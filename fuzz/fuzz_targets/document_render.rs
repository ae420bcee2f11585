#![no_main]
use libfuzzer_sys::fuzz_target;
use panconf::{Document, Format, RenderOptions};

fuzz_target!(|data: &[u8]| {
    if let Ok(doc) = Document::parse_bytes(data) {
        let options = RenderOptions::default()
            .with_prefix("set ")
            .with_member_list(true);
        for format in Format::ALL {
            let _ = doc.render(format, None, &options);
        }
        // rendered XML must parse back into the same tree
        if let Ok(Some(xml)) = doc.xml(None) {
            if let Ok(reparsed) = Document::parse(&xml) {
                assert_eq!(reparsed.root(), doc.root());
            }
        }
    }
});

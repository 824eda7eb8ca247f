#![no_main]

use content::{build_document_model, restore_wrappers};
use html::Document;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let mut doc = Document::parse(input);
    let pristine = doc.inner_html(doc.root());
    let model = build_document_model(&mut doc);
    for (_, group) in model.iter() {
        assert!(!group.is_empty());
    }
    restore_wrappers(&mut doc, &model.uuids());
    assert_eq!(doc.inner_html(doc.root()), pristine);
});

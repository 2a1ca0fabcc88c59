#![no_main]

use libfuzzer_sys::fuzz_target;
use yaml12::{Error, TagHandlers, Value};

// Composite keys must stay reachable through a freshly built key with the same structure.
fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }
    let s = String::from_utf8_lossy(data);
    let text = format!("? [{s}]\n: found\n");

    let handlers = TagHandlers::<Error>::new().with("!wrap", |t| Ok(Value::from(vec![t.into_value()])));
    let Ok(value) = yaml12::parse_with_handlers(&text, &handlers) else {
        return;
    };
    let Some(mapping) = value.as_mapping() else {
        return;
    };
    for key in mapping.keys() {
        let probe = Value::key(key.unkeyed().clone());
        assert!(mapping.contains_key(&probe));
    }
});

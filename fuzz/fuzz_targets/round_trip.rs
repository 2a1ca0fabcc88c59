#![no_main]

use libfuzzer_sys::fuzz_target;

// Anything the parser accepts must format into text that parses back to equal values.
fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(values) = yaml12::parse_multi(text) else {
        return;
    };
    let Ok(out) = yaml12::format_multi(&values) else {
        return;
    };
    match yaml12::parse_multi(&out) {
        Ok(reparsed) => assert_eq!(reparsed, values, "round trip changed the value:\n{out}"),
        Err(err) => panic!("emitted invalid YAML ({err}):\n{out}"),
    }
});

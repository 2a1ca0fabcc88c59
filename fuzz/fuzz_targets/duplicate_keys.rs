#![no_main]

use libfuzzer_sys::fuzz_target;
use yaml12::options::DuplicateKeyPolicy;

// Builds mappings with intentional duplicates, both literal and structural, and runs them
// through every duplicate-key policy.
fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }
    let s = String::from_utf8_lossy(data);

    let docs = [
        format!("a: 1\na: 2\nkey: {s}\nkey: {s}\n"),
        format!("outer:\n  inner: {{x: 1, x: 2}}\n  arr: [{{k: {s}}}, {{k: {s}}}]\n"),
        format!("{{'{s}': 1, '{s}': 2}}\n"),
        format!("? {{a: {s}, b: 1}}\n: 1\n? {{b: 1, a: {s}}}\n: 2\n"),
    ];

    let handlers = yaml12::TagHandlers::<yaml12::Error>::new();
    for policy in [
        DuplicateKeyPolicy::Error,
        DuplicateKeyPolicy::FirstWins,
        DuplicateKeyPolicy::LastWins,
    ] {
        let options = yaml12::options! { duplicate_keys: policy };
        for doc in &docs {
            let _ = yaml12::parse_with_options(doc, &handlers, options.clone());
        }
    }
});

#![no_main]

use libfuzzer_sys::fuzz_target;

// Repeats the input into long plain, quoted and block scalars under a tight byte budget.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() || data.len() > 4 * 1024 {
        return;
    }
    let s = String::from_utf8_lossy(data);
    let long = s.repeat(64);

    let docs = [
        format!("plain: {long}\n"),
        format!("quoted: \"{long}\"\n"),
        format!("block: |\n  {}\n", long.replace('\n', "\n  ")),
        format!("? {long}\n: long key\n"),
    ];

    let options = yaml12::options! {
        budget: Some(yaml12::budget! { max_total_scalar_bytes: 128 * 1024 }),
    };
    let handlers = yaml12::TagHandlers::<yaml12::Error>::new();
    for doc in &docs {
        if let Ok(value) = yaml12::parse_with_options(doc, &handlers, options.clone()) {
            let _ = yaml12::format(&value);
        }
    }
});

#![no_main]

use libfuzzer_sys::fuzz_target;

// Wraps fuzzed fragments into anchor/alias shapes, including self references and
// aliased collections used as keys.
fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }
    let s = String::from_utf8_lossy(data);

    let docs = [
        format!("base: &a {s}\ncopy: *a\n? *a\n: key\n"),
        format!("&a [{s}, *a]\n"),
        format!("a: &x [{s}, {s}]\nb: &y [*x, *x, *x]\nc: [*y, *y, *y, *y]\n"),
        format!("? &k {{{s}: 1}}\n: v\n? *k\n: w\n"),
    ];

    let mut options = yaml12::Options::default();
    options.alias_limits.max_total_expanded_nodes = 10_000;
    options.alias_limits.max_alias_expansions_per_anchor = 64;
    let handlers = yaml12::TagHandlers::<yaml12::Error>::new();
    for doc in &docs {
        let _ = yaml12::parse_with_options(doc, &handlers, options.clone());
    }
});

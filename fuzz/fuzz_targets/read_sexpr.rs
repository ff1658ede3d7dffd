#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        for source in [s.to_string(), dotlisp::desugar::desugar(s)] {
            if let Ok(parsed) = dotlisp::parser::parse(&source) {
                // Canonical printing must read back to the same tree
                let printed = parsed.to_string();
                assert_eq!(dotlisp::parser::parse(&printed).ok(), Some(parsed));
            }
        }
    }
});

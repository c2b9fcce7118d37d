// SPDX-License-Identifier: AGPL-3.0-or-later
#![no_main]

use cramdoc_core::{build, flatten, tokenize, SequentialIds};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let ids = SequentialIds::new();
    let doc = build(&tokenize(text, &ids), &ids);
    assert!(!doc.content.is_empty());

    let rebuilt = build(&flatten(&doc, &ids), &ids);
    assert!(!rebuilt.content.is_empty());
});

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use archescan::annotator::guess_name;
use archescan::store::sanitize_filename;
use archescan::videos::{embed_url, EMBED_BASE};

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    url: &'a str,
    filename: &'a str,
    summary: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    if let Some(embed) = embed_url(input.url) {
        let id = &embed[EMBED_BASE.len()..];
        assert!(!id.is_empty());
    }

    if let Ok(name) = sanitize_filename(input.filename) {
        assert!(!name.contains('/') && !name.contains('\\'));
        assert!(name != "." && name != "..");
    }

    assert!(!guess_name(input.summary).contains('\n'));
});

// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

const PUNCTUATION: &str = "，。！？；：“”‘’（）【】《》、,.!?;:\"'()[]<>";

/// Character counts for a piece of prose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    /// Characters excluding whitespace.
    pub total: u64,
    /// `total` minus CJK and ASCII punctuation.
    pub no_punctuation: u64,
}

impl WordCount {
    pub fn of(text: &str) -> Self {
        let mut wc = WordCount::default();
        for c in text.chars().filter(|c| !c.is_whitespace()) {
            wc.total += 1;
            if !PUNCTUATION.contains(c) {
                wc.no_punctuation += 1;
            }
        }
        wc
    }
}

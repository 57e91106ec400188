// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::OnceLock;

use regex::Regex;

fn dots_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.{3,}").expect("literal regex"))
}

fn ellipsis_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"…{2,}").expect("literal regex"))
}

fn han_then_alnum_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([\x{4e00}-\x{9fff}])([A-Za-z0-9])").expect("literal regex"))
}

fn alnum_then_han_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([A-Za-z0-9])([\x{4e00}-\x{9fff}])").expect("literal regex"))
}

/// Convert `\r\n` and lone `\r` to `\n`.
pub fn standardize_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Three or more ASCII dots, or two or more `…`, become the CJK ellipsis `……`.
pub fn standardize_ellipsis(text: &str) -> String {
    let text = dots_re().replace_all(text, "……");
    ellipsis_run_re().replace_all(&text, "……").into_owned()
}

/// Insert a single space at every boundary between a Han character and an
/// ASCII letter or digit.
pub fn smart_spacing(text: &str) -> String {
    let text = han_then_alnum_re().replace_all(text, "$1 $2");
    alnum_then_han_re().replace_all(&text, "$1 $2").into_owned()
}

/// Prefix every non-empty line with `width` spaces.  Existing leading
/// whitespace is replaced, not stacked.
pub fn indent_paragraphs(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{pad}{}", line.trim_start())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse runs of blank lines to a single empty line.
pub fn compress_empty_lines(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut last_empty = false;
    for line in text.split('\n') {
        if line.trim().is_empty() {
            if !last_empty {
                out.push("");
                last_empty = true;
            }
        } else {
            out.push(line);
            last_empty = false;
        }
    }
    out.join("\n")
}

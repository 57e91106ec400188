// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! A second pass over formatted output must never report a change.

use quill_format::{reformat, FormatOptions, LayoutMode};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Characters that interact with one or more pipeline steps: terminators,
/// block delimiters, ellipses and dots, every kind of whitespace, and both
/// CJK and ASCII letters for the spacing rule.
const ALPHABET: &[char] = &[
    '甲', '乙', '他', '。', '？', '！', '，', '“', '”', '‘', '’', '【', '】',
    '…', '.', ' ', '\r', '\n', '\u{3000}', '\t', 'a', 'Z', '3', 'é', '—',
];

const CASES: usize = 4000;
const MAX_LEN: usize = 24;

fn all_options() -> Vec<FormatOptions> {
    let mut out = Vec::new();
    for mode in [LayoutMode::Simple, LayoutMode::Segment] {
        for indent in [0u8, 2, 4] {
            for smart_spacing in [true, false] {
                for ellipsis_standardization in [true, false] {
                    out.push(FormatOptions {
                        layout_mode: mode,
                        indent,
                        smart_spacing,
                        ellipsis_standardization,
                        ..FormatOptions::default()
                    });
                }
            }
        }
    }
    out.push(FormatOptions {
        line_break_standardization: false,
        preserve_empty_lines: true,
        ..FormatOptions::default()
    });
    out
}

fn random_text(rng: &mut StdRng) -> String {
    let len = rng.gen_range(0..=MAX_LEN);
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect()
}

fn assert_settles(input: &str, opts: &FormatOptions) {
    let first = reformat(input, opts);
    let second = reformat(&first.text, opts);
    assert!(
        !second.changed(),
        "second pass changed {input:?} with {opts:?}:\n{:?}\n->\n{:?}",
        first.text,
        second.text
    );
    assert_eq!(second.text, first.text);
}

#[test]
fn reformat_is_idempotent_on_generated_text() {
    let options = all_options();
    let mut rng = StdRng::seed_from_u64(0x9E37_79B9);
    for _ in 0..CASES {
        let input = random_text(&mut rng);
        for opts in &options {
            assert_settles(&input, opts);
        }
    }
}

#[test]
fn reformat_is_idempotent_on_known_hard_inputs() {
    let inputs = [
        "",
        "   ",
        "等等…… ……",
        "？“。乙【………\r…Z\r",
        "他说“12345…… ……”。",
        "a... b",
        "他转身离开。\r\n\r\n\r\n她笑了……\r\n",
        "他说：“今天的天气真的非常非常好。”她点头。然后……他们走了...",
        "【系统提示：任务已经完成，奖励已发放。】他笑了！！真的吗？",
        "第3章 使用Rust写作，hello world。Then we leave. 然后呢",
        "    已经缩进的段落。\n\n    第二段。",
        "‘短’句。“没完的引号。后面还有",
        "中a中a。e.g. café au lait。",
    ];
    for opts in all_options() {
        for input in inputs {
            assert_settles(input, &opts);
        }
    }
}

#[test]
fn segment_scenario_two_sentences() {
    let out = reformat("他转身离开。她没有回头。", &FormatOptions::default());
    assert!(out.diff.changed);
    assert!(out.diff.changed_lines >= 1);
    assert!(out.text.contains("他转身离开。\n\n"));
}

#[test]
fn switching_modes_is_a_change() {
    let segment = reformat("甲。乙。", &FormatOptions::default());
    let simple = reformat(&segment.text, &FormatOptions::default().with_mode(LayoutMode::Simple));
    assert!(simple.changed());
    assert_eq!(simple.text, "  甲。\n  乙。");
}

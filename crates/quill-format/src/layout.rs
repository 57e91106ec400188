// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Block-aware paragraph segmentation.
//!
//! A *block* is a curly-quoted span (`“…”`, `‘…’`) or a `【…】` bracket.
//! Blocks whose inner text is longer than [`LONG_BLOCK_CHARS`] characters
//! become paragraphs of their own; shorter blocks stay inline with the
//! surrounding sentence.  Sentence terminators inside a block never split it.

use std::sync::OnceLock;

use regex::Regex;

use crate::LayoutMode;

/// Blocks with more inner characters than this stand alone.
pub const LONG_BLOCK_CHARS: usize = 8;

const TERMINALS: [char; 3] = ['。', '？', '！'];

fn block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"“[^”]*”|‘[^’]*’|【[^】]*】").expect("literal regex"))
}

fn is_terminal(c: char) -> bool {
    TERMINALS.contains(&c)
}

/// Full-width / CJK characters.  Whitespace next to one of these carries no
/// meaning in Chinese prose and is dropped during layout.
fn is_wide(c: char) -> bool {
    matches!(c,
        '\u{2014}' | '\u{2018}'..='\u{201D}' | '\u{2026}'
        | '\u{2E80}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FE30}'..='\u{FE4F}'
        | '\u{FF00}'..='\u{FFEF}'
    )
}

/// Remove every whitespace run that touches a wide character or the text
/// edges; runs between two narrow characters shrink to one space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending = true;
            continue;
        }
        if pending {
            if let Some(prev) = out.chars().next_back() {
                if !is_wide(prev) && !is_wide(c) {
                    out.push(' ');
                }
            }
            pending = false;
        }
        out.push(c);
    }
    out
}

fn is_long_block(block: &str) -> bool {
    // The block pattern always matches an opening and a closing delimiter.
    let chars: Vec<char> = block.chars().collect();
    if chars.len() < 2 {
        return false;
    }
    chars[1..chars.len() - 1]
        .iter()
        .filter(|c| !c.is_whitespace())
        .count()
        > LONG_BLOCK_CHARS
}

fn flush(current: &mut String, paragraphs: &mut Vec<String>) {
    let p = current.trim();
    if !p.is_empty() {
        paragraphs.push(p.to_string());
    }
    current.clear();
}

fn push_plain(plain: &str, current: &mut String, paragraphs: &mut Vec<String>) {
    let mut chars = plain.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        if is_terminal(c) && !chars.peek().is_some_and(|n| is_terminal(*n)) {
            flush(current, paragraphs);
        }
    }
}

/// Split `text` into paragraphs after collapsing insignificant whitespace.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let text = collapse_whitespace(text);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut pos = 0;

    for m in block_re().find_iter(&text) {
        push_plain(&text[pos..m.start()], &mut current, &mut paragraphs);
        let block = m.as_str();
        if is_long_block(block) {
            flush(&mut current, &mut paragraphs);
            paragraphs.push(block.to_string());
        } else {
            current.push_str(block);
        }
        pos = m.end();
    }
    push_plain(&text[pos..], &mut current, &mut paragraphs);
    flush(&mut current, &mut paragraphs);

    paragraphs
}

/// Re-lay `text` out according to `mode`.
pub fn layout(text: &str, mode: LayoutMode) -> String {
    split_paragraphs(text).join(mode.separator())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_after_each_terminator() {
        assert_eq!(split_paragraphs("甲。乙？丙！丁"), vec!["甲。", "乙？", "丙！", "丁"]);
    }

    #[test]
    fn terminator_runs_stay_together() {
        assert_eq!(split_paragraphs("什么？！真的。"), vec!["什么？！", "真的。"]);
    }

    #[test]
    fn short_quote_stays_inline_and_is_not_split() {
        let p = split_paragraphs("他说：“好。走！”然后离开了。");
        assert_eq!(p, vec!["他说：“好。走！”然后离开了。"]);
    }

    #[test]
    fn long_quote_becomes_its_own_paragraph() {
        let p = split_paragraphs("他说：“今天的天气真的非常非常好。”她点头。");
        assert_eq!(p, vec!["他说：", "“今天的天气真的非常非常好。”", "她点头。"]);
    }

    #[test]
    fn bracket_blocks_are_recognised() {
        let p = split_paragraphs("【系统提示：任务已经完成，奖励已发放。】他笑了。");
        assert_eq!(p, vec!["【系统提示：任务已经完成，奖励已发放。】", "他笑了。"]);
    }

    #[test]
    fn whitespace_next_to_cjk_is_dropped() {
        assert_eq!(collapse_whitespace("  他 转身\n离开。 \u{3000}"), "他转身离开。");
    }

    #[test]
    fn whitespace_between_latin_words_is_kept_once() {
        assert_eq!(collapse_whitespace("hello  \n world"), "hello world");
        assert_eq!(collapse_whitespace("café au lait"), "café au lait");
    }

    #[test]
    fn layout_joins_with_mode_separator() {
        assert_eq!(layout("甲。乙。", LayoutMode::Segment), "甲。\n\n乙。");
        assert_eq!(layout("甲。乙。", LayoutMode::Simple), "甲。\n乙。");
    }
}

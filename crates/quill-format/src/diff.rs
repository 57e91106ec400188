// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

/// Change summary between an original and a reformatted text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffInfo {
    pub changed: bool,
    /// Number of lines that differ, counted on whichever side of the diff
    /// has more changed lines.
    pub changed_lines: usize,
    /// Line count of the original text.
    #[serde(default)]
    pub total_lines: usize,
}

pub fn diff_info(original: &str, formatted: &str) -> DiffInfo {
    let total_lines = original.split('\n').count();
    if original == formatted {
        return DiffInfo { changed: false, changed_lines: 0, total_lines };
    }

    let diff = TextDiff::from_lines(original, formatted);
    let (mut deleted, mut inserted) = (0usize, 0usize);
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Delete => deleted += 1,
            ChangeTag::Insert => inserted += 1,
            ChangeTag::Equal => {}
        }
    }

    DiffInfo {
        changed: true,
        // A trailing-newline-only difference still counts as one line.
        changed_lines: deleted.max(inserted).max(1),
        total_lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_is_unchanged() {
        let d = diff_info("a\nb", "a\nb");
        assert!(!d.changed);
        assert_eq!(d.changed_lines, 0);
        assert_eq!(d.total_lines, 2);
    }

    #[test]
    fn split_line_counts_inserted_side() {
        let d = diff_info("甲。乙。", "甲。\n\n乙。");
        assert!(d.changed);
        assert_eq!(d.changed_lines, 3);
    }

    #[test]
    fn trailing_newline_difference_is_a_change() {
        let d = diff_info("a\n", "a");
        assert!(d.changed);
        assert_eq!(d.changed_lines, 1);
    }
}

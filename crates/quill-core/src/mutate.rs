// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::ops::Range;

use quill_config::SelectionPolicy;
use tracing::info;

use crate::{EditingSession, Extracted, OpError, OpKind};

/// Where a result lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Replace the selection (which one depends on the policy).
    Replace,
    /// Insert at the apply-time caret (the end of any selection), wrapped in
    /// `prefix`/`suffix`.
    Insert { prefix: String, suffix: String },
}

/// What a successful apply did to the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Replaced { range: Range<usize>, inserted: Range<usize> },
    Inserted { at: usize, inserted: Range<usize> },
}

/// Applies results to the session buffer as single undo steps.
///
/// With a selection at capture time the result replaces a range:
/// - [`SelectionPolicy::Lenient`] replaces whatever is selected when the
///   result arrives, even if that differs from the captured range. A polish
///   whose selection has since collapsed to a caret falls back to the
///   captured range, provided it still holds the captured text;
/// - [`SelectionPolicy::Strict`] replaces only if the captured range is
///   still selected and still holds the captured text.
///
/// Without one the result is inserted at the current caret.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeMutator {
    pub policy: SelectionPolicy,
}

impl RangeMutator {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy }
    }

    pub fn apply(
        &self,
        session: &mut EditingSession,
        kind: OpKind,
        capture: &Extracted,
        placement: &Placement,
        result: &str,
    ) -> Result<Mutation, OpError> {
        let mutation = match placement {
            Placement::Replace if capture.had_selection => {
                let range = self.target(session, kind, capture)?;
                let inserted = session.edit(range.clone(), result);
                Mutation::Replaced { range, inserted }
            }
            Placement::Replace => self.insert(session, "", result, ""),
            Placement::Insert { prefix, suffix } => self.insert(session, prefix, result, suffix),
        };
        info!(%kind, ?mutation, "applied result");
        Ok(mutation)
    }

    fn target(
        &self,
        session: &EditingSession,
        kind: OpKind,
        capture: &Extracted,
    ) -> Result<Range<usize>, OpError> {
        let current = session.selection();
        match self.policy {
            SelectionPolicy::Lenient if current.is_empty() && kind == OpKind::Polish => {
                // A rewrite dropped at the caret would leave the original next to it.
                if still_captured(session, capture) {
                    Ok(capture.captured.range())
                } else {
                    Err(OpError::StaleSelection(kind))
                }
            }
            SelectionPolicy::Lenient => Ok(current.range()),
            SelectionPolicy::Strict => {
                if current == capture.captured && still_captured(session, capture) {
                    Ok(capture.captured.range())
                } else {
                    Err(OpError::StaleSelection(kind))
                }
            }
        }
    }

    fn insert(&self, session: &mut EditingSession, prefix: &str, result: &str, suffix: &str) -> Mutation {
        let at = session.selection().end;
        let text = format!("{prefix}{result}{suffix}");
        let inserted = session.edit(at..at, &text);
        Mutation::Inserted { at, inserted }
    }
}

fn still_captured(session: &EditingSession, capture: &Extracted) -> bool {
    capture.captured.range().end <= session.char_len()
        && session.slice(capture.captured.range()) == capture.text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{extract, Selection};

    fn separator() -> Placement {
        Placement::Insert {
            prefix: "\n\n".into(),
            suffix: String::new(),
        }
    }

    #[test]
    fn replaces_exactly_the_selected_range() {
        let mut s = EditingSession::new("甲乙丙丁戊");
        s.set_selection(1, 3);
        let cap = extract(&s, OpKind::Polish, 500).unwrap();
        RangeMutator::default()
            .apply(&mut s, OpKind::Polish, &cap, &Placement::Replace, "XYZ")
            .unwrap();
        assert_eq!(s.text(), "甲XYZ丁戊");
        assert_eq!(s.undo_depth(), 1);
    }

    #[test]
    fn insertion_without_selection_adds_separator_and_result_only() {
        let mut s = EditingSession::new("他转身离开。");
        let cap = extract(&s, OpKind::Expand, 500).unwrap();
        let before_len = s.text().len();
        let m = RangeMutator::default()
            .apply(&mut s, OpKind::Expand, &cap, &separator(), "他转身离开，没有回头。")
            .unwrap();
        assert_eq!(s.text(), "他转身离开。\n\n他转身离开，没有回头。");
        assert_eq!(s.text().len(), before_len + "\n\n".len() + "他转身离开，没有回头。".len());
        assert_eq!(m, Mutation::Inserted { at: 6, inserted: 6..19 });
    }

    #[test]
    fn insertion_uses_apply_time_caret() {
        let mut s = EditingSession::new("前文。后文。");
        let cap = extract(&s, OpKind::Expand, 500).unwrap();
        s.set_caret(3);
        RangeMutator::default()
            .apply(&mut s, OpKind::Expand, &cap, &separator(), "插入")
            .unwrap();
        assert_eq!(s.text(), "前文。\n\n插入后文。");
    }

    #[test]
    fn lenient_replaces_apply_time_selection() {
        let mut s = EditingSession::new("abcdef");
        s.set_selection(0, 2);
        let cap = extract(&s, OpKind::Polish, 500).unwrap();
        s.set_selection(4, 6);
        RangeMutator::new(SelectionPolicy::Lenient)
            .apply(&mut s, OpKind::Polish, &cap, &Placement::Replace, "X")
            .unwrap();
        assert_eq!(s.text(), "abcdX");
    }

    #[test]
    fn lenient_polish_with_collapsed_selection_replaces_captured_range() {
        let mut s = EditingSession::new("abcdef");
        s.set_selection(0, 2);
        let cap = extract(&s, OpKind::Polish, 500).unwrap();
        s.set_caret(6);
        let m = RangeMutator::new(SelectionPolicy::Lenient)
            .apply(&mut s, OpKind::Polish, &cap, &Placement::Replace, "X")
            .unwrap();
        assert_eq!(s.text(), "Xcdef");
        assert_eq!(m, Mutation::Replaced { range: 0..2, inserted: 0..1 });
        assert_eq!(s.undo_depth(), 1);
    }

    #[test]
    fn lenient_polish_with_collapsed_selection_refuses_edited_capture() {
        let mut s = EditingSession::new("abcdef");
        s.set_selection(0, 2);
        let cap = extract(&s, OpKind::Polish, 500).unwrap();
        s.edit(0..1, "Z");
        s.set_caret(6);
        let err = RangeMutator::new(SelectionPolicy::Lenient)
            .apply(&mut s, OpKind::Polish, &cap, &Placement::Replace, "X")
            .unwrap_err();
        assert!(matches!(err, OpError::StaleSelection(OpKind::Polish)));
        assert_eq!(s.text(), "Zbcdef");
    }

    #[test]
    fn lenient_polish_refuses_when_captured_range_was_deleted() {
        let mut s = EditingSession::new("abcdef");
        s.set_selection(3, 6);
        let cap = extract(&s, OpKind::Polish, 500).unwrap();
        s.edit(1..6, "");
        let err = RangeMutator::new(SelectionPolicy::Lenient)
            .apply(&mut s, OpKind::Polish, &cap, &Placement::Replace, "X")
            .unwrap_err();
        assert!(matches!(err, OpError::StaleSelection(OpKind::Polish)));
        assert_eq!(s.text(), "a");
    }

    #[test]
    fn strict_refuses_moved_selection() {
        let mut s = EditingSession::new("abcdef");
        s.set_selection(0, 2);
        let cap = extract(&s, OpKind::Polish, 500).unwrap();
        s.set_selection(4, 6);
        let err = RangeMutator::new(SelectionPolicy::Strict)
            .apply(&mut s, OpKind::Polish, &cap, &Placement::Replace, "X")
            .unwrap_err();
        assert!(matches!(err, OpError::StaleSelection(OpKind::Polish)));
        assert_eq!(s.text(), "abcdef");
        assert_eq!(s.undo_depth(), 0);
    }

    #[test]
    fn strict_refuses_edited_text_under_same_range() {
        let mut s = EditingSession::new("abcdef");
        s.set_selection(0, 2);
        let cap = extract(&s, OpKind::Polish, 500).unwrap();
        s.edit(0..1, "Z");
        s.set_selection(0, 2);
        assert!(RangeMutator::new(SelectionPolicy::Strict)
            .apply(&mut s, OpKind::Polish, &cap, &Placement::Replace, "X")
            .is_err());
    }

    #[test]
    fn strict_accepts_unchanged_capture() {
        let mut s = EditingSession::new("abcdef");
        s.set_selection(2, 4);
        let cap = extract(&s, OpKind::Polish, 500).unwrap();
        let m = RangeMutator::new(SelectionPolicy::Strict)
            .apply(&mut s, OpKind::Polish, &cap, &Placement::Replace, "XY")
            .unwrap();
        assert_eq!(s.text(), "abXYef");
        assert_eq!(m, Mutation::Replaced { range: 2..4, inserted: 2..4 });
        assert_eq!(s.selection(), Selection::caret(4));
    }
}

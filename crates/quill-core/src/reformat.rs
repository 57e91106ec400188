// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use quill_remote::ReformatResult;
use tracing::info;

use crate::{EditingSession, OpError, OpKind};

/// Terminal state of a reformat.  `Unchanged` is a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReformatOutcome {
    Changed { changed_lines: usize, total_lines: usize },
    Unchanged,
}

impl ReformatOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, ReformatOutcome::Changed { .. })
    }
}

/// Apply a reformat result to the whole buffer.
///
/// The buffer is left untouched (no undo step, no dirty flag) when the
/// result reports no change or is identical to `original`.  A missing
/// `diff_info` is recomputed locally.
pub fn apply_reformat(
    session: &mut EditingSession,
    original: &str,
    result: ReformatResult,
) -> Result<ReformatOutcome, OpError> {
    let formatted = result
        .formatted_text
        .filter(|t| !t.trim().is_empty())
        .ok_or(OpError::EmptyResult(OpKind::Reformat))?;
    let diff = result
        .diff_info
        .unwrap_or_else(|| quill_format::diff_info(original, &formatted));

    if !diff.changed || formatted == original {
        info!("reformat: already formatted");
        return Ok(ReformatOutcome::Unchanged);
    }

    let len = session.char_len();
    session.edit(0..len, &formatted);
    info!(changed_lines = diff.changed_lines, "reformat applied");
    Ok(ReformatOutcome::Changed {
        changed_lines: diff.changed_lines,
        total_lines: diff.total_lines,
    })
}

#[cfg(test)]
mod tests {
    use quill_format::{reformat, DiffInfo, FormatOptions};

    use super::*;

    fn local(text: &str) -> ReformatResult {
        let out = reformat(text, &FormatOptions::default());
        ReformatResult {
            formatted_text: Some(out.text),
            diff_info: Some(out.diff),
        }
    }

    #[test]
    fn changed_result_replaces_buffer_once() {
        let mut s = EditingSession::new("他转身离开。她没有回头。");
        let original = s.text().to_string();
        let outcome = apply_reformat(&mut s, &original, local(&original)).unwrap();
        assert!(outcome.changed());
        assert!(s.text().contains("他转身离开。\n\n"));
        assert_eq!(s.undo_depth(), 1);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let mut s = EditingSession::new("他转身离开。她没有回头。");
        let first = s.text().to_string();
        apply_reformat(&mut s, &first, local(&first)).unwrap();
        let second = s.text().to_string();
        let outcome = apply_reformat(&mut s, &second, local(&second)).unwrap();
        assert_eq!(outcome, ReformatOutcome::Unchanged);
        assert_eq!(s.undo_depth(), 1);
    }

    #[test]
    fn unchanged_report_does_not_touch_buffer() {
        let mut s = EditingSession::new("  甲。");
        let r = ReformatResult {
            formatted_text: Some("  甲。".into()),
            diff_info: Some(DiffInfo::default()),
        };
        assert_eq!(apply_reformat(&mut s, "  甲。", r).unwrap(), ReformatOutcome::Unchanged);
        assert!(!s.is_dirty());
    }

    #[test]
    fn identical_text_is_unchanged_even_if_flagged() {
        let mut s = EditingSession::new("甲");
        let r = ReformatResult {
            formatted_text: Some("甲".into()),
            diff_info: Some(DiffInfo {
                changed: true,
                changed_lines: 1,
                total_lines: 1,
            }),
        };
        assert_eq!(apply_reformat(&mut s, "甲", r).unwrap(), ReformatOutcome::Unchanged);
    }

    #[test]
    fn missing_diff_info_is_recomputed() {
        let mut s = EditingSession::new("甲。乙。");
        let r = ReformatResult {
            formatted_text: Some("  甲。\n\n  乙。".into()),
            diff_info: None,
        };
        let outcome = apply_reformat(&mut s, "甲。乙。", r).unwrap();
        assert!(matches!(outcome, ReformatOutcome::Changed { changed_lines, .. } if changed_lines >= 1));
    }

    #[test]
    fn empty_formatted_text_is_a_failure() {
        let mut s = EditingSession::new("甲。");
        let err = apply_reformat(&mut s, "甲。", ReformatResult::default()).unwrap_err();
        assert!(matches!(err, OpError::EmptyResult(OpKind::Reformat)));
        assert_eq!(s.text(), "甲。");
    }
}

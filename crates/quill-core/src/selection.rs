// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use crate::{EditingSession, OpError, OpKind, Selection};

/// The operative text for one dispatch, plus the selection it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub text: String,
    pub had_selection: bool,
    /// Selection at capture time.
    pub captured: Selection,
}

/// Pick the text `kind` operates on.
///
/// | kind | with selection | without |
/// |---|---|---|
/// | expand | selection | last `tail_chars` characters |
/// | polish | selection | rejected |
/// | summarize | selection | whole buffer |
/// | reformat, save | whole buffer | whole buffer |
///
/// A whitespace-only selection counts as no selection.  Whitespace-only
/// results are rejected before anything is sent.
pub fn extract(
    session: &EditingSession,
    kind: OpKind,
    tail_chars: usize,
) -> Result<Extracted, OpError> {
    let captured = session.selection();
    let selected = session.selected_text();
    let has_selection = !captured.is_empty() && !selected.trim().is_empty();

    let (text, had_selection) = match kind {
        OpKind::Expand if has_selection => (selected, true),
        OpKind::Expand => (session.tail(tail_chars), false),
        OpKind::Polish if has_selection => (selected, true),
        OpKind::Polish => {
            return Err(OpError::precondition(kind, "select the text to polish"));
        }
        OpKind::Summarize if has_selection => (selected, true),
        OpKind::Summarize => (session.text(), false),
        OpKind::Reformat | OpKind::Save => (session.text(), false),
    };

    if text.trim().is_empty() {
        let reason = match kind {
            OpKind::Expand => "select or write some text to expand",
            OpKind::Summarize => "select or write some text to summarize",
            _ => "the document is empty",
        };
        return Err(OpError::precondition(kind, reason));
    }

    Ok(Extracted {
        text: text.to_string(),
        had_selection,
        captured,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(text: &str, sel: Option<(usize, usize)>) -> EditingSession {
        let mut s = EditingSession::new(text);
        if let Some((a, b)) = sel {
            s.set_selection(a, b);
        }
        s
    }

    #[test]
    fn expand_prefers_selection() {
        let s = session("他转身离开。她笑了。", Some((6, 10)));
        let e = extract(&s, OpKind::Expand, 500).unwrap();
        assert_eq!(e.text, "她笑了。");
        assert!(e.had_selection);
        assert_eq!(e.captured, Selection::new(6, 10));
    }

    #[test]
    fn expand_without_selection_takes_bounded_tail() {
        let s = session("一二三四五六七八九十", None);
        let e = extract(&s, OpKind::Expand, 4).unwrap();
        assert_eq!(e.text, "七八九十");
        assert!(!e.had_selection);

        let short = extract(&session("他转身离开。", None), OpKind::Expand, 500).unwrap();
        assert_eq!(short.text, "他转身离开。");
    }

    #[test]
    fn whitespace_selection_falls_back_for_expand() {
        let s = session("正文。   ", Some((3, 6)));
        let e = extract(&s, OpKind::Expand, 500).unwrap();
        assert!(!e.had_selection);
        assert_eq!(e.text, "正文。   ");
    }

    #[test]
    fn expand_rejects_blank_tail() {
        let s = session("正文\n\n\n   ", None);
        let err = extract(&s, OpKind::Expand, 3).unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn polish_requires_selection() {
        let s = session("他转身离开。", None);
        assert!(extract(&s, OpKind::Polish, 500).unwrap_err().is_precondition());
        let s = session("他转身离开。", Some((0, 3)));
        assert_eq!(extract(&s, OpKind::Polish, 500).unwrap().text, "他转身");
    }

    #[test]
    fn summarize_falls_back_to_whole_buffer() {
        let s = session("甲。乙。", None);
        let e = extract(&s, OpKind::Summarize, 1).unwrap();
        assert_eq!(e.text, "甲。乙。");
        assert!(!e.had_selection);
    }

    #[test]
    fn reformat_ignores_selection_and_rejects_empty() {
        let s = session("甲。乙。", Some((0, 1)));
        let e = extract(&s, OpKind::Reformat, 500).unwrap();
        assert_eq!(e.text, "甲。乙。");
        assert!(!e.had_selection);
        assert!(extract(&session(" \n ", None), OpKind::Reformat, 500).is_err());
    }
}

// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::ops::Range;

use quill_remote::ComposedUnit;

/// A contiguous span of the buffer in character offsets.  `start == end` is
/// a bare caret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Anchor and head may come in either order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn caret(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    buffer: String,
    selection: Selection,
}

/// The live buffer and selection for one open composed unit.
///
/// The buffer is never persisted implicitly; see `Editor::save`.
#[derive(Debug, Clone, Default)]
pub struct EditingSession {
    unit_id: Option<String>,
    title: String,
    buffer: String,
    selection: Selection,
    dirty: bool,
    revision: u64,
    undo: Vec<Snapshot>,
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

impl EditingSession {
    /// A detached session over `text` with the caret at the end.
    pub fn new(text: impl Into<String>) -> Self {
        let buffer = text.into();
        let end = buffer.chars().count();
        Self {
            buffer,
            selection: Selection::caret(end),
            ..Self::default()
        }
    }

    /// A session bound to `unit`; its content becomes the buffer.
    pub fn open(unit: &ComposedUnit) -> Self {
        Self {
            unit_id: Some(unit.id.clone()),
            title: unit.title.clone(),
            ..Self::new(unit.content.clone())
        }
    }

    pub fn unit_id(&self) -> Option<&str> {
        self.unit_id.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Follow an identity change reported by the store.
    pub fn retarget(&mut self, id: impl Into<String>) {
        self.unit_id = Some(id.into());
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn char_len(&self) -> usize {
        self.buffer.chars().count()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Offsets past the end are clamped.
    pub fn set_selection(&mut self, anchor: usize, head: usize) {
        let len = self.char_len();
        self.selection = Selection::new(anchor.min(len), head.min(len));
    }

    pub fn set_caret(&mut self, pos: usize) {
        self.set_selection(pos, pos);
    }

    pub fn slice(&self, range: Range<usize>) -> &str {
        let start = byte_offset(&self.buffer, range.start);
        let end = byte_offset(&self.buffer, range.end.max(range.start));
        &self.buffer[start..end]
    }

    pub fn selected_text(&self) -> &str {
        self.slice(self.selection.range())
    }

    /// The last `n` characters.
    pub fn tail(&self, n: usize) -> &str {
        let skip = self.char_len().saturating_sub(n);
        &self.buffer[byte_offset(&self.buffer, skip)..]
    }

    /// Replace `range` with `text` as one undo step.  The selection collapses
    /// to a caret after the inserted text.  Returns the inserted span.
    pub fn edit(&mut self, range: Range<usize>, text: &str) -> Range<usize> {
        let len = self.char_len();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);

        self.undo.push(Snapshot {
            buffer: self.buffer.clone(),
            selection: self.selection,
        });

        let (bs, be) = (byte_offset(&self.buffer, start), byte_offset(&self.buffer, end));
        self.buffer.replace_range(bs..be, text);

        let inserted_end = start + text.chars().count();
        self.selection = Selection::caret(inserted_end);
        self.dirty = true;
        self.revision += 1;
        start..inserted_end
    }

    /// Restore the buffer and selection from before the last edit.
    pub fn undo(&mut self) -> bool {
        match self.undo.pop() {
            Some(snap) => {
                self.buffer = snap.buffer;
                self.selection = snap.selection;
                self.dirty = true;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Bumped by every edit and undo.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Clear the dirty flag if nothing changed since `revision` was read.
    pub fn mark_saved(&mut self, revision: u64) {
        if self.revision == revision {
            self.dirty = false;
        }
    }
}

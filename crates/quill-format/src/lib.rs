// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Prose reformatting for long-form CJK/Latin text.
//!
//! The pipeline runs in a fixed order:
//!
//! 1. line-break standardisation (`\r\n`, `\r` → `\n`)
//! 2. ellipsis standardisation (`...`, `……………` → `……`), repeated after
//!    whitespace collapsing since `…… ……` only becomes a run once the
//!    space between the two halves is gone
//! 3. block-aware paragraph layout ([`LayoutMode`])
//! 4. CJK ↔ Latin/digit spacing
//! 5. paragraph indent
//! 6. empty-line compression
//!
//! Every step is idempotent on its own output, so running [`reformat`] on
//! already-formatted text reports `changed == false`.

mod diff;
mod layout;
mod normalize;
mod wordcount;

use serde::{Deserialize, Serialize};

pub use diff::{diff_info, DiffInfo};
pub use layout::{collapse_whitespace, layout, split_paragraphs};
pub use normalize::{
    compress_empty_lines, indent_paragraphs, smart_spacing, standardize_ellipsis,
    standardize_line_breaks,
};
pub use wordcount::WordCount;

/// Largest indent accepted; wider values are clamped.
pub const MAX_INDENT: u8 = 8;

/// How paragraphs are laid out after segmentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// One paragraph per line, no blank lines.
    Simple,
    /// Paragraphs separated by exactly one blank line.
    #[default]
    Segment,
}

impl LayoutMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutMode::Simple => "simple",
            LayoutMode::Segment => "segment",
        }
    }

    pub(crate) fn separator(self) -> &'static str {
        match self {
            LayoutMode::Simple => "\n",
            LayoutMode::Segment => "\n\n",
        }
    }
}

impl std::fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(LayoutMode::Simple),
            "segment" => Ok(LayoutMode::Segment),
            other => Err(format!("unknown layout mode: {other}")),
        }
    }
}

fn default_indent() -> u8 {
    2
}

fn default_true() -> bool {
    true
}

/// Formatting switches.  Serialises to the same field names the remote
/// reformat endpoint expects under `settings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    #[serde(default)]
    pub layout_mode: LayoutMode,
    /// Leading spaces added to every paragraph (0–8).
    #[serde(default = "default_indent")]
    pub indent: u8,
    #[serde(default)]
    pub preserve_empty_lines: bool,
    #[serde(default = "default_true")]
    pub smart_spacing: bool,
    #[serde(default = "default_true")]
    pub ellipsis_standardization: bool,
    #[serde(default = "default_true")]
    pub line_break_standardization: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            layout_mode: LayoutMode::Segment,
            indent: default_indent(),
            preserve_empty_lines: false,
            smart_spacing: true,
            ellipsis_standardization: true,
            line_break_standardization: true,
        }
    }
}

impl FormatOptions {
    pub fn with_mode(mut self, mode: LayoutMode) -> Self {
        self.layout_mode = mode;
        self
    }
}

/// Output of a [`reformat`] pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    pub text: String,
    pub diff: DiffInfo,
}

impl Formatted {
    pub fn changed(&self) -> bool {
        self.diff.changed
    }
}

/// Run the full formatting pipeline over `text`.
pub fn reformat(text: &str, opts: &FormatOptions) -> Formatted {
    let mut out = if opts.line_break_standardization {
        standardize_line_breaks(text)
    } else {
        text.to_string()
    };

    if opts.ellipsis_standardization {
        out = standardize_ellipsis(&out);
        out = standardize_ellipsis(&collapse_whitespace(&out));
    }

    out = layout(&out, opts.layout_mode);

    if opts.smart_spacing {
        out = smart_spacing(&out);
    }

    let indent = opts.indent.min(MAX_INDENT);
    if indent > 0 {
        out = indent_paragraphs(&out, indent as usize);
    }

    if !opts.preserve_empty_lines {
        out = compress_empty_lines(&out);
    }

    let diff = diff_info(text, &out);
    tracing::debug!(
        mode = %opts.layout_mode,
        changed = diff.changed,
        changed_lines = diff.changed_lines,
        "reformatted text"
    );
    Formatted { text: out, diff }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

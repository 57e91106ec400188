// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::Serialize;

use crate::{BatchReport, OpError, OpKind, ReconcileError, ReformatOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A one-shot, user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn applied(kind: OpKind) -> Self {
        Self::new(NoticeLevel::Success, format!("{kind} complete"))
    }

    pub fn reformatted(outcome: ReformatOutcome) -> Self {
        match outcome {
            ReformatOutcome::Changed { changed_lines, .. } => Self::new(
                NoticeLevel::Success,
                format!("reformatted, {changed_lines} line(s) changed"),
            ),
            ReformatOutcome::Unchanged => Self::new(NoticeLevel::Info, "already formatted"),
        }
    }

    pub fn committed(report: &BatchReport) -> Self {
        if report.all_ok() {
            return Self::new(NoticeLevel::Success, "order saved");
        }
        let failed: Vec<&str> = report.failed().map(|i| i.id.as_str()).collect();
        Self::new(
            NoticeLevel::Warning,
            format!(
                "order saved with {} failed update(s): {}; the list shows the store's order",
                failed.len(),
                failed.join(", ")
            ),
        )
    }

    /// Local rejections warn; everything that reached the network errors.
    pub fn from_error(err: &OpError) -> Self {
        let level = if err.is_precondition() {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Error
        };
        Self::new(level, err.to_string())
    }

    pub fn from_reconcile_error(err: &ReconcileError) -> Self {
        let level = match err {
            ReconcileError::UnknownItem(_) | ReconcileError::OutOfRange { .. } => NoticeLevel::Warning,
            ReconcileError::Reload { .. } => NoticeLevel::Error,
        };
        Self::new(level, err.to_string())
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        write!(f, "{tag}: {}", self.message)
    }
}

// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use quill_remote::RemoteError;
use thiserror::Error;

use crate::{reorder::BatchReport, OpKind};

#[derive(Debug, Error)]
pub enum OpError {
    /// Rejected locally; nothing was sent.
    #[error("{kind}: {reason}")]
    Precondition { kind: OpKind, reason: &'static str },

    #[error("{0} is already in flight")]
    Busy(OpKind),

    #[error("{kind} failed: {source}")]
    Remote {
        kind: OpKind,
        #[source]
        source: RemoteError,
    },

    #[error("{0} returned an empty result")]
    EmptyResult(OpKind),

    #[error("{0}: the selection changed before the result arrived")]
    StaleSelection(OpKind),
}

impl OpError {
    pub(crate) fn precondition(kind: OpKind, reason: &'static str) -> Self {
        Self::Precondition { kind, reason }
    }

    /// True when the operation never left the process.
    pub fn is_precondition(&self) -> bool {
        matches!(self, OpError::Precondition { .. } | OpError::Busy(_))
    }

    pub fn kind(&self) -> OpKind {
        match self {
            OpError::Precondition { kind, .. } | OpError::Remote { kind, .. } => *kind,
            OpError::Busy(k) | OpError::EmptyResult(k) | OpError::StaleSelection(k) => *k,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("unknown item '{0}'")]
    UnknownItem(String),

    #[error("position {position} is outside 1..={len}")]
    OutOfRange { position: usize, len: usize },

    /// The persistence pass ran; only the reload failed.
    #[error("reload after commit failed ({}/{} updates ok): {source}", .report.succeeded(), .report.items.len())]
    Reload {
        report: BatchReport,
        #[source]
        source: RemoteError,
    },
}

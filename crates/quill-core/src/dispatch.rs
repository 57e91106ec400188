// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A user-triggered operation.  At most one of each kind is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Expand,
    Polish,
    Summarize,
    Reformat,
    Save,
}

impl OpKind {
    pub const ALL: [OpKind; 5] = [
        OpKind::Expand,
        OpKind::Polish,
        OpKind::Summarize,
        OpKind::Reformat,
        OpKind::Save,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::Expand => "expand",
            OpKind::Polish => "polish",
            OpKind::Summarize => "summarize",
            OpKind::Reformat => "reformat",
            OpKind::Save => "save",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-kind busy flags.  Not a queue: a second dispatch of a busy kind is
/// refused, nothing is coalesced or cancelled.
#[derive(Debug, Clone, Default)]
pub struct BusyFlags {
    flags: Arc<[AtomicBool; 5]>,
}

impl BusyFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_dispatch(&self, kind: OpKind) -> bool {
        !self.flags[kind.index()].load(Ordering::Acquire)
    }

    /// Mark `kind` busy.  `None` when it already is.  The flag clears when
    /// the returned guard drops.
    pub fn try_begin(&self, kind: OpKind) -> Option<InFlight> {
        self.flags[kind.index()]
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight {
                flags: Arc::clone(&self.flags),
                kind,
            })
    }

    /// Kinds currently in flight.
    pub fn in_flight(&self) -> Vec<OpKind> {
        OpKind::ALL
            .into_iter()
            .filter(|k| !self.can_dispatch(*k))
            .collect()
    }
}

#[derive(Debug)]
pub struct InFlight {
    flags: Arc<[AtomicBool; 5]>,
    kind: OpKind,
}

impl InFlight {
    pub fn kind(&self) -> OpKind {
        self.kind
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.flags[self.kind.index()].store(false, Ordering::Release);
    }
}

// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Editing-session controller for the quill writing assistant.
//!
//! [`Editor`] owns the buffer of one open composed unit and runs the
//! generation operations (expand, polish, summarize), reformat and save
//! against a [`quill_remote::Backend`].  [`OrderingReconciler`] keeps the
//! unit list ordering in sync with the store.

mod controller;
mod dispatch;
mod error;
mod mutate;
mod notice;
pub mod placeholders;
mod reformat;
mod reorder;
mod selection;
mod session;
pub mod templates;


pub use controller::{Applied, Editor, Outcome};
pub use dispatch::{BusyFlags, InFlight, OpKind};
pub use error::{OpError, ReconcileError};
pub use mutate::{Mutation, Placement, RangeMutator};
pub use notice::{Notice, NoticeLevel};
pub use reformat::{apply_reformat, ReformatOutcome};
pub use reorder::{BatchReport, ItemResult, OrderingReconciler, ReconcileState};
pub use selection::{extract, Extracted};
pub use session::{EditingSession, Selection};
pub use templates::{ResolvedTemplate, TemplateCategory, TemplateResolver, TemplateSource};

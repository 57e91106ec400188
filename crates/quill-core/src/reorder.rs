// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Drag-and-drop ordering of composed units and its best-effort persistence.
//!
//! ```text
//! Clean ──move──▶ LocallyReordered ──commit──▶ Persisting ──reload──▶ Reconciled
//!   ▲                   │  reset                                        │ move
//!   └───────────────────┘                          LocallyReordered ◀───┘
//! ```
//!
//! A commit sends one update per item whose order differs from the last
//! persisted order, strictly one after another in final list order.  Item
//! failures are recorded and skipped.  The list is then replaced wholesale
//! by a reload from the store.

use std::collections::HashMap;

use quill_remote::{ComposedUnit, UnitStore, UnitUpdate};
use serde::Serialize;
use tracing::{info, warn};

use crate::ReconcileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    Clean,
    LocallyReordered,
    Persisting,
    Reconciled,
}

/// Outcome of one update in a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResult {
    pub id: String,
    /// Set when the store answered with a different id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_id: Option<String>,
    pub order: u32,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub items: Vec<ItemResult>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.ok).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ItemResult> {
        self.items.iter().filter(|i| !i.ok)
    }

    pub fn all_ok(&self) -> bool {
        self.items.iter().all(|i| i.ok)
    }
}

#[derive(Debug, Clone)]
pub struct OrderingReconciler {
    items: Vec<ComposedUnit>,
    /// id → order as last seen in the store.
    persisted: HashMap<String, u32>,
    state: ReconcileState,
}

fn sorted(mut units: Vec<ComposedUnit>) -> Vec<ComposedUnit> {
    units.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
    units
}

impl OrderingReconciler {
    pub fn new(units: Vec<ComposedUnit>) -> Self {
        let items = sorted(units);
        let persisted = items.iter().map(|u| (u.id.clone(), u.order)).collect();
        Self {
            items,
            persisted,
            state: ReconcileState::Clean,
        }
    }

    /// Load the list from `store`.
    pub async fn load(store: &(impl UnitStore + ?Sized)) -> Result<Self, quill_remote::RemoteError> {
        Ok(Self::new(store.list_units().await?))
    }

    pub fn items(&self) -> &[ComposedUnit] {
        &self.items
    }

    pub fn state(&self) -> ReconcileState {
        self.state
    }

    fn position(&self, id: &str) -> Result<usize, ReconcileError> {
        self.items
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| ReconcileError::UnknownItem(id.to_string()))
    }

    fn renumber(&mut self) {
        for (idx, item) in self.items.iter_mut().enumerate() {
            item.order = idx as u32 + 1;
        }
        self.state = if self.pending().next().is_some() {
            ReconcileState::LocallyReordered
        } else {
            ReconcileState::Clean
        };
    }

    /// Drop `dragged` onto `target`: `dragged` takes `target`'s position and
    /// the items in between shift by one.  Dropping an item on itself does
    /// nothing.
    pub fn move_item(&mut self, dragged: &str, target: &str) -> Result<(), ReconcileError> {
        let from = self.position(dragged)?;
        let to = self.position(target)?;
        if from == to {
            return Ok(());
        }
        let moved = self.items.remove(from);
        self.items.insert(to, moved);
        self.renumber();
        Ok(())
    }

    /// Move `id` to 1-based `position`.
    pub fn move_to(&mut self, id: &str, position: usize) -> Result<(), ReconcileError> {
        let len = self.items.len();
        if position == 0 || position > len {
            return Err(ReconcileError::OutOfRange { position, len });
        }
        let from = self.position(id)?;
        let moved = self.items.remove(from);
        self.items.insert(position - 1, moved);
        self.renumber();
        Ok(())
    }

    /// Discard local moves.
    pub fn reset(&mut self) {
        for item in &mut self.items {
            if let Some(order) = self.persisted.get(&item.id) {
                item.order = *order;
            }
        }
        self.items = sorted(std::mem::take(&mut self.items));
        self.state = ReconcileState::Clean;
    }

    /// Items whose local order differs from the persisted one, in list order.
    pub fn pending(&self) -> impl Iterator<Item = &ComposedUnit> {
        self.items
            .iter()
            .filter(|u| self.persisted.get(&u.id) != Some(&u.order))
    }

    /// Persist pending orders, then reload from `store`.
    ///
    /// On a reload failure the local list is kept, successful updates are
    /// treated as persisted, and the report travels inside the error.
    pub async fn commit(&mut self, store: &(impl UnitStore + ?Sized)) -> Result<BatchReport, ReconcileError> {
        self.state = ReconcileState::Persisting;
        let batch: Vec<(String, u32, String)> = self
            .pending()
            .map(|u| (u.id.clone(), u.order, u.title.clone()))
            .collect();

        let mut report = BatchReport::default();
        for (id, order, title) in batch {
            match store.update_unit(&id, UnitUpdate::reorder(order, title)).await {
                Ok(unit) => {
                    let new_id = (unit.id != id).then(|| unit.id.clone());
                    self.persisted.remove(&id);
                    self.persisted.insert(unit.id.clone(), order);
                    if let Some(new_id) = &new_id {
                        if let Some(item) = self.items.iter_mut().find(|u| u.id == id) {
                            item.id = new_id.clone();
                        }
                    }
                    report.items.push(ItemResult {
                        id,
                        new_id,
                        order,
                        ok: true,
                        error: None,
                    });
                }
                Err(e) => {
                    warn!(id = %id, order, error = %e, "order update failed, continuing");
                    report.items.push(ItemResult {
                        id,
                        new_id: None,
                        order,
                        ok: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        info!(
            updated = report.succeeded(),
            failed = report.items.len() - report.succeeded(),
            "order persistence finished"
        );

        match store.list_units().await {
            Ok(units) => {
                *self = Self::new(units);
                self.state = ReconcileState::Reconciled;
                Ok(report)
            }
            Err(source) => {
                self.state = if self.pending().next().is_some() {
                    ReconcileState::LocallyReordered
                } else {
                    ReconcileState::Clean
                };
                Err(ReconcileError::Reload { report, source })
            }
        }
    }
}

// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use crate::{ComposedUnit, RemoteError, UnitUpdate};

/// In-process unit storage shared by the mock backends.
#[derive(Debug, Clone, Default)]
pub(crate) struct UnitTable {
    units: Vec<ComposedUnit>,
}

impl UnitTable {
    pub(crate) fn new(units: Vec<ComposedUnit>) -> Self {
        Self { units }
    }

    /// Apply `update` to unit `id`, optionally re-keying it to `new_id`.
    pub(crate) fn apply(
        &mut self,
        id: &str,
        update: UnitUpdate,
        new_id: Option<String>,
    ) -> Result<ComposedUnit, RemoteError> {
        let unit = self
            .units
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| RemoteError::UnknownUnit(id.to_string()))?;
        if let Some(order) = update.order {
            unit.order = order;
        }
        if let Some(title) = update.title {
            unit.title = title;
        }
        if let Some(content) = update.content {
            unit.word_count = Some(quill_format::WordCount::of(&content).total);
            unit.content = content;
        }
        if let Some(new_id) = new_id {
            unit.id = new_id;
        }
        Ok(unit.clone())
    }

    /// Units sorted by order, ties broken by id.
    pub(crate) fn sorted(&self) -> Vec<ComposedUnit> {
        let mut out = self.units.clone();
        out.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        out
    }
}

// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
    memory::UnitTable,
    service::{Backend, GenerationService, TemplateStore, UnitStore},
    ComposedUnit, ExpandRequest, GenerationResult, PolishRequest, PromptTable, ReformatRequest,
    ReformatResult, RemoteError, SummarizeRequest, SummaryResult, TemplateScope, UnitUpdate,
};

/// One request seen by a [`ScriptedBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Expand(ExpandRequest),
    Polish(PolishRequest),
    Summarize(SummarizeRequest),
    Reformat(ReformatRequest),
    FetchTemplates(TemplateScope),
    UpdateUnit { id: String, update: UnitUpdate },
    ListUnits,
}

type Script<T> = Mutex<VecDeque<Result<T, String>>>;

/// A pre-scripted backend for tests.  Generation calls pop the next
/// scripted answer per operation; unit storage is in memory with per-id
/// failure and rename injection.  Every call is recorded in `calls`.
#[derive(Default)]
pub struct ScriptedBackend {
    expand: Script<GenerationResult>,
    polish: Script<GenerationResult>,
    summarize: Script<SummaryResult>,
    reformat: Script<ReformatResult>,
    templates: HashMap<TemplateScope, Result<PromptTable, String>>,
    units: Mutex<UnitTable>,
    failing_updates: HashSet<String>,
    renames: HashMap<String, String>,
    list_failures: Mutex<u32>,
    /// Every request in arrival order.
    pub calls: Arc<Mutex<Vec<Call>>>,
}

fn scripted<T>(queue: &Script<T>, endpoint: &str) -> Result<T, RemoteError> {
    match queue.lock().unwrap().pop_front() {
        Some(Ok(v)) => Ok(v),
        Some(Err(msg)) => Err(RemoteError::rejected(endpoint, msg)),
        None => Err(RemoteError::rejected(endpoint, "no more scripts")),
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_units(mut self, units: Vec<ComposedUnit>) -> Self {
        self.units = Mutex::new(UnitTable::new(units));
        self
    }

    pub fn with_templates(mut self, scope: TemplateScope, table: serde_json::Value) -> Self {
        self.templates.insert(scope, Ok(PromptTable(table)));
        self
    }

    /// Template lookups for `scope` fail with `msg`.
    pub fn failing_templates(mut self, scope: TemplateScope, msg: impl Into<String>) -> Self {
        self.templates.insert(scope, Err(msg.into()));
        self
    }

    /// Queue an expand answer; `None` models an empty `result_text`.
    pub fn expand_reply(self, text: Option<&str>) -> Self {
        self.expand.lock().unwrap().push_back(Ok(GenerationResult {
            result_text: text.map(str::to_string),
        }));
        self
    }

    pub fn expand_failure(self, msg: impl Into<String>) -> Self {
        self.expand.lock().unwrap().push_back(Err(msg.into()));
        self
    }

    pub fn polish_reply(self, text: Option<&str>) -> Self {
        self.polish.lock().unwrap().push_back(Ok(GenerationResult {
            result_text: text.map(str::to_string),
        }));
        self
    }

    pub fn polish_failure(self, msg: impl Into<String>) -> Self {
        self.polish.lock().unwrap().push_back(Err(msg.into()));
        self
    }

    pub fn summarize_reply(self, text: Option<&str>) -> Self {
        self.summarize.lock().unwrap().push_back(Ok(SummaryResult {
            result_summary: text.map(str::to_string),
        }));
        self
    }

    pub fn reformat_reply(self, result: ReformatResult) -> Self {
        self.reformat.lock().unwrap().push_back(Ok(result));
        self
    }

    pub fn reformat_failure(self, msg: impl Into<String>) -> Self {
        self.reformat.lock().unwrap().push_back(Err(msg.into()));
        self
    }

    /// Updates of unit `id` fail.
    pub fn failing_update(mut self, id: impl Into<String>) -> Self {
        self.failing_updates.insert(id.into());
        self
    }

    /// Updates of unit `from` answer with id `to`.
    pub fn renaming(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }

    /// The next `n` list calls fail.
    pub fn failing_lists(self, n: u32) -> Self {
        *self.list_failures.lock().unwrap() = n;
        self
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    /// Snapshot of the recorded calls.
    pub fn recorded(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Ids passed to `update_unit`, in call order.
    pub fn updated_ids(&self) -> Vec<String> {
        self.recorded()
            .into_iter()
            .filter_map(|c| match c {
                Call::UpdateUnit { id, .. } => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Number of calls that reached a generation endpoint.
    pub fn generation_calls(&self) -> usize {
        self.recorded()
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::Expand(_) | Call::Polish(_) | Call::Summarize(_) | Call::Reformat(_)
                )
            })
            .count()
    }
}

#[async_trait]
impl GenerationService for ScriptedBackend {
    async fn expand(&self, req: ExpandRequest) -> Result<GenerationResult, RemoteError> {
        self.record(Call::Expand(req));
        scripted(&self.expand, "/api/ai/expand")
    }

    async fn polish(&self, req: PolishRequest) -> Result<GenerationResult, RemoteError> {
        self.record(Call::Polish(req));
        scripted(&self.polish, "/api/ai/polish")
    }

    async fn summarize(&self, req: SummarizeRequest) -> Result<SummaryResult, RemoteError> {
        self.record(Call::Summarize(req));
        scripted(&self.summarize, "/api/ai/summarize")
    }

    async fn reformat(&self, req: ReformatRequest) -> Result<ReformatResult, RemoteError> {
        self.record(Call::Reformat(req));
        scripted(&self.reformat, "/api/utils/reformat")
    }
}

#[async_trait]
impl TemplateStore for ScriptedBackend {
    async fn fetch_templates(&self, scope: &TemplateScope) -> Result<PromptTable, RemoteError> {
        self.record(Call::FetchTemplates(scope.clone()));
        match self.templates.get(scope) {
            Some(Ok(t)) => Ok(t.clone()),
            Some(Err(msg)) => Err(RemoteError::rejected("/api/utils/prompts", msg.clone())),
            None => Ok(PromptTable::default()),
        }
    }
}

#[async_trait]
impl UnitStore for ScriptedBackend {
    async fn update_unit(&self, id: &str, update: UnitUpdate) -> Result<ComposedUnit, RemoteError> {
        self.record(Call::UpdateUnit {
            id: id.to_string(),
            update: update.clone(),
        });
        if self.failing_updates.contains(id) {
            return Err(RemoteError::rejected(format!("/units/{id}"), "scripted failure"));
        }
        let new_id = self.renames.get(id).cloned();
        self.units.lock().unwrap().apply(id, update, new_id)
    }

    async fn list_units(&self) -> Result<Vec<ComposedUnit>, RemoteError> {
        self.record(Call::ListUnits);
        {
            let mut remaining = self.list_failures.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(RemoteError::rejected("/units", "scripted list failure"));
            }
        }
        Ok(self.units.lock().unwrap().sorted())
    }
}

impl Backend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

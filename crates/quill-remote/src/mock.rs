// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Offline backend for demos and end-to-end tests.
//!
//! Generation echoes its input unless a YAML seed file supplies canned
//! replies; reformat runs the local engine; templates and units live in
//! memory.
//!
//! # Seed format
//!
//! ```yaml
//! prompts:
//!   global:
//!     expand:
//!       paragraph: "续写：{ORIGINAL_TEXT}"
//!   documents:
//!     n1:
//!       polish: "请润色，风格{STYLE}"
//! replies:
//!   - match_type: contains      # contains | equals | starts_with | default
//!     pattern: "转身"
//!     reply: "他转身离开，没有回头。"
//! units:
//!   - { id: a, title: 第一章, order: 1, content: "……" }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{
    memory::UnitTable,
    service::{Backend, GenerationService, TemplateStore, UnitStore},
    ComposedUnit, ExpandRequest, GenerationResult, PolishRequest, PromptTable, ReformatRequest,
    ReformatResult, RemoteError, SummarizeRequest, SummaryResult, TemplateScope, UnitUpdate,
};

// ─── YAML schema ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct MockSeed {
    #[serde(default)]
    pub prompts: SeedPrompts,
    #[serde(default)]
    pub replies: Vec<ReplyRule>,
    #[serde(default)]
    pub units: Vec<ComposedUnit>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedPrompts {
    #[serde(default)]
    pub global: serde_json::Value,
    #[serde(default)]
    pub documents: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRule {
    pub match_type: MatchType,
    #[serde(default)]
    pub pattern: String,
    pub reply: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Contains,
    Equals,
    StartsWith,
    Default,
}

// ─── Backend ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockBackend {
    global: PromptTable,
    documents: HashMap<String, PromptTable>,
    replies: Vec<ReplyRule>,
    units: Mutex<UnitTable>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a backend from a YAML seed file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading mock seed file: {}", path.display()))?;
        Self::load(&text)
    }

    /// Load a backend from a YAML string.
    pub fn load(yaml: &str) -> anyhow::Result<Self> {
        let seed: MockSeed = serde_yaml::from_str(yaml).context("parsing mock seed YAML")?;
        Ok(Self::from_seed(seed))
    }

    pub fn from_seed(seed: MockSeed) -> Self {
        Self {
            global: PromptTable(seed.prompts.global),
            documents: seed
                .prompts
                .documents
                .into_iter()
                .map(|(k, v)| (k, PromptTable(v)))
                .collect(),
            replies: seed.replies,
            units: Mutex::new(UnitTable::new(seed.units)),
        }
    }

    fn reply_for(&self, input: &str) -> Option<&str> {
        let lower = input.to_lowercase();
        let mut fallback = None;
        for rule in &self.replies {
            let pattern = rule.pattern.to_lowercase();
            let hit = match rule.match_type {
                MatchType::Default => {
                    fallback = Some(rule.reply.as_str());
                    false
                }
                MatchType::Contains => lower.contains(&pattern),
                MatchType::Equals => lower == pattern,
                MatchType::StartsWith => lower.starts_with(&pattern),
            };
            if hit {
                return Some(&rule.reply);
            }
        }
        fallback
    }

    fn generate(&self, input: &str) -> String {
        let reply = self
            .reply_for(input)
            .map(str::to_string)
            .unwrap_or_else(|| format!("MOCK: {input}"));
        debug!(input_chars = input.chars().count(), "mock generation");
        reply
    }
}

#[async_trait]
impl GenerationService for MockBackend {
    async fn expand(&self, req: ExpandRequest) -> Result<GenerationResult, RemoteError> {
        Ok(GenerationResult {
            result_text: Some(self.generate(&req.input_summary)),
        })
    }

    async fn polish(&self, req: PolishRequest) -> Result<GenerationResult, RemoteError> {
        Ok(GenerationResult {
            result_text: Some(self.generate(&req.text)),
        })
    }

    async fn summarize(&self, req: SummarizeRequest) -> Result<SummaryResult, RemoteError> {
        Ok(SummaryResult {
            result_summary: Some(self.generate(&req.text)),
        })
    }

    async fn reformat(&self, req: ReformatRequest) -> Result<ReformatResult, RemoteError> {
        let out = quill_format::reformat(&req.text, &req.settings);
        Ok(ReformatResult {
            formatted_text: Some(out.text),
            diff_info: Some(out.diff),
        })
    }
}

#[async_trait]
impl TemplateStore for MockBackend {
    async fn fetch_templates(&self, scope: &TemplateScope) -> Result<PromptTable, RemoteError> {
        Ok(match scope {
            TemplateScope::Global => self.global.clone(),
            TemplateScope::Document(id) => self.documents.get(id).cloned().unwrap_or_default(),
        })
    }
}

#[async_trait]
impl UnitStore for MockBackend {
    async fn update_unit(&self, id: &str, update: UnitUpdate) -> Result<ComposedUnit, RemoteError> {
        self.units.lock().unwrap().apply(id, update, None)
    }

    async fn list_units(&self) -> Result<Vec<ComposedUnit>, RemoteError> {
        Ok(self.units.lock().unwrap().sorted())
    }
}

impl Backend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

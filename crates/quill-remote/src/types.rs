// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};
use serde_json::Value;

use quill_format::{DiffInfo, FormatOptions};

// ── Generation ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub novel_id: Option<String>,
    /// Template with every placeholder already substituted.
    pub prompt_template: String,
    /// The text being expanded (selection or document tail).
    pub input_summary: String,
    pub style: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolishRequest {
    pub text: String,
    pub preserve_content: bool,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
    pub max_sentences: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReformatRequest {
    pub text: String,
    pub settings: FormatOptions,
}

/// Expand and polish answer with `result_text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(default)]
    pub result_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    #[serde(default)]
    pub result_summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReformatResult {
    #[serde(default)]
    pub formatted_text: Option<String>,
    #[serde(default)]
    pub diff_info: Option<DiffInfo>,
}

// ── Templates ────────────────────────────────────────────────────────────────

/// Where a prompt table is read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateScope {
    /// Templates customised for one document (novel).
    Document(String),
    Global,
}

impl TemplateScope {
    /// Query string for `GET /api/utils/prompts`.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            TemplateScope::Document(id) => vec![("scope", "novel".into()), ("novel_id", id.clone())],
            TemplateScope::Global => vec![("scope", "global".into())],
        }
    }
}

impl std::fmt::Display for TemplateScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateScope::Document(id) => write!(f, "document:{id}"),
            TemplateScope::Global => f.write_str("global"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptsPayload {
    #[serde(default)]
    pub prompts: PromptTable,
}

/// Prompt table as returned by the store.  A category is either a plain
/// string (used for every key) or an object keyed by variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptTable(pub Value);

impl PromptTable {
    pub fn lookup(&self, category: &str, key: &str) -> Option<&str> {
        let entry = match self.0.get(category)? {
            Value::String(s) => s.as_str(),
            Value::Object(map) => map.get(key)?.as_str()?,
            _ => return None,
        };
        if entry.trim().is_empty() {
            None
        } else {
            Some(entry)
        }
    }
}

impl From<Value> for PromptTable {
    fn from(v: Value) -> Self {
        Self(v)
    }
}

// ── Composed units ───────────────────────────────────────────────────────────

/// A chapter or outline entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedUnit {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub content: String,
    /// Derived by the store; informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,
}

/// Body of `PUT …/{id}`.  Absent fields are left unchanged by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl UnitUpdate {
    pub fn reorder(order: u32, title: impl Into<String>) -> Self {
        Self {
            order: Some(order),
            title: Some(title.into()),
            content: None,
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitListPayload {
    #[serde(default, alias = "chapters", alias = "outlines")]
    pub items: Vec<ComposedUnit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitPayload {
    #[serde(alias = "chapter", alias = "outline")]
    pub composed_unit: ComposedUnit,
}

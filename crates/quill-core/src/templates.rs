// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Instruction-template lookup: document scope, then global scope, then a
//! built-in default.  Lookup failures are logged and skipped; resolution
//! never fails.

use quill_remote::{TemplateScope, TemplateStore};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateCategory {
    Expand,
    Polish,
    Summarize,
}

impl TemplateCategory {
    /// Category name in the prompt table.
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateCategory::Expand => "expand",
            TemplateCategory::Polish => "polish",
            TemplateCategory::Summarize => "summarize",
        }
    }

    /// Key within the category.  Expand distinguishes a selected sentence
    /// from continuing the paragraph at the end of the document.
    pub fn key(self, had_selection: bool) -> &'static str {
        match self {
            TemplateCategory::Expand if had_selection => "sentence",
            TemplateCategory::Expand => "paragraph",
            TemplateCategory::Polish => "sentence",
            TemplateCategory::Summarize => "chapter",
        }
    }

    pub fn default_template(self) -> &'static str {
        match self {
            TemplateCategory::Expand => "请根据以下内容进行创意扩写，保持原有的风格和情节连贯性",
            TemplateCategory::Polish => "请保持原意，对下文进行润色提升可读性与节奏感。",
            TemplateCategory::Summarize => "请生成3句以内的概要，突出核心信息与推进点。",
        }
    }
}

/// Which link of the chain produced a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSource {
    Document,
    Global,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    pub text: String,
    pub source: TemplateSource,
}

pub struct TemplateResolver<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: TemplateStore + ?Sized> TemplateResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    async fn lookup(&self, scope: &TemplateScope, category: TemplateCategory, key: &str) -> Option<String> {
        match self.store.fetch_templates(scope).await {
            Ok(table) => table.lookup(category.as_str(), key).map(str::to_string),
            Err(e) => {
                warn!(%scope, category = category.as_str(), error = %e, "template lookup failed, falling back");
                None
            }
        }
    }

    pub async fn resolve(
        &self,
        category: TemplateCategory,
        key: &str,
        document: Option<&str>,
    ) -> ResolvedTemplate {
        let resolved = self.resolve_inner(category, key, document).await;
        debug!(
            category = category.as_str(),
            key,
            source = ?resolved.source,
            "resolved template"
        );
        resolved
    }

    async fn resolve_inner(
        &self,
        category: TemplateCategory,
        key: &str,
        document: Option<&str>,
    ) -> ResolvedTemplate {
        if let Some(id) = document.filter(|id| !id.is_empty()) {
            let scope = TemplateScope::Document(id.to_string());
            if let Some(text) = self.lookup(&scope, category, key).await {
                return ResolvedTemplate {
                    text,
                    source: TemplateSource::Document,
                };
            }
        }
        if let Some(text) = self.lookup(&TemplateScope::Global, category, key).await {
            return ResolvedTemplate {
                text,
                source: TemplateSource::Global,
            };
        }
        ResolvedTemplate {
            text: category.default_template().to_string(),
            source: TemplateSource::Default,
        }
    }
}

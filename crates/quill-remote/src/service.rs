// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;

use crate::{
    ComposedUnit, ExpandRequest, GenerationResult, PolishRequest, PromptTable, ReformatRequest,
    ReformatResult, RemoteError, SummarizeRequest, SummaryResult, TemplateScope, UnitUpdate,
};

/// The remote AI generation endpoints plus the reformat utility.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn expand(&self, req: ExpandRequest) -> Result<GenerationResult, RemoteError>;
    async fn polish(&self, req: PolishRequest) -> Result<GenerationResult, RemoteError>;
    async fn summarize(&self, req: SummarizeRequest) -> Result<SummaryResult, RemoteError>;
    async fn reformat(&self, req: ReformatRequest) -> Result<ReformatResult, RemoteError>;
}

/// Read-only access to prompt tables.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn fetch_templates(&self, scope: &TemplateScope) -> Result<PromptTable, RemoteError>;
}

/// Chapters or outline entries belonging to one document.
#[async_trait]
pub trait UnitStore: Send + Sync {
    /// The store may answer with a unit whose id differs from `id`.
    async fn update_unit(&self, id: &str, update: UnitUpdate) -> Result<ComposedUnit, RemoteError>;

    async fn list_units(&self) -> Result<Vec<ComposedUnit>, RemoteError>;
}

/// Anything that serves all three concerns.
pub trait Backend: GenerationService + TemplateStore + UnitStore {
    fn name(&self) -> &str;
}

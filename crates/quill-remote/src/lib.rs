// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod envelope;
mod error;
mod http;
mod memory;
mod mock;
mod scripted;
mod service;
mod types;

pub use envelope::{Envelope, ErrorBody};
pub use error::RemoteError;
pub use http::HttpBackend;
pub use mock::{MatchType, MockBackend, MockSeed, ReplyRule, SeedPrompts};
pub use scripted::{Call, ScriptedBackend};
pub use service::{Backend, GenerationService, TemplateStore, UnitStore};
pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use quill_config::{BackendKind, RemoteConfig};
use tracing::debug;

/// Construct the configured backend.
///
/// - `http` → [`HttpBackend`] against `base_url`
/// - `mock` → [`MockBackend`], seeded from `QUILL_MOCK_SEED` or
///   `remote.mock_seed` when either is set
pub fn from_config(cfg: &RemoteConfig) -> anyhow::Result<Arc<dyn Backend>> {
    match cfg.backend {
        BackendKind::Http => {
            let timeout = (cfg.timeout_secs > 0).then(|| Duration::from_secs(cfg.timeout_secs));
            debug!(base_url = %cfg.base_url, collection = %cfg.collection, "using http backend");
            Ok(Arc::new(HttpBackend::new(
                &cfg.base_url,
                cfg.resolve_token(),
                cfg.novel_id.clone(),
                cfg.collection.clone(),
                timeout,
            )?))
        }
        BackendKind::Mock => {
            // Prefer env var, then config field
            let seed = std::env::var("QUILL_MOCK_SEED")
                .ok()
                .map(std::path::PathBuf::from)
                .or_else(|| cfg.mock_seed_path());
            match seed {
                Some(path) => {
                    debug!(path = %path.display(), "using seeded mock backend");
                    Ok(Arc::new(MockBackend::from_file(&path)?))
                }
                None => Ok(Arc::new(MockBackend::new())),
            }
        }
    }
}

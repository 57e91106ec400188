// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

use quill_format::FormatOptions;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    /// Default settings sent with every reformat request.
    #[serde(default)]
    pub format: FormatOptions,
}

/// Which backend serves generation, templates and unit storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// JSON-over-HTTP content store.
    #[default]
    Http,
    /// In-process backend with deterministic answers; no network.
    Mock,
}

fn default_base_url() -> String {
    "http://localhost:8000".into()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_collection() -> String {
    "chapters".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// Base URL of the content store; endpoint paths are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token.  Prefer `token_env` in config files checked into git.
    pub token: Option<String>,
    /// Environment variable holding the bearer token.  `QUILL_TOKEN` is
    /// consulted when neither `token` nor `token_env` is set.
    pub token_env: Option<String>,
    /// Per-request timeout.  0 disables the timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Document scope (novel id) used for template lookup and unit storage.
    pub novel_id: Option<String>,
    /// Unit collection under the novel: `"chapters"` or `"outlines"`.
    #[serde(default = "default_collection")]
    pub collection: String,
    /// YAML file that seeds the mock backend's templates and units.
    /// `~` and environment variables are expanded.
    pub mock_seed: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Http,
            base_url: default_base_url(),
            token: None,
            token_env: None,
            timeout_secs: default_timeout_secs(),
            novel_id: None,
            collection: default_collection(),
            mock_seed: None,
        }
    }
}

impl RemoteConfig {
    /// Resolve the bearer token: explicit value, then `token_env`, then
    /// `QUILL_TOKEN`.
    pub fn resolve_token(&self) -> Option<String> {
        if let Some(t) = &self.token {
            return Some(t.clone());
        }
        let env = self.token_env.as_deref().unwrap_or("QUILL_TOKEN");
        std::env::var(env).ok().filter(|t| !t.is_empty())
    }

    /// `mock_seed` with `~` and `$VARS` expanded.
    pub fn mock_seed_path(&self) -> Option<std::path::PathBuf> {
        self.mock_seed.as_deref().map(|p| {
            let expanded = shellexpand::full(p)
                .map(|c| c.into_owned())
                .unwrap_or_else(|_| p.to_string());
            std::path::PathBuf::from(expanded)
        })
    }
}

/// How the range mutator treats the selection captured at dispatch time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Replace whatever is selected when the result arrives.
    #[default]
    Lenient,
    /// Refuse to apply unless the captured range is still selected and its
    /// text is unchanged.
    Strict,
}

fn default_tail_chars() -> usize {
    500
}
fn default_style() -> String {
    "默认".into()
}
fn default_sentinel() -> String {
    "（自动生成）".into()
}
fn default_separator() -> String {
    "\n\n".into()
}
fn default_expand_max_tokens() -> u32 {
    1000
}
fn default_summarize_max_sentences() -> u32 {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Characters taken from the end of the buffer when expanding without a
    /// selection.
    #[serde(default = "default_tail_chars")]
    pub expand_tail_chars: usize,
    #[serde(default)]
    pub selection_policy: SelectionPolicy,
    /// Style name substituted for the style placeholder and sent with
    /// expand/polish requests.
    #[serde(default = "default_style")]
    pub default_style: String,
    /// Substituted for placeholders that have no value at dispatch time.
    #[serde(default = "default_sentinel")]
    pub sentinel: String,
    /// Prefixed to results inserted at the caret.
    #[serde(default = "default_separator")]
    pub insert_separator: String,
    #[serde(default = "default_expand_max_tokens")]
    pub expand_max_tokens: u32,
    #[serde(default = "default_summarize_max_sentences")]
    pub summarize_max_sentences: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            expand_tail_chars: default_tail_chars(),
            selection_policy: SelectionPolicy::Lenient,
            default_style: default_style(),
            sentinel: default_sentinel(),
            insert_separator: default_separator(),
            expand_max_tokens: default_expand_max_tokens(),
            summarize_max_sentences: default_summarize_max_sentences(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.remote.backend, BackendKind::Http);
        assert_eq!(cfg.remote.collection, "chapters");
        assert_eq!(cfg.editor.expand_tail_chars, 500);
        assert_eq!(cfg.editor.sentinel, "（自动生成）");
        assert_eq!(cfg.editor.selection_policy, SelectionPolicy::Lenient);
        assert_eq!(cfg.format.indent, 2);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg: Config = toml::from_str(
            r#"[editor]
selection_policy = "strict"

[format]
layout_mode = "simple""#,
        )
        .unwrap();
        assert_eq!(cfg.editor.selection_policy, SelectionPolicy::Strict);
        assert_eq!(cfg.editor.default_style, "默认");
        assert_eq!(cfg.format.layout_mode, quill_format::LayoutMode::Simple);
        assert!(cfg.format.smart_spacing);
    }

    #[test]
    fn explicit_token_wins() {
        let remote = RemoteConfig {
            token: Some("abc".into()),
            token_env: Some("QUILL_TEST_TOKEN_UNSET_XYZ".into()),
            ..RemoteConfig::default()
        };
        assert_eq!(remote.resolve_token().as_deref(), Some("abc"));
    }

    #[test]
    fn missing_token_env_resolves_to_none() {
        let remote = RemoteConfig {
            token_env: Some("QUILL_TEST_TOKEN_UNSET_XYZ".into()),
            ..RemoteConfig::default()
        };
        assert_eq!(remote.resolve_token(), None);
    }
}

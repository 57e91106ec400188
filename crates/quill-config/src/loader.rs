// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::Config;

/// System, user, then project-local config files, lowest priority first.
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("/etc/quill/config.toml"));

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config/quill/config.toml"));
    }
    if let Some(cfg) = dirs::config_dir() {
        let p = cfg.join("quill/config.toml");
        if !paths.contains(&p) {
            paths.push(p);
        }
    }

    // Project-local
    paths.push(PathBuf::from(".quill/config.toml"));
    paths.push(PathBuf::from("quill.toml"));

    paths
}

fn read_layer(path: &Path) -> anyhow::Result<toml::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Merge every config layer that exists, then `extra` on top.
///
/// A missing `extra` file is an error; missing discovered files are skipped.
pub fn load(extra: Option<&Path>) -> anyhow::Result<Config> {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in config_search_paths() {
        if path.is_file() {
            debug!(path = %path.display(), "loading config layer");
            merge_toml(&mut merged, read_layer(&path)?);
        }
    }

    if let Some(p) = extra {
        debug!(path = %p.display(), "loading explicit config");
        merge_toml(&mut merged, read_layer(p)?);
    }

    merged.try_into().context("invalid configuration")
}

/// Tables merge key by key; any other value in `src` replaces `dst`.
fn merge_toml(dst: &mut toml::Value, src: toml::Value) {
    match (dst, src) {
        (toml::Value::Table(d), toml::Value::Table(s)) => {
            for (k, v) in s {
                let entry = d.entry(k).or_insert(toml::Value::Table(toml::map::Map::new()));
                merge_toml(entry, v);
            }
        }
        (dst, src) => *dst = src,
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BackendKind, SelectionPolicy};

    fn val(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn merge_scalar_src_wins() {
        let mut dst = val(r#"x = 1"#);
        merge_toml(&mut dst, val(r#"x = 2"#));
        assert_eq!(dst["x"].as_integer(), Some(2));
    }

    #[test]
    fn merge_nested_tables() {
        let mut dst = val(r#"[remote]
backend = "http"
base_url = "http://a""#);
        merge_toml(&mut dst, val(r#"[remote]
base_url = "http://b""#));
        assert_eq!(dst["remote"]["backend"].as_str(), Some("http"));
        assert_eq!(dst["remote"]["base_url"].as_str(), Some("http://b"));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let result = load(Some(Path::new("/tmp/quill_nonexistent_config_xyz.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, r#"[remote]
backend = "mock"
novel_id = "n1"

[editor]
selection_policy = "strict"
expand_tail_chars = 64"#).unwrap();
        let cfg = load(Some(f.path())).unwrap();
        assert_eq!(cfg.remote.backend, BackendKind::Mock);
        assert_eq!(cfg.remote.novel_id.as_deref(), Some("n1"));
        assert_eq!(cfg.editor.selection_policy, SelectionPolicy::Strict);
        assert_eq!(cfg.editor.expand_tail_chars, 64);
        assert_eq!(cfg.editor.summarize_max_sentences, 3);
    }

    #[test]
    fn malformed_values_are_reported() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, r#"[editor]
expand_tail_chars = "lots""#).unwrap();
        assert!(load(Some(f.path())).is_err());
    }
}

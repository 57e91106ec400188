// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The `{ok, data?, error?:{msg}}` wrapper every content-store response uses.

use serde::{Deserialize, Serialize};

use crate::RemoteError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub msg: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub ok: bool,
    #[serde(default = "none", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(ErrorBody { msg: msg.into() }),
        }
    }

    /// `ok:false` and a missing `data` are both failures.
    pub fn into_result(self, endpoint: &str) -> Result<T, RemoteError> {
        if !self.ok {
            let msg = self
                .error
                .map(|e| e.msg)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "ok:false without message".into());
            return Err(RemoteError::rejected(endpoint, msg));
        }
        self.data.ok_or_else(|| RemoteError::MissingData {
            endpoint: endpoint.to_string(),
        })
    }
}

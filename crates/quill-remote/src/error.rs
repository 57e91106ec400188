// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use thiserror::Error;

/// Every way a call to the content store can fail.  Callers treat all
/// variants as one failure class; the variants exist for diagnostics.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("{endpoint} rejected the request: {msg}")]
    Rejected { endpoint: String, msg: String },

    #[error("{endpoint} returned no data")]
    MissingData { endpoint: String },

    #[error("could not decode {endpoint} response: {msg}")]
    Decode { endpoint: String, msg: String },

    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("no document scope configured (set remote.novel_id)")]
    NoDocumentScope,
}

impl RemoteError {
    pub fn rejected(endpoint: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Rejected {
            endpoint: endpoint.into(),
            msg: msg.into(),
        }
    }
}

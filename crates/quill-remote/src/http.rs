// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! JSON-over-HTTP backend for the content store.
//!
//! Endpoints, relative to `base_url`:
//! - `POST /api/ai/expand`, `/api/ai/polish`, `/api/ai/summarize`
//! - `POST /api/utils/reformat`
//! - `GET  /api/utils/prompts?scope=novel&novel_id=…` or `?scope=global`
//! - `GET  /api/novels/{novel}/{collection}`
//! - `PUT  /api/novels/{novel}/{collection}/{id}`
//!
//! Every response is wrapped in an [`Envelope`]; non-2xx statuses, transport
//! errors and `ok:false` all surface as [`RemoteError`].

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::{
    service::{Backend, GenerationService, TemplateStore, UnitStore},
    ComposedUnit, Envelope, ExpandRequest, GenerationResult, PolishRequest, PromptTable,
    PromptsPayload, ReformatRequest, ReformatResult, RemoteError, SummarizeRequest,
    SummaryResult, TemplateScope, UnitListPayload, UnitPayload, UnitUpdate,
};

pub struct HttpBackend {
    base: Url,
    token: Option<String>,
    novel_id: Option<String>,
    collection: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        novel_id: Option<String>,
        collection: impl Into<String>,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("invalid base_url '{base_url}'"))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("base_url '{base_url}' cannot carry a path");
        }
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            base,
            token,
            novel_id,
            collection: collection.into(),
            client: builder.build().context("building HTTP client")?,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn unit_segments<'a>(&'a self, id: Option<&'a str>) -> Result<Vec<&'a str>, RemoteError> {
        let novel = self.novel_id.as_deref().ok_or(RemoteError::NoDocumentScope)?;
        let mut segs = vec!["api", "novels", novel, self.collection.as_str()];
        segs.extend(id);
        Ok(segs)
    }

    async fn call<B, T>(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = url.path().to_string();
        debug!(%method, endpoint = %endpoint, "content store request");

        let mut req = self.client.request(method, url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await.map_err(|source| RemoteError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await.map_err(|source| RemoteError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;
        let envelope: Envelope<T> =
            serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decode {
                endpoint: endpoint.clone(),
                msg: e.to_string(),
            })?;
        envelope.into_result(&endpoint)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, RemoteError> {
        self.call(Method::POST, self.url(segments), &[], Some(body)).await
    }
}

#[async_trait]
impl GenerationService for HttpBackend {
    async fn expand(&self, req: ExpandRequest) -> Result<GenerationResult, RemoteError> {
        self.post(&["api", "ai", "expand"], &req).await
    }

    async fn polish(&self, req: PolishRequest) -> Result<GenerationResult, RemoteError> {
        self.post(&["api", "ai", "polish"], &req).await
    }

    async fn summarize(&self, req: SummarizeRequest) -> Result<SummaryResult, RemoteError> {
        self.post(&["api", "ai", "summarize"], &req).await
    }

    async fn reformat(&self, req: ReformatRequest) -> Result<ReformatResult, RemoteError> {
        self.post(&["api", "utils", "reformat"], &req).await
    }
}

#[async_trait]
impl TemplateStore for HttpBackend {
    async fn fetch_templates(&self, scope: &TemplateScope) -> Result<PromptTable, RemoteError> {
        let url = self.url(&["api", "utils", "prompts"]);
        let payload: PromptsPayload = self
            .call::<(), _>(Method::GET, url, &scope.query(), None)
            .await?;
        Ok(payload.prompts)
    }
}

#[async_trait]
impl UnitStore for HttpBackend {
    async fn update_unit(&self, id: &str, update: UnitUpdate) -> Result<ComposedUnit, RemoteError> {
        let url = self.url(&self.unit_segments(Some(id))?);
        let payload: UnitPayload = self.call(Method::PUT, url, &[], Some(&update)).await?;
        Ok(payload.composed_unit)
    }

    async fn list_units(&self) -> Result<Vec<ComposedUnit>, RemoteError> {
        let url = self.url(&self.unit_segments(None)?);
        let payload: UnitListPayload = self.call::<(), _>(Method::GET, url, &[], None).await?;
        Ok(payload.items)
    }
}

impl Backend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }
}

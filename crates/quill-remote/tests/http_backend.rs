// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! HttpBackend against a throw-away axum server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use quill_remote::{
    ExpandRequest, GenerationService, HttpBackend, PolishRequest, ReformatRequest, RemoteError,
    SummarizeRequest, TemplateScope, TemplateStore, UnitStore, UnitUpdate,
};

#[derive(Default, Clone)]
struct Seen {
    bodies: Arc<Mutex<Vec<(String, Value)>>>,
    auth: Arc<Mutex<Vec<Option<String>>>>,
}

impl Seen {
    fn push(&self, path: &str, headers: &HeaderMap, body: Value) {
        self.bodies.lock().unwrap().push((path.to_string(), body));
        self.auth.lock().unwrap().push(
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server failed");
    });
    addr
}

fn app(seen: Seen) -> Router {
    let s1 = seen.clone();
    let s2 = seen.clone();
    let s3 = seen;
    Router::new()
        .route(
            "/api/ai/expand",
            post(move |h: HeaderMap, Json(b): Json<Value>| async move {
                s1.push("/api/ai/expand", &h, b.clone());
                let input = b["input_summary"].as_str().unwrap_or_default().to_string();
                Json(json!({"ok": true, "data": {"result_text": format!("{input}，没有回头。")}}))
            }),
        )
        .route(
            "/api/ai/polish",
            post(move |h: HeaderMap, Json(b): Json<Value>| async move {
                s2.push("/api/ai/polish", &h, b);
                Json(json!({"ok": false, "error": {"msg": "quota exceeded"}}))
            }),
        )
        .route(
            "/api/ai/summarize",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        )
        .route(
            "/api/utils/reformat",
            post(|| async { "this is not json" }),
        )
        .route(
            "/api/utils/prompts",
            get(move |Query(q): Query<HashMap<String, String>>| async move {
                let prompts = match (q.get("scope").map(String::as_str), q.get("novel_id")) {
                    (Some("novel"), Some(id)) if id == "n1" => json!({"polish": "文档润色"}),
                    (Some("global"), None) => json!({"expand": {"paragraph": "全局扩写"}}),
                    _ => json!({}),
                };
                Json(json!({"ok": true, "data": {"prompts": prompts}}))
            }),
        )
        .route(
            "/api/novels/:novel/chapters",
            get(|Path(novel): Path<String>| async move {
                Json(json!({"ok": true, "data": {"chapters": [
                    {"id": "a", "title": format!("{novel}-一"), "order": 1},
                    {"id": "b", "title": "二", "order": 2, "content": "正文"}
                ]}}))
            }),
        )
        .route(
            "/api/novels/:novel/chapters/:id",
            put(move |Path((_novel, id)): Path<(String, String)>, h: HeaderMap, Json(b): Json<Value>| async move {
                s3.push(&format!("/chapters/{id}"), &h, b.clone());
                let new_id = if b.get("title").and_then(Value::as_str) == Some("改名") {
                    "renamed".to_string()
                } else {
                    id
                };
                Json(json!({"ok": true, "data": {"chapter": {
                    "id": new_id,
                    "title": b["title"],
                    "order": b["order"],
                }}}))
            }),
        )
}

async fn backend(token: Option<&str>) -> (HttpBackend, Seen) {
    let seen = Seen::default();
    let addr = serve(app(seen.clone())).await;
    let b = HttpBackend::new(
        &format!("http://{addr}"),
        token.map(str::to_string),
        Some("n1".into()),
        "chapters",
        Some(std::time::Duration::from_secs(5)),
    )
    .unwrap();
    (b, seen)
}

#[tokio::test]
async fn expand_round_trip_with_bearer_token() {
    let (b, seen) = backend(Some("secret")).await;
    let r = b
        .expand(ExpandRequest {
            novel_id: Some("n1".into()),
            prompt_template: "续写".into(),
            input_summary: "他转身离开".into(),
            style: "default".into(),
            max_tokens: 1000,
        })
        .await
        .unwrap();
    assert_eq!(r.result_text.as_deref(), Some("他转身离开，没有回头。"));

    let bodies = seen.bodies.lock().unwrap().clone();
    assert_eq!(bodies[0].1["max_tokens"], 1000);
    assert_eq!(bodies[0].1["novel_id"], "n1");
    assert_eq!(
        seen.auth.lock().unwrap()[0].as_deref(),
        Some("Bearer secret")
    );
}

#[tokio::test]
async fn ok_false_is_rejected_with_message() {
    let (b, _) = backend(None).await;
    let err = b
        .polish(PolishRequest {
            text: "t".into(),
            preserve_content: true,
            style: "default".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Rejected { ref msg, .. } if msg == "quota exceeded"));
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let (b, _) = backend(None).await;
    let err = b
        .summarize(SummarizeRequest {
            text: "t".into(),
            max_sentences: 3,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Status { status: 502, .. }));
}

#[tokio::test]
async fn undecodable_body_is_reported() {
    let (b, _) = backend(None).await;
    let err = b
        .reformat(ReformatRequest {
            text: "甲。".into(),
            settings: Default::default(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Decode { .. }));
}

#[tokio::test]
async fn templates_are_fetched_per_scope() {
    let (b, _) = backend(None).await;
    let doc = b
        .fetch_templates(&TemplateScope::Document("n1".into()))
        .await
        .unwrap();
    assert_eq!(doc.lookup("polish", "sentence"), Some("文档润色"));
    let global = b.fetch_templates(&TemplateScope::Global).await.unwrap();
    assert_eq!(global.lookup("expand", "paragraph"), Some("全局扩写"));
    assert_eq!(global.lookup("polish", "sentence"), None);
}

#[tokio::test]
async fn units_list_and_update_with_identity_change() {
    let (b, seen) = backend(None).await;
    let units = b.list_units().await.unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].title, "n1-一");
    assert_eq!(units[1].content, "正文");

    let same = b.update_unit("a", UnitUpdate::reorder(2, "一")).await.unwrap();
    assert_eq!(same.id, "a");
    assert_eq!(same.order, 2);

    let renamed = b.update_unit("b", UnitUpdate::reorder(1, "改名")).await.unwrap();
    assert_eq!(renamed.id, "renamed");

    let bodies = seen.bodies.lock().unwrap().clone();
    assert_eq!(bodies[0].0, "/chapters/a");
    assert_eq!(bodies[0].1, json!({"order": 2, "title": "一"}));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let b = HttpBackend::new(&format!("http://{addr}"), None, Some("n1".into()), "chapters", None)
        .unwrap();
    assert!(matches!(
        b.list_units().await,
        Err(RemoteError::Transport { .. })
    ));
}

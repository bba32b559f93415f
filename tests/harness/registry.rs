// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-process registry serving the document creation route.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use serde_json::Value;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const CREATE_PATH: &str = "/api/v3/lk/documents/create";

/// A request as the registry received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub content_type: Option<String>,
    pub signature: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct RegistryState {
    status: Arc<AtomicU16>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Registry answering every creation request with a configurable status.
pub struct MockRegistry {
    pub endpoint: String,
    state: RegistryState,
}

impl MockRegistry {
    pub async fn start(status: u16) -> Self {
        let state = RegistryState {
            status: Arc::new(AtomicU16::new(status)),
            requests: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route(CREATE_PATH, post(create_document))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            endpoint: format!("http://{}{}", addr, CREATE_PATH),
            state,
        }
    }

    pub fn set_status(&self, status: u16) {
        self.state.status.store(status, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn create_document(
    State(state): State<RegistryState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        content_type: header_value(header::CONTENT_TYPE.as_str()),
        signature: header_value("signature"),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });

    let status = StatusCode::from_u16(state.status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status == StatusCode::OK {
        (status, r#"{"value":"created"}"#.to_string())
    } else {
        (status, "registry temporarily unavailable".to_string())
    }
}

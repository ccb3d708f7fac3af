// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP surface: webhook intake, status board and health check
//!
//! Webhooks are acknowledged as soon as the run is queued; the outcome is
//! only visible on `/status` and in the logs.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use quay_adapters::{ProcessRunner, RepoAdapter};
use quay_core::{DeployConfig, PushError, PushNotification, RequestError};
use quay_engine::{PipelineQueue, StatusSnapshot};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// Header naming the webhook event type
pub const EVENT_HEADER: &str = "x-github-event";

/// Shared handler state
pub struct AppState<R, P> {
    config: Arc<DeployConfig>,
    queue: PipelineQueue<R, P>,
}

impl<R, P> Clone for AppState<R, P> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            queue: self.queue.clone(),
        }
    }
}

impl<R, P> AppState<R, P> {
    pub fn new(config: DeployConfig, queue: PipelineQueue<R, P>) -> Self {
        Self {
            config: Arc::new(config),
            queue,
        }
    }
}

/// Errors turned into 4xx responses
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("malformed push payload: {0}")]
    Payload(#[from] PushError),
    #[error("malformed form body: {0}")]
    Form(String),
    #[error("unreadable body: {0}")]
    Body(String),
    #[error("unusable branch: {0}")]
    Request(#[from] RequestError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "rejected webhook");
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// Form-encoded deliveries carry the JSON document in `payload`
#[derive(Debug, Deserialize)]
struct FormDelivery {
    payload: String,
}

/// Create the router with all endpoints
pub fn router<R, P>(state: AppState<R, P>) -> Router
where
    R: RepoAdapter,
    P: ProcessRunner,
{
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status::<R, P>))
        .route("/webhook", post(webhook::<R, P>))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn status<R, P>(State(state): State<AppState<R, P>>) -> Json<StatusSnapshot>
where
    R: RepoAdapter,
    P: ProcessRunner,
{
    Json(state.queue.status())
}

pub async fn webhook<R, P>(
    State(state): State<AppState<R, P>>,
    request: Request,
) -> Result<Response, ServerError>
where
    R: RepoAdapter,
    P: ProcessRunner,
{
    let headers = request.headers().clone();
    if event_name(&headers) == Some("ping") {
        return Ok(ignored("ping"));
    }

    let body = read_payload(&headers, request).await?;
    let push = PushNotification::from_json(&body)?;

    if push.deleted {
        return Ok(ignored("ref deleted"));
    }
    let Some(branch) = push.branch() else {
        let reason = if push.is_tag() { "tag push" } else { "not a branch ref" };
        return Ok(ignored(reason));
    };
    if !state.config.accepts_repository(&push.repository) {
        return Ok(ignored("repository mismatch"));
    }
    if !state.config.accepts_branch(branch) {
        return Ok(ignored("branch not configured"));
    }

    let request = state.config.request_for(branch)?;
    let submission = state.queue.submit(request);
    tracing::info!(
        branch,
        repository = %push.repository,
        commit = push.short_sha().unwrap_or("unknown"),
        run_id = %submission.run_id(),
        status = submission.status(),
        "push accepted"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "status": submission.status(),
            "branch": branch,
            "run_id": submission.run_id().to_string(),
        })),
    )
        .into_response())
}

fn event_name(headers: &HeaderMap) -> Option<&str> {
    headers.get(EVENT_HEADER).and_then(|v| v.to_str().ok())
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// The JSON document, whether sent raw or form-encoded
async fn read_payload(headers: &HeaderMap, request: Request) -> Result<Bytes, ServerError> {
    if is_form(headers) {
        let Form(delivery) = Form::<FormDelivery>::from_request(request, &())
            .await
            .map_err(|e| ServerError::Form(e.body_text()))?;
        return Ok(Bytes::from(delivery.payload));
    }

    Bytes::from_request(request, &())
        .await
        .map_err(|e| ServerError::Body(e.body_text()))
}

fn ignored(reason: &str) -> Response {
    tracing::info!(reason, "webhook ignored");
    (
        StatusCode::OK,
        Json(json!({ "status": "ignored", "reason": reason })),
    )
        .into_response()
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;

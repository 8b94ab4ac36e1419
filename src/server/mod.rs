// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! HTTP servers and the shared error response.
//!
//! Every rejected request answers with a JSON body of the form
//! `{"error": "<reason>", "detail": "<message>"}` where `reason` is a short
//! machine-readable code.

pub mod annotate;
pub mod gallery;

use crate::io::{data_url::DataUrlError, dataset::StoreError};
use crate::models::frame::FrameError;
use anyhow::{Context, Result};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use thiserror::Error;

/// Errors a handler reports to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    DataUrl(#[from] DataUrlError),
    #[error("width and height must be positive")]
    BadDimensions,
    #[error("invalid request: {0}")]
    BadBody(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Status code and reason code for this error.
    pub fn status_and_reason(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Frame(FrameError::BadSplit) => (StatusCode::BAD_REQUEST, "bad_split"),
            ApiError::Frame(FrameError::BadName) => (StatusCode::BAD_REQUEST, "bad_name"),
            ApiError::Frame(FrameError::BadExtension) => {
                (StatusCode::BAD_REQUEST, "bad_extension")
            }
            ApiError::Frame(FrameError::NotFound) | ApiError::NotFound(_) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            ApiError::DataUrl(DataUrlError::BadPrefix) => (StatusCode::BAD_REQUEST, "bad_data_url"),
            ApiError::DataUrl(_) => (StatusCode::BAD_REQUEST, "bad_base64"),
            ApiError::BadDimensions => (StatusCode::BAD_REQUEST, "bad_dimensions"),
            ApiError::BadBody(_) => (StatusCode::BAD_REQUEST, "bad_body"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Frame(e) => ApiError::Frame(e),
            StoreError::Io(e) => ApiError::Io(e),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason) = self.status_and_reason();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::warn!("Rejected request: {} ({})", self, reason);
        }
        let body = Json(json!({ "error": reason, "detail": self.to_string() }));
        (status, body).into_response()
    }
}

/// Replace every `{{KEY}}` in `template` with its value, in one pass.
///
/// Substituted text is never scanned again, so values may contain braces.
/// Unknown placeholders are left as they are.
pub(crate) fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let value = after.find("}}").and_then(|end| {
            let key = &after[..end];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (v.as_str(), end))
        });
        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Bind `addr` and serve `app` until Ctrl+C.
pub async fn serve(app: Router, addr: SocketAddr, name: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    log::info!("{} listening on http://{}", name, listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    log::info!("{} stopped", name);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use tower::ServiceExt;

    /// Send one request through `app` and collect the response.
    pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    pub async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = get(app, uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    pub async fn post_json(
        app: &Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation server: frame listing, frame download and label upload.
//!
//! The editor page is embedded in the binary. It fetches frames from this
//! server, paints the mask client-side and posts the flattened PNG back to
//! `/api/save-label`.

use crate::config::{AnnotateConfig, EditorDefaults};
use crate::io::data_url::decode_png_data_url;
use crate::io::dataset::FrameStore;
use crate::models::frame::{FrameRef, Split};
use crate::models::label::Label;
use crate::server::{fill_template, ApiError};
use crate::util::geometry::GridLayout;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

const PAGE_TEMPLATE: &str = include_str!("../../assets/annotate.html");

#[derive(Clone)]
struct AppState {
    store: FrameStore,
    editor: EditorDefaults,
    page: Arc<str>,
}

#[derive(Debug, Deserialize)]
struct ImagesQuery {
    split: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImagesResponse {
    split: Split,
    images: Vec<String>,
    count: usize,
}

#[derive(Debug, Deserialize)]
struct FrameQuery {
    split: Option<String>,
    image_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SaveLabelRequest {
    split: String,
    image_name: String,
    png_data_url: String,
}

#[derive(Debug, Serialize)]
struct SaveLabelResponse {
    saved: bool,
    path: String,
}

#[derive(Debug, Deserialize)]
struct GridQuery {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Serialize)]
struct EditorSettingsResponse {
    brush_width: f64,
    drone_radius: f64,
    orange_radius: f64,
    mask_alpha: f32,
}

/// Build the annotation router for `config`.
pub fn router(config: &AnnotateConfig) -> Router {
    let editor = config.editor.clamped();
    let state = AppState {
        store: FrameStore::new(&config.dataset_dir),
        editor,
        page: render_page(&editor).into(),
    };

    Router::new()
        .route("/", get(index))
        .route("/api/images", get(list_images))
        .route("/api/frame", get(fetch_frame))
        .route("/api/save-label", post(save_label))
        .route("/api/grid", get(grid_layout))
        .route("/api/editor-settings", get(editor_settings))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(state)
}

/// Fill the page template with the configured defaults and label colours.
fn render_page(editor: &EditorDefaults) -> String {
    let brush = editor.brush;
    fill_template(
        PAGE_TEMPLATE,
        &[
            ("BRUSH_WIDTH", brush.brush_width.to_string()),
            ("DRONE_RADIUS", brush.drone_radius.to_string()),
            ("ORANGE_RADIUS", brush.orange_radius.to_string()),
            ("MASK_ALPHA", editor.mask_alpha.to_string()),
            ("COLOR_PATH", Label::Path.css()),
            ("COLOR_UNKNOWN", Label::Unknown.css()),
            ("COLOR_WALL", Label::Wall.css()),
            ("COLOR_DRONE", Label::Drone.css()),
            ("COLOR_ORANGE", Label::Orange.css()),
        ],
    )
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.page.to_string())
}

async fn list_images(
    State(state): State<AppState>,
    query: Result<Query<ImagesQuery>, QueryRejection>,
) -> Result<Json<ImagesResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadBody(e.body_text()))?;
    let split: Split = query.split.as_deref().unwrap_or_default().parse()?;
    let store = state.store.clone();
    let images = tokio::task::spawn_blocking(move || store.list(split)).await??;
    log::debug!("Listed {} frames in {}", images.len(), split);
    Ok(Json(ImagesResponse {
        split,
        count: images.len(),
        images,
    }))
}

async fn fetch_frame(
    State(state): State<AppState>,
    query: Result<Query<FrameQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadBody(e.body_text()))?;
    let split = query.split.as_deref().unwrap_or_default();
    let frame = FrameRef::parse(split, query.image_name.as_deref().unwrap_or_default())?;
    let content_type = content_type_for(frame.name());
    let store = state.store.clone();
    let bytes = tokio::task::spawn_blocking(move || store.read(&frame)).await??;
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

async fn save_label(
    State(state): State<AppState>,
    payload: Result<Json<SaveLabelRequest>, JsonRejection>,
) -> Result<Json<SaveLabelResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadBody(e.body_text()))?;

    let frame = FrameRef::parse(&request.split, &request.image_name)?;
    state.store.locate(&frame)?;
    let png = decode_png_data_url(&request.png_data_url)?;

    let store = state.store.clone();
    let saved = tokio::task::spawn_blocking(move || store.save_label(&frame, &png)).await??;
    Ok(Json(SaveLabelResponse {
        saved: true,
        path: saved.relative,
    }))
}

async fn grid_layout(
    query: Result<Query<GridQuery>, QueryRejection>,
) -> Result<Json<GridLayout>, ApiError> {
    let Query(query) = query.map_err(|_| ApiError::BadDimensions)?;
    match (query.width, query.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => {
            Ok(Json(GridLayout::new(width, height)))
        }
        _ => Err(ApiError::BadDimensions),
    }
}

async fn editor_settings(State(state): State<AppState>) -> Json<EditorSettingsResponse> {
    let editor = state.editor;
    Json(EditorSettingsResponse {
        brush_width: editor.brush.brush_width,
        drone_radius: editor.brush.drone_radius,
        orange_radius: editor.brush.orange_radius,
        mask_alpha: editor.mask_alpha,
    })
}

/// MIME type for a frame file, from its extension.
fn content_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Gallery server: one image per page with a thumbnail strip.
//!
//! The listing comes from an [`ImageLibrary`] passed in by the caller.
//! It only changes on `POST /api/refresh`.

use crate::config::GalleryConfig;
use crate::io::library::ImageLibrary;
use crate::server::{fill_template, ApiError};
use axum::extract::{Path, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::fmt::Write as _;
use std::ops::Range;
use tower_http::services::ServeDir;

const PAGE_TEMPLATE: &str = include_str!("../../assets/gallery.html");

const EMPTY_PAGE: &str = r#"<!DOCTYPE html><html><body><h1 style="text-align: center; margin-top: 50px;">No images found</h1></body></html>"#;

#[derive(Clone)]
struct AppState {
    library: ImageLibrary,
    thumbnail_radius: usize,
}

#[derive(Debug, Serialize)]
struct ImagesResponse {
    images: Vec<String>,
    count: usize,
}

#[derive(Debug, Serialize)]
struct ImageInfo {
    index: usize,
    name: String,
    url: String,
    size: u64,
}

#[derive(Debug, Serialize)]
struct RefreshResponse {
    count: usize,
}

/// Build the gallery router over an already scanned library.
pub fn router(library: ImageLibrary, config: &GalleryConfig) -> Router {
    let static_files = ServeDir::new(library.dir());
    let state = AppState {
        library,
        thumbnail_radius: config.thumbnail_radius,
    };

    Router::new()
        .route("/", get(home))
        .route("/view/:index", get(view))
        .route("/api/images", get(list_images))
        .route("/api/image/:index", get(image_info))
        .route("/api/refresh", post(refresh))
        .nest_service("/static", static_files)
        .with_state(state)
}

/// Indices of the thumbnails shown around `current`.
pub fn thumbnail_window(len: usize, current: usize, radius: usize) -> Range<usize> {
    let start = current.saturating_sub(radius);
    let end = len.min(current.saturating_add(radius).saturating_add(1));
    start..end.max(start)
}

async fn home(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&state.library.images(), 0, state.thumbnail_radius))
}

/// Page index for `/view/{raw}`, clamped into `0..len`.
///
/// Negative numbers map to the first image and numbers too large for
/// `usize` to the last. Anything that is not an integer is `None`.
fn view_index(raw: &str, len: usize) -> Option<usize> {
    let last = len.saturating_sub(1);
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, raw),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if negative {
        return Some(0);
    }
    Some(digits.parse::<usize>().map_or(last, |i| i.min(last)))
}

async fn view(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Html<String>, ApiError> {
    let images = state.library.images();
    let index = view_index(&raw, images.len()).ok_or(ApiError::NotFound("page not found"))?;
    Ok(Html(render_page(&images, index, state.thumbnail_radius)))
}

async fn list_images(State(state): State<AppState>) -> Json<ImagesResponse> {
    let images = state.library.images().to_vec();
    Json(ImagesResponse {
        count: images.len(),
        images,
    })
}

async fn image_info(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<ImageInfo>, ApiError> {
    let (index, (name, size)) = raw
        .parse::<usize>()
        .ok()
        .and_then(|index| Some((index, state.library.get(index)?)))
        .ok_or(ApiError::NotFound("Image not found"))?;
    Ok(Json(ImageInfo {
        index,
        url: static_url(&name),
        name,
        size,
    }))
}

async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshResponse>, ApiError> {
    let library = state.library.clone();
    let count = tokio::task::spawn_blocking(move || library.refresh())
        .await?
        .map_err(|e| ApiError::Internal(format!("{e:#}")))?;
    Ok(Json(RefreshResponse { count }))
}

/// URL of an image under `/static/`.
fn static_url(name: &str) -> String {
    let mut url = String::from("/static/");
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            url.push(byte as char);
        } else {
            let _ = write!(url, "%{byte:02X}");
        }
    }
    url
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Gallery page with `images[index]` as the main image.
fn render_page(images: &[String], index: usize, radius: usize) -> String {
    let Some(current) = images.get(index) else {
        return EMPTY_PAGE.to_string();
    };

    let mut thumbnails = String::new();
    for i in thumbnail_window(images.len(), index, radius) {
        let active = if i == index { " active" } else { "" };
        let _ = write!(
            thumbnails,
            r#"<img class="thumbnail{active}" src="{src}" onclick="navigate({i})" loading="lazy" data-index="{i}">"#,
            src = escape_html(&static_url(&images[i])),
        );
    }

    let urls: Vec<String> = images.iter().map(|name| static_url(name)).collect();
    let script_json = |value: &[String]| {
        serde_json::to_string(value)
            .unwrap_or_else(|_| "[]".to_string())
            .replace('<', "\\u003c")
            .replace('>', "\\u003e")
    };

    fill_template(
        PAGE_TEMPLATE,
        &[
            ("NAME", escape_html(current)),
            ("SRC", escape_html(&static_url(current))),
            ("POSITION", (index + 1).to_string()),
            ("TOTAL", images.len().to_string()),
            ("INDEX", index.to_string()),
            ("RADIUS", radius.to_string()),
            ("THUMBNAILS", thumbnails),
            ("NAMES_JSON", script_json(images)),
            ("URLS_JSON", script_json(urls.as_slice())),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::frame::GALLERY_EXTENSIONS;
    use crate::server::test_util::{get, get_json, send};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tempfile::{tempdir, TempDir};

    fn setup(files: &[(&str, &str)]) -> (TempDir, ImageLibrary, Router) {
        let dir = tempdir().unwrap();
        for (name, bytes) in files {
            std::fs::write(dir.path().join(name), bytes).unwrap();
        }
        let library = ImageLibrary::open(dir.path(), GALLERY_EXTENSIONS).unwrap();
        let app = router(library.clone(), &GalleryConfig::default());
        (dir, library, app)
    }

    fn page_text(body: Vec<u8>) -> String {
        String::from_utf8(body).unwrap()
    }

    #[test]
    fn test_thumbnail_window() {
        assert_eq!(thumbnail_window(20, 0, 5), 0..6);
        assert_eq!(thumbnail_window(20, 10, 5), 5..16);
        assert_eq!(thumbnail_window(20, 19, 5), 14..20);
        assert_eq!(thumbnail_window(3, 1, 5), 0..3);
        assert_eq!(thumbnail_window(0, 0, 5), 0..0);
    }

    #[test]
    fn test_static_url_escapes() {
        assert_eq!(static_url("a b.png"), "/static/a%20b.png");
        assert_eq!(static_url("x\"<y>.jpg"), "/static/x%22%3Cy%3E.jpg");
    }

    #[test]
    fn test_render_escapes_names() {
        let images = vec!["<b>.png".to_string()];
        let page = render_page(&images, 0, 5);
        assert!(page.contains("&lt;b&gt;.png"));
        assert!(!page.contains("<b>.png"));
    }

    #[test]
    fn test_view_index() {
        assert_eq!(view_index("1", 3), Some(1));
        assert_eq!(view_index("7", 3), Some(2));
        assert_eq!(view_index("-4", 3), Some(0));
        assert_eq!(view_index("18446744073709551616", 3), Some(2));
        assert_eq!(view_index("0", 0), Some(0));
        for raw in ["", "-", "1.5", "x1", "--1", "+1"] {
            assert_eq!(view_index(raw, 3), None, "{raw}");
        }
    }

    #[test]
    fn test_placeholder_names_stay_literal() {
        let images = vec!["{{NAME}}.png".to_string(), "b.png".to_string()];
        let page = render_page(&images, 1, 5);
        assert!(page.contains(r#"["{{NAME}}.png","b.png"]"#));
        assert!(page.contains("<title>b.png</title>"));
    }

    #[tokio::test]
    async fn test_api_images_and_info() {
        let (_dir, _library, app) = setup(&[("b.png", "bb"), ("a.jpg", "a"), ("notes.md", "x")]);

        let (status, body) = get_json(&app, "/api/images").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["images"], serde_json::json!(["a.jpg", "b.png"]));
        assert_eq!(body["count"], 2);

        let (status, body) = get_json(&app, "/api/image/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({"index": 1, "name": "b.png", "url": "/static/b.png", "size": 2})
        );

        for uri in ["/api/image/2", "/api/image/-1", "/api/image/abc"] {
            let (status, body) = get_json(&app, uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["error"], "not_found");
        }
    }

    #[tokio::test]
    async fn test_view_clamps_index() {
        let (_dir, _library, app) = setup(&[("a.png", "a"), ("b.png", "b")]);

        let (status, body) = get(&app, "/view/99").await;
        assert_eq!(status, StatusCode::OK);
        let page = page_text(body);
        assert!(page.contains("2 / 2"));
        assert!(page.contains(r#"src="/static/b.png""#));

        let (status, body) = get(&app, "/view/99999999999999999999999").await;
        assert_eq!(status, StatusCode::OK);
        assert!(page_text(body).contains("2 / 2"));

        let (status, body) = get(&app, "/view/-1").await;
        assert_eq!(status, StatusCode::OK);
        let page = page_text(body);
        assert!(page.contains("1 / 2"));
        assert!(page.contains(r#"src="/static/a.png""#));

        let (status, _) = get(&app, "/view/abc").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = get(&app, "/").await;
        assert!(page_text(body).contains("1 / 2"));
    }

    #[tokio::test]
    async fn test_empty_library_page() {
        let (_dir, _library, app) = setup(&[]);
        let (status, body) = get(&app, "/view/3").await;
        assert_eq!(status, StatusCode::OK);
        assert!(page_text(body).contains("No images found"));
    }

    #[tokio::test]
    async fn test_refresh_picks_up_new_files() {
        let (dir, library, app) = setup(&[("a.png", "a")]);
        std::fs::write(dir.path().join("c.webp"), b"c").unwrap();

        let (_, body) = get_json(&app, "/api/images").await;
        assert_eq!(body["count"], 1);

        let request = Request::post("/api/refresh").body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["count"], 2);
        assert_eq!(library.images().len(), 2);

        let (_, body) = get_json(&app, "/api/images").await;
        assert_eq!(body["images"], serde_json::json!(["a.png", "c.webp"]));
    }

    #[tokio::test]
    async fn test_static_serves_files() {
        let (_dir, _library, app) = setup(&[("a.png", "pixels")]);
        let (status, body) = get(&app, "/static/a.png").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"pixels");
    }
}

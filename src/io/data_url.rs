// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! PNG data URLs as produced by `canvas.toDataURL("image/png")`.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use thiserror::Error;

/// The only accepted data URL header.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Error)]
pub enum DataUrlError {
    #[error("png_data_url must be data:image/png;base64,...")]
    BadPrefix,
    #[error("invalid png base64: {0}")]
    BadBase64(#[from] base64::DecodeError),
    #[error("invalid png base64: empty payload")]
    Empty,
}

/// Strictly decode a PNG data URL into its raw bytes.
///
/// The prefix must match exactly; the payload must be canonical standard
/// base64 with no whitespace.
pub fn decode_png_data_url(url: &str) -> Result<Vec<u8>, DataUrlError> {
    let payload = url
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .ok_or(DataUrlError::BadPrefix)?;
    let bytes = BASE64.decode(payload)?;
    if bytes.is_empty() {
        return Err(DataUrlError::Empty);
    }
    Ok(bytes)
}

/// Wrap PNG bytes in a data URL.
pub fn encode_png_data_url(png: &[u8]) -> String {
    format!("{PNG_DATA_URL_PREFIX}{}", BASE64.encode(png))
}

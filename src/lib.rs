// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! seglab - local web tools for segmentation datasets
//!
//! Two small HTTP servers share this library:
//!
//! - the annotation server lists frames under `train/` and `val/`, serves
//!   the mask editor page and stores painted label PNGs next to the frames
//! - the gallery server shows one image at a time from a flat folder
//!
//! The mask model itself ([`editor::MaskEditor`]) and the wall grid
//! geometry ([`util::geometry`]) are plain Rust and do not depend on HTTP.

pub mod config;
pub mod editor;
pub mod io;
pub mod models;
pub mod server;
pub mod util;

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for dataset frames, labels and image directories.

pub mod data_url;
pub mod dataset;
pub mod library;

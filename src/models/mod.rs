// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Core data model: dataset frames and mask labels.

pub mod frame;
pub mod label;

/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timetabler – weekly school timetable generator
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── grid          – fixed 5 × 9 weekly grid, break slot, gap helpers
//! ├── model         – Teacher / Subject / Group / Plan / Assignment
//! ├── config/       – engine tunables + YAML plan loading
//! ├── engine/       – generation pipeline (preceptor, filler, compactor, balancer, validator)
//! ├── report        – post-run completeness, gap and load summary
//! └── rooms         – classroom binding of the finished schedule
//! ```

pub mod config;
pub mod engine;
pub mod grid;
pub mod model;
pub mod report;
pub mod rooms;

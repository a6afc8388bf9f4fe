// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Recall conversation archive.
//!
//! Configuration is merged from compiled defaults, a TOML file hierarchy,
//! and `RECALL_*` environment variables. Model structs reject unknown keys
//! so typos fail at startup instead of being silently ignored.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::RecallConfig;

//! Utility modules for data-fetch
//!
//! - `files`: folder creation and per-kind file writers
//! - `http`: HTTP client, status checks and body readers

pub mod files;
pub mod http;

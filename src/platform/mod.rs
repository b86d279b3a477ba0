//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - Storage (LocalStorage on web, see `persistence::storage`)
//! - JavaScript bindings for the presentation layer

pub mod time;

#[cfg(target_arch = "wasm32")]
pub mod web;

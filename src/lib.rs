//! Workbench layout engine for the Notewell desktop note-taking app.
//!
//! This crate is the renderer-side layout subsystem: a recursive tree of
//! resizable split panes hosting tab strips, dock bars for singleton
//! utility panels, JSON persistence of the whole tree, and per-panel push
//! channels to the backend kernel. It is embedded by the application
//! shell; there is no standalone entry point.
//!
//! The in-memory tree is the source of truth. Rendered geometry (pixel
//! bounds, header order) is a derived projection recomputed from it, which
//! keeps every tree operation testable without a UI.

/// Application version (root crate version, for use by sub-crates).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod interaction;
pub mod layout;
pub mod push;
pub mod workspace;

pub use notewell_config::Config;

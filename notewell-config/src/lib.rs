//! Configuration system for the Notewell workbench.
//!
//! This crate provides configuration loading, saving, and default values
//! for the workbench layout engine, plus the primitive types shared across
//! sub-crates:
//!
//! - Workbench limits and timing (tab cap, reconnect/debounce delays)
//! - Id newtypes for layout nodes, panes, and tabs
//! - Direction / layout-kind / dock-position enums
//! - Pixel geometry primitives used by the layout pass

pub mod config;
pub mod error;
mod types;

// Re-export main types for convenience
pub use config::Config;
pub use error::ConfigError;
pub use types::{
    DockPosition, LayoutId, LayoutKind, PanelType, Rect, SizeHint, SplitDirection, TabId, WndId,
};

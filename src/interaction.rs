//! Process-wide interaction context.
//!
//! The focused pane, the in-flight tab drag, and the kernel-error latch are
//! single-writer-at-a-time state shared by every window of the process.
//! Whichever handler owns the current gesture writes them and must clear
//! them on every completion and cancellation path; readers only observe.

use crate::layout::drag::TabDrag;
use notewell_config::{DockPosition, PanelType, WndId};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct UiInteractionState {
    /// Pane owning keyboard focus.
    pub focused_wnd: Option<WndId>,
    /// Dock panel owning focus instead of a center pane, if any.
    pub focused_dock: Option<(DockPosition, PanelType)>,
    /// Header drag in progress.
    pub drag: Option<TabDrag>,
    /// The fatal "kernel unreachable" banner has been raised.
    pub kernel_down: bool,
}

/// Handle shared between the windows of one process.
pub type SharedInteraction = Arc<Mutex<UiInteractionState>>;

pub fn shared_interaction() -> SharedInteraction {
    Arc::new(Mutex::new(UiInteractionState::default()))
}

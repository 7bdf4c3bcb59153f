//! Tab drag-and-drop protocol.
//!
//! Headers can be reordered within one strip, moved between strips, or
//! dropped on a pane's drop overlay to split it. During a gesture only the
//! header strip projection is touched; the tab order commits on drop and
//! resynchronizes on cancel.

use notewell_config::{Rect, TabId, WndId};

/// Zone of the drop overlay the cursor is in.
///
/// Edge zones split the target pane 50/50 in that direction; the center
/// zone is a plain move into the target strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropZone {
    Left,
    Right,
    Top,
    Bottom,
    Center,
}

/// Classify a cursor position over a pane's drop overlay.
///
/// The side bands claim the outer thirds near the corners and the outer
/// eighths along the middle; the top/bottom bands claim the middle third's
/// outer eighths. Everything else is the center.
pub fn overlay_drop_zone(rect: Rect, cursor_x: f32, cursor_y: f32) -> DropZone {
    let x = cursor_x - rect.x;
    let y = cursor_y - rect.y;
    let width = rect.width;
    let height = rect.height;

    if (x <= width / 3.0 && (y <= height / 8.0 || y >= height * 7.0 / 8.0))
        || (x <= width / 8.0 && (y > height / 8.0 || y < height * 7.0 / 8.0))
    {
        DropZone::Left
    } else if (x > width * 2.0 / 3.0 && (y <= height / 8.0 || y >= height * 7.0 / 8.0))
        || (x >= width * 7.0 / 8.0 && (y > height / 8.0 || y < height * 7.0 / 8.0))
    {
        DropZone::Right
    } else if x > width / 3.0 && x < width * 2.0 / 3.0 && y <= height / 8.0 {
        DropZone::Top
    } else if x > width / 3.0 && x < width * 2.0 / 3.0 && y >= height * 7.0 / 8.0 {
        DropZone::Bottom
    } else {
        DropZone::Center
    }
}

/// Where a header-bar drop lands relative to the hovered header: before it
/// when the cursor sits in the left half of its rect, after it otherwise.
pub fn header_half(target: Rect, cursor_x: f32) -> bool {
    cursor_x > target.x + target.width / 2.0
}

/// Insertion point for a cross-strip header drop: the first header whose
/// midpoint lies right of the cursor, `None` to append.
pub fn header_insertion(headers: &[(TabId, Rect)], cursor_x: f32) -> Option<TabId> {
    headers
        .iter()
        .find(|(_, rect)| cursor_x <= rect.x + rect.width / 2.0)
        .map(|(id, _)| *id)
}

/// State of an in-flight tab drag, held by the shared interaction context.
/// The payload carries the tab's full subtree serialized at drag start so a
/// drop outside the window can spin the tab off into a new one.
#[derive(Debug, Clone)]
pub struct TabDrag {
    pub tab_id: TabId,
    pub source_wnd: WndId,
    pub payload: serde_json::Value,
}

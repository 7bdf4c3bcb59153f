//! Shared primitive types.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Id newtypes
// ============================================================================

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Allocate a fresh unique id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.as_simple().fmt(f)
            }
        }
    };
}

id_type!(
    /// Identifier for a split-container node.
    LayoutId
);
id_type!(
    /// Identifier for a pane (tab strip).
    WndId
);
id_type!(
    /// Identifier for a tab.
    TabId
);

// ============================================================================
// Layout enums
// ============================================================================

/// Direction of a linear split.
///
/// `Lr` lays children out left-to-right (vertical dividers); `Tb` stacks
/// them top-to-bottom (horizontal dividers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    Lr,
    #[default]
    Tb,
}

/// Role of a split-container node within the window.
///
/// `Center` marks the document area root: it is never compacted away, and
/// every window keeps at least one pane reachable under it. The four edge
/// kinds mark dock regions whose panes are hidden rather than destroyed
/// when they empty out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    #[default]
    Normal,
    Center,
    Left,
    Right,
    Top,
    Bottom,
}

impl LayoutKind {
    /// Whether this kind marks a fixed dock region.
    pub fn is_dock_region(self) -> bool {
        matches!(
            self,
            LayoutKind::Left | LayoutKind::Right | LayoutKind::Top | LayoutKind::Bottom
        )
    }
}

/// Screen edge a dock bar is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DockPosition {
    Left,
    Right,
    Top,
    Bottom,
}

impl DockPosition {
    /// Axis along which this edge's panels are resized: `Lr` edges grow in
    /// width, `Tb` edges in height.
    pub fn resize_direction(self) -> SplitDirection {
        match self {
            DockPosition::Left | DockPosition::Right => SplitDirection::Lr,
            DockPosition::Top | DockPosition::Bottom => SplitDirection::Tb,
        }
    }

    pub fn layout_kind(self) -> LayoutKind {
        match self {
            DockPosition::Left => LayoutKind::Left,
            DockPosition::Right => LayoutKind::Right,
            DockPosition::Top => LayoutKind::Top,
            DockPosition::Bottom => LayoutKind::Bottom,
        }
    }
}

/// Utility panel types hostable in a dock bar.
///
/// Serialized with the wire names used by the persisted layout document
/// (`"file"`, `"globalGraph"`, ...). Plugin-contributed panels round-trip
/// through the `Custom` variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PanelType {
    File,
    Outline,
    Bookmark,
    Tag,
    Graph,
    GlobalGraph,
    Backlink,
    #[serde(untagged)]
    Custom(String),
}

// ============================================================================
// Sizing
// ============================================================================

/// Declared main-axis size of a layout child.
///
/// `Auto` children flex-fill the remaining space; `Px` children keep an
/// explicit pixel size. Serialized as `"auto"` or `"<n>px"` to match the
/// persisted layout document.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SizeHint {
    #[default]
    Auto,
    Px(f32),
}

impl SizeHint {
    pub fn is_auto(self) -> bool {
        matches!(self, SizeHint::Auto)
    }

    /// Explicit pixel size, if any.
    pub fn px(self) -> Option<f32> {
        match self {
            SizeHint::Auto => None,
            SizeHint::Px(v) => Some(v),
        }
    }
}

impl fmt::Display for SizeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeHint::Auto => f.write_str("auto"),
            SizeHint::Px(v) => write!(f, "{v}px"),
        }
    }
}

impl std::str::FromStr for SizeHint {
    type Err = crate::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "auto" || s.is_empty() {
            return Ok(SizeHint::Auto);
        }
        let digits = s.strip_suffix("px").unwrap_or(s);
        digits
            .trim()
            .parse::<f32>()
            .map(SizeHint::Px)
            .map_err(|_| crate::ConfigError::InvalidSize(s.to_string()))
    }
}

impl Serialize for SizeHint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SizeHint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Pixel rectangle in window coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point is inside this rect.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    /// Center point.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Extent along the given direction (`Lr` = width, `Tb` = height).
    pub fn extent(&self, direction: SplitDirection) -> f32 {
        match direction {
            SplitDirection::Lr => self.width,
            SplitDirection::Tb => self.height,
        }
    }
}

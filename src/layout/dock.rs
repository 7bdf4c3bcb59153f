//! Dock bars: collapsible fixed-position edge regions hosting singleton
//! utility panels.
//!
//! Each edge carries up to two independently positioned button groups,
//! each bound to one pane inside the edge's dock-region layout. Panels are
//! instantiated lazily on first activation; at most one live instance per
//! panel type per edge exists at a time. Unpinned docks slide out and
//! auto-hide on pointer leave, except while a maximized descendant (e.g. a
//! fullscreen graph) is open.

use crate::layout::Layout;
use crate::layout::model::{
    BacklinkPayload, BookmarkPayload, CustomPayload, FilesPayload, GraphPayload, Model,
    OutlinePayload, PanelPayload, PanelScope, TagPayload,
};
use crate::layout::persist::{DockEntryJson, DockSizeJson, DockStateJson};
use crate::layout::tab::{Tab, TabOptions};
use crate::layout::wnd::ActivationClock;
use notewell_config::{Config, DockPosition, PanelType, SizeHint, SplitDirection, TabId};

/// One dock bar button, remembering its panel's last size per axis.
#[derive(Debug, Clone)]
pub struct DockButton {
    pub panel: PanelType,
    pub icon: String,
    pub title: Option<String>,
    pub hotkey_lang_id: String,
    pub show: bool,
    pub width: f32,
    pub height: f32,
    /// Live panel slot; `None` while declared but not yet instantiated.
    pub tab: Option<TabId>,
}

impl DockButton {
    fn from_entry(entry: &DockEntryJson) -> Self {
        Self {
            panel: entry.panel.clone(),
            icon: entry.icon.clone(),
            title: entry.title.clone(),
            hotkey_lang_id: entry.hotkey_lang_id.clone(),
            show: entry.show,
            width: entry.size.width,
            height: entry.size.height,
            tab: None,
        }
    }

    fn to_entry(&self) -> DockEntryJson {
        DockEntryJson {
            panel: self.panel.clone(),
            size: DockSizeJson {
                width: self.width,
                height: self.height,
            },
            show: self.show,
            icon: self.icon.clone(),
            title: self.title.clone(),
            hotkey_lang_id: self.hotkey_lang_id.clone(),
        }
    }
}

/// Focus context for lazily instantiated panels bound to the focused
/// document (outline, graph, backlinks).
#[derive(Debug, Clone, Default)]
pub struct PanelContext {
    pub root_id: Option<String>,
    pub is_preview: bool,
}

/// How a toggle was requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToggleOptions {
    /// End up visible no matter the current state (hotkeys, startup).
    pub force_show: bool,
    /// The panel is active but not focused; a click focuses it instead of
    /// closing it.
    pub needs_focus: bool,
}

/// Result of a toggle.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DockToggle {
    /// The panel tab now visible/focused, if any.
    pub activated: Option<TabId>,
    /// The panel was instantiated just now.
    pub created: bool,
    /// The panel was deactivated.
    pub closed: bool,
}

/// Facade over one screen edge's panel buttons and their hosting panes.
pub struct Dock {
    pub position: DockPosition,
    pub pin: bool,
    /// Slide-out state of an unpinned dock.
    pub hidden: bool,
    groups: [Vec<DockButton>; 2],
}

impl Dock {
    pub fn new(position: DockPosition, state: &DockStateJson) -> Self {
        let mut groups: [Vec<DockButton>; 2] = [Vec::new(), Vec::new()];
        for (idx, group) in state.data.iter().take(2).enumerate() {
            groups[idx] = group.iter().map(DockButton::from_entry).collect();
        }
        Self {
            position,
            pin: state.pin,
            hidden: !state.pin,
            groups,
        }
    }

    pub fn to_state(&self) -> DockStateJson {
        let mut data = Vec::new();
        let second = self.groups[1].iter().map(DockButton::to_entry).collect::<Vec<_>>();
        let first = self.groups[0].iter().map(DockButton::to_entry).collect::<Vec<_>>();
        if !first.is_empty() || !second.is_empty() {
            data.push(first);
        }
        if !second.is_empty() {
            data.push(second);
        }
        DockStateJson {
            pin: self.pin,
            data,
        }
    }

    pub fn groups(&self) -> &[Vec<DockButton>; 2] {
        &self.groups
    }

    pub fn has_panel(&self, panel: &PanelType) -> bool {
        self.locate(panel).is_some()
    }

    pub fn has_active(&self) -> bool {
        self.groups.iter().flatten().any(|b| b.show)
    }

    pub fn button(&self, panel: &PanelType) -> Option<&DockButton> {
        self.locate(panel)
            .map(|(g, i)| &self.groups[g][i])
    }

    fn locate(&self, panel: &PanelType) -> Option<(usize, usize)> {
        for (g, group) in self.groups.iter().enumerate() {
            if let Some(i) = group.iter().position(|b| &b.panel == panel) {
                return Some((g, i));
            }
        }
        None
    }

    /// Move a button into this dock (cross-dock button drag), placed after
    /// a named sibling or prepended to the group.
    pub fn add_button(&mut self, group: usize, mut button: DockButton, after: Option<&PanelType>) {
        let group = group.min(1);
        // Remembered sizes belong to the old edge.
        button.width = 0.0;
        button.height = 0.0;
        button.show = false;
        button.tab = None;
        let idx = after
            .and_then(|a| self.groups[group].iter().position(|b| &b.panel == a))
            .map(|i| i + 1)
            .unwrap_or(0);
        self.groups[group].insert(idx, button);
    }

    pub fn remove_button(&mut self, panel: &PanelType) -> Option<DockButton> {
        let (g, i) = self.locate(panel)?;
        Some(self.groups[g].remove(i))
    }

    /// Toggle a panel: instantiate lazily on first activation, focus when
    /// active-but-unfocused, deactivate otherwise. Recomputes the edge's
    /// size and the two groups' share of it.
    pub fn toggle_panel(
        &mut self,
        panel: &PanelType,
        region: &mut Layout,
        opts: ToggleOptions,
        ctx: &PanelContext,
        clock: &mut ActivationClock,
        config: &Config,
    ) -> DockToggle {
        let Some((g, idx)) = self.locate(panel) else {
            log::warn!("No dock button for panel {panel:?}");
            return DockToggle::default();
        };
        let Some(wnd_id) = region.children().get(g).and_then(|c| c.as_wnd()).map(|w| w.id)
        else {
            log::warn!("Dock region missing pane for group {g}");
            return DockToggle::default();
        };

        // A forced show on an active panel re-enters the activation path,
        // instantiating the panel if it never was.
        if opts.force_show && self.groups[g][idx].show {
            self.groups[g][idx].show = false;
        }

        let mut outcome = DockToggle::default();
        if self.groups[g][idx].show {
            if opts.needs_focus {
                outcome.activated = self.groups[g][idx].tab;
                self.hidden = false;
            } else {
                self.groups[g][idx].show = false;
                outcome.closed = true;
                log::debug!("Dock {:?}: deactivated {panel:?}", self.position);
            }
        } else {
            // One visible panel per group.
            for other in &mut self.groups[g] {
                other.show = false;
            }
            self.groups[g][idx].show = true;

            if self.groups[g][idx].tab.is_none() {
                let payload = payload_for(panel, ctx);
                let tab = Tab::new(TabOptions {
                    callback: Some(Box::new(move |tab: &mut Tab| {
                        tab.add_model(Model::from_payload(payload));
                    })),
                    ..TabOptions::default()
                });
                let tab_id = tab.id;
                if let Some(wnd) = region.find_wnd_mut(wnd_id) {
                    wnd.add_tab(tab, false, false, usize::MAX, clock);
                }
                self.groups[g][idx].tab = Some(tab_id);
                outcome.created = true;
                log::info!("Dock {:?}: instantiated {panel:?}", self.position);
            } else if let Some(tab_id) = self.groups[g][idx].tab
                && let Some(wnd) = region.find_wnd_mut(wnd_id)
            {
                wnd.switch_tab(tab_id, clock);
            }
            outcome.activated = self.groups[g][idx].tab;
            self.hidden = false;
        }

        self.apply_region_sizes(region, config);
        outcome
    }

    /// Recompute the edge's cross-axis size and the two groups' panes.
    ///
    /// Group 0 is the primary holder of the shared size (it flex-fills);
    /// group 1 claims its remembered slice of the secondary axis when both
    /// groups have an active panel.
    pub fn apply_region_sizes(&self, region: &mut Layout, config: &Config) {
        let g0_active = self.groups[0].iter().any(|b| b.show);
        let g1_active = self.groups[1].iter().any(|b| b.show);

        region.size = if g0_active || g1_active {
            SizeHint::Px(self.max_panel_size(config))
        } else {
            SizeHint::Px(0.0)
        };

        let stacking = region.direction;
        let secondary = self.groups[1]
            .iter()
            .find(|b| b.show)
            .map(|b| match stacking {
                SplitDirection::Tb => b.height,
                SplitDirection::Lr => b.width,
            })
            .unwrap_or(0.0);

        for (g, child) in region.children_mut().iter_mut().enumerate().take(2) {
            let Some(wnd) = child.as_wnd_mut() else {
                continue;
            };
            let active = if g == 0 { g0_active } else { g1_active };
            wnd.hidden = !active;
            if g == 0 {
                wnd.size = SizeHint::Auto;
            } else if active && g0_active && secondary > 0.0 {
                wnd.size = SizeHint::Px(secondary);
            } else {
                wnd.size = SizeHint::Auto;
            }
        }
    }

    /// Edge size: the max of all active panels' remembered sizes, with
    /// per-panel floors for canvas panels that need room.
    fn max_panel_size(&self, config: &Config) -> f32 {
        let mut max: f32 = 0.0;
        for button in self.groups.iter().flatten().filter(|b| b.show) {
            let size = match self.position.resize_direction() {
                SplitDirection::Lr => {
                    let fallback = match &button.panel {
                        PanelType::Graph | PanelType::GlobalGraph | PanelType::Backlink => {
                            config.dock_panel_min_size_wide
                        }
                        _ => config.dock_panel_min_size,
                    };
                    if button.width > 0.0 { button.width } else { fallback }
                }
                SplitDirection::Tb => {
                    if button.height > 0.0 {
                        button.height
                    } else {
                        config.dock_panel_min_size
                    }
                }
            };
            max = max.max(size);
        }
        max
    }

    /// Write the current extents back into the active buttons after an
    /// interactive resize.
    pub fn remember_sizes(&mut self, region: &Layout) {
        let edge_extent = region
            .size
            .px()
            .unwrap_or_else(|| region.bounds.extent(self.position.resize_direction()));
        let along_edge = self.position.resize_direction();
        let group1_extent = region
            .children()
            .get(1)
            .map(|c| c.bounds().extent(region.direction));
        let both_active = self.groups[0].iter().any(|b| b.show)
            && self.groups[1].iter().any(|b| b.show);

        for (g, group) in self.groups.iter_mut().enumerate() {
            for button in group.iter_mut().filter(|b| b.show) {
                match along_edge {
                    SplitDirection::Lr => button.width = edge_extent,
                    SplitDirection::Tb => button.height = edge_extent,
                }
                if g == 1 && both_active && let Some(extent) = group1_extent {
                    match along_edge {
                        SplitDirection::Lr => button.height = extent,
                        SplitDirection::Tb => button.width = extent,
                    }
                }
            }
        }
    }

    /// Pin toggles between a docked region and a floating overlay that
    /// slides in on hover.
    pub fn toggle_pin(&mut self) -> bool {
        self.pin = !self.pin;
        if self.pin {
            self.hidden = false;
        } else if !self.has_active() {
            self.hidden = true;
        }
        log::debug!("Dock {:?}: pin={}", self.position, self.pin);
        self.pin
    }

    /// Slide an unpinned dock in (pointer entered the edge).
    pub fn show(&mut self) {
        if !self.pin && self.has_active() {
            self.hidden = false;
        }
    }

    /// Slide an unpinned dock out (pointer left). Refused while pinned or
    /// while a maximized descendant is open.
    pub fn hide(&mut self, region: &Layout) -> bool {
        if self.pin {
            return false;
        }
        let mut fullscreen = false;
        region.for_each_wnd(&mut |wnd| {
            for tab in wnd.children() {
                if tab.model.as_ref().is_some_and(|m| m.fullscreen) {
                    fullscreen = true;
                }
            }
        });
        if fullscreen {
            return false;
        }
        self.hidden = true;
        true
    }
}

fn payload_for(panel: &PanelType, ctx: &PanelContext) -> PanelPayload {
    match panel {
        PanelType::File => PanelPayload::Files(FilesPayload::default()),
        PanelType::Outline => PanelPayload::Outline(OutlinePayload {
            block_id: ctx.root_id.clone(),
            scope: PanelScope::Pin,
            is_preview: ctx.is_preview,
        }),
        PanelType::Bookmark => PanelPayload::Bookmark(BookmarkPayload::default()),
        PanelType::Tag => PanelPayload::Tag(TagPayload::default()),
        PanelType::Graph => PanelPayload::Graph(GraphPayload {
            block_id: ctx.root_id.clone(),
            root_id: None,
            scope: PanelScope::Pin,
        }),
        PanelType::GlobalGraph => PanelPayload::Graph(GraphPayload {
            block_id: None,
            root_id: None,
            scope: PanelScope::Global,
        }),
        PanelType::Backlink => PanelPayload::Backlink(BacklinkPayload {
            block_id: ctx.root_id.clone(),
            root_id: None,
            scope: PanelScope::Pin,
        }),
        PanelType::Custom(model_type) => PanelPayload::Custom(CustomPayload {
            model_type: model_type.clone(),
            data: serde_json::Value::Null,
        }),
    }
}

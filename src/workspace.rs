//! The window-level workbench coordinator.
//!
//! Owns one window's pane tree and dock bars, the shared interaction
//! context, the flush scheduler and the layout store, and orchestrates the
//! operations that cross pane boundaries: moving and splitting, tree
//! compaction after the last tab closes, dock toggles, drag-and-drop
//! commits, push-event dispatch, and the save/restore round trip.

use crate::interaction::{SharedInteraction, shared_interaction};
use crate::layout::dock::{Dock, DockToggle, PanelContext, ToggleOptions};
use crate::layout::drag::{DropZone, TabDrag};
use crate::layout::model::{Model, PanelPayload};
use crate::layout::persist::{self, DockStateJson, LayoutStore, NodeJson, UiLayoutJson};
use crate::layout::scheduler::FlushScheduler;
use crate::layout::tab::{Tab, TabOptions};
use crate::layout::wnd::{ActivationClock, SwitchOutcome, TabRemoval, Wnd};
use crate::layout::{Layout, LayoutChild, NodeRef};
use crate::push::{KernelLink, PushEvent, PushFrame};
use anyhow::{Context, Result};
use notewell_config::{
    Config, DockPosition, LayoutId, LayoutKind, PanelType, Rect, SizeHint, SplitDirection, TabId,
    WndId,
};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

/// Notifications for the host shell.
#[derive(Debug, PartialEq)]
pub enum WorkspaceEvent {
    /// The focused content changed; dependent docks (outline, backlink,
    /// graph) should resync.
    PanelUpdated { tab: TabId },
    /// A tab was evicted to keep the pane under the open-tab cap.
    TabEvicted { tab: TabId },
    /// A close was refused by a guard; show a transient message.
    CloseRefused { tab: TabId, reason: String },
    /// A tab left this window; hand the serialized subtree to a new
    /// top-level window.
    TabDetached { layout: serde_json::Value },
    /// The last center tab of a secondary window closed; the window itself
    /// should close instead of showing an empty state.
    WindowCloseRequested,
    /// The kernel never came up; show the blocking error state.
    KernelUnreachable,
}

/// One window's layout coordinator.
pub struct Workspace {
    pub config: Config,
    root: Layout,
    center: LayoutId,
    dock_regions: HashMap<DockPosition, LayoutId>,
    docks: HashMap<DockPosition, Dock>,
    clock: ActivationClock,
    interaction: SharedInteraction,
    events: VecDeque<WorkspaceEvent>,
    secondary_window: bool,
    link: Option<KernelLink>,
    store: Option<LayoutStore>,
    scheduler: Option<FlushScheduler>,
    pub hide_dock: bool,
    window_rect: Rect,
}

impl Workspace {
    /// Fresh workspace: an empty-state center pane and the default dock
    /// button sets.
    pub fn new(config: Config) -> Self {
        let mut clock = ActivationClock::new();

        let mut root = Layout::new(SplitDirection::Tb, LayoutKind::Normal, SizeHint::Auto, None);
        let top = dock_region(DockPosition::Top);
        let mut middle = Layout::new(SplitDirection::Lr, LayoutKind::Normal, SizeHint::Auto, None);
        let left = dock_region(DockPosition::Left);
        let mut center = Layout::new(
            SplitDirection::Lr,
            LayoutKind::Center,
            SizeHint::Auto,
            Some(SplitDirection::Lr),
        );
        let mut first = Wnd::new(None);
        first.add_tab(Tab::empty_center(), false, true, usize::MAX, &mut clock);
        center.add_wnd(first, None);
        let right = dock_region(DockPosition::Right);
        let bottom = dock_region(DockPosition::Bottom);

        let center_id = center.id;
        let dock_regions = HashMap::from([
            (DockPosition::Top, top.id),
            (DockPosition::Left, left.id),
            (DockPosition::Right, right.id),
            (DockPosition::Bottom, bottom.id),
        ]);

        middle.add_layout(left, None);
        middle.add_layout(center, None);
        middle.add_layout(right, None);
        root.add_layout(top, None);
        root.add_layout(middle, None);
        root.add_layout(bottom, None);

        let docks = default_dock_states()
            .into_iter()
            .map(|(position, state)| (position, Dock::new(position, &state)))
            .collect();

        Self {
            config,
            root,
            center: center_id,
            dock_regions,
            docks,
            clock,
            interaction: shared_interaction(),
            events: VecDeque::new(),
            secondary_window: false,
            link: None,
            store: None,
            scheduler: None,
            hide_dock: false,
            window_rect: Rect::default(),
        }
    }

    /// Rebuild a workspace from a persisted layout document. Falls back to
    /// a fresh workspace when the document's tree has no center region.
    pub fn from_saved(config: Config, doc: &UiLayoutJson) -> Result<Self> {
        let mut clock = ActivationClock::new();
        let restored = persist::layout_from_json(&doc.layout, &mut clock)
            .context("Failed to rebuild the pane tree")?;
        let root = restored.root;

        let Some(center) = root.find_kind(LayoutKind::Center) else {
            log::warn!("Layout document has no center region, starting fresh");
            return Ok(Self::new(config));
        };
        let mut dock_regions = HashMap::new();
        for position in [
            DockPosition::Top,
            DockPosition::Left,
            DockPosition::Right,
            DockPosition::Bottom,
        ] {
            if let Some(id) = root.find_kind(position.layout_kind()) {
                dock_regions.insert(position, id);
            }
        }

        let docks = [
            (DockPosition::Top, &doc.top),
            (DockPosition::Left, &doc.left),
            (DockPosition::Right, &doc.right),
            (DockPosition::Bottom, &doc.bottom),
        ]
        .into_iter()
        .map(|(position, state)| (position, Dock::new(position, state)))
        .collect();

        let close_on_start = config.close_tabs_on_start;
        let mut ws = Self {
            config,
            root,
            center,
            dock_regions,
            docks,
            clock,
            interaction: shared_interaction(),
            events: VecDeque::new(),
            secondary_window: false,
            link: None,
            store: None,
            scheduler: None,
            hide_dock: doc.hide_dock,
            window_rect: Rect::default(),
        };

        if close_on_start {
            for tab in ws.root.all_tab_ids() {
                let keep = ws
                    .root
                    .find_tab(tab)
                    .map(|t| t.pinned || !t.has_header())
                    .unwrap_or(true);
                if !keep {
                    ws.close_tab_inner(tab, true);
                }
            }
        }

        // Activate the recorded tabs only once the whole tree stands.
        for tab in restored.activate {
            if ws.root.find_tab(tab).is_some() {
                ws.switch_tab(tab);
            }
        }
        // Startup pruning may have dropped a pane's recorded active tab.
        for wnd_id in ws.root.all_wnd_ids() {
            let fallback = ws.root.find_wnd(wnd_id).and_then(|w| {
                (!w.is_empty() && w.active_tab().is_none())
                    .then(|| w.children().last().map(|t| t.id))
                    .flatten()
            });
            if let Some(tab) = fallback {
                ws.switch_tab(tab);
            }
        }
        // Startup dock panels come back through the regular toggle path.
        let startup: Vec<(DockPosition, PanelType)> = ws
            .docks
            .iter()
            .flat_map(|(position, dock)| {
                dock.groups()
                    .iter()
                    .flatten()
                    .filter(|b| b.show)
                    .map(|b| (*position, b.panel.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();
        for (position, panel) in startup {
            ws.toggle_dock_panel(position, &panel, true);
        }

        ws.ensure_center_populated();
        Ok(ws)
    }

    // ------------------------------------------------------------------
    // Wiring
    // ------------------------------------------------------------------

    pub fn set_store(&mut self, store: LayoutStore) {
        self.store = Some(store);
    }

    pub fn set_kernel_link(&mut self, link: KernelLink) {
        self.link = Some(link);
    }

    /// Secondary windows close themselves instead of synthesizing an
    /// empty-state tab when their last center tab goes away.
    pub fn mark_secondary_window(&mut self) {
        self.secondary_window = true;
    }

    /// Share another window's interaction context (drag source/target
    /// windows must see the same state).
    pub fn set_interaction(&mut self, interaction: SharedInteraction) {
        self.interaction = interaction;
    }

    pub fn interaction(&self) -> SharedInteraction {
        self.interaction.clone()
    }

    /// Install the debounced resize/save flush. The returned receiver
    /// yields one signal per coalesced burst; the host calls
    /// [`Self::flush_layout`] for each.
    pub fn enable_flush_scheduler(
        &mut self,
        handle: tokio::runtime::Handle,
    ) -> UnboundedReceiver<()> {
        let (tx, rx) = unbounded_channel();
        self.scheduler = Some(FlushScheduler::new(
            handle,
            Duration::from_millis(self.config.resize_debounce_ms),
            tx,
        ));
        rx
    }

    pub fn drain_events(&mut self) -> Vec<WorkspaceEvent> {
        self.events.drain(..).collect()
    }

    pub fn root(&self) -> &Layout {
        &self.root
    }

    pub fn center_layout(&self) -> &Layout {
        self.root
            .find_layout(self.center)
            .expect("center region is never removed")
    }

    pub fn dock(&self, position: DockPosition) -> Option<&Dock> {
        self.docks.get(&position)
    }

    fn mark_dirty(&mut self) {
        if let Some(scheduler) = &mut self.scheduler {
            scheduler.mark_dirty();
        }
    }

    /// Recompute bounds and persist; the debounced flush target.
    pub fn flush_layout(&mut self) {
        self.compute_bounds(self.window_rect);
        if let Err(err) = self.save_layout() {
            log::warn!("Failed to save layout: {err:#}");
        }
    }

    pub fn compute_bounds(&mut self, rect: Rect) {
        self.window_rect = rect;
        let min = self.config.min_pane_height;
        self.root.compute_bounds(rect, min);
    }

    // ------------------------------------------------------------------
    // Tab operations
    // ------------------------------------------------------------------

    /// Open a tab in the focused center pane (or the most recently active
    /// one). `keep_cursor` inserts without activating.
    pub fn open_tab(&mut self, tab: Tab, keep_cursor: bool) -> TabId {
        let wnd_id = self.target_center_wnd();
        self.open_tab_in(wnd_id, tab, keep_cursor)
    }

    /// Open a tab in a specific pane.
    pub fn open_tab_in(&mut self, wnd_id: WndId, tab: Tab, keep_cursor: bool) -> TabId {
        let tab_id = tab.id;
        let in_center = self.wnd_in_center(wnd_id);
        let max_tabs = self.config.max_open_tab_count;
        let Some(wnd) = self.root.find_wnd_mut(wnd_id) else {
            log::warn!("open_tab: pane {wnd_id} not found");
            return tab_id;
        };
        let outcome = wnd.add_tab(tab, keep_cursor, in_center, max_tabs, &mut self.clock);
        if let Some(evicted) = outcome.evicted {
            self.events.push_back(WorkspaceEvent::TabEvicted { tab: evicted });
        }
        self.wire_channel(wnd_id, tab_id);
        if !keep_cursor {
            self.focus_wnd(wnd_id);
            self.events
                .push_back(WorkspaceEvent::PanelUpdated { tab: tab_id });
        }
        self.mark_dirty();
        tab_id
    }

    /// Activate a tab, materializing a deferred model if needed.
    pub fn switch_tab(&mut self, tab_id: TabId) {
        let Some(wnd_id) = self.root.wnd_of_tab(tab_id) else {
            return;
        };
        let outcome = self
            .root
            .find_wnd_mut(wnd_id)
            .and_then(|w| w.switch_tab(tab_id, &mut self.clock));
        if let Some(SwitchOutcome { materialized: true }) = outcome {
            self.wire_channel(wnd_id, tab_id);
        }
        self.focus_wnd(wnd_id);
        self.events
            .push_back(WorkspaceEvent::PanelUpdated { tab: tab_id });
        self.mark_dirty();
    }

    /// Close a tab through the guarded removal path.
    pub fn close_tab(&mut self, tab_id: TabId) {
        self.close_tab_inner(tab_id, false);
    }

    fn close_tab_inner(&mut self, tab_id: TabId, close_all: bool) {
        let Some(wnd_id) = self.root.wnd_of_tab(tab_id) else {
            return;
        };
        let in_dock = self.wnd_in_dock_region(wnd_id);
        let removal = self
            .root
            .find_wnd_mut(wnd_id)
            .map(|w| w.remove_tab(tab_id, close_all, &mut self.clock))
            .unwrap_or(TabRemoval::NotFound);
        match removal {
            TabRemoval::NotFound => {}
            TabRemoval::Refused => {
                self.events.push_back(WorkspaceEvent::CloseRefused {
                    tab: tab_id,
                    reason: "uploading".to_string(),
                });
            }
            TabRemoval::Removed { emptied } => {
                if emptied {
                    if in_dock {
                        // Dock panes go dormant; the bar rebuilds them.
                        if let Some(wnd) = self.root.find_wnd_mut(wnd_id) {
                            wnd.hidden = true;
                        }
                    } else {
                        self.root.remove_wnd(wnd_id);
                        self.ensure_center_populated();
                    }
                }
                let mut interaction = self.interaction.lock();
                if interaction.focused_wnd == Some(wnd_id)
                    && self.root.find_wnd(wnd_id).is_none()
                {
                    interaction.focused_wnd = self.center_layout().most_recent_wnd();
                }
                drop(interaction);
                self.mark_dirty();
            }
        }
    }

    /// Close every unpinned sibling of `keep`.
    pub fn close_other_tabs(&mut self, keep: TabId) {
        let Some(wnd_id) = self.root.wnd_of_tab(keep) else {
            return;
        };
        let victims: Vec<TabId> = self
            .root
            .find_wnd(wnd_id)
            .map(|w| {
                w.children()
                    .iter()
                    .filter(|t| t.id != keep && !t.pinned)
                    .map(|t| t.id)
                    .collect()
            })
            .unwrap_or_default();
        for victim in victims {
            self.close_tab_inner(victim, true);
        }
        self.switch_tab(keep);
    }

    /// Close every unpinned tab in a pane.
    pub fn close_all_tabs(&mut self, wnd_id: WndId) {
        let victims: Vec<TabId> = self
            .root
            .find_wnd(wnd_id)
            .map(|w| {
                w.children()
                    .iter()
                    .filter(|t| !t.pinned)
                    .map(|t| t.id)
                    .collect()
            })
            .unwrap_or_default();
        for victim in victims {
            self.close_tab_inner(victim, true);
        }
        if let Some(last) = self
            .root
            .find_wnd(wnd_id)
            .and_then(|w| w.children().last())
            .map(|t| t.id)
        {
            self.switch_tab(last);
        }
    }

    /// Relocate a tab into another pane, before a named sibling or
    /// appended. The source pane is compacted if left empty.
    pub fn move_tab(&mut self, tab_id: TabId, target: WndId, before: Option<TabId>) {
        let Some(source) = self.root.wnd_of_tab(tab_id) else {
            return;
        };
        if self.root.find_wnd(target).is_none() {
            return;
        }
        let Some(tab) = self
            .root
            .find_wnd_mut(source)
            .and_then(|w| w.detach_tab(tab_id, &mut self.clock))
        else {
            return;
        };

        let max_tabs = self.config.max_open_tab_count;
        let outcome = self
            .root
            .find_wnd_mut(target)
            .map(|w| w.adopt_tab(tab, before, max_tabs, &mut self.clock))
            .unwrap_or_default();
        if let Some(evicted) = outcome.evicted {
            self.events.push_back(WorkspaceEvent::TabEvicted { tab: evicted });
        }
        self.wire_channel(target, tab_id);

        if source != target
            && self
                .root
                .find_wnd(source)
                .map(|w| w.is_empty() && !self.wnd_in_dock_region(source))
                .unwrap_or(false)
        {
            self.root.remove_wnd(source);
            self.ensure_center_populated();
        }
        self.focus_wnd(target);
        self.events
            .push_back(WorkspaceEvent::PanelUpdated { tab: tab_id });
        self.mark_dirty();
    }

    /// Split a pane, returning the new empty sibling.
    pub fn split_wnd(&mut self, wnd_id: WndId, direction: SplitDirection) -> Option<WndId> {
        let new_id = self.root.split_wnd(wnd_id, direction)?;
        self.mark_dirty();
        Some(new_id)
    }

    pub fn pin_tab(&mut self, tab_id: TabId) {
        if let Some(wnd_id) = self.root.wnd_of_tab(tab_id)
            && let Some(wnd) = self.root.find_wnd_mut(wnd_id)
            && wnd.pin_tab(tab_id)
        {
            self.mark_dirty();
        }
    }

    pub fn unpin_tab(&mut self, tab_id: TabId) {
        if let Some(wnd_id) = self.root.wnd_of_tab(tab_id)
            && let Some(wnd) = self.root.find_wnd_mut(wnd_id)
            && wnd.unpin_tab(tab_id)
        {
            self.mark_dirty();
        }
    }

    /// Duplicate a tab: same panel payload, fresh ids, inserted after the
    /// source in the same pane.
    pub fn copy_tab(&mut self, tab_id: TabId) -> Option<TabId> {
        let wnd_id = self.root.wnd_of_tab(tab_id)?;
        let source = self.root.find_tab(tab_id)?;
        let payload = source
            .model
            .as_ref()
            .map(|m| m.payload().clone())
            .or_else(|| source.init_data.clone());
        let mut tab = Tab::new(TabOptions {
            title: source.title().map(str::to_string),
            icon: source.icon.clone(),
            doc_icon: source.doc_icon.clone(),
            callback: payload.clone().filter(|p| !p.is_deferred()).map(|payload| {
                Box::new(move |tab: &mut Tab| {
                    tab.add_model(Model::from_payload(payload));
                }) as Box<dyn FnOnce(&mut Tab) + Send>
            }),
        });
        if let Some(payload) = payload.filter(|p| p.is_deferred()) {
            tab.init_data = Some(payload);
        }
        Some(self.open_tab_in(wnd_id, tab, false))
    }

    // ------------------------------------------------------------------
    // Tab switching helpers
    // ------------------------------------------------------------------

    fn focused_wnd(&self) -> Option<WndId> {
        let focused = self.interaction.lock().focused_wnd;
        focused
            .filter(|id| self.root.find_wnd(*id).is_some())
            .or_else(|| self.center_layout().most_recent_wnd())
    }

    /// Switch to a tab by header index in the focused pane (1-based, the
    /// hotkey convention).
    pub fn switch_tab_by_index(&mut self, index: usize) {
        let Some(wnd_id) = self.focused_wnd() else {
            return;
        };
        let target = self.root.find_wnd(wnd_id).and_then(|w| {
            (index >= 1)
                .then(|| w.header_order().get(index - 1).copied())
                .flatten()
        });
        if let Some(tab) = target {
            self.switch_tab(tab);
        }
    }

    pub fn next_tab(&mut self) {
        self.step_tab(1);
    }

    pub fn prev_tab(&mut self) {
        self.step_tab(-1);
    }

    fn step_tab(&mut self, delta: i64) {
        let Some(wnd_id) = self.focused_wnd() else {
            return;
        };
        let Some(wnd) = self.root.find_wnd(wnd_id) else {
            return;
        };
        let count = wnd.header_order().len() as i64;
        if count <= 1 {
            return;
        }
        let Some(active) = wnd.active_tab().map(|t| t.id) else {
            return;
        };
        let Some(idx) = wnd.header_order().iter().position(|h| *h == active) else {
            return;
        };
        let next = (idx as i64 + delta).rem_euclid(count) as usize;
        let target = wnd.header_order()[next];
        self.switch_tab(target);
    }

    // ------------------------------------------------------------------
    // Drag-and-drop
    // ------------------------------------------------------------------

    /// Begin a header drag: serialize the tab subtree into the drag
    /// payload and record the dragged header in the shared context.
    pub fn start_tab_drag(&mut self, tab_id: TabId) -> bool {
        let Some(source) = self.root.wnd_of_tab(tab_id) else {
            return false;
        };
        let Some(tab) = self.root.find_tab(tab_id) else {
            return false;
        };
        if !tab.has_header() {
            return false;
        }
        let payload = serde_json::to_value(persist::tab_to_json(tab))
            .expect("tab serialization is infallible");
        self.interaction.lock().drag = Some(TabDrag {
            tab_id,
            source_wnd: source,
            payload,
        });
        true
    }

    /// Drag-over a header: same-strip drags reorder headers speculatively;
    /// foreign drags show a placeholder clone at the end of the strip.
    pub fn drag_over_header(&mut self, wnd_id: WndId, target: TabId, after: bool) {
        let Some(drag) = self.interaction.lock().drag.clone() else {
            return;
        };
        let Some(wnd) = self.root.find_wnd_mut(wnd_id) else {
            return;
        };
        if wnd.tab(drag.tab_id).is_some() {
            wnd.speculate_header_move(drag.tab_id, target, after);
        } else {
            wnd.set_drag_clone(true);
        }
    }

    /// The pointer left a strip mid-drag; its placeholder clone goes away.
    pub fn drag_leave_header(&mut self, wnd_id: WndId) {
        if let Some(wnd) = self.root.find_wnd_mut(wnd_id) {
            wnd.set_drag_clone(false);
        }
    }

    /// Drop on a header bar: commit the speculative order (same strip) or
    /// move the tab over (foreign strip).
    pub fn drop_on_header(&mut self, wnd_id: WndId, before: Option<TabId>) {
        let Some(drag) = self.take_drag() else {
            return;
        };
        if drag.source_wnd == wnd_id {
            if let Some(wnd) = self.root.find_wnd_mut(wnd_id) {
                wnd.commit_header_order();
            }
            self.mark_dirty();
        } else {
            self.move_tab(drag.tab_id, wnd_id, before);
        }
        self.clear_drag_clones();
    }

    /// Drop on a pane's drop overlay: edge zones split 50/50 in that
    /// direction, the center zone is a plain move. Leading-edge zones swap
    /// the fresh pane in front of the target.
    pub fn drop_on_overlay(&mut self, target: WndId, zone: DropZone) {
        let Some(drag) = self.take_drag() else {
            return;
        };
        self.clear_drag_clones();
        match zone {
            DropZone::Center => {
                if self.root.wnd_of_tab(drag.tab_id) != Some(target) {
                    self.move_tab(drag.tab_id, target, None);
                }
            }
            DropZone::Right | DropZone::Left => {
                if let Some(new_wnd) = self.split_wnd(target, SplitDirection::Lr) {
                    self.move_tab(drag.tab_id, new_wnd, None);
                    if zone == DropZone::Left {
                        self.root.swap_with_previous(new_wnd);
                        self.mark_dirty();
                    }
                }
            }
            DropZone::Bottom | DropZone::Top => {
                if let Some(new_wnd) = self.split_wnd(target, SplitDirection::Tb) {
                    self.move_tab(drag.tab_id, new_wnd, None);
                    if zone == DropZone::Top {
                        self.root.swap_with_previous(new_wnd);
                        self.mark_dirty();
                    }
                }
            }
        }
    }

    /// End of gesture. A cancelled drop (Escape) resynchronizes the source
    /// strip's headers with the tab order; a drop outside the window
    /// bounds spins the tab off into a new OS window.
    pub fn finish_drag(&mut self, cancelled: bool, pointer: Option<(f32, f32)>) {
        let drag = self.take_drag();
        self.clear_drag_clones();
        let Some(drag) = drag else {
            return;
        };
        if cancelled {
            if let Some(wnd) = self.root.find_wnd_mut(drag.source_wnd) {
                wnd.resync_header();
            }
            return;
        }
        if let Some((x, y)) = pointer {
            let outside = x < self.window_rect.x
                || y < self.window_rect.y
                || x > self.window_rect.x + self.window_rect.width
                || y > self.window_rect.y + self.window_rect.height;
            if outside && self.root.find_tab(drag.tab_id).is_some() {
                self.detach_tab_to_new_window(drag.tab_id);
            }
        }
    }

    fn take_drag(&mut self) -> Option<TabDrag> {
        self.interaction.lock().drag.take()
    }

    fn clear_drag_clones(&mut self) {
        self.root.for_each_wnd_mut(&mut |wnd| wnd.set_drag_clone(false));
    }

    /// Serialize a tab subtree, emit it for a new top-level window, and
    /// remove the origin tab.
    pub fn detach_tab_to_new_window(&mut self, tab_id: TabId) {
        let Some(tab) = self.root.find_tab(tab_id) else {
            return;
        };
        let layout = serde_json::to_value(persist::tab_to_json(tab))
            .expect("tab serialization is infallible");
        self.events.push_back(WorkspaceEvent::TabDetached { layout });
        self.close_tab_inner(tab_id, true);
    }

    /// Receiving side of a cross-window transfer.
    pub fn adopt_transferred_tab(&mut self, node: &NodeJson) -> Option<TabId> {
        let (tab, _) = persist::tab_from_json(node)?;
        Some(self.open_tab(tab, false))
    }

    // ------------------------------------------------------------------
    // Docks
    // ------------------------------------------------------------------

    /// Toggle a dock panel by type on the given edge.
    pub fn toggle_dock_panel(
        &mut self,
        position: DockPosition,
        panel: &PanelType,
        force_show: bool,
    ) -> DockToggle {
        let ctx = self.panel_context();
        let Some(region_id) = self.dock_regions.get(&position).copied() else {
            return DockToggle::default();
        };
        let needs_focus = {
            let interaction = self.interaction.lock();
            interaction.focused_dock.as_ref() != Some(&(position, panel.clone()))
        };
        let Self {
            docks,
            root,
            clock,
            config,
            ..
        } = self;
        let Some(dock) = docks.get_mut(&position) else {
            return DockToggle::default();
        };
        let Some(region) = root.find_layout_mut(region_id) else {
            return DockToggle::default();
        };
        let active_before = dock
            .button(panel)
            .map(|b| b.show)
            .unwrap_or(false);
        let outcome = dock.toggle_panel(
            panel,
            region,
            ToggleOptions {
                force_show,
                needs_focus: active_before && needs_focus,
            },
            &ctx,
            clock,
            config,
        );

        {
            let mut interaction = self.interaction.lock();
            if outcome.activated.is_some() {
                interaction.focused_dock = Some((position, panel.clone()));
            } else if interaction.focused_dock.as_ref() == Some(&(position, panel.clone())) {
                interaction.focused_dock = None;
            }
        }
        if let Some(tab) = outcome.activated {
            if let Some(wnd_id) = self.root.wnd_of_tab(tab) {
                self.wire_channel(wnd_id, tab);
            }
            self.events.push_back(WorkspaceEvent::PanelUpdated { tab });
        }
        self.mark_dirty();
        outcome
    }

    pub fn toggle_dock_pin(&mut self, position: DockPosition) {
        if let Some(dock) = self.docks.get_mut(&position) {
            dock.toggle_pin();
            self.mark_dirty();
        }
    }

    /// Pointer entered a dock edge: slide an unpinned dock in.
    pub fn dock_pointer_enter(&mut self, position: DockPosition) {
        if let Some(dock) = self.docks.get_mut(&position) {
            dock.show();
        }
    }

    /// Pointer left a dock region: slide an unpinned dock out, unless a
    /// maximized descendant holds it open.
    pub fn dock_pointer_leave(&mut self, position: DockPosition) {
        let Some(region_id) = self.dock_regions.get(&position).copied() else {
            return;
        };
        let Self { docks, root, .. } = self;
        if let Some(dock) = docks.get_mut(&position)
            && let Some(region) = root.find_layout(region_id)
        {
            dock.hide(region);
        }
    }

    /// Interactive resize of the split handle preceding `node`.
    pub fn resize_split(&mut self, node: NodeRef, delta: f32) {
        if !self.root.drag_resize(node, delta, 8.0) {
            return;
        }
        self.compute_bounds(self.window_rect);
        let Self {
            docks,
            root,
            dock_regions,
            ..
        } = self;
        for (position, dock) in docks.iter_mut() {
            if let Some(region_id) = dock_regions.get(position)
                && let Some(region) = root.find_layout(*region_id)
            {
                dock.remember_sizes(region);
            }
        }
        self.mark_dirty();
    }

    // ------------------------------------------------------------------
    // Push events
    // ------------------------------------------------------------------

    /// Drain pending push events and dispatch frames to their models.
    pub fn pump_push_events(&mut self, rx: &mut UnboundedReceiver<PushEvent>) {
        while let Ok(event) = rx.try_recv() {
            match event {
                PushEvent::Opened { subscriber } => {
                    log::debug!("Push channel open for {subscriber}");
                }
                PushEvent::KernelUnreachable => {
                    self.interaction.lock().kernel_down = true;
                    self.events.push_back(WorkspaceEvent::KernelUnreachable);
                }
                PushEvent::Frame { subscriber, frame } => {
                    self.dispatch_frame(&subscriber, &frame);
                }
            }
        }
    }

    fn dispatch_frame(&mut self, subscriber: &str, frame: &PushFrame) {
        let Some(tab_id) = self
            .root
            .all_tab_ids()
            .into_iter()
            .find(|id| id.to_string() == subscriber)
        else {
            log::debug!("Push frame for unknown subscriber {subscriber}");
            return;
        };
        let Some(wnd_id) = self.root.wnd_of_tab(tab_id) else {
            return;
        };
        let reaction = self
            .root
            .find_wnd_mut(wnd_id)
            .and_then(|w| w.tab_mut(tab_id))
            .and_then(|t| t.model.as_mut())
            .map(|m| m.on_message(frame));
        let Some(reaction) = reaction else {
            return;
        };
        if let Some(title) = reaction.rename {
            if let Some(tab) = self
                .root
                .find_wnd_mut(wnd_id)
                .and_then(|w| w.tab_mut(tab_id))
            {
                tab.update_title(title);
            }
            self.events
                .push_back(WorkspaceEvent::PanelUpdated { tab: tab_id });
            self.mark_dirty();
        }
        if reaction.close {
            self.close_tab_inner(tab_id, true);
        } else if reaction.refresh {
            self.events
                .push_back(WorkspaceEvent::PanelUpdated { tab: tab_id });
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serialize the whole workbench (pane tree + dock states) and write
    /// it to the store if one is attached.
    pub fn save_layout(&self) -> Result<UiLayoutJson> {
        let doc = UiLayoutJson {
            hide_dock: self.hide_dock,
            layout: persist::layout_to_json(&self.root),
            left: self.dock_state(DockPosition::Left),
            right: self.dock_state(DockPosition::Right),
            top: self.dock_state(DockPosition::Top),
            bottom: self.dock_state(DockPosition::Bottom),
        };
        if let Some(store) = &self.store {
            store.save(&doc)?;
        }
        Ok(doc)
    }

    fn dock_state(&self, position: DockPosition) -> DockStateJson {
        self.docks
            .get(&position)
            .map(Dock::to_state)
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn target_center_wnd(&mut self) -> WndId {
        if let Some(id) = self.focused_wnd()
            && self.wnd_in_center(id)
        {
            return id;
        }
        self.ensure_center_populated();
        if let Some(id) = self
            .center_layout()
            .most_recent_wnd()
            .or_else(|| self.center_layout().first_wnd())
        {
            return id;
        }
        // A secondary window mid-close still hosts the tab until the window
        // actually goes away.
        let wnd = Wnd::new(None);
        let id = wnd.id;
        if let Some(center) = self.root.find_layout_mut(self.center) {
            center.add_wnd(wnd, None);
        }
        id
    }

    fn wnd_in_center(&self, wnd_id: WndId) -> bool {
        self.root
            .find_layout(self.center)
            .map(|c| c.find_wnd(wnd_id).is_some())
            .unwrap_or(false)
    }

    fn wnd_in_dock_region(&self, wnd_id: WndId) -> bool {
        self.dock_regions.values().any(|region_id| {
            self.root
                .find_layout(*region_id)
                .map(|region| region.find_wnd(wnd_id).is_some())
                .unwrap_or(false)
        })
    }

    /// The center region must never end up with zero tabs: synthesize the
    /// empty-state tab, or ask a secondary window to close itself.
    fn ensure_center_populated(&mut self) {
        let has_wnd = self
            .root
            .find_layout(self.center)
            .and_then(Layout::first_wnd)
            .is_some();
        if has_wnd {
            return;
        }
        if self.secondary_window {
            self.events.push_back(WorkspaceEvent::WindowCloseRequested);
            return;
        }
        log::info!("Center region emptied; synthesizing empty-state tab");
        let mut wnd = Wnd::new(None);
        wnd.add_tab(Tab::empty_center(), false, true, usize::MAX, &mut self.clock);
        let wnd_id = wnd.id;
        if let Some(center) = self.root.find_layout_mut(self.center) {
            center.add_wnd(wnd, None);
        }
        self.interaction.lock().focused_wnd = Some(wnd_id);
    }

    fn focus_wnd(&mut self, wnd_id: WndId) {
        let mut interaction = self.interaction.lock();
        interaction.focused_wnd = Some(wnd_id);
        interaction.focused_dock = None;
    }

    /// Attach a push channel to a freshly built model when a kernel link
    /// is wired and the panel kind subscribes.
    fn wire_channel(&mut self, wnd_id: WndId, tab_id: TabId) {
        let Some(link) = self.link.clone() else {
            return;
        };
        let Some(tab) = self
            .root
            .find_wnd_mut(wnd_id)
            .and_then(|w| w.tab_mut(tab_id))
        else {
            return;
        };
        if let Some(model) = &mut tab.model
            && model.payload().takes_push_channel()
            && !model.has_channel()
        {
            let channel = link.open_channel(&tab_id.to_string(), None);
            model.attach_channel(channel);
        }
    }

    /// Focus context for document-bound dock panels: the most recently
    /// focused editor.
    fn panel_context(&self) -> PanelContext {
        let mut best: Option<(u64, PanelContext)> = None;
        self.root.for_each_wnd(&mut |wnd| {
            if let Some(tab) = wnd.active_tab()
                && let Some(model) = &tab.model
                && let PanelPayload::Editor(editor) = model.payload()
            {
                let ctx = PanelContext {
                    root_id: editor
                        .root_id
                        .clone()
                        .or_else(|| Some(editor.block_id.clone())),
                    is_preview: editor.mode == crate::layout::model::EditorMode::Preview,
                };
                if best.as_ref().map(|(s, _)| tab.active_seq > *s).unwrap_or(true) {
                    best = Some((tab.active_seq, ctx));
                }
            }
        });
        best.map(|(_, ctx)| ctx).unwrap_or_default()
    }
}

/// The canonical two-pane region hosting one dock edge's panels.
fn dock_region(position: DockPosition) -> Layout {
    let (direction, second_resize) = match position {
        DockPosition::Left | DockPosition::Right => (SplitDirection::Tb, SplitDirection::Tb),
        DockPosition::Top | DockPosition::Bottom => (SplitDirection::Lr, SplitDirection::Lr),
    };
    let resize = match position {
        DockPosition::Left | DockPosition::Top => None,
        DockPosition::Right => Some(SplitDirection::Lr),
        DockPosition::Bottom => Some(SplitDirection::Tb),
    };
    let mut region = Layout::new(
        direction,
        position.layout_kind(),
        SizeHint::Px(0.0),
        resize,
    );
    region.add_wnd(Wnd::new(None), None);
    region.add_wnd(Wnd::new(Some(second_resize)), None);
    for child in region.children_mut() {
        if let LayoutChild::Wnd(wnd) = child {
            wnd.hidden = true;
        }
    }
    region
}

/// Default dock button sets for a fresh workspace.
fn default_dock_states() -> Vec<(DockPosition, DockStateJson)> {
    use crate::layout::persist::{DockEntryJson, DockSizeJson};

    let entry = |panel: PanelType, icon: &str, lang: &str| DockEntryJson {
        panel,
        size: DockSizeJson::default(),
        show: false,
        icon: icon.to_string(),
        title: None,
        hotkey_lang_id: lang.to_string(),
    };

    vec![
        (
            DockPosition::Left,
            DockStateJson {
                pin: true,
                data: vec![
                    vec![
                        entry(PanelType::File, "iconFiles", "fileTree"),
                        entry(PanelType::Outline, "iconAlignCenter", "outline"),
                    ],
                    vec![
                        entry(PanelType::Bookmark, "iconBookmark", "bookmark"),
                        entry(PanelType::Tag, "iconTags", "tag"),
                    ],
                ],
            },
        ),
        (
            DockPosition::Right,
            DockStateJson {
                pin: true,
                data: vec![
                    vec![
                        entry(PanelType::Graph, "iconGraph", "graphView"),
                        entry(PanelType::GlobalGraph, "iconGlobalGraph", "globalGraphView"),
                    ],
                    vec![entry(PanelType::Backlink, "iconLink", "backlinks")],
                ],
            },
        ),
        (DockPosition::Top, DockStateJson::default()),
        (DockPosition::Bottom, DockStateJson::default()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::model::{EditorMode, EditorPayload};

    fn doc_tab(title: &str, root: &str) -> Tab {
        let mut tab = Tab::stub(title);
        tab.init_data = Some(PanelPayload::Editor(EditorPayload {
            notebook_id: Some("box-1".to_string()),
            block_id: root.to_string(),
            root_id: Some(root.to_string()),
            mode: EditorMode::Wysiwyg,
            action: Vec::new(),
        }));
        tab
    }

    fn workspace_with_tabs(titles: &[&str]) -> (Workspace, Vec<TabId>) {
        let mut ws = Workspace::new(Config::default());
        let ids = titles
            .iter()
            .enumerate()
            .map(|(i, t)| ws.open_tab(doc_tab(t, &format!("root-{i}")), false))
            .collect();
        (ws, ids)
    }

    fn center_first_wnd(ws: &Workspace) -> WndId {
        ws.center_layout().first_wnd().unwrap()
    }

    #[test]
    fn fresh_workspace_has_empty_state_tab() {
        let ws = Workspace::new(Config::default());
        let wnd_id = center_first_wnd(&ws);
        let wnd = ws.root().find_wnd(wnd_id).unwrap();
        assert_eq!(wnd.children().len(), 1);
        assert!(!wnd.children()[0].has_header());
    }

    #[test]
    fn opening_first_tab_displaces_empty_state() {
        let (ws, _) = workspace_with_tabs(&["doc"]);
        let wnd = ws.root().find_wnd(center_first_wnd(&ws)).unwrap();
        assert_eq!(wnd.children().len(), 1);
        assert_eq!(wnd.children()[0].title(), Some("doc"));
    }

    #[test]
    fn closing_last_tab_synthesizes_empty_state() {
        let (mut ws, ids) = workspace_with_tabs(&["doc"]);
        ws.close_tab(ids[0]);
        let wnd_id = center_first_wnd(&ws);
        let wnd = ws.root().find_wnd(wnd_id).unwrap();
        assert_eq!(wnd.children().len(), 1);
        assert!(!wnd.children()[0].has_header());
    }

    #[test]
    fn secondary_window_asks_to_close_instead() {
        let (mut ws, ids) = workspace_with_tabs(&["doc"]);
        ws.mark_secondary_window();
        ws.close_tab(ids[0]);
        assert!(
            ws.drain_events()
                .iter()
                .any(|e| matches!(e, WorkspaceEvent::WindowCloseRequested))
        );
    }

    #[test]
    fn split_scenario() {
        let (mut ws, _) = workspace_with_tabs(&["a", "b"]);
        let wnd_id = center_first_wnd(&ws);
        let active_before = ws
            .root()
            .find_wnd(wnd_id)
            .unwrap()
            .active_tab()
            .unwrap()
            .id;

        let new_wnd = ws.split_wnd(wnd_id, SplitDirection::Lr).unwrap();
        let center = ws.center_layout();
        assert_eq!(center.children().len(), 2);
        let original = ws.root().find_wnd(wnd_id).unwrap();
        assert_eq!(original.children().len(), 2);
        assert_eq!(original.active_tab().unwrap().id, active_before);
        assert!(ws.root().find_wnd(new_wnd).unwrap().is_empty());
    }

    #[test]
    fn move_tab_compacts_emptied_source() {
        let (mut ws, ids) = workspace_with_tabs(&["a", "b"]);
        let wnd_id = center_first_wnd(&ws);
        let new_wnd = ws.split_wnd(wnd_id, SplitDirection::Lr).unwrap();

        ws.move_tab(ids[0], new_wnd, None);
        assert_eq!(ws.center_layout().children().len(), 2);
        ws.move_tab(ids[1], new_wnd, None);
        // Source pane emptied: the center collapses back to one pane.
        assert_eq!(ws.center_layout().children().len(), 1);
        let survivor = ws.root().find_wnd(new_wnd).unwrap();
        assert_eq!(survivor.children().len(), 2);
    }

    #[test]
    fn evict_by_count_scenario() {
        let mut config = Config::default();
        config.max_open_tab_count = 3;
        let mut ws = Workspace::new(config);
        let a = ws.open_tab(doc_tab("a", "root-a"), false);
        let b = ws.open_tab(doc_tab("b", "root-b"), false);
        let c = ws.open_tab(doc_tab("c", "root-c"), false);
        // B most recently active among non-focused; A focused.
        ws.switch_tab(b);
        ws.switch_tab(a);
        ws.open_tab(doc_tab("d", "root-d"), false);

        let wnd = ws.root().find_wnd(center_first_wnd(&ws)).unwrap();
        let titles: Vec<_> = wnd.children().iter().filter_map(|t| t.title()).collect();
        assert_eq!(wnd.children().len(), 3);
        assert!(!titles.contains(&"c"));
        assert!(titles.contains(&"a"));
        assert!(titles.contains(&"b"));
        assert!(
            ws.drain_events()
                .iter()
                .any(|e| matches!(e, WorkspaceEvent::TabEvicted { tab } if *tab == c))
        );
    }

    #[test]
    fn drag_cancel_restores_header_order() {
        let (mut ws, ids) = workspace_with_tabs(&["a", "b", "c"]);
        let wnd_id = center_first_wnd(&ws);
        assert!(ws.start_tab_drag(ids[0]));
        ws.drag_over_header(wnd_id, ids[2], true);
        {
            let wnd = ws.root().find_wnd(wnd_id).unwrap();
            assert_ne!(wnd.header_order()[0], ids[0]);
        }
        ws.finish_drag(true, None);
        let wnd = ws.root().find_wnd(wnd_id).unwrap();
        assert_eq!(wnd.header_order(), &[ids[0], ids[1], ids[2]]);
        assert!(ws.interaction().lock().drag.is_none());
    }

    #[test]
    fn drop_on_header_commits_reorder() {
        let (mut ws, ids) = workspace_with_tabs(&["a", "b", "c"]);
        let wnd_id = center_first_wnd(&ws);
        ws.start_tab_drag(ids[0]);
        ws.drag_over_header(wnd_id, ids[2], true);
        ws.drop_on_header(wnd_id, None);
        let wnd = ws.root().find_wnd(wnd_id).unwrap();
        let titles: Vec<_> = wnd.children().iter().filter_map(|t| t.title()).collect();
        assert_eq!(titles, vec!["b", "c", "a"]);
    }

    #[test]
    fn overlay_drop_right_splits_and_moves() {
        let (mut ws, ids) = workspace_with_tabs(&["a", "b"]);
        let wnd_id = center_first_wnd(&ws);
        ws.start_tab_drag(ids[1]);
        ws.drop_on_overlay(wnd_id, DropZone::Right);

        let center = ws.center_layout();
        assert_eq!(center.children().len(), 2);
        let new_wnd = center.children()[1].as_wnd().unwrap();
        assert_eq!(new_wnd.children().len(), 1);
        assert_eq!(new_wnd.children()[0].id, ids[1]);
    }

    #[test]
    fn overlay_drop_left_swaps_panes() {
        let (mut ws, ids) = workspace_with_tabs(&["a", "b"]);
        let wnd_id = center_first_wnd(&ws);
        ws.start_tab_drag(ids[1]);
        ws.drop_on_overlay(wnd_id, DropZone::Left);

        let center = ws.center_layout();
        assert_eq!(center.children().len(), 2);
        // The pane holding the dropped tab sits first.
        let first = center.children()[0].as_wnd().unwrap();
        assert_eq!(first.children()[0].id, ids[1]);
        assert_eq!(center.children()[0].resize(), None);
    }

    #[test]
    fn drag_outside_window_detaches_tab() {
        let (mut ws, ids) = workspace_with_tabs(&["a", "b"]);
        ws.compute_bounds(Rect::new(0.0, 0.0, 1200.0, 800.0));
        ws.start_tab_drag(ids[1]);
        ws.finish_drag(false, Some((1500.0, 400.0)));

        let events = ws.drain_events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, WorkspaceEvent::TabDetached { .. }))
        );
        assert!(ws.root().find_tab(ids[1]).is_none());
    }

    #[test]
    fn detached_payload_rebuilds_in_new_window() {
        let (mut ws, ids) = workspace_with_tabs(&["a", "b"]);
        ws.compute_bounds(Rect::new(0.0, 0.0, 1200.0, 800.0));
        ws.start_tab_drag(ids[1]);
        ws.finish_drag(false, Some((1500.0, 400.0)));
        let payload = ws
            .drain_events()
            .into_iter()
            .find_map(|e| match e {
                WorkspaceEvent::TabDetached { layout } => Some(layout),
                _ => None,
            })
            .unwrap();

        let mut other = Workspace::new(Config::default());
        other.mark_secondary_window();
        let node: NodeJson = serde_json::from_value(payload).unwrap();
        let adopted = other.adopt_transferred_tab(&node).unwrap();
        assert_eq!(
            other.root().find_tab(adopted).and_then(|t| t.title()),
            Some("b")
        );
    }

    #[test]
    fn close_others_keeps_pinned() {
        let (mut ws, ids) = workspace_with_tabs(&["a", "b", "c"]);
        ws.pin_tab(ids[1]);
        ws.close_other_tabs(ids[2]);
        let wnd = ws.root().find_wnd(center_first_wnd(&ws)).unwrap();
        let titles: Vec<_> = wnd.children().iter().filter_map(|t| t.title()).collect();
        assert_eq!(titles, vec!["b", "c"]);
        assert_eq!(wnd.active_tab().unwrap().id, ids[2]);
    }

    #[test]
    fn upload_guard_refuses_close() {
        let (mut ws, ids) = workspace_with_tabs(&["a"]);
        ws.switch_tab(ids[0]); // materialize the editor model
        let wnd_id = center_first_wnd(&ws);
        ws.root
            .find_wnd_mut(wnd_id)
            .unwrap()
            .tab_mut(ids[0])
            .unwrap()
            .model
            .as_mut()
            .unwrap()
            .set_uploading(true);

        ws.close_tab(ids[0]);
        assert!(ws.root().find_tab(ids[0]).is_some());
        assert!(
            ws.drain_events()
                .iter()
                .any(|e| matches!(e, WorkspaceEvent::CloseRefused { tab, .. } if *tab == ids[0]))
        );
    }

    #[test]
    fn copy_tab_duplicates_payload() {
        let (mut ws, ids) = workspace_with_tabs(&["a"]);
        let copy = ws.copy_tab(ids[0]).unwrap();
        assert_ne!(copy, ids[0]);
        let wnd = ws.root().find_wnd(center_first_wnd(&ws)).unwrap();
        assert_eq!(wnd.children().len(), 2);
        let original = ws.root().find_tab(ids[0]).unwrap();
        let duplicate = ws.root().find_tab(copy).unwrap();
        assert_eq!(original.init_data, duplicate.init_data);
    }

    #[test]
    fn tab_stepping_wraps() {
        let (mut ws, ids) = workspace_with_tabs(&["a", "b", "c"]);
        ws.switch_tab(ids[2]);
        ws.next_tab();
        let active = |ws: &Workspace| {
            ws.root()
                .find_wnd(center_first_wnd(ws))
                .unwrap()
                .active_tab()
                .unwrap()
                .id
        };
        assert_eq!(active(&ws), ids[0]);
        ws.prev_tab();
        assert_eq!(active(&ws), ids[2]);
        ws.switch_tab_by_index(2);
        assert_eq!(active(&ws), ids[1]);
    }

    #[test]
    fn dock_toggle_routes_through_workspace() {
        let (mut ws, _) = workspace_with_tabs(&["doc"]);
        let outcome = ws.toggle_dock_panel(DockPosition::Left, &PanelType::File, false);
        assert!(outcome.created);
        let tab = outcome.activated.unwrap();
        assert!(ws.root().find_tab(tab).is_some());

        // Toggling again while focused deactivates.
        let second = ws.toggle_dock_panel(DockPosition::Left, &PanelType::File, false);
        assert!(second.closed);
    }

    #[test]
    fn dock_panel_context_binds_focused_editor() {
        let (mut ws, ids) = workspace_with_tabs(&["doc"]);
        ws.switch_tab(ids[0]); // materialize the editor
        let outcome = ws.toggle_dock_panel(DockPosition::Left, &PanelType::Outline, false);
        let tab = outcome.activated.unwrap();
        let panel = ws.root().find_tab(tab).unwrap();
        let Some(model) = &panel.model else {
            panic!("outline model expected");
        };
        let PanelPayload::Outline(outline) = model.payload() else {
            panic!("outline payload expected");
        };
        assert_eq!(outline.block_id.as_deref(), Some("root-0"));
    }

    #[test]
    fn save_restore_round_trip_preserves_tabs_and_docks() {
        let (mut ws, ids) = workspace_with_tabs(&["a", "b"]);
        ws.pin_tab(ids[0]);
        ws.toggle_dock_panel(DockPosition::Left, &PanelType::File, false);
        let doc = ws.save_layout().unwrap();

        let restored = Workspace::from_saved(Config::default(), &doc).unwrap();
        let wnd = restored
            .root()
            .find_wnd(center_first_wnd(&restored))
            .unwrap();
        let titles: Vec<_> = wnd.children().iter().filter_map(|t| t.title()).collect();
        assert_eq!(titles, vec!["a", "b"]);
        assert!(wnd.children()[0].pinned);
        // The files panel came back through the dock toggle path.
        let dock = restored.dock(DockPosition::Left).unwrap();
        let button = dock.button(&PanelType::File).unwrap();
        assert!(button.show);
        assert!(button.tab.is_some());
    }

    #[test]
    fn close_tabs_on_start_drops_unpinned() {
        let (mut ws, ids) = workspace_with_tabs(&["a", "b"]);
        ws.pin_tab(ids[0]);
        let doc = ws.save_layout().unwrap();

        let mut config = Config::default();
        config.close_tabs_on_start = true;
        let restored = Workspace::from_saved(config, &doc).unwrap();
        let wnd = restored
            .root()
            .find_wnd(center_first_wnd(&restored))
            .unwrap();
        let titles: Vec<_> = wnd.children().iter().filter_map(|t| t.title()).collect();
        assert_eq!(titles, vec!["a"]);
    }

    #[test]
    fn rename_frame_retitles_tab() {
        let (mut ws, ids) = workspace_with_tabs(&["a"]);
        ws.switch_tab(ids[0]);
        let subscriber = ids[0].to_string();
        let frame = PushFrame {
            cmd: "rename".to_string(),
            data: serde_json::json!({"id": "root-0", "title": "Renamed"}),
        };
        ws.dispatch_frame(&subscriber, &frame);
        assert_eq!(
            ws.root().find_tab(ids[0]).and_then(|t| t.title()),
            Some("Renamed")
        );
    }

    #[test]
    fn remove_doc_frame_closes_tab() {
        let (mut ws, ids) = workspace_with_tabs(&["a", "b"]);
        ws.switch_tab(ids[0]);
        let frame = PushFrame {
            cmd: "removeDoc".to_string(),
            data: serde_json::json!({"ids": ["root-0"]}),
        };
        ws.dispatch_frame(&ids[0].to_string(), &frame);
        assert!(ws.root().find_tab(ids[0]).is_none());
        assert!(ws.root().find_tab(ids[1]).is_some());
    }

    #[test]
    fn active_tab_unique_across_workspace_operations() {
        let (mut ws, ids) = workspace_with_tabs(&["a", "b", "c"]);
        let wnd_id = center_first_wnd(&ws);
        let new_wnd = ws.split_wnd(wnd_id, SplitDirection::Lr).unwrap();
        ws.move_tab(ids[1], new_wnd, None);
        ws.switch_tab(ids[0]);
        ws.close_tab(ids[2]);

        ws.root().for_each_wnd(&mut |wnd| {
            if !wnd.is_empty() {
                let actives = wnd.children().iter().filter(|t| t.active).count();
                assert_eq!(actives, 1, "pane {} active count", wnd.id);
            }
            let ids: Vec<TabId> = wnd.children().iter().map(|t| t.id).collect();
            assert_eq!(ids, wnd.header_order());
        });
    }
}

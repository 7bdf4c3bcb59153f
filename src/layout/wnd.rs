//! Panes: horizontal tab strips, the minimal visible content-hosting unit.
//!
//! A pane owns an ordered list of tabs plus a *header strip projection* —
//! the visual header order the drag handlers reorder speculatively during a
//! gesture. Every public operation leaves the projection equal to the tab
//! order again; a cancelled drag restores it explicitly.

use crate::layout::model::Model;
use crate::layout::tab::Tab;
use notewell_config::{Rect, SizeHint, SplitDirection, TabId, WndId};

/// Monotonic activation stamps. Strictly increasing, so recency comparisons
/// never tie; were two stamps ever equal, the lower index wins.
#[derive(Debug, Default)]
pub struct ActivationClock(u64);

impl ActivationClock {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}

/// Result of [`Wnd::add_tab`] / [`Wnd::adopt_tab`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AddOutcome {
    /// Tab evicted to stay under the open-tab cap.
    pub evicted: Option<TabId>,
}

/// Result of [`Wnd::switch_tab`].
#[derive(Debug, PartialEq, Eq)]
pub struct SwitchOutcome {
    /// The tab carried deferred init data and its model was built just now.
    pub materialized: bool,
}

/// Result of [`Wnd::remove_tab`].
#[derive(Debug, PartialEq, Eq)]
pub enum TabRemoval {
    NotFound,
    /// The tab's content has an upload in flight; nothing was changed.
    Refused,
    Removed {
        /// The pane has no tabs left; the owner decides between compaction
        /// (center) and hiding (dock regions).
        emptied: bool,
    },
}

/// A pane: one strip of tabs with a single active (visible) one.
pub struct Wnd {
    pub id: WndId,
    /// Direction of the resize handle preceding this pane, if any. The
    /// first child of a split never carries one.
    pub resize: Option<SplitDirection>,
    /// Main-axis size within the parent split.
    pub size: SizeHint,
    pub bounds: Rect,
    /// Dock-region panes hide instead of being destroyed when emptied.
    pub hidden: bool,
    /// Horizontal scroll offset of the header strip.
    pub header_scroll: f32,
    children: Vec<Tab>,
    header_order: Vec<TabId>,
    /// A foreign drag currently shows a placeholder clone at the end of
    /// this strip.
    drag_clone: bool,
}

impl Wnd {
    pub fn new(resize: Option<SplitDirection>) -> Self {
        Self {
            id: WndId::new(),
            resize,
            size: SizeHint::Auto,
            bounds: Rect::default(),
            hidden: false,
            header_scroll: 0.0,
            children: Vec::new(),
            header_order: Vec::new(),
            drag_clone: false,
        }
    }

    pub fn children(&self) -> &[Tab] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Tab] {
        &mut self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Visual header order. Diverges from the tab order only mid-drag.
    pub fn header_order(&self) -> &[TabId] {
        &self.header_order
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.children.iter().find(|t| t.id == id)
    }

    pub fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.children.iter_mut().find(|t| t.id == id)
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.children.iter().find(|t| t.active)
    }

    fn index_of(&self, id: TabId) -> Option<usize> {
        self.children.iter().position(|t| t.id == id)
    }

    /// Insert a tab after the currently active one, skipping any pinned run
    /// that follows it so new tabs never land ahead of pinned tabs.
    ///
    /// With `keep_cursor` the tab is inserted but deliberately not
    /// activated ("open in background"); its model construction stays
    /// deferred on `init_data`. Enforces the open-tab cap by evicting the
    /// least-recently-active unpinned, unfocused tab. The tab's deferred
    /// callback runs only after insertion, once geometry is attached.
    pub fn add_tab(
        &mut self,
        mut tab: Tab,
        keep_cursor: bool,
        in_center: bool,
        max_tabs: usize,
        clock: &mut ActivationClock,
    ) -> AddOutcome {
        let prev_active = self.children.iter().find(|t| t.active).map(|t| t.id);
        let mut insert_at = self.children.len().min(
            self.children
                .iter()
                .position(|t| t.active)
                .map(|focus| focus + 1)
                .unwrap_or(0),
        );
        while insert_at < self.children.len() && self.children[insert_at].pinned {
            insert_at += 1;
        }

        if keep_cursor {
            tab.active = false;
        } else {
            for existing in &mut self.children {
                if existing.active {
                    existing.active = false;
                    if let Some(model) = &mut existing.model {
                        model.on_panel_hidden();
                    }
                }
            }
            tab.active = true;
            tab.active_seq = clock.next();
        }

        let id = tab.id;
        self.children.insert(insert_at, tab);
        self.header_order.insert(insert_at, id);

        if let Some(callback) = self.children[insert_at].take_callback() {
            callback(&mut self.children[insert_at]);
        }

        // The first real tab displaces the headless empty-center placeholder.
        if in_center && self.children.len() == 2 && !self.children[0].has_header() {
            self.remove_at(0);
            if !self.children.iter().any(|t| t.active) {
                self.children[0].active = true;
                self.children[0].active_seq = clock.next();
            }
            self.sync_header();
            return AddOutcome { evicted: None };
        }

        let mut evicted = None;
        if self.children.len() > max_tabs {
            evicted = self.evict_over_counter(prev_active);
        }
        self.sync_header();
        AddOutcome { evicted }
    }

    /// Activate a tab, deactivating all siblings.
    ///
    /// A tab carrying deferred init data (background open, reload of an
    /// editor/plugin tab) materializes its model now. Visibility hooks run
    /// on the models involved (a hidden graph pauses its simulation, a
    /// shown one resumes).
    pub fn switch_tab(&mut self, id: TabId, clock: &mut ActivationClock) -> Option<SwitchOutcome> {
        self.index_of(id)?;
        for tab in &mut self.children {
            if tab.id == id {
                tab.active = true;
                tab.active_seq = clock.next();
            } else if tab.active {
                tab.active = false;
                if let Some(model) = &mut tab.model {
                    model.on_panel_hidden();
                }
            }
        }
        let tab = self.tab_mut(id).expect("tab vanished mid-switch");
        let mut materialized = false;
        if let Some(payload) = tab.init_data.take() {
            tab.add_model(Model::from_payload(payload));
            materialized = true;
        } else if let Some(model) = &mut tab.model {
            model.on_panel_shown();
        }
        Some(SwitchOutcome { materialized })
    }

    /// Remove a tab, tearing its model down first.
    ///
    /// Refused while the tab's content has an upload in flight. When the
    /// removed tab was active and siblings remain, the most-recently-active
    /// sibling takes over (skipped during a whole-strip teardown).
    pub fn remove_tab(&mut self, id: TabId, close_all: bool, clock: &mut ActivationClock) -> TabRemoval {
        let Some(idx) = self.index_of(id) else {
            return TabRemoval::NotFound;
        };
        if self.children[idx].removal_blocked() {
            log::info!("Refusing to close tab {id}: upload in flight");
            return TabRemoval::Refused;
        }

        if self.children[idx].active && !close_all && self.children.len() > 1 {
            let successor = self
                .children
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .max_by(|a, b| {
                    a.1.active_seq
                        .cmp(&b.1.active_seq)
                        .then_with(|| b.0.cmp(&a.0))
                })
                .map(|(_, t)| t.id);
            if let Some(successor) = successor {
                self.switch_tab(successor, clock);
            }
        }

        // The successor switch may have reordered nothing; the index is
        // still valid.
        self.remove_at(self.index_of(id).expect("tab vanished mid-removal"));
        self.sync_header();
        TabRemoval::Removed {
            emptied: self.children.is_empty(),
        }
    }

    fn remove_at(&mut self, idx: usize) -> TabId {
        let mut tab = self.children.remove(idx);
        self.header_order.retain(|h| *h != tab.id);
        if let Some(model) = &mut tab.model {
            model.teardown();
        }
        log::info!("Removed tab {} ({} left)", tab.id, self.children.len());
        tab.id
    }

    /// Detach a tab without tearing it down, for relocation into another
    /// pane or window. The strip left behind shows its last tab.
    pub fn detach_tab(&mut self, id: TabId, clock: &mut ActivationClock) -> Option<Tab> {
        let idx = self.index_of(id)?;
        let mut tab = self.children.remove(idx);
        self.header_order.retain(|h| *h != tab.id);
        if tab.active {
            tab.active = false;
            if let Some(last) = self.children.last().map(|t| t.id) {
                self.switch_tab(last, clock);
            }
        }
        self.sync_header();
        Some(tab)
    }

    /// Adopt a relocated tab, before a named sibling or appended, then
    /// activate it. Applies the same over-cap eviction as [`Self::add_tab`];
    /// the adopted tab itself is protected.
    pub fn adopt_tab(
        &mut self,
        mut tab: Tab,
        before: Option<TabId>,
        max_tabs: usize,
        clock: &mut ActivationClock,
    ) -> AddOutcome {
        tab.active = false;
        let id = tab.id;
        let idx = before
            .and_then(|b| self.index_of(b))
            .unwrap_or(self.children.len());
        self.children.insert(idx, tab);
        self.header_order.insert(idx, id);

        let mut evicted = None;
        if self.children.len() > max_tabs {
            evicted = self.evict_over_counter(Some(id));
        }
        self.switch_tab(id, clock);
        self.sync_header();
        AddOutcome { evicted }
    }

    /// Evict the least-recently-active tab that is neither pinned, active,
    /// nor protected. Stable: equal stamps keep the earlier index.
    fn evict_over_counter(&mut self, protect: Option<TabId>) -> Option<TabId> {
        let mut candidate: Option<(usize, u64)> = None;
        for (idx, tab) in self.children.iter().enumerate() {
            if tab.pinned || tab.active || Some(tab.id) == protect || !tab.has_header() {
                continue;
            }
            match candidate {
                Some((_, seq)) if tab.active_seq >= seq => {}
                _ => candidate = Some((idx, tab.active_seq)),
            }
        }
        candidate.map(|(idx, _)| self.remove_at(idx))
    }

    /// Move a tab to sit immediately after the pinned run and mark it
    /// pinned. A no-op move when it is already adjacent to the boundary.
    pub fn pin_tab(&mut self, id: TabId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let adjacent = idx == 0 || self.children[idx - 1].pinned;
        if adjacent {
            self.children[idx].pinned = true;
        } else {
            let mut tab = self.children.remove(idx);
            let boundary = self.children.iter().filter(|t| t.pinned).count();
            tab.pinned = true;
            self.children.insert(boundary, tab);
        }
        self.sync_header();
        true
    }

    /// Inverse of [`Self::pin_tab`]: clear the flag and move the tab to sit
    /// immediately after the last still-pinned tab.
    pub fn unpin_tab(&mut self, id: TabId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let adjacent = idx + 1 == self.children.len() || !self.children[idx + 1].pinned;
        if adjacent {
            self.children[idx].pinned = false;
        } else {
            let mut tab = self.children.remove(idx);
            tab.pinned = false;
            let boundary = self.children.iter().filter(|t| t.pinned).count();
            self.children.insert(boundary, tab);
        }
        self.sync_header();
        true
    }

    // ------------------------------------------------------------------
    // Header strip projection
    // ------------------------------------------------------------------

    fn sync_header(&mut self) {
        self.header_order = self.children.iter().map(|t| t.id).collect();
    }

    /// Restore the projection from the tab order. Drag-over handlers may
    /// have speculatively reordered headers; a cancelled drop (Escape)
    /// resynchronizes here instead of rolling back step by step.
    pub fn resync_header(&mut self) {
        self.sync_header();
    }

    /// Commit a completed same-strip header drag: reorder the tabs to match
    /// the projection.
    pub fn commit_header_order(&mut self) {
        let order = self.header_order.clone();
        self.children.sort_by_key(|t| {
            order
                .iter()
                .position(|id| *id == t.id)
                .unwrap_or(usize::MAX)
        });
        self.sync_header();
    }

    /// Speculatively move `dragged`'s header to the other side of
    /// `target`'s during a drag-over. Only applies within one pinned zone;
    /// pinned and unpinned headers never interleave.
    pub(crate) fn speculate_header_move(
        &mut self,
        dragged: TabId,
        target: TabId,
        after: bool,
    ) -> bool {
        if dragged == target {
            return false;
        }
        let (Some(drag_tab), Some(target_tab)) = (self.tab(dragged), self.tab(target)) else {
            return false;
        };
        if drag_tab.pinned != target_tab.pinned {
            return false;
        }
        let Some(from) = self.header_order.iter().position(|h| *h == dragged) else {
            return false;
        };
        self.header_order.remove(from);
        let Some(to) = self.header_order.iter().position(|h| *h == target) else {
            self.header_order.insert(from, dragged);
            return false;
        };
        self.header_order.insert(to + usize::from(after), dragged);
        true
    }

    pub(crate) fn set_drag_clone(&mut self, present: bool) {
        self.drag_clone = present;
    }

    pub(crate) fn has_drag_clone(&self) -> bool {
        self.drag_clone
    }

    /// Scroll the header strip so the focused header is fully visible.
    pub fn scroll_focus_into_view(&mut self, header_width: f32, viewport_width: f32) {
        let Some(active) = self.active_tab().map(|t| t.id) else {
            return;
        };
        let Some(idx) = self.header_order.iter().position(|h| *h == active) else {
            return;
        };
        let offset = idx as f32 * header_width;
        if offset + header_width > self.header_scroll + viewport_width {
            self.header_scroll = offset + header_width - viewport_width;
        } else if offset < self.header_scroll {
            self.header_scroll = offset;
        }
    }
}

impl std::fmt::Debug for Wnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wnd")
            .field("id", &self.id.to_string())
            .field("tabs", &self.children.len())
            .field("hidden", &self.hidden)
            .finish_non_exhaustive()
    }
}

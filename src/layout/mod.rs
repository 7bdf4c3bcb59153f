//! The pane tree: recursive split containers composing panes and nested
//! splits.
//!
//! Nodes are exclusively owned by their parent; traversal and mutation are
//! addressed by id from the region root. The rendered surface is a derived
//! projection of this tree — pixel bounds are recomputed by
//! [`Layout::compute_bounds`], never read back as the source of truth.

pub mod dock;
pub mod drag;
pub mod model;
pub mod persist;
pub mod scheduler;
pub mod tab;
pub mod wnd;

use notewell_config::{LayoutId, LayoutKind, Rect, SizeHint, SplitDirection, TabId, WndId};
use tab::Tab;
use wnd::Wnd;

/// Id of either child node kind, for insert-after addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    Layout(LayoutId),
    Wnd(WndId),
}

impl From<LayoutId> for NodeRef {
    fn from(id: LayoutId) -> Self {
        NodeRef::Layout(id)
    }
}

impl From<WndId> for NodeRef {
    fn from(id: WndId) -> Self {
        NodeRef::Wnd(id)
    }
}

/// A child of a split container: either a nested split or a pane.
#[derive(Debug)]
pub enum LayoutChild {
    Layout(Layout),
    Wnd(Wnd),
}

impl LayoutChild {
    pub fn node_ref(&self) -> NodeRef {
        match self {
            LayoutChild::Layout(l) => NodeRef::Layout(l.id),
            LayoutChild::Wnd(w) => NodeRef::Wnd(w.id),
        }
    }

    pub fn as_wnd(&self) -> Option<&Wnd> {
        match self {
            LayoutChild::Wnd(w) => Some(w),
            LayoutChild::Layout(_) => None,
        }
    }

    pub fn as_wnd_mut(&mut self) -> Option<&mut Wnd> {
        match self {
            LayoutChild::Wnd(w) => Some(w),
            LayoutChild::Layout(_) => None,
        }
    }

    pub fn as_layout(&self) -> Option<&Layout> {
        match self {
            LayoutChild::Layout(l) => Some(l),
            LayoutChild::Wnd(_) => None,
        }
    }

    pub fn as_layout_mut(&mut self) -> Option<&mut Layout> {
        match self {
            LayoutChild::Layout(l) => Some(l),
            LayoutChild::Wnd(_) => None,
        }
    }

    pub fn size(&self) -> SizeHint {
        match self {
            LayoutChild::Layout(l) => l.size,
            LayoutChild::Wnd(w) => w.size,
        }
    }

    pub fn set_size(&mut self, size: SizeHint) {
        match self {
            LayoutChild::Layout(l) => l.size = size,
            LayoutChild::Wnd(w) => w.size = size,
        }
    }

    pub fn resize(&self) -> Option<SplitDirection> {
        match self {
            LayoutChild::Layout(l) => l.resize,
            LayoutChild::Wnd(w) => w.resize,
        }
    }

    pub fn set_resize(&mut self, resize: Option<SplitDirection>) {
        match self {
            LayoutChild::Layout(l) => l.resize = resize,
            LayoutChild::Wnd(w) => w.resize = resize,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            LayoutChild::Layout(l) => l.bounds,
            LayoutChild::Wnd(w) => w.bounds,
        }
    }

    fn hidden(&self) -> bool {
        match self {
            LayoutChild::Layout(_) => false,
            LayoutChild::Wnd(w) => w.hidden,
        }
    }
}

/// A split container holding panes and nested splits in one linear run.
#[derive(Debug)]
pub struct Layout {
    pub id: LayoutId,
    pub direction: SplitDirection,
    pub kind: LayoutKind,
    pub size: SizeHint,
    /// Direction of the resize handle preceding this container, if any.
    pub resize: Option<SplitDirection>,
    pub bounds: Rect,
    children: Vec<LayoutChild>,
}

impl Layout {
    pub fn new(
        direction: SplitDirection,
        kind: LayoutKind,
        size: SizeHint,
        resize: Option<SplitDirection>,
    ) -> Self {
        Self {
            id: LayoutId::new(),
            direction,
            kind,
            size,
            resize,
            bounds: Rect::default(),
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[LayoutChild] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [LayoutChild] {
        &mut self.children
    }

    fn child_index(&self, node: NodeRef) -> Option<usize> {
        self.children.iter().position(|c| c.node_ref() == node)
    }

    // ------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------

    /// Append a nested split, or insert it immediately after a named
    /// sibling.
    pub fn add_layout(&mut self, child: Layout, after: Option<NodeRef>) {
        let idx = match after.and_then(|a| self.child_index(a)) {
            Some(i) => i + 1,
            None => self.children.len(),
        };
        self.children.insert(idx, LayoutChild::Layout(child));
    }

    /// Append a pane, or insert it immediately after a named sibling.
    /// Insert-after re-balances which child flex-fills the run.
    pub fn add_wnd(&mut self, child: Wnd, after: Option<NodeRef>) {
        let idx = match after.and_then(|a| self.child_index(a)) {
            Some(i) => i + 1,
            None => self.children.len(),
        };
        self.children.insert(idx, LayoutChild::Wnd(child));
        if after.is_some() {
            self.fix_flex_fill();
        }
    }

    /// Keep exactly one flex-filled child per run, pinned to the
    /// second-to-last position: every other flex child is frozen to its
    /// current pixel extent.
    pub fn fix_flex_fill(&mut self) {
        if self.children.len() < 2 {
            return;
        }
        let target = self.children.len() - 2;
        if self.children[target].size().is_auto() {
            return;
        }
        let direction = self.direction;
        for (idx, child) in self.children.iter_mut().enumerate() {
            if idx != target && child.size().is_auto() {
                let extent = child.bounds().extent(direction);
                // A child that was never laid out has no extent worth
                // freezing; leave it flexing until the next pass.
                if extent > 0.0 {
                    child.set_size(SizeHint::Px(extent));
                }
            }
        }
        self.children[target].set_size(SizeHint::Auto);
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    pub fn find_wnd(&self, id: WndId) -> Option<&Wnd> {
        for child in &self.children {
            match child {
                LayoutChild::Wnd(w) if w.id == id => return Some(w),
                LayoutChild::Wnd(_) => {}
                LayoutChild::Layout(l) => {
                    if let Some(found) = l.find_wnd(id) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    pub fn find_wnd_mut(&mut self, id: WndId) -> Option<&mut Wnd> {
        for child in &mut self.children {
            match child {
                LayoutChild::Wnd(w) if w.id == id => return Some(w),
                LayoutChild::Wnd(_) => {}
                LayoutChild::Layout(l) => {
                    if let Some(found) = l.find_wnd_mut(id) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    pub fn find_layout(&self, id: LayoutId) -> Option<&Layout> {
        if self.id == id {
            return Some(self);
        }
        self.children
            .iter()
            .filter_map(LayoutChild::as_layout)
            .find_map(|l| l.find_layout(id))
    }

    pub fn find_layout_mut(&mut self, id: LayoutId) -> Option<&mut Layout> {
        if self.id == id {
            return Some(self);
        }
        self.children
            .iter_mut()
            .filter_map(LayoutChild::as_layout_mut)
            .find_map(|l| l.find_layout_mut(id))
    }

    /// First container of the given kind, depth-first, self included.
    pub fn find_kind(&self, kind: LayoutKind) -> Option<LayoutId> {
        if self.kind == kind {
            return Some(self.id);
        }
        self.children
            .iter()
            .filter_map(LayoutChild::as_layout)
            .find_map(|l| l.find_kind(kind))
    }

    /// Pane hosting the given tab.
    pub fn wnd_of_tab(&self, id: TabId) -> Option<WndId> {
        for child in &self.children {
            match child {
                LayoutChild::Wnd(w) => {
                    if w.tab(id).is_some() {
                        return Some(w.id);
                    }
                }
                LayoutChild::Layout(l) => {
                    if let Some(found) = l.wnd_of_tab(id) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    pub fn find_tab(&self, id: TabId) -> Option<&Tab> {
        self.wnd_of_tab(id)
            .and_then(|wnd| self.find_wnd(wnd))
            .and_then(|wnd| wnd.tab(id))
    }

    /// First pane by depth-first descent.
    pub fn first_wnd(&self) -> Option<WndId> {
        for child in &self.children {
            match child {
                LayoutChild::Wnd(w) => return Some(w.id),
                LayoutChild::Layout(l) => {
                    if let Some(found) = l.first_wnd() {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    pub fn all_wnd_ids(&self) -> Vec<WndId> {
        let mut out = Vec::new();
        self.collect_wnd_ids(&mut out);
        out
    }

    fn collect_wnd_ids(&self, out: &mut Vec<WndId>) {
        for child in &self.children {
            match child {
                LayoutChild::Wnd(w) => out.push(w.id),
                LayoutChild::Layout(l) => l.collect_wnd_ids(out),
            }
        }
    }

    pub fn all_tab_ids(&self) -> Vec<TabId> {
        let mut out = Vec::new();
        self.for_each_wnd(&mut |wnd| {
            out.extend(wnd.children().iter().map(|t| t.id));
        });
        out
    }

    pub fn for_each_wnd(&self, f: &mut dyn FnMut(&Wnd)) {
        for child in &self.children {
            match child {
                LayoutChild::Wnd(w) => f(w),
                LayoutChild::Layout(l) => l.for_each_wnd(f),
            }
        }
    }

    pub fn for_each_wnd_mut(&mut self, f: &mut dyn FnMut(&mut Wnd)) {
        for child in &mut self.children {
            match child {
                LayoutChild::Wnd(w) => f(w),
                LayoutChild::Layout(l) => l.for_each_wnd_mut(f),
            }
        }
    }

    /// Pane whose focused tab was activated most recently; panes without a
    /// focused tab rank last, ties fall back to document order.
    pub fn most_recent_wnd(&self) -> Option<WndId> {
        let mut best: Option<(u64, WndId)> = None;
        self.for_each_wnd(&mut |wnd| {
            let seq = wnd.active_tab().map(|t| t.active_seq).unwrap_or(0);
            if best.map(|(s, _)| seq > s).unwrap_or(true) {
                best = Some((seq, wnd.id));
            }
        });
        best.map(|(_, id)| id)
    }

    // ------------------------------------------------------------------
    // Split
    // ------------------------------------------------------------------

    /// Create a new empty pane adjacent to `wnd_id`.
    ///
    /// When the parent run already goes the requested way the new pane is a
    /// plain sibling insert; a single-child parent just flips its
    /// direction; otherwise an intermediate split is spliced in at the
    /// pane's position, carrying its size so geometry is unchanged at the
    /// moment of the split.
    pub fn split_wnd(&mut self, wnd_id: WndId, direction: SplitDirection) -> Option<WndId> {
        if let Some(idx) = self.child_index(NodeRef::Wnd(wnd_id)) {
            // A lone headless placeholder never splits.
            if let Some(w) = self.children[idx].as_wnd()
                && w.children().len() == 1
                && !w.children()[0].has_header()
            {
                return Some(wnd_id);
            }

            let new_wnd = Wnd::new(Some(direction));
            let new_id = new_wnd.id;
            if direction == self.direction {
                self.add_wnd(new_wnd, Some(NodeRef::Wnd(wnd_id)));
            } else if self.children.len() == 1 {
                self.direction = direction;
                self.add_wnd(new_wnd, Some(NodeRef::Wnd(wnd_id)));
            } else {
                let LayoutChild::Wnd(mut moved) = self.children.remove(idx) else {
                    unreachable!("index located a pane child");
                };
                let mut mid = Layout::new(
                    direction,
                    LayoutKind::Normal,
                    moved.size,
                    moved.resize.take(),
                );
                moved.size = SizeHint::Auto;
                mid.children.push(LayoutChild::Wnd(moved));
                mid.children.push(LayoutChild::Wnd(new_wnd));
                self.children.insert(idx, LayoutChild::Layout(mid));
            }
            return Some(new_id);
        }
        for child in &mut self.children {
            if let LayoutChild::Layout(l) = child
                && let Some(new_id) = l.split_wnd(wnd_id, direction)
            {
                return Some(new_id);
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Removal and compaction
    // ------------------------------------------------------------------

    /// Remove an emptied pane, compacting single-child split chains out of
    /// the tree. Compaction stops at the `center` container: the document
    /// region itself is never removed.
    pub fn remove_wnd(&mut self, id: WndId) -> bool {
        if let Some(idx) = self.child_index(NodeRef::Wnd(id)) {
            self.remove_child_at(idx);
            return true;
        }
        for i in 0..self.children.len() {
            if let LayoutChild::Layout(l) = &mut self.children[i]
                && l.remove_wnd(id)
            {
                if let LayoutChild::Layout(l) = &self.children[i]
                    && l.children.is_empty()
                    && l.kind != LayoutKind::Center
                {
                    self.remove_child_at(i);
                }
                return true;
            }
        }
        false
    }

    /// Remove a child, handing its extent to a neighbor so the remaining
    /// run keeps its overall geometry.
    fn remove_child_at(&mut self, idx: usize) {
        if self.children.len() > 1 {
            let removed_extent = self.children[idx].bounds().extent(self.direction);
            let neighbor = if idx == 0 { 1 } else { idx - 1 };
            if self.children.len() == 2 {
                // The survivor fills the whole run.
                self.children[neighbor].set_size(SizeHint::Auto);
                self.children[neighbor].set_resize(None);
            } else if !self.children[neighbor].size().is_auto() {
                let extent = self.children[neighbor].bounds().extent(self.direction);
                self.children[neighbor].set_size(SizeHint::Px(extent + removed_extent));
            }
            if self.children.len() > 2 && idx == 0 {
                // The new first child must not carry a resize handle.
                self.children[1].set_resize(None);
            }
        }
        self.children.remove(idx);
    }

    /// Swap a pane with its preceding sibling (drop on the leading edge of
    /// a split overlay). Resize handles stay attached to their positions.
    pub fn swap_with_previous(&mut self, id: WndId) -> bool {
        if let Some(idx) = self.child_index(NodeRef::Wnd(id)) {
            if idx == 0 {
                return false;
            }
            let prev_resize = self.children[idx - 1].resize();
            let this_resize = self.children[idx].resize();
            self.children[idx - 1].set_resize(this_resize);
            self.children[idx].set_resize(prev_resize);
            self.children.swap(idx - 1, idx);
            return true;
        }
        self.children
            .iter_mut()
            .filter_map(LayoutChild::as_layout_mut)
            .any(|l| l.swap_with_previous(id))
    }

    // ------------------------------------------------------------------
    // Interactive resize
    // ------------------------------------------------------------------

    /// Drag the resize handle preceding `node` by `delta` pixels along the
    /// run, freezing both neighbors to explicit sizes. Refused when either
    /// side would shrink under `min_size`.
    pub fn drag_resize(&mut self, node: NodeRef, delta: f32, min_size: f32) -> bool {
        if let Some(idx) = self.child_index(node) {
            if idx == 0 || self.children[idx].resize().is_none() {
                return false;
            }
            let direction = self.direction;
            let prev_extent = self.children[idx - 1].bounds().extent(direction);
            let next_extent = self.children[idx].bounds().extent(direction);
            let prev_now = prev_extent + delta;
            let next_now = next_extent - delta;
            if prev_now < min_size || next_now < min_size {
                return false;
            }
            if !self.children[idx - 1].size().is_auto() {
                self.children[idx - 1].set_size(SizeHint::Px(prev_now));
            }
            if !self.children[idx].size().is_auto() {
                self.children[idx].set_size(SizeHint::Px(next_now));
            }
            return true;
        }
        self.children
            .iter_mut()
            .filter_map(LayoutChild::as_layout_mut)
            .any(|l| l.drag_resize(node, delta, min_size))
    }

    // ------------------------------------------------------------------
    // Bounds projection
    // ------------------------------------------------------------------

    /// Recompute pixel bounds for the whole subtree.
    ///
    /// Fixed-size children keep their pixel extent, the flex children share
    /// the remainder. Panes under a column run get a minimum-height floor
    /// so a freshly added pane is never zero-height before content loads.
    pub fn compute_bounds(&mut self, rect: Rect, min_pane_height: f32) {
        self.bounds = rect;
        if self.children.is_empty() {
            return;
        }
        let direction = self.direction;
        let total = rect.extent(direction);

        let mut fixed_sum = 0.0;
        let mut flex_count = 0usize;
        for child in &self.children {
            if child.hidden() {
                continue;
            }
            match child.size() {
                SizeHint::Px(px) => fixed_sum += self.clamp_child_extent(child, px, min_pane_height),
                SizeHint::Auto => flex_count += 1,
            }
        }
        let flex_each = if flex_count > 0 {
            ((total - fixed_sum).max(0.0)) / flex_count as f32
        } else {
            0.0
        };

        let mut offset = 0.0;
        for child in &mut self.children {
            if child.hidden() {
                let rect = match direction {
                    SplitDirection::Lr => Rect::new(rect.x + offset, rect.y, 0.0, rect.height),
                    SplitDirection::Tb => Rect::new(rect.x, rect.y + offset, rect.width, 0.0),
                };
                Self::assign_bounds(child, rect, min_pane_height);
                continue;
            }
            let mut extent = match child.size() {
                SizeHint::Px(px) => px,
                SizeHint::Auto => flex_each,
            };
            if direction == SplitDirection::Tb && child.as_wnd().is_some() {
                extent = extent.max(min_pane_height);
            }
            let child_rect = match direction {
                SplitDirection::Lr => Rect::new(rect.x + offset, rect.y, extent, rect.height),
                SplitDirection::Tb => Rect::new(rect.x, rect.y + offset, rect.width, extent),
            };
            Self::assign_bounds(child, child_rect, min_pane_height);
            offset += extent;
        }
    }

    fn clamp_child_extent(&self, child: &LayoutChild, px: f32, min_pane_height: f32) -> f32 {
        if self.direction == SplitDirection::Tb && child.as_wnd().is_some() {
            px.max(min_pane_height)
        } else {
            px
        }
    }

    fn assign_bounds(child: &mut LayoutChild, rect: Rect, min_pane_height: f32) {
        match child {
            LayoutChild::Wnd(w) => w.bounds = rect,
            LayoutChild::Layout(l) => l.compute_bounds(rect, min_pane_height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::wnd::ActivationClock;

    fn center_with_wnd() -> (Layout, WndId) {
        let mut center = Layout::new(
            SplitDirection::Lr,
            LayoutKind::Center,
            SizeHint::Auto,
            None,
        );
        let wnd = Wnd::new(None);
        let id = wnd.id;
        center.add_wnd(wnd, None);
        (center, id)
    }

    fn add_tabs(layout: &mut Layout, wnd: WndId, titles: &[&str], clock: &mut ActivationClock) {
        let wnd = layout.find_wnd_mut(wnd).unwrap();
        for title in titles {
            wnd.add_tab(Tab::stub(title), false, false, usize::MAX, clock);
        }
    }

    #[test]
    fn split_same_direction_inserts_sibling() {
        let mut clock = ActivationClock::new();
        let (mut center, w1) = center_with_wnd();
        add_tabs(&mut center, w1, &["a", "b"], &mut clock);

        // The parent already runs left-to-right after the first flip.
        center.direction = SplitDirection::Lr;
        let w2 = center.split_wnd(w1, SplitDirection::Lr).unwrap();
        assert_eq!(center.children().len(), 2);
        assert_eq!(center.children()[0].node_ref(), NodeRef::Wnd(w1));
        assert_eq!(center.children()[1].node_ref(), NodeRef::Wnd(w2));
        // Original tabs stay put; the new pane is empty.
        assert_eq!(center.find_wnd(w1).unwrap().children().len(), 2);
        assert!(center.find_wnd(w2).unwrap().is_empty());
        assert_eq!(
            center.find_wnd(w2).unwrap().resize,
            Some(SplitDirection::Lr)
        );
    }

    #[test]
    fn split_single_child_flips_direction() {
        let mut clock = ActivationClock::new();
        let (mut center, w1) = center_with_wnd();
        add_tabs(&mut center, w1, &["a"], &mut clock);
        center.direction = SplitDirection::Tb;

        center.split_wnd(w1, SplitDirection::Lr).unwrap();
        assert_eq!(center.direction, SplitDirection::Lr);
        assert_eq!(center.children().len(), 2);
    }

    #[test]
    fn split_cross_direction_splices_intermediate_layout() {
        let mut clock = ActivationClock::new();
        let (mut center, w1) = center_with_wnd();
        add_tabs(&mut center, w1, &["a"], &mut clock);
        center.direction = SplitDirection::Lr;
        let w2 = center.split_wnd(w1, SplitDirection::Lr).unwrap();
        add_tabs(&mut center, w2, &["b"], &mut clock);

        // Give the target pane an explicit width that must carry over.
        center.find_wnd_mut(w2).unwrap().size = SizeHint::Px(300.0);

        let w3 = center.split_wnd(w2, SplitDirection::Tb).unwrap();
        assert_eq!(center.children().len(), 2);
        let mid = center.children()[1].as_layout().expect("spliced layout");
        assert_eq!(mid.direction, SplitDirection::Tb);
        assert_eq!(mid.size, SizeHint::Px(300.0));
        assert_eq!(mid.children().len(), 2);
        assert_eq!(mid.children()[0].node_ref(), NodeRef::Wnd(w2));
        assert_eq!(mid.children()[1].node_ref(), NodeRef::Wnd(w3));
        // The re-parented pane gave up its handle and explicit size.
        assert_eq!(mid.children()[0].resize(), None);
        assert!(mid.children()[0].size().is_auto());
    }

    #[test]
    fn split_refused_on_lone_placeholder() {
        let mut clock = ActivationClock::new();
        let (mut center, w1) = center_with_wnd();
        center
            .find_wnd_mut(w1)
            .unwrap()
            .add_tab(Tab::empty_center(), false, true, usize::MAX, &mut clock);

        assert_eq!(center.split_wnd(w1, SplitDirection::Lr), Some(w1));
        assert_eq!(center.children().len(), 1);
    }

    #[test]
    fn remove_wnd_compacts_chain_but_not_center() {
        let mut clock = ActivationClock::new();
        let (mut center, w1) = center_with_wnd();
        add_tabs(&mut center, w1, &["a"], &mut clock);
        center.direction = SplitDirection::Lr;
        let w2 = center.split_wnd(w1, SplitDirection::Lr).unwrap();
        add_tabs(&mut center, w2, &["b"], &mut clock);
        let w3 = center.split_wnd(w2, SplitDirection::Tb).unwrap();

        // Removing w3 collapses the intermediate layout back into center.
        assert!(center.remove_wnd(w3));
        assert!(center.remove_wnd(w2));
        assert_eq!(center.children().len(), 1);
        assert_eq!(center.children()[0].node_ref(), NodeRef::Wnd(w1));

        // The last pane leaves the center itself standing, empty.
        assert!(center.remove_wnd(w1));
        assert!(center.children().is_empty());
        assert_eq!(center.kind, LayoutKind::Center);
    }

    #[test]
    fn remove_child_redistributes_size() {
        let mut center = Layout::new(
            SplitDirection::Lr,
            LayoutKind::Center,
            SizeHint::Auto,
            None,
        );
        let mut a = Wnd::new(None);
        a.size = SizeHint::Px(200.0);
        let mut b = Wnd::new(Some(SplitDirection::Lr));
        b.size = SizeHint::Px(300.0);
        let mut c = Wnd::new(Some(SplitDirection::Lr));
        c.size = SizeHint::Auto;
        let (ida, idb) = (a.id, b.id);
        center.add_wnd(a, None);
        center.add_wnd(b, None);
        center.add_wnd(c, None);
        center.compute_bounds(Rect::new(0.0, 0.0, 1000.0, 500.0), 64.0);

        // Removing b: its 300px goes to its fixed-size neighbor a.
        assert!(center.remove_wnd(idb));
        assert_eq!(
            center.find_wnd(ida).map(|w| w.size),
            Some(SizeHint::Px(500.0))
        );
    }

    #[test]
    fn remove_first_child_clears_next_handle() {
        let mut center = Layout::new(
            SplitDirection::Lr,
            LayoutKind::Center,
            SizeHint::Auto,
            None,
        );
        let a = Wnd::new(None);
        let b = Wnd::new(Some(SplitDirection::Lr));
        let c = Wnd::new(Some(SplitDirection::Lr));
        let (ida, idb) = (a.id, b.id);
        center.add_wnd(a, None);
        center.add_wnd(b, None);
        center.add_wnd(c, None);

        assert!(center.remove_wnd(ida));
        assert_eq!(center.find_wnd(idb).unwrap().resize, None);
    }

    #[test]
    fn two_child_survivor_fills_run() {
        let mut center = Layout::new(
            SplitDirection::Lr,
            LayoutKind::Center,
            SizeHint::Auto,
            None,
        );
        let mut a = Wnd::new(None);
        a.size = SizeHint::Px(400.0);
        let b = Wnd::new(Some(SplitDirection::Lr));
        let (ida, idb) = (a.id, b.id);
        center.add_wnd(a, None);
        center.add_wnd(b, None);

        assert!(center.remove_wnd(idb));
        let survivor = center.find_wnd(ida).unwrap();
        assert!(survivor.size.is_auto());
        assert_eq!(survivor.resize, None);
    }

    #[test]
    fn bounds_distribute_fixed_and_flex() {
        let mut center = Layout::new(
            SplitDirection::Lr,
            LayoutKind::Center,
            SizeHint::Auto,
            None,
        );
        let mut a = Wnd::new(None);
        a.size = SizeHint::Px(300.0);
        let b = Wnd::new(Some(SplitDirection::Lr));
        let (ida, idb) = (a.id, b.id);
        center.add_wnd(a, None);
        center.add_wnd(b, None);

        center.compute_bounds(Rect::new(0.0, 0.0, 1000.0, 600.0), 64.0);
        assert_eq!(center.find_wnd(ida).unwrap().bounds.width, 300.0);
        let b_bounds = center.find_wnd(idb).unwrap().bounds;
        assert_eq!(b_bounds.x, 300.0);
        assert_eq!(b_bounds.width, 700.0);
    }

    #[test]
    fn column_panes_get_min_height_floor() {
        let mut column = Layout::new(
            SplitDirection::Tb,
            LayoutKind::Normal,
            SizeHint::Auto,
            None,
        );
        let mut a = Wnd::new(None);
        a.size = SizeHint::Px(10.0);
        let b = Wnd::new(Some(SplitDirection::Tb));
        let ida = a.id;
        column.add_wnd(a, None);
        column.add_wnd(b, None);

        column.compute_bounds(Rect::new(0.0, 0.0, 800.0, 600.0), 64.0);
        assert_eq!(column.find_wnd(ida).unwrap().bounds.height, 64.0);
    }

    #[test]
    fn swap_with_previous_swaps_positions_not_handles() {
        let mut center = Layout::new(
            SplitDirection::Lr,
            LayoutKind::Center,
            SizeHint::Auto,
            None,
        );
        let a = Wnd::new(None);
        let b = Wnd::new(Some(SplitDirection::Lr));
        let (ida, idb) = (a.id, b.id);
        center.add_wnd(a, None);
        center.add_wnd(b, None);

        assert!(center.swap_with_previous(idb));
        assert_eq!(center.children()[0].node_ref(), NodeRef::Wnd(idb));
        // The first position still has no handle.
        assert_eq!(center.children()[0].resize(), None);
        assert_eq!(center.children()[1].resize(), Some(SplitDirection::Lr));
        assert_eq!(center.children()[1].node_ref(), NodeRef::Wnd(ida));
    }

    #[test]
    fn drag_resize_respects_minimum() {
        let mut center = Layout::new(
            SplitDirection::Lr,
            LayoutKind::Center,
            SizeHint::Auto,
            None,
        );
        let mut a = Wnd::new(None);
        a.size = SizeHint::Px(300.0);
        let mut b = Wnd::new(Some(SplitDirection::Lr));
        b.size = SizeHint::Px(700.0);
        let (ida, idb) = (a.id, b.id);
        center.add_wnd(a, None);
        center.add_wnd(b, None);
        center.compute_bounds(Rect::new(0.0, 0.0, 1000.0, 600.0), 64.0);

        assert!(center.drag_resize(NodeRef::Wnd(idb), 100.0, 8.0));
        assert_eq!(center.find_wnd(ida).unwrap().size, SizeHint::Px(400.0));
        assert_eq!(center.find_wnd(idb).unwrap().size, SizeHint::Px(600.0));

        // Shrinking the right pane under the floor is refused outright.
        center.compute_bounds(Rect::new(0.0, 0.0, 1000.0, 600.0), 64.0);
        assert!(!center.drag_resize(NodeRef::Wnd(idb), 650.0, 8.0));
    }

    #[test]
    fn most_recent_wnd_tracks_focus_stamps() {
        let mut clock = ActivationClock::new();
        let (mut center, w1) = center_with_wnd();
        add_tabs(&mut center, w1, &["a"], &mut clock);
        center.direction = SplitDirection::Lr;
        let w2 = center.split_wnd(w1, SplitDirection::Lr).unwrap();
        add_tabs(&mut center, w2, &["b"], &mut clock);
        assert_eq!(center.most_recent_wnd(), Some(w2));

        let a = center.find_wnd(w1).unwrap().children()[0].id;
        center
            .find_wnd_mut(w1)
            .unwrap()
            .switch_tab(a, &mut clock)
            .unwrap();
        assert_eq!(center.most_recent_wnd(), Some(w1));
    }
}

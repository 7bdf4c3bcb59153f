//! Tabs: one content slot per open document or panel.

use crate::layout::model::{Model, PanelPayload};
use notewell_config::TabId;
use std::fmt;

/// Deferred model construction, invoked once the tab is actually inserted
/// into a pane so the model never reads layout geometry before attachment.
pub type TabCallback = Box<dyn FnOnce(&mut Tab) + Send>;

/// Construction options for [`Tab::new`].
#[derive(Default)]
pub struct TabOptions {
    /// Header label. Tabs without a title are headless (no header): the
    /// transient empty-center placeholder and dock panel slots.
    pub title: Option<String>,
    /// Built-in icon name.
    pub icon: Option<String>,
    /// Per-document emoji icon.
    pub doc_icon: Option<String>,
    pub callback: Option<TabCallback>,
}

/// One content slot inside a pane.
///
/// Holds at most one model. Closing a tab routes through the owning pane's
/// removal path, which tears the model down before detaching.
pub struct Tab {
    pub id: TabId,
    title: Option<String>,
    pub icon: Option<String>,
    pub doc_icon: Option<String>,
    pub pinned: bool,
    pub active: bool,
    /// Monotonic stamp of the last activation; drives recency-based
    /// eviction and successor selection.
    pub active_seq: u64,
    /// Resolved full-path tooltip; once set, hover lookups stop.
    pub tooltip_label: Option<String>,
    pub model: Option<Model>,
    /// Serialized panel payload for tabs whose model construction is
    /// deferred until first activation (background opens, reloads of
    /// editor/plugin tabs).
    pub init_data: Option<PanelPayload>,
    pub(crate) callback: Option<TabCallback>,
}

impl Tab {
    pub fn new(options: TabOptions) -> Self {
        Self {
            id: TabId::new(),
            title: options.title,
            icon: options.icon,
            doc_icon: options.doc_icon,
            pinned: false,
            active: false,
            active_seq: 0,
            tooltip_label: None,
            model: None,
            init_data: None,
            callback: options.callback,
        }
    }

    /// The headless empty-state tab synthesized when the center region
    /// would otherwise have no tabs at all.
    pub fn empty_center() -> Self {
        Self::new(TabOptions::default())
    }

    /// Whether this tab has a visible, draggable header.
    pub fn has_header(&self) -> bool {
        self.title.is_some()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn update_title(&mut self, title: impl Into<String>) {
        if self.title.is_some() {
            self.title = Some(title.into());
        }
    }

    pub fn set_doc_icon(&mut self, icon: Option<String>) {
        self.doc_icon = icon;
    }

    /// Pinned tabs with an icon collapse their title text to save header
    /// width.
    pub fn title_collapsed(&self) -> bool {
        self.pinned && (self.icon.is_some() || self.doc_icon.is_some())
    }

    /// Attach the model, wiring the back-reference side of the pair.
    pub fn add_model(&mut self, model: Model) {
        self.model = Some(model);
    }

    /// Document id whose full path should be resolved for the hover
    /// tooltip. `None` once a label is already set (the lookup is fired at
    /// most once per resolution) or when the tab hosts no document.
    pub fn tooltip_request(&self) -> Option<&str> {
        if self.tooltip_label.is_some() {
            return None;
        }
        match (&self.model, &self.init_data) {
            (Some(model), _) => match model.payload() {
                PanelPayload::Editor(editor) => {
                    Some(editor.root_id.as_deref().unwrap_or(&editor.block_id))
                }
                _ => None,
            },
            (None, Some(PanelPayload::Editor(editor))) => {
                Some(editor.root_id.as_deref().unwrap_or(&editor.block_id))
            }
            _ => None,
        }
    }

    /// Whether tab removal must be refused right now (content mid-upload).
    pub fn removal_blocked(&self) -> bool {
        self.model.as_ref().is_some_and(Model::is_uploading)
    }

    pub(crate) fn take_callback(&mut self) -> Option<TabCallback> {
        self.callback.take()
    }
}

#[cfg(test)]
impl Tab {
    /// Minimal titled tab for tests.
    pub(crate) fn stub(title: &str) -> Self {
        Self::new(TabOptions {
            title: Some(title.to_string()),
            ..TabOptions::default()
        })
    }
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id.to_string())
            .field("title", &self.title)
            .field("pinned", &self.pinned)
            .field("active", &self.active)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::model::{EditorMode, EditorPayload};

    fn titled(title: &str) -> Tab {
        Tab::stub(title)
    }

    #[test]
    fn headless_tab_has_no_header() {
        let tab = Tab::empty_center();
        assert!(!tab.has_header());
        assert!(tab.title().is_none());
    }

    #[test]
    fn update_title_is_noop_for_headless() {
        let mut tab = Tab::empty_center();
        tab.update_title("ghost");
        assert!(tab.title().is_none());

        let mut tab = titled("doc");
        tab.update_title("renamed");
        assert_eq!(tab.title(), Some("renamed"));
    }

    #[test]
    fn title_collapses_only_when_pinned_with_icon() {
        let mut tab = titled("doc");
        tab.icon = Some("iconFile".to_string());
        assert!(!tab.title_collapsed());
        tab.pinned = true;
        assert!(tab.title_collapsed());
        tab.icon = None;
        assert!(!tab.title_collapsed());
    }

    #[test]
    fn tooltip_request_fires_once() {
        let mut tab = titled("doc");
        tab.init_data = Some(PanelPayload::Editor(EditorPayload {
            notebook_id: None,
            block_id: "block-1".to_string(),
            root_id: Some("root-1".to_string()),
            mode: EditorMode::Wysiwyg,
            action: Vec::new(),
        }));
        assert_eq!(tab.tooltip_request(), Some("root-1"));
        tab.tooltip_label = Some("/notebook/path".to_string());
        assert_eq!(tab.tooltip_request(), None);
    }

    #[test]
    fn callback_runs_once() {
        let mut tab = Tab::new(TabOptions {
            title: Some("doc".to_string()),
            callback: Some(Box::new(|tab: &mut Tab| {
                tab.tooltip_label = Some("ran".to_string());
            })),
            ..TabOptions::default()
        });
        let callback = tab.take_callback().unwrap();
        callback(&mut tab);
        assert_eq!(tab.tooltip_label.as_deref(), Some("ran"));
        assert!(tab.take_callback().is_none());
    }
}

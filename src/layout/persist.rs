//! Layout persistence: the live pane tree round-trips through an
//! `instance`-tagged JSON document.
//!
//! The document shape is shared with the cross-window tab transfer path: a
//! single tab subtree serialized here can be handed to a new top-level
//! window and rebuilt there. Dock state is persisted separately as up to
//! two button groups per edge; dock-region layouts save canonical empty
//! pane pairs, with the dock records as the authority on reload.

use crate::layout::model::{Model, PanelPayload};
use crate::layout::tab::{Tab, TabOptions};
use crate::layout::wnd::{ActivationClock, Wnd};
use crate::layout::{Layout, LayoutChild};
use anyhow::{Context, Result, bail};
use notewell_config::{LayoutKind, PanelType, SizeHint, SplitDirection, TabId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One node of the persisted layout document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "instance")]
pub enum NodeJson {
    Layout {
        #[serde(default)]
        direction: SplitDirection,
        #[serde(default)]
        size: SizeHint,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resize: Option<SplitDirection>,
        #[serde(rename = "type", default)]
        kind: LayoutKind,
        #[serde(default)]
        children: Vec<NodeJson>,
    },
    Wnd {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resize: Option<SplitDirection>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<SizeHint>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<SizeHint>,
        #[serde(default)]
        children: Vec<NodeJson>,
    },
    Tab {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        #[serde(rename = "docIcon", default, skip_serializing_if = "Option::is_none")]
        doc_icon: Option<String>,
        /// Language id for locale-aware relabeling of built-in panels.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
        #[serde(default)]
        pin: bool,
        #[serde(default)]
        active: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        children: Option<Box<NodeJson>>,
    },
    /// Panel payloads carry their own `instance` tag.
    #[serde(untagged)]
    Panel(PanelPayload),
}

/// Remembered size of a dock panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DockSizeJson {
    pub width: f32,
    pub height: f32,
}

/// One dock bar button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockEntryJson {
    #[serde(rename = "type")]
    pub panel: PanelType,
    pub size: DockSizeJson,
    pub show: bool,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "hotkeyLangId", default, skip_serializing_if = "String::is_empty")]
    pub hotkey_lang_id: String,
}

/// Persisted state of one dock edge: the pin flag plus up to two button
/// groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockStateJson {
    pub pin: bool,
    pub data: Vec<Vec<DockEntryJson>>,
}

impl Default for DockStateJson {
    fn default() -> Self {
        Self {
            pin: true,
            data: Vec::new(),
        }
    }
}

/// The whole persisted workbench layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiLayoutJson {
    #[serde(rename = "hideDock", default)]
    pub hide_dock: bool,
    pub layout: NodeJson,
    #[serde(default)]
    pub left: DockStateJson,
    #[serde(default)]
    pub right: DockStateJson,
    #[serde(default)]
    pub top: DockStateJson,
    #[serde(default)]
    pub bottom: DockStateJson,
}

// ----------------------------------------------------------------------
// Live tree -> document
// ----------------------------------------------------------------------

/// Serialize a layout subtree.
pub fn layout_to_json(layout: &Layout) -> NodeJson {
    layout_node(layout)
}

fn layout_node(layout: &Layout) -> NodeJson {
    let children = if layout.kind.is_dock_region() {
        // Dock regions reset to a canonical empty pane pair; the dock
        // records rebuild their content on reload.
        let second_resize = match layout.kind {
            LayoutKind::Top | LayoutKind::Bottom => SplitDirection::Lr,
            _ => SplitDirection::Tb,
        };
        vec![
            NodeJson::Wnd {
                resize: None,
                width: None,
                height: None,
                children: Vec::new(),
            },
            NodeJson::Wnd {
                resize: Some(second_resize),
                width: None,
                height: None,
                children: Vec::new(),
            },
        ]
    } else {
        layout
            .children()
            .iter()
            .map(|child| match child {
                LayoutChild::Layout(l) => layout_node(l),
                LayoutChild::Wnd(w) => wnd_node(w, layout.direction),
            })
            .collect()
    };
    NodeJson::Layout {
        direction: layout.direction,
        size: layout.size,
        resize: layout.resize,
        kind: layout.kind,
        children,
    }
}

fn wnd_node(wnd: &Wnd, parent_direction: SplitDirection) -> NodeJson {
    let (width, height) = match (parent_direction, wnd.size) {
        (_, SizeHint::Auto) => (None, None),
        (SplitDirection::Lr, px) => (Some(px), None),
        (SplitDirection::Tb, px) => (None, Some(px)),
    };
    NodeJson::Wnd {
        resize: wnd.resize,
        width,
        height,
        children: wnd.children().iter().map(tab_to_json).collect(),
    }
}

/// Serialize a single tab subtree (drag payloads, cross-window transfer).
pub fn tab_to_json(tab: &Tab) -> NodeJson {
    let children = tab
        .model
        .as_ref()
        .map(|m| m.payload().clone())
        .or_else(|| tab.init_data.clone())
        .map(|payload| Box::new(NodeJson::Panel(payload)));
    let lang = tab
        .model
        .as_ref()
        .map(|m| m.payload())
        .or(tab.init_data.as_ref())
        .and_then(PanelPayload::lang_id)
        .map(str::to_string);
    NodeJson::Tab {
        title: tab.title().map(str::to_string),
        icon: tab.icon.clone(),
        doc_icon: tab.doc_icon.clone(),
        lang,
        pin: tab.pinned,
        active: tab.active,
        children,
    }
}

// ----------------------------------------------------------------------
// Document -> live tree
// ----------------------------------------------------------------------

/// A reconstructed tree plus the tabs recorded as active, to be switched
/// to once the whole tree stands.
pub struct RestoredTree {
    pub root: Layout,
    pub activate: Vec<TabId>,
}

/// Rebuild a layout subtree from its document form.
pub fn layout_from_json(node: &NodeJson, clock: &mut ActivationClock) -> Result<RestoredTree> {
    let mut activate = Vec::new();
    let root = build_layout(node, clock, &mut activate)?;
    Ok(RestoredTree { root, activate })
}

fn build_layout(
    node: &NodeJson,
    clock: &mut ActivationClock,
    activate: &mut Vec<TabId>,
) -> Result<Layout> {
    let NodeJson::Layout {
        direction,
        size,
        resize,
        kind,
        children,
    } = node
    else {
        bail!("expected a Layout node at the subtree root");
    };
    let mut layout = Layout::new(*direction, *kind, *size, *resize);
    for child in children {
        match child {
            NodeJson::Layout { .. } => {
                layout.add_layout(build_layout(child, clock, activate)?, None);
            }
            NodeJson::Wnd { .. } => {
                layout.add_wnd(build_wnd(child, clock, activate), None);
            }
            other => {
                log::warn!("Skipping misplaced layout child: {other:?}");
            }
        }
    }
    Ok(layout)
}

fn build_wnd(node: &NodeJson, clock: &mut ActivationClock, activate: &mut Vec<TabId>) -> Wnd {
    let NodeJson::Wnd {
        resize,
        width,
        height,
        children,
    } = node
    else {
        unreachable!("caller matched a Wnd node");
    };
    let mut wnd = Wnd::new(*resize);
    wnd.size = (*width).or(*height).unwrap_or(SizeHint::Auto);
    for child in children {
        match tab_from_json(child) {
            Some((tab, active)) => {
                let id = tab.id;
                wnd.add_tab(tab, false, false, usize::MAX, clock);
                if active {
                    activate.push(id);
                }
            }
            None => log::warn!("Skipping misplaced pane child"),
        }
    }
    wnd
}

/// Rebuild a single tab, returning whether it was recorded as active.
pub fn tab_from_json(node: &NodeJson) -> Option<(Tab, bool)> {
    let NodeJson::Tab {
        title,
        icon,
        doc_icon,
        lang: _,
        pin,
        active,
        children,
    } = node
    else {
        return None;
    };
    let mut tab = if title.is_none() {
        Tab::empty_center()
    } else {
        Tab::new(TabOptions {
            title: title.clone(),
            icon: icon.clone(),
            doc_icon: doc_icon.clone(),
            callback: None,
        })
    };
    tab.pinned = *pin;
    if let Some(child) = children.as_deref() {
        match child {
            NodeJson::Panel(payload) => {
                if payload.is_deferred() {
                    // Built on first activation.
                    tab.init_data = Some(payload.clone());
                } else {
                    tab.add_model(Model::from_payload(payload.clone()));
                }
            }
            other => log::warn!("Skipping misplaced tab child: {other:?}"),
        }
    }
    Some((tab, *active))
}

// ----------------------------------------------------------------------
// Storage
// ----------------------------------------------------------------------

/// File-backed store for the layout document, standing in for the
/// kernel-side "get/set UI layout" endpoint.
pub struct LayoutStore {
    path: PathBuf,
}

impl LayoutStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default store path (`~/.config/notewell/layout.json`).
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notewell")
            .join("layout.json")
    }

    /// Load the persisted document. A missing or empty file is a fresh
    /// start, not an error.
    pub fn load(&self) -> Result<Option<UiLayoutJson>> {
        if !self.path.exists() {
            log::info!("No layout document at {:?}", self.path);
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read layout document {:?}", self.path))?;
        if contents.trim().is_empty() {
            return Ok(None);
        }
        let doc = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse layout document {:?}", self.path))?;
        Ok(Some(doc))
    }

    /// Write the document, creating parent directories as needed.
    pub fn save(&self, doc: &UiLayoutJson) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {parent:?}"))?;
        }
        let contents = serde_json::to_string(doc).context("Failed to serialize layout")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write layout document {:?}", self.path))?;
        log::info!("Saved layout to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::model::{
        EditorMode, EditorPayload, FilesPayload, OutlinePayload, PanelScope,
    };
    use notewell_config::Rect;
    use tempfile::tempdir;

    fn sample_tree(clock: &mut ActivationClock) -> Layout {
        let mut center = Layout::new(
            SplitDirection::Lr,
            LayoutKind::Center,
            SizeHint::Auto,
            None,
        );
        let mut left = Wnd::new(None);
        let mut doc = Tab::stub("Meeting notes");
        doc.init_data = Some(PanelPayload::Editor(EditorPayload {
            notebook_id: Some("box-1".to_string()),
            block_id: "block-1".to_string(),
            root_id: Some("root-1".to_string()),
            mode: EditorMode::Wysiwyg,
            action: Vec::new(),
        }));
        left.add_tab(doc, false, false, usize::MAX, clock);
        let mut outline = Tab::stub("Outline");
        outline.add_model(Model::from_payload(PanelPayload::Outline(OutlinePayload {
            block_id: Some("root-1".to_string()),
            scope: PanelScope::Pin,
            is_preview: false,
        })));
        left.add_tab(outline, true, false, usize::MAX, clock);
        let pinned_id = left.children()[0].id;
        left.pin_tab(pinned_id);

        let mut right = Wnd::new(Some(SplitDirection::Lr));
        right.size = SizeHint::Px(420.0);
        let mut files = Tab::stub("Files");
        files.add_model(Model::from_payload(PanelPayload::Files(FilesPayload::default())));
        right.add_tab(files, false, false, usize::MAX, clock);

        center.add_wnd(left, None);
        center.add_wnd(right, None);
        center.compute_bounds(Rect::new(0.0, 0.0, 1200.0, 800.0), 64.0);
        center
    }

    /// Shape equality: node kinds, nesting, directions, tab titles, pins
    /// and active flags, panel assignments. Ids and live objects differ by
    /// construction.
    fn assert_same_shape(a: &Layout, b: &Layout) {
        assert_eq!(a.direction, b.direction);
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.size, b.size);
        assert_eq!(a.children().len(), b.children().len());
        for (ca, cb) in a.children().iter().zip(b.children()) {
            match (ca, cb) {
                (LayoutChild::Layout(la), LayoutChild::Layout(lb)) => assert_same_shape(la, lb),
                (LayoutChild::Wnd(wa), LayoutChild::Wnd(wb)) => {
                    assert_eq!(wa.resize, wb.resize);
                    assert_eq!(wa.size, wb.size);
                    assert_eq!(wa.children().len(), wb.children().len());
                    for (ta, tb) in wa.children().iter().zip(wb.children()) {
                        assert_eq!(ta.title(), tb.title());
                        assert_eq!(ta.pinned, tb.pinned);
                        let pa = ta
                            .model
                            .as_ref()
                            .map(|m| m.payload().clone())
                            .or_else(|| ta.init_data.clone());
                        let pb = tb
                            .model
                            .as_ref()
                            .map(|m| m.payload().clone())
                            .or_else(|| tb.init_data.clone());
                        assert_eq!(pa, pb);
                    }
                }
                _ => panic!("child kinds diverged"),
            }
        }
    }

    #[test]
    fn round_trip_preserves_shape() {
        let mut clock = ActivationClock::new();
        let tree = sample_tree(&mut clock);
        let json = layout_to_json(&tree);
        let text = serde_json::to_string(&json).unwrap();
        let parsed: NodeJson = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, json);

        let restored = layout_from_json(&parsed, &mut clock).unwrap();
        assert_same_shape(&tree, &restored.root);
    }

    #[test]
    fn round_trip_restores_active_tabs() {
        let mut clock = ActivationClock::new();
        let tree = sample_tree(&mut clock);
        let active_titles: Vec<String> = {
            let mut titles = Vec::new();
            tree.for_each_wnd(&mut |w| {
                if let Some(t) = w.active_tab() {
                    titles.push(t.title().unwrap_or_default().to_string());
                }
            });
            titles
        };

        let json = layout_to_json(&tree);
        let restored = layout_from_json(&json, &mut clock).unwrap();
        let restored_titles: Vec<String> = restored
            .activate
            .iter()
            .map(|id| {
                restored
                    .root
                    .find_tab(*id)
                    .and_then(|t| t.title())
                    .unwrap_or_default()
                    .to_string()
            })
            .collect();
        assert_eq!(restored_titles, active_titles);
    }

    #[test]
    fn node_wire_format_uses_instance_tags() {
        let mut clock = ActivationClock::new();
        let tree = sample_tree(&mut clock);
        let value = serde_json::to_value(layout_to_json(&tree)).unwrap();
        assert_eq!(value["instance"], "Layout");
        assert_eq!(value["type"], "center");
        assert_eq!(value["children"][0]["instance"], "Wnd");
        assert_eq!(value["children"][0]["children"][0]["instance"], "Tab");
        assert_eq!(
            value["children"][0]["children"][0]["children"]["instance"],
            "Editor"
        );
        assert_eq!(value["children"][1]["width"], "420px");
    }

    #[test]
    fn deferred_payloads_stay_deferred_across_reload() {
        let mut clock = ActivationClock::new();
        let tree = sample_tree(&mut clock);
        let json = layout_to_json(&tree);
        let restored = layout_from_json(&json, &mut clock).unwrap();

        let mut editor_tab_deferred = None;
        restored.root.for_each_wnd(&mut |w| {
            for tab in w.children() {
                if tab.title() == Some("Meeting notes") {
                    editor_tab_deferred = Some(tab.init_data.is_some() && tab.model.is_none());
                }
            }
        });
        assert_eq!(editor_tab_deferred, Some(true));
    }

    #[test]
    fn dock_region_saves_canonical_empty_panes() {
        let mut region = Layout::new(
            SplitDirection::Tb,
            LayoutKind::Left,
            SizeHint::Px(260.0),
            None,
        );
        let mut wnd = Wnd::new(None);
        let mut clock = ActivationClock::new();
        wnd.add_tab(Tab::empty_center(), false, false, usize::MAX, &mut clock);
        region.add_wnd(wnd, None);
        region.add_wnd(Wnd::new(Some(SplitDirection::Tb)), None);

        let NodeJson::Layout { children, .. } = layout_to_json(&region) else {
            panic!("layout node expected");
        };
        assert_eq!(children.len(), 2);
        for child in &children {
            let NodeJson::Wnd { children, .. } = child else {
                panic!("wnd node expected");
            };
            assert!(children.is_empty());
        }
    }

    #[test]
    fn headless_tab_round_trips_without_title() {
        let tab = Tab::empty_center();
        let json = tab_to_json(&tab);
        let (restored, active) = tab_from_json(&json).unwrap();
        assert!(!restored.has_header());
        assert!(!active);
    }

    #[test]
    fn store_round_trip() {
        let temp = tempdir().unwrap();
        let store = LayoutStore::new(temp.path().join("nested").join("layout.json"));
        assert!(store.load().unwrap().is_none());

        let mut clock = ActivationClock::new();
        let doc = UiLayoutJson {
            hide_dock: false,
            layout: layout_to_json(&sample_tree(&mut clock)),
            left: DockStateJson {
                pin: true,
                data: vec![vec![DockEntryJson {
                    panel: PanelType::File,
                    size: DockSizeJson {
                        width: 240.0,
                        height: 0.0,
                    },
                    show: true,
                    icon: "iconFiles".to_string(),
                    title: None,
                    hotkey_lang_id: "fileTree".to_string(),
                }]],
            },
            right: DockStateJson::default(),
            top: DockStateJson::default(),
            bottom: DockStateJson::default(),
        };
        store.save(&doc).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn store_rejects_corrupt_document() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("layout.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(LayoutStore::new(path).load().is_err());
    }
}

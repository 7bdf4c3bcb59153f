//! Panel content models.
//!
//! A `Model` is the behavior object attached to a tab: one per open
//! document or utility panel. Panel variants are a tagged payload enum
//! rather than a subclass hierarchy; lifecycle hooks (`teardown`,
//! `on_panel_shown`, `on_message`) dispatch on the payload kind.

use crate::push::{PushChannel, PushFrame};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::task::JoinHandle;

/// Scope of a dock-style panel: pinned to the focused document, bound to a
/// specific document, or global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PanelScope {
    #[default]
    Pin,
    Local,
    Global,
}

/// Editor display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    #[default]
    Wysiwyg,
    Preview,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook_id: Option<String>,
    pub block_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
    #[serde(default)]
    pub mode: EditorMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPayload {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
    #[serde(rename = "type", default)]
    pub scope: PanelScope,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlinePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(rename = "type", default)]
    pub scope: PanelScope,
    #[serde(default)]
    pub is_preview: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklinkPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
    #[serde(rename = "type", default)]
    pub scope: PanelScope,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BookmarkPayload {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TagPayload {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FilesPayload {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchPayload {
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub config: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPayload {
    #[serde(rename = "customModelType")]
    pub model_type: String,
    #[serde(rename = "customModelData", default)]
    pub data: serde_json::Value,
}

/// Panel content payload, tagged the way the persisted layout document tags
/// node instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "instance")]
pub enum PanelPayload {
    Editor(EditorPayload),
    Asset(AssetPayload),
    Graph(GraphPayload),
    Outline(OutlinePayload),
    Backlink(BacklinkPayload),
    Bookmark(BookmarkPayload),
    Tag(TagPayload),
    Files(FilesPayload),
    Search(SearchPayload),
    Custom(CustomPayload),
}

/// Bare panel kind, for dispatch and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Editor,
    Asset,
    Graph,
    Outline,
    Backlink,
    Bookmark,
    Tag,
    Files,
    Search,
    Custom,
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PanelKind::Editor => "editor",
            PanelKind::Asset => "asset",
            PanelKind::Graph => "graph",
            PanelKind::Outline => "outline",
            PanelKind::Backlink => "backlink",
            PanelKind::Bookmark => "bookmark",
            PanelKind::Tag => "tag",
            PanelKind::Files => "files",
            PanelKind::Search => "search",
            PanelKind::Custom => "custom",
        };
        f.write_str(name)
    }
}

impl PanelPayload {
    pub fn kind(&self) -> PanelKind {
        match self {
            PanelPayload::Editor(_) => PanelKind::Editor,
            PanelPayload::Asset(_) => PanelKind::Asset,
            PanelPayload::Graph(_) => PanelKind::Graph,
            PanelPayload::Outline(_) => PanelKind::Outline,
            PanelPayload::Backlink(_) => PanelKind::Backlink,
            PanelPayload::Bookmark(_) => PanelKind::Bookmark,
            PanelPayload::Tag(_) => PanelKind::Tag,
            PanelPayload::Files(_) => PanelKind::Files,
            PanelPayload::Search(_) => PanelKind::Search,
            PanelPayload::Custom(_) => PanelKind::Custom,
        }
    }

    /// Whether this payload's construction should be deferred until its tab
    /// is first activated (editors and plugin panels are expensive).
    pub fn is_deferred(&self) -> bool {
        matches!(self, PanelPayload::Editor(_) | PanelPayload::Custom(_))
    }

    /// Whether a model of this kind subscribes to the kernel push channel.
    pub fn takes_push_channel(&self) -> bool {
        !matches!(
            self,
            PanelPayload::Asset(_) | PanelPayload::Search(_) | PanelPayload::Custom(_)
        )
    }

    /// Language id recorded on serialized dock-style tabs so a reload can
    /// relabel them in the active locale.
    pub fn lang_id(&self) -> Option<&'static str> {
        match self {
            PanelPayload::Files(_) => Some("fileTree"),
            PanelPayload::Backlink(p) if p.scope == PanelScope::Pin => Some("backlinks"),
            PanelPayload::Bookmark(_) => Some("bookmark"),
            PanelPayload::Graph(p) if p.scope != PanelScope::Local => Some("graphView"),
            PanelPayload::Outline(p) if p.scope != PanelScope::Local => Some("outline"),
            PanelPayload::Tag(_) => Some("tag"),
            _ => None,
        }
    }
}

/// What a pushed frame asks the owning tab/pane to do.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ModelReaction {
    /// Retitle the owning tab.
    pub rename: Option<String>,
    /// The hosted document is gone; close the owning tab.
    pub close: bool,
    /// The panel content is stale and should refetch.
    pub refresh: bool,
}

impl ModelReaction {
    fn refresh() -> Self {
        Self {
            refresh: true,
            ..Self::default()
        }
    }

    fn close() -> Self {
        Self {
            close: true,
            ..Self::default()
        }
    }

    pub fn is_noop(&self) -> bool {
        self.rename.is_none() && !self.close && !self.refresh
    }
}

/// Panel content model, at most one per tab.
pub struct Model {
    payload: PanelPayload,
    channel: Option<PushChannel>,
    /// A maximized descendant (e.g. a fullscreen graph) blocks dock
    /// auto-hide while open.
    pub fullscreen: bool,
    /// Graph physics runs only while the panel is visible.
    simulation_running: bool,
    /// In-flight PDF loading task, cancelled on teardown.
    pdf_load: Option<JoinHandle<()>>,
    /// Ids of embedded sub-editors detached on teardown.
    embedded_editors: Vec<String>,
    /// Plugin-provided destroy hook.
    destroy_hook: Option<Box<dyn FnOnce() + Send>>,
    uploading: bool,
}

impl Model {
    pub fn from_payload(payload: PanelPayload) -> Self {
        Self {
            payload,
            channel: None,
            fullscreen: false,
            simulation_running: false,
            pdf_load: None,
            embedded_editors: Vec::new(),
            destroy_hook: None,
            uploading: false,
        }
    }

    pub fn kind(&self) -> PanelKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &PanelPayload {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut PanelPayload {
        &mut self.payload
    }

    /// Attach the push channel routing kernel events to this model. The
    /// subscriber id on the channel must be the one the kernel uses to
    /// address exactly this instance.
    pub fn attach_channel(&mut self, channel: PushChannel) {
        self.channel = Some(channel);
    }

    pub fn has_channel(&self) -> bool {
        self.channel.is_some()
    }

    pub fn set_destroy_hook(&mut self, hook: Box<dyn FnOnce() + Send>) {
        self.destroy_hook = Some(hook);
    }

    pub fn set_pdf_load(&mut self, task: JoinHandle<()>) {
        self.pdf_load = Some(task);
    }

    pub fn add_embedded_editor(&mut self, id: String) {
        self.embedded_editors.push(id);
    }

    pub fn set_uploading(&mut self, uploading: bool) {
        self.uploading = uploading;
    }

    /// Whether the hosted editor has an upload in flight. Closing the tab
    /// is refused while this holds.
    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn simulation_running(&self) -> bool {
        self.simulation_running
    }

    /// Fire-and-forget command over the push channel; a no-op for models
    /// without one (declared-but-not-instantiated dock placeholders).
    pub fn send(&self, cmd: &str, param: serde_json::Value, broadcast: bool) {
        if let Some(channel) = &self.channel {
            channel.send(cmd, param, broadcast);
        }
    }

    /// Hook run when the owning tab becomes visible.
    pub fn on_panel_shown(&mut self) {
        match self.payload {
            PanelPayload::Graph(_) => {
                // Physics only runs while visible.
                self.simulation_running = true;
            }
            PanelPayload::Asset(_) => {
                log::debug!("Asset viewer refocused");
            }
            _ => {}
        }
    }

    /// Hook run when the owning tab is hidden behind a sibling.
    pub fn on_panel_hidden(&mut self) {
        if matches!(self.payload, PanelPayload::Graph(_)) {
            self.simulation_running = false;
        }
    }

    /// Variant-specific teardown, run before the owning tab is dropped.
    ///
    /// Dropping the channel reference afterwards is what lets the socket
    /// close; a pending reconnect dies with it.
    pub fn teardown(&mut self) {
        match &self.payload {
            PanelPayload::Editor(_) => {
                self.embedded_editors.clear();
            }
            PanelPayload::Search(_) => {}
            other => {
                if let PanelPayload::Asset(_) = other {
                    if let Some(task) = self.pdf_load.take() {
                        task.abort();
                    }
                }
                if let Some(hook) = self.destroy_hook.take() {
                    hook();
                }
                self.send("closews", serde_json::json!({}), false);
            }
        }
        self.channel = None;
    }

    /// React to an inbound push frame. Each kind handles only the subset of
    /// commands relevant to it; everything else is ignored.
    pub fn on_message(&mut self, frame: &PushFrame) -> ModelReaction {
        match &self.payload {
            PanelPayload::Editor(editor) => Self::editor_reaction(editor, frame),
            PanelPayload::Outline(_) | PanelPayload::Backlink(_) => match frame.cmd.as_str() {
                "transactions" | "rename" | "savedoc" => ModelReaction::refresh(),
                _ => ModelReaction::default(),
            },
            PanelPayload::Bookmark(_) | PanelPayload::Tag(_) => match frame.cmd.as_str() {
                "transactions" | "savedoc" => ModelReaction::refresh(),
                _ => ModelReaction::default(),
            },
            PanelPayload::Graph(_) => match frame.cmd.as_str() {
                "transactions" | "mount" | "unmount" | "remove" => ModelReaction::refresh(),
                _ => ModelReaction::default(),
            },
            PanelPayload::Files(_) => match frame.cmd.as_str() {
                "mount" | "unmount" | "remove" | "removeDoc" | "rename" => {
                    ModelReaction::refresh()
                }
                _ => ModelReaction::default(),
            },
            PanelPayload::Asset(_)
            | PanelPayload::Search(_)
            | PanelPayload::Custom(_) => ModelReaction::default(),
        }
    }

    fn editor_reaction(editor: &EditorPayload, frame: &PushFrame) -> ModelReaction {
        let root_id = editor.root_id.as_deref().unwrap_or(&editor.block_id);
        match frame.cmd.as_str() {
            "transactions" => ModelReaction::refresh(),
            "rename" => {
                if data_str(&frame.data, "id") == Some(root_id) {
                    ModelReaction {
                        rename: data_str(&frame.data, "title").map(str::to_string),
                        ..ModelReaction::default()
                    }
                } else {
                    ModelReaction::default()
                }
            }
            "unmount" => {
                let matches = match (&editor.notebook_id, data_str(&frame.data, "box")) {
                    (Some(notebook), Some(unmounted)) => notebook == unmounted,
                    _ => false,
                };
                if matches {
                    ModelReaction::close()
                } else {
                    ModelReaction::default()
                }
            }
            "removeDoc" => {
                let removed = frame
                    .data
                    .get("ids")
                    .and_then(|ids| ids.as_array())
                    .is_some_and(|ids| ids.iter().any(|id| id.as_str() == Some(root_id)));
                if removed {
                    ModelReaction::close()
                } else {
                    ModelReaction::default()
                }
            }
            "savedoc" => {
                if data_str(&frame.data, "rootID") == Some(root_id) {
                    ModelReaction::refresh()
                } else {
                    ModelReaction::default()
                }
            }
            _ => ModelReaction::default(),
        }
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("kind", &self.kind())
            .field("channel", &self.channel.is_some())
            .field("fullscreen", &self.fullscreen)
            .finish_non_exhaustive()
    }
}

fn data_str<'a>(data: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(|v| v.as_str())
}

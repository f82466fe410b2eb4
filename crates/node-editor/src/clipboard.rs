//! Clipboard exchange of serialized subgraphs
//!
//! A copied subgraph travels as JSON under a named MIME format, with the same
//! text as a plain-text fallback so other applications can read it. The
//! clipboard itself is an external, last-writer-wins resource behind the
//! [`Clipboard`] trait; reading never clears it.

use std::collections::BTreeMap;

use crate::document::SceneDocument;
use crate::error::Result;

/// Default MIME format for copied subgraphs
pub const GRAPH_MIME_TYPE: &str = "application/x-node-editor-graph";

/// Contents of the clipboard: named formats plus optional plain text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardPayload {
    formats: BTreeMap<String, Vec<u8>>,
    text: Option<String>,
}

impl ClipboardPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data(&mut self, mime_type: impl Into<String>, data: Vec<u8>) {
        self.formats.insert(mime_type.into(), data);
    }

    pub fn data(&self, mime_type: &str) -> Option<&[u8]> {
        self.formats.get(mime_type).map(|d| d.as_slice())
    }

    pub fn has_format(&self, mime_type: &str) -> bool {
        self.formats.contains_key(mime_type)
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// System clipboard access
pub trait Clipboard {
    /// Replace the clipboard contents
    fn write(&mut self, payload: ClipboardPayload) -> Result<()>;

    /// Current contents, `None` when empty
    fn read(&self) -> Result<Option<ClipboardPayload>>;
}

/// Process-local clipboard
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<ClipboardPayload>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.contents = None;
    }
}

impl Clipboard for MemoryClipboard {
    fn write(&mut self, payload: ClipboardPayload) -> Result<()> {
        self.contents = Some(payload);
        Ok(())
    }

    fn read(&self) -> Result<Option<ClipboardPayload>> {
        Ok(self.contents.clone())
    }
}

/// Put `scene` on the clipboard under `mime_type` and as text
pub fn write_scene(
    clipboard: &mut dyn Clipboard,
    scene: &SceneDocument,
    mime_type: &str,
) -> Result<()> {
    let text = scene.to_json_string()?;
    let mut payload = ClipboardPayload::new();
    payload.set_data(mime_type, text.clone().into_bytes());
    payload.set_text(text);
    clipboard.write(payload)
}

/// Read a scene from the clipboard
///
/// Prefers the `mime_type` format and falls back to plain text. Returns
/// `None` when the clipboard is unavailable, empty or holds something that
/// is not a scene document.
pub fn read_scene(clipboard: &dyn Clipboard, mime_type: &str) -> Option<SceneDocument> {
    let payload = match clipboard.read() {
        Ok(Some(payload)) => payload,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Clipboard unavailable: {}", e);
            return None;
        }
    };

    let parsed = if let Some(data) = payload.data(mime_type) {
        SceneDocument::from_json_slice(data)
    } else if let Some(text) = payload.text() {
        SceneDocument::from_json_str(text)
    } else {
        return None;
    };

    match parsed {
        Ok(scene) => Some(scene),
        Err(e) => {
            log::warn!("Ignoring malformed clipboard content: {}", e);
            None
        }
    }
}

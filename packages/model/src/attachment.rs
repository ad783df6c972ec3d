//! # Attachment Attributes
//!
//! The attribute record carried by a figure node, plus the small pure
//! helpers derived from it (render mode, preferred URL, style classes).
//!
//! The record is an explicit typed shape with named, defaulted optional
//! fields rather than an open JSON bag, so the serialize/parse round-trip
//! is checkable field by field.

use serde::{Deserialize, Serialize};

/// How a figure should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Raw embed markup supplied in `content`
    Content,
    /// Visual preview (image-like attachments)
    Preview,
    /// Generic file chip (icon + metadata)
    File,
}

/// Attribute record describing one attachment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttachmentDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_id: Option<String>,

    /// Sanitized inline markup, mirrored into the figure's caption content
    pub caption: String,

    pub content_type: String,

    #[serde(alias = "filename", skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(alias = "filesize", skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,

    #[serde(alias = "href", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    pub previewable: bool,

    /// Raw embed markup; presence forces `RenderMode::Content`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    pub progress: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sgid: Option<String>,
}

impl Default for AttachmentDescriptor {
    fn default() -> Self {
        Self {
            attachment_id: None,
            caption: String::new(),
            content_type: "application/octet-stream".to_string(),
            file_name: None,
            file_size: None,
            url: None,
            src: None,
            width: None,
            height: None,
            previewable: false,
            content: None,
            progress: 100,
            sgid: None,
        }
    }
}

impl AttachmentDescriptor {
    /// Render mode precedence: content, then preview, then generic file
    pub fn render_mode(&self) -> RenderMode {
        if self.content.is_some() {
            RenderMode::Content
        } else if self.previewable || self.content_type.starts_with("image/") {
            RenderMode::Preview
        } else {
            RenderMode::File
        }
    }

    /// `url` wins over `src` wherever both are present
    pub fn best_url(&self) -> Option<&str> {
        self.url.as_deref().or(self.src.as_deref())
    }

    /// Lowercased file-name extension; only plain alphanumeric extensions count
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        let ext = ext.to_ascii_lowercase();
        if ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            Some(ext)
        } else {
            None
        }
    }

    /// Container style classes encoding (mode, extension).
    /// An unrecognized extension simply omits the extension class.
    pub fn class_names(&self) -> String {
        let mode = match self.render_mode() {
            RenderMode::Content => "attachment--content",
            RenderMode::Preview => "attachment--preview",
            RenderMode::File => "attachment--file",
        };
        let mut classes = format!("attachment {}", mode);
        if let Some(ext) = self.extension() {
            classes.push_str(" attachment--");
            classes.push_str(&ext);
        }
        classes
    }

    /// Decode a legacy JSON attribute payload.
    ///
    /// The payload may be double-encoded (a JSON string whose content is
    /// itself JSON). Malformed or missing payloads fall back to defaults.
    pub fn from_legacy_payload(raw: &str) -> Self {
        if let Ok(descriptor) = serde_json::from_str::<AttachmentDescriptor>(raw) {
            return descriptor;
        }
        if let Ok(inner) = serde_json::from_str::<String>(raw) {
            if let Ok(descriptor) = serde_json::from_str::<AttachmentDescriptor>(&inner) {
                return descriptor;
            }
        }
        AttachmentDescriptor::default()
    }
}

/// Attributes of a standalone image leaf
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_id: Option<String>,
}

//! # Canonical Serializer
//!
//! Converts a node tree back to markup. This is the persistence form: a
//! figure serializes to a container element whose classes encode
//! (mode, extension), carrying the full descriptor as a JSON attribute
//! payload, a nested preview element in preview mode, and a caption
//! sub-element. Parsing the output reconstructs attribute-identical
//! descriptors.
//!
//! The caption attribute on a figure stores exactly what
//! [`serialize_inline`] produces for its caption content; the
//! reconciliation pass in the editor crate leans on
//! [`extract_caption_markup`] to compare the two.

use crate::attachment::{AttachmentDescriptor, ImageAttrs, RenderMode};
use crate::node::Node;
use std::fmt::Write;

/// Class carried by the caption sub-element inside a figure
pub const CAPTION_CLASS: &str = "attachment__caption";

/// Serializer converts a node tree back to markup
pub struct Serializer {
    out: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self { out: String::new() }
    }

    /// Serialize a document's content
    pub fn serialize(mut self, doc: &Node) -> String {
        if let Some(children) = doc.children() {
            for child in children {
                self.write_node(child);
            }
        }
        self.out
    }

    /// Serialize a single node
    pub fn serialize_node(mut self, node: &Node) -> String {
        self.write_node(node);
        self.out
    }

    fn write_node(&mut self, node: &Node) {
        match node {
            Node::Doc { children, .. } => {
                for child in children {
                    self.write_node(child);
                }
            }
            Node::Paragraph { content, .. } => {
                if content.is_empty() {
                    // empty paragraphs stay visible and parse back as empty
                    self.out.push_str("<p><br></p>");
                } else {
                    self.out.push_str("<p>");
                    self.write_inline(content);
                    self.out.push_str("</p>");
                }
            }
            Node::Gallery { children, .. } => {
                let _ = write!(
                    self.out,
                    "<div class=\"attachment-gallery attachment-gallery--{}\">",
                    children.len()
                );
                for child in children {
                    self.write_node(child);
                }
                self.out.push_str("</div>");
            }
            Node::Figure { attrs, content, .. } => self.write_figure(attrs, content),
            Node::Image { attrs, .. } => self.write_image(attrs),
            Node::Figcaption { content, .. } => {
                self.out.push_str("<figcaption>");
                self.write_inline(content);
                self.out.push_str("</figcaption>");
            }
            Node::Text { text } => {
                self.out.push_str(&html_escape::encode_text(text));
            }
        }
    }

    fn write_figure(&mut self, attrs: &AttachmentDescriptor, content: &[Node]) {
        self.out.push_str("<figure class=\"");
        self.out.push_str(&attrs.class_names());
        self.out.push_str("\" data-attachment=\"");
        let payload = serde_json::to_string(attrs).unwrap_or_default();
        self.out.push_str(&encode_attribute(&payload));
        self.out.push_str("\">");

        if attrs.render_mode() == RenderMode::Preview {
            if let Some(url) = attrs.best_url() {
                self.out.push_str("<img src=\"");
                self.out.push_str(&encode_attribute(url));
                self.out.push('"');
                if let Some(width) = attrs.width {
                    let _ = write!(self.out, " width=\"{}\"", width);
                }
                if let Some(height) = attrs.height {
                    let _ = write!(self.out, " height=\"{}\"", height);
                }
                self.out.push('>');
            }
        }

        let _ = write!(self.out, "<figcaption class=\"{}\">", CAPTION_CLASS);
        // caption content is already canonical inline markup when written
        // through write_inline
        self.write_inline(content);
        self.out.push_str("</figcaption></figure>");
    }

    fn write_image(&mut self, attrs: &ImageAttrs) {
        self.out.push_str("<img");
        if let Some(src) = &attrs.src {
            let _ = write!(self.out, " src=\"{}\"", encode_attribute(src));
        }
        if let Some(width) = attrs.width {
            let _ = write!(self.out, " width=\"{}\"", width);
        }
        if let Some(height) = attrs.height {
            let _ = write!(self.out, " height=\"{}\"", height);
        }
        if let Some(id) = &attrs.attachment_id {
            let _ = write!(
                self.out,
                " data-attachment-id=\"{}\"",
                encode_attribute(id)
            );
        }
        self.out.push('>');
    }

    fn write_inline(&mut self, content: &[Node]) {
        for node in content {
            self.write_node(node);
        }
    }
}

/// Escape a double-quoted attribute value. Quotes and angle brackets must
/// both be escaped so attribute payloads never open or close a tag.
fn encode_attribute(value: &str) -> String {
    html_escape::encode_text(value).replace('"', "&quot;")
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a document's content to canonical markup
pub fn serialize(doc: &Node) -> String {
    Serializer::new().serialize(doc)
}

/// Serialize one node to canonical markup
pub fn serialize_node(node: &Node) -> String {
    Serializer::new().serialize_node(node)
}

/// Canonical inner-markup form of inline content; this is the value the
/// caption attribute mirrors
pub fn serialize_inline(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        if let Node::Text { text } = node {
            out.push_str(&html_escape::encode_text(text));
        }
    }
    out
}

/// Locate the caption sub-element in serialized markup and return its inner
/// markup. `None` when the markup carries no caption element.
pub fn extract_caption_markup(markup: &str) -> Option<String> {
    let open = markup.find("<figcaption")?;
    let rest = &markup[open..];
    let content_start = rest.find('>')? + 1;
    let rest = &rest[content_start..];
    let content_end = rest.find("</figcaption>")?;
    Some(rest[..content_end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::NodeIdGenerator;
    use crate::parse::parse;

    fn figure(attrs: AttachmentDescriptor) -> Node {
        let mut ids = NodeIdGenerator::new("serialize-tests");
        let caption = attrs.caption.clone();
        let content = if caption.is_empty() {
            vec![]
        } else {
            vec![Node::text(
                html_escape::decode_html_entities(&caption).into_owned(),
            )]
        };
        Node::Figure {
            id: ids.next_id(),
            attrs,
            content,
        }
    }

    #[test]
    fn test_serialize_empty_paragraph() {
        let mut ids = NodeIdGenerator::new("serialize-tests");
        let para = Node::paragraph(ids.next_id());
        assert_eq!(serialize_node(&para), "<p><br></p>");

        // and it parses back as empty
        let doc = parse("<p><br></p>").unwrap();
        assert_eq!(doc.children().unwrap()[0].content_size(), 0);
    }

    #[test]
    fn test_serialize_figure_preview_mode() {
        let attrs = AttachmentDescriptor {
            content_type: "image/png".to_string(),
            file_name: Some("photo.png".to_string()),
            url: Some("https://cdn.example/photo.png".to_string()),
            width: Some(640),
            height: Some(480),
            caption: "Holiday".to_string(),
            ..Default::default()
        };
        let markup = serialize_node(&figure(attrs));

        assert!(markup.starts_with(
            "<figure class=\"attachment attachment--preview attachment--png\""
        ));
        assert!(markup.contains("<img src=\"https://cdn.example/photo.png\" width=\"640\" height=\"480\">"));
        assert!(markup.contains("<figcaption class=\"attachment__caption\">Holiday</figcaption>"));
    }

    #[test]
    fn test_serialize_figure_file_mode_has_no_preview() {
        let attrs = AttachmentDescriptor {
            file_name: Some("report.pdf".to_string()),
            url: Some("https://cdn.example/report.pdf".to_string()),
            ..Default::default()
        };
        let markup = serialize_node(&figure(attrs));
        assert!(markup.contains("attachment--file"));
        assert!(!markup.contains("<img"));
    }

    #[test]
    fn test_extract_caption_markup() {
        let markup = "<figure><figcaption class=\"attachment__caption\">a &amp; b</figcaption></figure>";
        assert_eq!(extract_caption_markup(markup).as_deref(), Some("a &amp; b"));
        assert_eq!(extract_caption_markup("<figure></figure>"), None);
    }

    #[test]
    fn test_descriptor_round_trip() {
        let attrs = AttachmentDescriptor {
            caption: "Trip &amp; fall".to_string(),
            content_type: "image/jpeg".to_string(),
            file_name: Some("fall.jpg".to_string()),
            file_size: Some(123456),
            width: Some(800),
            height: Some(600),
            url: Some("https://cdn.example/fall.jpg".to_string()),
            src: Some("blob:local-fall".to_string()),
            sgid: Some("sgid-token".to_string()),
            ..Default::default()
        };

        let markup = serialize_node(&figure(attrs.clone()));
        let doc = parse(&markup).unwrap();
        match &doc.children().unwrap()[0] {
            Node::Figure { attrs: parsed, .. } => assert_eq!(*parsed, attrs),
            other => panic!("expected figure, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_caption_with_leading_quote_round_trips() {
        let attrs = AttachmentDescriptor {
            caption: "'tis the season".to_string(),
            ..Default::default()
        };

        let markup = serialize_node(&figure(attrs));
        let doc = parse(&markup).unwrap();
        match &doc.children().unwrap()[0] {
            Node::Figure { attrs, content, .. } => {
                assert_eq!(attrs.caption, "'tis the season");
                assert_eq!(content[0], Node::text("'tis the season"));
            }
            other => panic!("expected figure, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_gallery_round_trip() {
        let mut ids = NodeIdGenerator::new("serialize-tests");
        let gallery = Node::Gallery {
            id: ids.next_id(),
            children: vec![
                figure(AttachmentDescriptor {
                    file_name: Some("a.png".to_string()),
                    content_type: "image/png".to_string(),
                    src: Some("blob:a".to_string()),
                    ..Default::default()
                }),
                figure(AttachmentDescriptor {
                    file_name: Some("b.png".to_string()),
                    content_type: "image/png".to_string(),
                    src: Some("blob:b".to_string()),
                    ..Default::default()
                }),
            ],
        };

        let markup = serialize_node(&gallery);
        assert!(markup.starts_with("<div class=\"attachment-gallery attachment-gallery--2\">"));

        let doc = parse(&markup).unwrap();
        let parsed = &doc.children().unwrap()[0];
        assert_eq!(parsed.kind(), crate::node::NodeKind::Gallery);
        assert_eq!(parsed.children().unwrap().len(), 2);
    }

    #[test]
    fn test_text_escaped() {
        let mut ids = NodeIdGenerator::new("serialize-tests");
        let para = Node::Paragraph {
            id: ids.next_id(),
            content: vec![Node::text("a < b & c")],
        };
        assert_eq!(serialize_node(&para), "<p>a &lt; b &amp; c</p>");
    }
}

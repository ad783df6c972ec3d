//! # Markup Parser
//!
//! Token-walker over the lexer's spanned tokens. Three attachment element
//! shapes unify into the same figure + descriptor:
//!
//! 1. Legacy dialect: a wrapper element whose single JSON attribute holds
//!    the whole descriptor (possibly double-encoded).
//! 2. Native dialect: an `<attachment>` element with one attribute per
//!    field and an optional literal `<figcaption>`, which takes precedence
//!    over any caption attribute.
//! 3. The canonical persisted form produced by the serializer, which parses
//!    back to attribute-identical descriptors.
//!
//! Unknown elements have their children lifted; unknown attributes are
//! ignored. Malformed attachment payloads fall back to field defaults.

use crate::attachment::{AttachmentDescriptor, ImageAttrs};
use crate::error::{ParseError, ParseResult};
use crate::ids::NodeIdGenerator;
use crate::lexer::{tokenize, Token};
use crate::node::Node;
use crate::serialize::serialize_inline;
use std::ops::Range;

/// Elements that never carry a closing tag
const VOID_TAGS: &[&str] = &["br", "img", "hr"];

/// Parser for document markup
pub struct Parser<'src, 'ids> {
    src: &'src str,
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
    ids: &'ids mut NodeIdGenerator,
}

/// Parse markup into a document node with a throwaway ID generator
pub fn parse(source: &str) -> ParseResult<Node> {
    let mut ids = NodeIdGenerator::new("memory");
    parse_document(source, &mut ids)
}

/// Parse markup into a document node, drawing IDs from the caller's
/// generator so later edits keep allocating past the parsed range
pub fn parse_document(source: &str, ids: &mut NodeIdGenerator) -> ParseResult<Node> {
    Parser::new(source, ids).parse_doc()
}

/// Parse an inline markup fragment (a caption value, say) into text runs,
/// decoding entities and dropping any stray wrapper tags
pub fn parse_inline_markup(source: &str) -> Vec<Node> {
    let mut ids = NodeIdGenerator::new("inline");
    let mut parser = Parser::new(source, &mut ids);
    parser.parse_inline(None).unwrap_or_default()
}

impl<'src, 'ids> Parser<'src, 'ids> {
    pub fn new(source: &'src str, ids: &'ids mut NodeIdGenerator) -> Self {
        Self {
            src: source,
            tokens: tokenize(source),
            pos: 0,
            ids,
        }
    }

    pub fn parse_doc(&mut self) -> ParseResult<Node> {
        let children = self.parse_blocks(None)?;
        Ok(Node::Doc {
            id: self.ids.next_id(),
            children,
        })
    }

    fn peek(&self) -> Option<&(Token<'src>, Range<usize>)> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&(Token<'src>, Range<usize>)> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some((Token::Whitespace, _))) {
            self.pos += 1;
        }
    }

    /// Parse block-level content until the matching close tag (or EOF)
    fn parse_blocks(&mut self, until: Option<&str>) -> ParseResult<Vec<Node>> {
        let mut out = Vec::new();

        loop {
            match self.peek() {
                None => break,
                Some((Token::TagClose(name), _)) => {
                    if until == Some(*name) {
                        self.pos += 1;
                        break;
                    }
                    // stray close tag
                    self.pos += 1;
                }
                Some((Token::TagOpen(_), _)) => {
                    self.parse_element_into(&mut out)?;
                }
                Some(_) => {
                    let text = self.collect_text();
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        // loose text becomes its own paragraph
                        let id = self.ids.next_id();
                        out.push(Node::Paragraph {
                            id,
                            content: vec![Node::text(trimmed)],
                        });
                    }
                }
            }
        }

        Ok(out)
    }

    fn parse_element_into(&mut self, out: &mut Vec<Node>) -> ParseResult<()> {
        let name = match self.advance() {
            Some((Token::TagOpen(name), _)) => *name,
            _ => return Ok(()),
        };
        let (attrs, self_closed) = self.parse_attrs()?;
        let closed = self_closed || VOID_TAGS.contains(&name);

        match name {
            "figure" => {
                let descriptor = attrs
                    .iter()
                    .find(|(n, _)| n == "data-attachment")
                    .map(|(_, v)| AttachmentDescriptor::from_legacy_payload(v))
                    .unwrap_or_default();
                let caption = if closed {
                    None
                } else {
                    let inner = self.parse_blocks(Some("figure"))?;
                    take_caption(inner)
                };
                out.push(self.build_figure(descriptor, caption));
            }
            "attachment" => {
                let descriptor = descriptor_from_native_attrs(&attrs);
                let caption = if closed {
                    None
                } else {
                    let inner = self.parse_blocks(Some("attachment"))?;
                    take_caption(inner)
                };
                out.push(self.build_figure(descriptor, caption));
            }
            "div" => {
                let inner = if closed {
                    Vec::new()
                } else {
                    self.parse_blocks(Some("div"))?
                };
                if class_of(&attrs)
                    .map(|c| c.split_whitespace().any(|t| t == "attachment-gallery"))
                    .unwrap_or(false)
                {
                    out.push(Node::Gallery {
                        id: self.ids.next_id(),
                        children: inner,
                    });
                } else {
                    // unknown container, lift its children
                    out.extend(inner);
                }
            }
            "p" => {
                let content = if closed {
                    Vec::new()
                } else {
                    self.parse_inline(Some("p"))?
                };
                out.push(Node::Paragraph {
                    id: self.ids.next_id(),
                    content,
                });
            }
            "figcaption" => {
                let content = if closed {
                    Vec::new()
                } else {
                    self.parse_inline(Some("figcaption"))?
                };
                out.push(Node::Figcaption {
                    id: self.ids.next_id(),
                    content,
                });
            }
            "img" => {
                out.push(Node::Image {
                    id: self.ids.next_id(),
                    attrs: image_attrs(&attrs),
                });
            }
            "br" | "hr" => {}
            _ => {
                if !closed {
                    let inner = self.parse_blocks(Some(name))?;
                    out.extend(inner);
                }
            }
        }

        Ok(())
    }

    /// Parse inline content until the matching close tag (or EOF)
    fn parse_inline(&mut self, until: Option<&str>) -> ParseResult<Vec<Node>> {
        let mut out = Vec::new();

        loop {
            match self.peek() {
                None => break,
                Some((Token::TagClose(name), _)) => {
                    if until == Some(*name) {
                        self.pos += 1;
                        break;
                    }
                    self.pos += 1;
                }
                Some((Token::TagOpen(name), _)) => {
                    let name = *name;
                    self.pos += 1;
                    let (_, self_closed) = self.parse_attrs()?;
                    if self_closed || VOID_TAGS.contains(&name) {
                        continue;
                    }
                    // unknown inline wrapper: keep its text, drop the wrapper
                    let inner = self.parse_inline(Some(name))?;
                    out.extend(inner);
                }
                Some(_) => {
                    let text = self.collect_text();
                    if !text.trim().is_empty() {
                        out.push(Node::text(text));
                    }
                }
            }
        }

        Ok(out)
    }

    /// Collect raw source between the current token and the next tag token,
    /// decoding entities
    fn collect_text(&mut self) -> String {
        let start = match self.peek() {
            Some((_, span)) => span.start,
            None => return String::new(),
        };
        let mut end = self.src.len();
        while let Some((token, span)) = self.peek() {
            if matches!(token, Token::TagOpen(_) | Token::TagClose(_)) {
                end = span.start;
                break;
            }
            self.pos += 1;
        }
        html_escape::decode_html_entities(&self.src[start..end]).into_owned()
    }

    /// Parse attributes up to the end of the open tag.
    /// Attribute names are lowercased; values are entity-decoded.
    fn parse_attrs(&mut self) -> ParseResult<(Vec<(String, String)>, bool)> {
        let mut attrs = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(ParseError::unexpected_eof(self.src.len())),
                Some((Token::TagEnd, _)) => {
                    self.pos += 1;
                    return Ok((attrs, false));
                }
                Some((Token::SelfClose, _)) => {
                    self.pos += 1;
                    return Ok((attrs, true));
                }
                Some((Token::Name(name), _)) => {
                    let name = name.to_ascii_lowercase();
                    self.pos += 1;
                    self.skip_whitespace();
                    if matches!(self.peek(), Some((Token::Eq, _))) {
                        self.pos += 1;
                        self.skip_whitespace();
                        let value = match self.peek() {
                            Some((Token::DoubleQuoted(v), _))
                            | Some((Token::SingleQuoted(v), _))
                            | Some((Token::Name(v), _))
                            | Some((Token::Chunk(v), _)) => {
                                let v = *v;
                                self.pos += 1;
                                html_escape::decode_html_entities(v).into_owned()
                            }
                            Some((token, span)) => {
                                return Err(ParseError::unexpected_token(
                                    span.start,
                                    "attribute value",
                                    token.to_string(),
                                ));
                            }
                            None => {
                                return Err(ParseError::unexpected_eof(self.src.len()));
                            }
                        };
                        attrs.push((name, value));
                    } else {
                        // bare attribute
                        attrs.push((name, String::new()));
                    }
                }
                Some(_) => {
                    // stray token inside a tag
                    self.pos += 1;
                }
            }
        }
    }

    /// Build a figure, keeping the caption attribute and the inline caption
    /// content consistent from birth. An explicit caption element wins over
    /// the descriptor's caption attribute.
    fn build_figure(
        &mut self,
        mut attrs: AttachmentDescriptor,
        caption: Option<Vec<Node>>,
    ) -> Node {
        let content = match caption {
            Some(nodes) => {
                attrs.caption = serialize_inline(&nodes);
                nodes
            }
            None if !attrs.caption.is_empty() => {
                let text = html_escape::decode_html_entities(&attrs.caption).into_owned();
                vec![Node::text(text)]
            }
            None => Vec::new(),
        };
        Node::Figure {
            id: self.ids.next_id(),
            attrs,
            content,
        }
    }
}

/// Pull the first caption element's content out of parsed figure children
fn take_caption(inner: Vec<Node>) -> Option<Vec<Node>> {
    inner.into_iter().find_map(|node| match node {
        Node::Figcaption { content, .. } => Some(content),
        _ => None,
    })
}

fn class_of(attrs: &[(String, String)]) -> Option<&str> {
    attrs
        .iter()
        .find(|(n, _)| n == "class")
        .map(|(_, v)| v.as_str())
}

fn descriptor_from_native_attrs(attrs: &[(String, String)]) -> AttachmentDescriptor {
    let mut descriptor = AttachmentDescriptor::default();
    for (name, value) in attrs {
        match name.as_str() {
            "sgid" => descriptor.sgid = Some(value.clone()),
            "content-type" => descriptor.content_type = value.clone(),
            "url" | "href" => descriptor.url = Some(value.clone()),
            "src" => descriptor.src = Some(value.clone()),
            "filename" => descriptor.file_name = Some(value.clone()),
            "filesize" => descriptor.file_size = value.parse().ok(),
            "width" => descriptor.width = value.parse().ok(),
            "height" => descriptor.height = value.parse().ok(),
            "progress" => {
                if let Ok(progress) = value.parse() {
                    descriptor.progress = progress;
                }
            }
            "previewable" => {
                descriptor.previewable =
                    matches!(value.as_str(), "" | "true" | "previewable");
            }
            "caption" => {
                descriptor.caption = html_escape::encode_text(value).into_owned();
            }
            "content" => descriptor.content = Some(value.clone()),
            _ => {}
        }
    }
    descriptor
}

fn image_attrs(attrs: &[(String, String)]) -> ImageAttrs {
    let mut image = ImageAttrs::default();
    for (name, value) in attrs {
        match name.as_str() {
            "src" => image.src = Some(value.clone()),
            "width" => image.width = value.parse().ok(),
            "height" => image.height = value.parse().ok(),
            "data-attachment-id" => image.attachment_id = Some(value.clone()),
            _ => {}
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn blocks(doc: &Node) -> &Vec<Node> {
        doc.children().unwrap()
    }

    #[test]
    fn test_parse_paragraph() {
        let doc = parse("<p>hello world</p>").unwrap();
        let para = &blocks(&doc)[0];
        assert_eq!(para.kind(), NodeKind::Paragraph);
        assert_eq!(para.text_content(), "hello world");
    }

    #[test]
    fn test_parse_empty_paragraph_with_br() {
        let doc = parse("<p><br></p>").unwrap();
        let para = &blocks(&doc)[0];
        assert_eq!(para.kind(), NodeKind::Paragraph);
        assert_eq!(para.content_size(), 0);
    }

    #[test]
    fn test_parse_legacy_figure() {
        let markup = r#"<figure data-attachment='{"contentType":"image/png","filename":"cat.png","previewable":true}'><figcaption>A cat</figcaption></figure>"#;
        let doc = parse(markup).unwrap();
        match &blocks(&doc)[0] {
            Node::Figure { attrs, content, .. } => {
                assert_eq!(attrs.content_type, "image/png");
                assert_eq!(attrs.file_name.as_deref(), Some("cat.png"));
                assert!(attrs.previewable);
                assert_eq!(attrs.caption, "A cat");
                assert_eq!(content.len(), 1);
            }
            other => panic!("expected figure, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_parse_legacy_payload_defaults_when_missing_fields() {
        let markup = r#"<figure data-attachment='{"filename":"a.bin"}'></figure>"#;
        let doc = parse(markup).unwrap();
        match &blocks(&doc)[0] {
            Node::Figure { attrs, .. } => {
                assert_eq!(attrs.content_type, "application/octet-stream");
                assert_eq!(attrs.progress, 100);
            }
            other => panic!("expected figure, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_parse_legacy_payload_malformed_is_not_fatal() {
        let markup = r#"<figure data-attachment="not json"></figure>"#;
        let doc = parse(markup).unwrap();
        match &blocks(&doc)[0] {
            Node::Figure { attrs, .. } => {
                assert_eq!(*attrs, AttachmentDescriptor::default());
            }
            other => panic!("expected figure, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_parse_native_dialect() {
        let markup = r#"<attachment sgid="abc123" content-type="application/pdf" url="https://x/y.pdf" filename="y.pdf" filesize="2048" caption="from attribute"></attachment>"#;
        let doc = parse(markup).unwrap();
        match &blocks(&doc)[0] {
            Node::Figure { attrs, .. } => {
                assert_eq!(attrs.sgid.as_deref(), Some("abc123"));
                assert_eq!(attrs.content_type, "application/pdf");
                assert_eq!(attrs.file_size, Some(2048));
                assert_eq!(attrs.caption, "from attribute");
            }
            other => panic!("expected figure, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_native_caption_element_wins_over_attribute() {
        let markup = r#"<attachment content-type="image/gif" caption="attribute"><figcaption>element</figcaption></attachment>"#;
        let doc = parse(markup).unwrap();
        match &blocks(&doc)[0] {
            Node::Figure { attrs, content, .. } => {
                assert_eq!(attrs.caption, "element");
                assert_eq!(content[0], Node::text("element"));
            }
            other => panic!("expected figure, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_parse_gallery() {
        let markup = r#"<div class="attachment-gallery attachment-gallery--2"><figure data-attachment='{"filename":"a.png"}'></figure><figure data-attachment='{"filename":"b.png"}'></figure></div>"#;
        let doc = parse(markup).unwrap();
        let gallery = &blocks(&doc)[0];
        assert_eq!(gallery.kind(), NodeKind::Gallery);
        assert_eq!(gallery.children().unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_elements_lift_children() {
        let doc = parse("<section><p>inside</p></section>").unwrap();
        let para = &blocks(&doc)[0];
        assert_eq!(para.kind(), NodeKind::Paragraph);
        assert_eq!(para.text_content(), "inside");
    }

    #[test]
    fn test_text_with_leading_quote_survives() {
        let doc = parse("<p>'tis the season</p>").unwrap();
        assert_eq!(blocks(&doc)[0].text_content(), "'tis the season");

        let doc = parse(r#"<p>"quoted" words</p>"#).unwrap();
        assert_eq!(blocks(&doc)[0].text_content(), "\"quoted\" words");
    }

    #[test]
    fn test_entities_decoded_in_text() {
        let doc = parse("<p>a &amp; b &lt;ok&gt;</p>").unwrap();
        assert_eq!(blocks(&doc)[0].text_content(), "a & b <ok>");
    }

    #[test]
    fn test_caption_attribute_seeds_inline_content() {
        let markup = r#"<figure data-attachment='{"caption":"hello"}'></figure>"#;
        let doc = parse(markup).unwrap();
        match &blocks(&doc)[0] {
            Node::Figure { content, .. } => {
                assert_eq!(content[0], Node::text("hello"));
            }
            other => panic!("expected figure, got {:?}", other.kind()),
        }
    }
}

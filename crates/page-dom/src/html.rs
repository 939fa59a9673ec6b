//! Lenient HTML fragment builder for [`Document`]
//!
//! Handles elements, quoted/unquoted/bare attributes, void elements, raw-text
//! elements (`script`, `style`, `textarea`), comments, doctypes and the common
//! character references. Unmatched end tags are ignored and open elements are
//! closed at end of input; it never fails.

use crate::arena::{Document, NodeId};
use tracing::debug;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

impl Document {
    /// Build a document from an HTML fragment
    pub fn parse_html(html: &str) -> Document {
        let mut doc = Document::new();
        let root = doc.root();
        Builder {
            doc: &mut doc,
            input: html,
            pos: 0,
            stack: vec![root],
        }
        .run();
        doc
    }
}

struct Builder<'a> {
    doc: &'a mut Document,
    input: &'a str,
    pos: usize,
    stack: Vec<NodeId>,
}

impl<'a> Builder<'a> {
    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn rest(&self) -> &'a str {
        let input: &'a str = self.input;
        &input[self.pos..]
    }

    fn run(mut self) {
        while self.pos < self.input.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                self.pos = match rest[4..].find("-->") {
                    Some(end) => self.pos + 4 + end + 3,
                    None => self.input.len(),
                };
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.pos = match rest.find('>') {
                    Some(end) => self.pos + end + 1,
                    None => self.input.len(),
                };
            } else if rest.starts_with("</") {
                self.end_tag();
            } else if rest.starts_with('<')
                && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
            {
                self.start_tag();
            } else {
                self.text();
            }
        }
    }

    fn text(&mut self) {
        let rest = self.rest();
        // A lone '<' that does not open a tag is literal text
        let skip = usize::from(rest.starts_with('<'));
        let end = rest[skip..]
            .find('<')
            .map(|i| i + skip)
            .unwrap_or(rest.len());
        let text = decode_entities(&rest[..end]);
        self.pos += end;
        self.append_text(&text);
    }

    fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let parent = self.current();
        if let Err(e) = self.doc.append_text(parent, text) {
            debug!(error = %e, "dropping text node");
        }
    }

    fn end_tag(&mut self) {
        let rest = self.rest();
        let close = rest.find('>').unwrap_or(rest.len());
        let name = rest[2..close].trim().to_ascii_lowercase();
        self.pos = (self.pos + close + 1).min(self.input.len());

        let open = self.stack.iter().rposition(|id| {
            *id != NodeId::ROOT && crate::Dom::tag_name(&*self.doc, id).as_deref() == Some(name.as_str())
        });
        if let Some(idx) = open {
            self.stack.truncate(idx);
        }
    }

    fn start_tag(&mut self) {
        let bytes = self.input.as_bytes();
        let mut pos = self.pos + 1;

        let name_start = pos;
        while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && !matches!(bytes[pos], b'>' | b'/') {
            pos += 1;
        }
        let tag = self.input[name_start..pos].to_ascii_lowercase();

        let mut attrs: Vec<(String, String)> = Vec::new();
        let mut self_closing = false;
        loop {
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            if pos >= bytes.len() {
                break;
            }
            match bytes[pos] {
                b'>' => {
                    pos += 1;
                    break;
                }
                b'/' => {
                    self_closing = true;
                    pos += 1;
                    continue;
                }
                _ => {}
            }

            let attr_start = pos;
            while pos < bytes.len()
                && !bytes[pos].is_ascii_whitespace()
                && !matches!(bytes[pos], b'=' | b'>' | b'/')
            {
                pos += 1;
            }
            let name = self.input[attr_start..pos].to_ascii_lowercase();
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }

            let mut value = String::new();
            if pos < bytes.len() && bytes[pos] == b'=' {
                pos += 1;
                while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                    pos += 1;
                }
                if pos < bytes.len() && matches!(bytes[pos], b'"' | b'\'') {
                    let quote = bytes[pos];
                    let value_start = pos + 1;
                    let value_end = self.input[value_start..]
                        .find(quote as char)
                        .map(|i| value_start + i)
                        .unwrap_or(bytes.len());
                    value = decode_entities(&self.input[value_start..value_end]);
                    pos = (value_end + 1).min(bytes.len());
                } else {
                    let value_start = pos;
                    while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'>' {
                        pos += 1;
                    }
                    value = decode_entities(&self.input[value_start..pos]);
                }
            }
            if !name.is_empty() && !attrs.iter().any(|(n, _)| *n == name) {
                attrs.push((name, value));
            }
        }
        self.pos = pos;

        let parent = self.current();
        let attr_refs: Vec<(&str, &str)> = attrs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let element = match self.doc.append_element(parent, &tag, &attr_refs) {
            Ok(element) => element,
            Err(e) => {
                debug!(tag = %tag, error = %e, "dropping element");
                return;
            }
        };

        if is_void(&tag) || self_closing {
            return;
        }
        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            let rest = self.rest();
            let closing = format!("</{}", tag);
            let end = rest
                .to_ascii_lowercase()
                .find(&closing)
                .unwrap_or(rest.len());
            let raw = &rest[..end];
            let text = if tag == "textarea" {
                decode_entities(raw)
            } else {
                raw.to_string()
            };
            if !text.is_empty() {
                if let Err(e) = self.doc.append_text(element, &text) {
                    debug!(tag = %tag, error = %e, "dropping raw text");
                }
            }
            self.pos += end;
            if self.pos < self.input.len() {
                let close = self.rest().find('>').unwrap_or(self.rest().len());
                self.pos = (self.pos + close + 1).min(self.input.len());
            }
            return;
        }
        self.stack.push(element);
    }
}

/// Decode the character references that show up in real documents
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let Some(semi) = rest[1..].find(';').map(|i| i + 1).filter(|i| *i <= 10) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let name = &rest[1..semi];
        let decoded = match name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ if name.starts_with("#x") || name.starts_with("#X") => {
                u32::from_str_radix(&name[2..], 16).ok().and_then(char::from_u32)
            }
            _ if name.starts_with('#') => name[1..].parse::<u32>().ok().and_then(char::from_u32),
            _ => None,
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dom;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trips_simple_markup() {
        let html = r#"<div class="a" contenteditable="true"><p>Hello <b>world</b></p></div>"#;
        let doc = Document::parse_html(html);
        assert_eq!(doc.to_html(doc.root()), html);
    }

    #[test]
    fn test_bare_and_unquoted_attributes() {
        let doc = Document::parse_html("<div contenteditable id=x data-k='v w'>t</div>");
        let div = doc.first_child(&doc.root()).unwrap();
        assert_eq!(doc.attribute(&div, "contenteditable").as_deref(), Some(""));
        assert_eq!(doc.attribute(&div, "id").as_deref(), Some("x"));
        assert_eq!(doc.attribute(&div, "data-k").as_deref(), Some("v w"));
    }

    #[test]
    fn test_void_and_self_closing() {
        let doc = Document::parse_html(r#"<p>a<br>b<input type="text"/>c</p>"#);
        let p = doc.first_child(&doc.root()).unwrap();
        assert_eq!(doc.children(&p).len(), 5);
        assert_eq!(doc.text_content(&p), "abc");
    }

    #[test]
    fn test_raw_text_elements() {
        let doc = Document::parse_html("<script>if (a < b) {}</script><textarea>x &amp; <y></textarea>");
        let script = doc.first_child(&doc.root()).unwrap();
        assert_eq!(doc.text_content(&script), "if (a < b) {}");
        let area = doc.next_sibling(&script).unwrap();
        assert_eq!(doc.text_content(&area), "x & <y>");
    }

    #[test]
    fn test_text_runs_decode_and_keep_lone_angles() {
        let doc = Document::parse_html("<p>a < b &amp; c</p>tail &lt;3");
        let p = doc.first_child(&doc.root()).unwrap();
        assert_eq!(doc.text_content(&p), "a < b & c");
        let tail = doc.next_sibling(&p).unwrap();
        assert_eq!(doc.text_data(&tail).as_deref(), Some("tail <3"));
    }

    #[test]
    fn test_unmatched_end_tags_are_ignored() {
        let doc = Document::parse_html("<div><span>a</div>b</span>c");
        assert_eq!(doc.to_html(doc.root()), "<div><span>a</span></div>bc");
    }

    #[test]
    fn test_comments_and_doctype_are_skipped() {
        let doc = Document::parse_html("<!DOCTYPE html><!-- note --><p>x</p>");
        assert_eq!(doc.to_html(doc.root()), "<p>x</p>");
    }

    #[test]
    fn test_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;&#65;&#x42;&gt;"), "a & b <AB>");
        assert_eq!(decode_entities("AT&T rocks"), "AT&T rocks");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
    }
}

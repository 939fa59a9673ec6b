//! Minimal CSS selector engine
//!
//! Supports what the locator's selector tables need: type, universal, `#id`,
//! `.class`, `[attr]` and `[attr="value"]` simple selectors, compound
//! selectors, descendant (` `) and child (`>`) combinators, and comma lists.

use crate::dom::{Dom, NodeKind};
use crate::error::DomError;

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatcher {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatcher>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// Compounds left to right; `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
}

/// A parsed, comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<Complex>,
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let mut selectors = Vec::new();
        for part in split_top_level(input) {
            selectors.push(parse_complex(part.trim(), input)?);
        }
        if selectors.is_empty() {
            return Err(invalid(input));
        }
        Ok(Self { selectors })
    }

    /// Whether the element matches any selector in the list
    pub fn matches<D: Dom + ?Sized>(&self, dom: &D, node: D::Node) -> bool {
        if dom.node_kind(&node) != NodeKind::Element {
            return false;
        }
        self.selectors
            .iter()
            .any(|complex| match_at(complex, dom, &node, complex.compounds.len() - 1))
    }
}

fn invalid(input: &str) -> DomError {
    DomError::InvalidSelector(input.to_string())
}

/// Split on commas that are not inside brackets or quotes
fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (idx, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn parse_complex(part: &str, input: &str) -> Result<Complex, DomError> {
    let chars: Vec<char> = part.chars().collect();
    let mut pos = 0;
    let mut compounds = Vec::new();
    let mut combinators = Vec::new();
    let mut pending: Option<Combinator> = None;

    while pos < chars.len() {
        let c = chars[pos];
        if c.is_whitespace() {
            if !compounds.is_empty() && pending.is_none() {
                pending = Some(Combinator::Descendant);
            }
            pos += 1;
            continue;
        }
        if c == '>' {
            if compounds.is_empty() {
                return Err(invalid(input));
            }
            pending = Some(Combinator::Child);
            pos += 1;
            continue;
        }

        let compound = parse_compound(&chars, &mut pos, input)?;
        if !compounds.is_empty() {
            combinators.push(pending.take().ok_or_else(|| invalid(input))?);
        }
        pending = None;
        compounds.push(compound);
    }

    if compounds.is_empty() || pending == Some(Combinator::Child) {
        return Err(invalid(input));
    }
    Ok(Complex {
        compounds,
        combinators,
    })
}

fn read_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn parse_compound(chars: &[char], pos: &mut usize, input: &str) -> Result<Compound, DomError> {
    let mut compound = Compound::default();
    let start = *pos;

    if chars[*pos] == '*' {
        *pos += 1;
    } else if is_ident_char(chars[*pos]) {
        compound.tag = Some(read_ident(chars, pos).to_ascii_lowercase());
    }

    while *pos < chars.len() {
        match chars[*pos] {
            '.' => {
                *pos += 1;
                let class = read_ident(chars, pos);
                if class.is_empty() {
                    return Err(invalid(input));
                }
                compound.classes.push(class);
            }
            '#' => {
                *pos += 1;
                let id = read_ident(chars, pos);
                if id.is_empty() {
                    return Err(invalid(input));
                }
                compound.id = Some(id);
            }
            '[' => {
                *pos += 1;
                compound.attrs.push(parse_attr(chars, pos, input)?);
            }
            _ => break,
        }
    }

    if *pos == start {
        return Err(invalid(input));
    }
    Ok(compound)
}

fn parse_attr(chars: &[char], pos: &mut usize, input: &str) -> Result<AttrMatcher, DomError> {
    skip_spaces(chars, pos);
    let name = read_ident(chars, pos).to_ascii_lowercase();
    if name.is_empty() {
        return Err(invalid(input));
    }
    skip_spaces(chars, pos);

    let value = match chars.get(*pos) {
        Some(']') => None,
        Some('=') => {
            *pos += 1;
            skip_spaces(chars, pos);
            let value = match chars.get(*pos) {
                Some(&q) if q == '"' || q == '\'' => {
                    *pos += 1;
                    let start = *pos;
                    while *pos < chars.len() && chars[*pos] != q {
                        *pos += 1;
                    }
                    if *pos >= chars.len() {
                        return Err(invalid(input));
                    }
                    let value: String = chars[start..*pos].iter().collect();
                    *pos += 1;
                    value
                }
                _ => read_ident(chars, pos),
            };
            skip_spaces(chars, pos);
            Some(value)
        }
        _ => return Err(invalid(input)),
    };

    if chars.get(*pos) != Some(&']') {
        return Err(invalid(input));
    }
    *pos += 1;
    Ok(AttrMatcher { name, value })
}

fn skip_spaces(chars: &[char], pos: &mut usize) {
    while *pos < chars.len() && chars[*pos].is_whitespace() {
        *pos += 1;
    }
}

fn match_compound<D: Dom + ?Sized>(compound: &Compound, dom: &D, node: &D::Node) -> bool {
    if dom.node_kind(node) != NodeKind::Element {
        return false;
    }
    if let Some(tag) = &compound.tag {
        if dom.tag_name(node).as_deref() != Some(tag.as_str()) {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if dom.attribute(node, "id").as_deref() != Some(id.as_str()) {
            return false;
        }
    }
    if !compound.classes.iter().all(|c| dom.has_class(node, c)) {
        return false;
    }
    compound.attrs.iter().all(|attr| {
        match (dom.attribute(node, &attr.name), &attr.value) {
            (Some(_), None) => true,
            (Some(actual), Some(expected)) => actual == *expected,
            (None, _) => false,
        }
    })
}

fn match_at<D: Dom + ?Sized>(complex: &Complex, dom: &D, node: &D::Node, idx: usize) -> bool {
    if !match_compound(&complex.compounds[idx], dom, node) {
        return false;
    }
    if idx == 0 {
        return true;
    }
    match complex.combinators[idx - 1] {
        Combinator::Child => dom
            .parent(node)
            .map(|p| match_at(complex, dom, &p, idx - 1))
            .unwrap_or(false),
        Combinator::Descendant => {
            let mut current = dom.parent(node);
            while let Some(ancestor) = current {
                if match_at(complex, dom, &ancestor, idx - 1) {
                    return true;
                }
                current = dom.parent(&ancestor);
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    fn ids(doc: &Document, selector: &str) -> Vec<String> {
        doc.query_all(&doc.root(), selector)
            .unwrap()
            .iter()
            .filter_map(|n| doc.attribute(n, "id"))
            .collect()
    }

    #[test]
    fn test_attribute_value_selector() {
        let doc = Document::parse_html(
            r#"<div id=a contenteditable="true"></div><div id=b contenteditable="false"></div><div id=c contenteditable></div>"#,
        );
        assert_eq!(ids(&doc, r#"div[contenteditable="true"]"#), vec!["a"]);
        assert_eq!(ids(&doc, "[contenteditable]"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_class_and_descendant() {
        let doc = Document::parse_html(
            r#"<div class="notion-page-content x" id=page><section id=sec><div id=blk contenteditable="true"></div></section></div><div id=out contenteditable="true"></div>"#,
        );
        assert_eq!(
            ids(&doc, r#"div.notion-page-content [contenteditable="true"]"#),
            vec!["blk"]
        );
        assert_eq!(ids(&doc, "div.notion-page-content > section"), vec!["sec"]);
        assert_eq!(
            ids(&doc, r#"div.notion-page-content > [contenteditable="true"]"#),
            Vec::<String>::new()
        );
        assert_eq!(ids(&doc, ".x"), vec!["page"]);
    }

    #[test]
    fn test_selector_lists() {
        let doc = Document::parse_html(
            r#"<input id=t type="text"><input id=e type="email"><input id=p type="password"><input id=s type=search>"#,
        );
        assert_eq!(
            ids(
                &doc,
                r#"input[type="text"], input[type="email"], input[type="search"]"#
            ),
            vec!["t", "e", "s"]
        );
    }

    #[test]
    fn test_child_combinator() {
        let doc = Document::parse_html("<ul id=l><li id=a><p id=b></p></li></ul>");
        assert_eq!(ids(&doc, "ul > li"), vec!["a"]);
        assert_eq!(ids(&doc, "ul > p"), Vec::<String>::new());
        assert_eq!(ids(&doc, "ul p"), vec!["b"]);
    }

    #[test]
    fn test_invalid_selectors() {
        for bad in ["", "div[", "div[x=\"y]", ">", "div >", ".", "a,,b", "[=x]"] {
            assert!(
                matches!(SelectorList::parse(bad), Err(DomError::InvalidSelector(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}

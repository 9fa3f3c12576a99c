//! ODT member XML parsing into the working-tree arena.
//!
//! Whitespace in text is preserved exactly as written; collapsing is the
//! paragraph engine's job, not the parser's.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::dom::{Dom, NodeId};
use crate::error::Result;

/// Parse an XML member into a fresh arena tree. Qualified names (prefix
/// included) are kept as the tag and attribute names.
pub fn parse(content: &str) -> Result<Dom> {
    let mut dom = Dom::new();
    let mut reader = Reader::from_str(content);
    let mut stack = vec![dom.document()];

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let node = open_element(&mut dom, &e)?;
                let parent = *stack.last().unwrap_or(&dom.document());
                dom.append(parent, node);
                stack.push(node);
            }
            Event::Empty(e) => {
                let node = open_element(&mut dom, &e)?;
                let parent = *stack.last().unwrap_or(&dom.document());
                dom.append(parent, node);
            }
            Event::End(_) => {
                if stack.len() > 1 {
                    stack.pop();
                }
            }
            Event::Text(e) => {
                let parent = *stack.last().unwrap_or(&dom.document());
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                if !dom.is_document(parent) {
                    dom.append_text(parent, &text);
                }
            }
            Event::CData(e) => {
                let parent = *stack.last().unwrap_or(&dom.document());
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                if !dom.is_document(parent) {
                    dom.append_text(parent, &text);
                }
            }
            Event::GeneralRef(e) => {
                let parent = *stack.last().unwrap_or(&dom.document());
                let entity = String::from_utf8_lossy(e.as_ref());
                if let Some(resolved) = resolve_entity(&entity)
                    && !dom.is_document(parent)
                {
                    dom.append_text(parent, &resolved);
                }
            }
            Event::Eof => break,
            // Declarations, PIs, comments, doctypes carry no content.
            _ => {}
        }
    }

    Ok(dom)
}

fn open_element(dom: &mut Dom, e: &quick_xml::events::BytesStart<'_>) -> Result<NodeId> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let node = dom.create_element(&tag);
    for attr in e.attributes().flatten() {
        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value).into_owned();
        let value = quick_xml::escape::unescape(&raw)
            .map(|v| v.into_owned())
            .unwrap_or(raw);
        dom.set_attr(node, &name, &value);
    }
    Ok(node)
}

/// Resolve an XML entity reference to its text.
///
/// Handles the five predefined entities plus decimal and hex character
/// references. Unknown entities resolve to nothing.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "amp" => Some("&".to_string()),
        "lt" => Some("<".to_string()),
        "gt" => Some(">".to_string()),
        "quot" => Some("\"".to_string()),
        "apos" => Some("'".to_string()),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = if let Some(hex) = code.strip_prefix('x').or_else(|| code.strip_prefix('X'))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                code.parse::<u32>().ok()?
            };
            char::from_u32(value).map(|c| c.to_string())
        }
    }
}

/// Root element of a parsed member (first element child of the document).
pub fn root_element(dom: &Dom) -> NodeId {
    let mut child = dom.first_child(dom.document());
    while child.is_some() && !dom.is_element(child) {
        child = dom.next_sibling(child);
    }
    child
}

/// First descendant element with the given tag, in document order.
pub fn find_first(dom: &Dom, root: NodeId, tag: &str) -> NodeId {
    dom.collect_tags(root, tag)
        .first()
        .copied()
        .unwrap_or(NodeId::NONE)
}

/// Extract the document title from a parsed `meta.xml` tree.
pub fn document_title(dom: &Dom) -> Option<String> {
    let root = root_element(dom);
    if root.is_none() {
        return None;
    }
    let meta = find_first(dom, root, "office:meta");
    if meta.is_none() {
        return None;
    }
    let title = find_first(dom, meta, "dc:title");
    if title.is_none() {
        return None;
    }
    let text = dom.text_content(title).trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_with_attrs() {
        let dom = parse(r#"<text:p text:style-name="Standard">Hello <text:span text:style-name="T1">world</text:span></text:p>"#).unwrap();
        let p = root_element(&dom);
        assert_eq!(dom.tag(p), Some("text:p"));
        assert_eq!(dom.attr(p, "text:style-name"), Some("Standard"));
        let span = dom.next_sibling(dom.first_child(p));
        assert_eq!(dom.tag(span), Some("text:span"));
        assert_eq!(dom.text_content(p), "Hello world");
    }

    #[test]
    fn preserves_whitespace() {
        let dom = parse("<text:p>  two  spaces  </text:p>").unwrap();
        let p = root_element(&dom);
        assert_eq!(dom.text_content(p), "  two  spaces  ");
    }

    #[test]
    fn resolves_entities_in_text_and_attrs() {
        let dom = parse(r#"<text:p text:style-name="a&amp;b">x &amp; y &#8217;</text:p>"#).unwrap();
        let p = root_element(&dom);
        assert_eq!(dom.attr(p, "text:style-name"), Some("a&b"));
        assert_eq!(dom.text_content(p), "x & y \u{2019}");
    }

    #[test]
    fn empty_elements_have_no_children() {
        let dom = parse(r#"<text:p><text:s text:c="3"/></text:p>"#).unwrap();
        let p = root_element(&dom);
        let s = dom.first_child(p);
        assert_eq!(dom.tag(s), Some("text:s"));
        assert!(!dom.has_children(s));
    }

    #[test]
    fn extracts_meta_title() {
        let dom = parse(
            "<office:document-meta><office:meta><dc:title> My Guide </dc:title></office:meta></office:document-meta>",
        )
        .unwrap();
        assert_eq!(document_title(&dom), Some("My Guide".to_string()));
    }

    #[test]
    fn resolve_entity_cases() {
        assert_eq!(resolve_entity("amp"), Some("&".to_string()));
        assert_eq!(resolve_entity("#65"), Some("A".to_string()));
        assert_eq!(resolve_entity("#x2019"), Some("\u{2019}".to_string()));
        assert_eq!(resolve_entity("nbsp"), None);
    }
}

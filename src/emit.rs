//! DITA serialization: finished topics and the map become XML documents.

use std::fmt::Write as _;

use crate::dom::{Dom, NodeId};
use crate::topic::{Topic, TopicKind};

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// The output file name for a topic.
pub fn topic_file_name(topic: &Topic) -> String {
    format!("{}.dita", topic.id)
}

/// A topic with no text at all renders as an empty page and is skipped.
pub fn has_text(topic: &Topic) -> bool {
    !topic.dom.text_content(topic.root).trim().is_empty()
}

/// Serialize one topic as a standalone DITA document.
pub fn topic_document(topic: &Topic) -> String {
    let (public, dtd) = match topic.kind {
        TopicKind::Concept => ("Concept", "concept.dtd"),
        TopicKind::Task => ("Task", "task.dtd"),
        TopicKind::Reference => ("Reference", "reference.dtd"),
    };
    let mut doc = String::from(XML_DECL);
    writeln!(
        doc,
        "<!DOCTYPE {root} PUBLIC \"-//OASIS//DTD DITA {public}//EN\" \"{dtd}\">",
        root = topic.kind.root_tag()
    )
    .unwrap();
    write_subtree(&topic.dom, topic.root, &mut doc);
    doc.push('\n');
    doc
}

/// Serialize the map tying the topics together. Hierarchy follows topic
/// levels; a level can step at most one deeper than its predecessor.
pub fn map_document(title: &str, topics: &[&Topic]) -> String {
    let mut dom = Dom::new();
    let map = dom.create_element("map");
    dom.set_attr(map, "xml:lang", "en-us");
    dom.set_attr(
        map,
        "xmlns:ditaarch",
        "http://dita.oasis-open.org/architecture/2005/",
    );
    let document = dom.document();
    dom.append(document, map);
    let title_el = dom.create_element("title");
    dom.append(map, title_el);
    dom.append_text(title_el, title);

    // Stack of open topicrefs; level 0 stands for the map itself.
    let mut stack: Vec<(u32, NodeId)> = vec![(0, map)];
    for topic in topics {
        let last = stack.last().map_or(0, |(l, _)| *l);
        let level = topic.level.max(1).min(last + 1);
        while stack.last().is_some_and(|(l, _)| *l >= level) {
            stack.pop();
        }
        let parent = stack.last().map_or(map, |(_, n)| *n);
        let tref = dom.create_element("topicref");
        dom.set_attr(tref, "href", &topic_file_name(topic));
        dom.set_attr(tref, "format", "dita");
        dom.append(parent, tref);
        stack.push((level, tref));
    }

    let mut doc = String::from(XML_DECL);
    doc.push_str("<!DOCTYPE map PUBLIC \"-//OASIS//DTD DITA Map//EN\" \"map.dtd\">\n");
    write_subtree(&dom, map, &mut doc);
    doc.push('\n');
    doc
}

fn write_subtree(dom: &Dom, node: NodeId, out: &mut String) {
    if let Some(text) = dom.text(node) {
        out.push_str(&escape_xml(text));
        return;
    }
    let Some(tag) = dom.tag(node) else { return };
    write!(out, "<{tag}").unwrap();
    for (name, value) in dom.attrs(node) {
        write!(out, " {name}=\"{}\"", escape_xml(value)).unwrap();
    }
    if !dom.has_children(node) {
        out.push_str("/>");
        return;
    }
    out.push('>');
    let mut child = dom.first_child(node);
    while child.is_some() {
        write_subtree(dom, child, out);
        child = dom.next_sibling(child);
    }
    write!(out, "</{tag}>").unwrap();
}

/// Escape text for use in XML content or attribute values.
pub fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

//! The rewrite pipeline: ordered structural passes over the working tree.
//!
//! Each pass is small, self-contained, and runs exactly once (internally
//! looping to a fixed point where needed). The order is load-bearing:
//! whitespace cleanup must precede line-break splitting, nesting repair
//! must precede the unwrap passes, and code-block detection must see the
//! already-merged lists and inline tags.

pub mod admonition;
pub mod codeblock;
pub mod inline;
pub mod linebreak;
pub mod lists;
pub mod nesting;
pub mod prune;
pub mod space;
pub mod table;
pub mod unwrap;

use crate::dom::{Dom, NodeId};
use crate::log::RunLog;
use crate::refs::Forwards;

/// Run every pass over the body, in order.
pub fn run(dom: &mut Dom, body: NodeId, forwards: &mut Forwards, log: &mut RunLog) {
    space::pass(dom, body, forwards, log);
    linebreak::pass(dom, body, forwards, log);
    nesting::pass(dom, body, forwards, log);
    unwrap::first_child_pass(dom, body, forwards, log);
    unwrap::footnotes_pass(dom, body, forwards, log);
    lists::join_pass(dom, body, forwards, log);
    lists::collapse_pass(dom, body, forwards, log);
    inline::pass(dom, body, forwards, log);
    table::pass(dom, body, forwards, log);
    codeblock::pass(dom, body, forwards, log);
    prune::prune_childless(dom, forwards, log, body);
    admonition::notes_pass(dom, body, forwards, log);
    admonition::paragraphs_pass(dom, body, forwards, log);
}

/// True when a paragraph-like node holds only text and simple inline
/// formatting, transitively. Anything structural (links, images, lists)
/// makes it non-simple.
pub(crate) fn is_simple_paragraph(dom: &Dom, node: NodeId) -> bool {
    for child in dom.children(node) {
        if dom.is_text(child) {
            continue;
        }
        let simple_tag = matches!(dom.tag(child), Some("b" | "i" | "codeph"));
        if simple_tag && is_simple_paragraph(dom, child) {
            continue;
        }
        return false;
    }
    true
}

/// True when the subtree's visible text is empty or all whitespace.
pub(crate) fn is_blank(dom: &Dom, node: NodeId) -> bool {
    dom.text_content(node).trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odt::xml;

    /// Parse a DITA-shaped fragment into a working tree for pass tests.
    /// Returns the tree and the root element of the fragment.
    pub(crate) fn tree(fragment: &str) -> (Dom, NodeId) {
        let dom = xml::parse(fragment).expect("test fragment parses");
        let root = xml::root_element(&dom);
        (dom, root)
    }

    /// Serialize a subtree to a compact string for assertions.
    pub(crate) fn render(dom: &Dom, node: NodeId) -> String {
        let mut out = String::new();
        render_into(dom, node, &mut out);
        out
    }

    fn render_into(dom: &Dom, node: NodeId, out: &mut String) {
        if let Some(text) = dom.text(node) {
            out.push_str(text);
            return;
        }
        if let Some(tag) = dom.tag(node) {
            out.push('<');
            out.push_str(tag);
            for (name, value) in dom.attrs(node) {
                out.push_str(&format!(" {name}=\"{value}\""));
            }
            out.push('>');
            for child in dom.children(node) {
                render_into(dom, child, out);
            }
            out.push_str(&format!("</{tag}>"));
        } else {
            for child in dom.children(node) {
                render_into(dom, child, out);
            }
        }
    }

    #[test]
    fn simple_paragraph_detection() {
        let (dom, root) = tree("<p>plain <b>bold <i>nested</i></b></p>");
        assert!(is_simple_paragraph(&dom, root));
        let (dom, root) = tree("<p>has a <xref>link</xref></p>");
        assert!(!is_simple_paragraph(&dom, root));
    }

    #[test]
    fn blank_detection() {
        let (dom, root) = tree("<p> \n <b>  </b></p>");
        assert!(is_blank(&dom, root));
        let (dom, root) = tree("<p> x </p>");
        assert!(!is_blank(&dom, root));
    }

    #[test]
    fn full_pipeline_smoke() {
        let (mut dom, root) = tree(
            "<conbody><p>one</p><ul><li><p>first</p></li></ul><ul><li><p>second</p></li></ul></conbody>",
        );
        let mut fwd = Forwards::new();
        let mut log = RunLog::new();
        run(&mut dom, root, &mut fwd, &mut log);
        // Lists merged; item paragraphs unwrapped.
        let rendered = render(&dom, root);
        assert_eq!(
            rendered,
            "<conbody><p>one</p><ul><li>first</li><li>second</li></ul></conbody>"
        );
    }
}

//! First-child unwrapping for containers whose leading paragraph is
//! redundant, and footnote body normalization.

use crate::dom::{Dom, NodeId};
use crate::log::RunLog;
use crate::refs::{self, Forwards};

/// Containers where a leading `p` wrapper adds nothing.
const UNWRAP_IN: [&str; 3] = ["li", "entry", "fn"];

/// A first-child paragraph dissolves into its container: the container
/// takes its id and attributes, and its children move up in place.
pub fn first_child_pass(dom: &mut Dom, body: NodeId, forwards: &mut Forwards, _log: &mut RunLog) {
    for tag in UNWRAP_IN {
        for node in dom.collect_tags(body, tag) {
            let first = dom.first_child(node);
            if dom.is_tag(first, "p") {
                unwrap_into(dom, forwards, node, first);
            }
        }
    }
}

/// Footnotes: a leading `note` child (a note-styled source paragraph)
/// dissolves like a leading `p`; remaining `note` children become plain
/// paragraphs, since a footnote is already an aside.
pub fn footnotes_pass(dom: &mut Dom, body: NodeId, forwards: &mut Forwards, _log: &mut RunLog) {
    for fn_node in dom.collect_tags(body, "fn") {
        let first = dom.first_child(fn_node);
        if dom.is_tag(first, "note") {
            unwrap_into(dom, forwards, fn_node, first);
        }
        for child in dom.child_ids(fn_node) {
            if dom.is_tag(child, "note") {
                dom.set_tag(child, "p");
                dom.remove_attr(child, "type");
            }
        }
    }
}

fn unwrap_into(dom: &mut Dom, forwards: &mut Forwards, container: NodeId, wrapper: NodeId) {
    refs::move_id(dom, forwards, wrapper, container);
    dom.copy_attrs(wrapper, container);
    loop {
        let child = dom.first_child(wrapper);
        if child.is_none() {
            break;
        }
        dom.insert_before(wrapper, child);
    }
    dom.detach(wrapper);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::tests::{render, tree};

    #[test]
    fn list_item_first_paragraph_unwraps() {
        let (mut dom, root) = tree("<conbody><ul><li><p>a</p><p>b</p></li></ul></conbody>");
        let mut fwd = Forwards::new();
        let mut log = RunLog::new();
        first_child_pass(&mut dom, root, &mut fwd, &mut log);
        assert_eq!(
            render(&dom, root),
            "<conbody><ul><li>a<p>b</p></li></ul></conbody>"
        );
    }

    #[test]
    fn unwrapped_paragraph_attrs_move_to_container() {
        let (mut dom, root) = tree(
            r#"<conbody><table><tgroup><tbody><row><entry><p id="x" otherprops="codeph">c</p></entry></row></tbody></tgroup></table></conbody>"#,
        );
        let mut fwd = Forwards::new();
        let mut log = RunLog::new();
        first_child_pass(&mut dom, root, &mut fwd, &mut log);
        let entry = dom.collect_tags(root, "entry")[0];
        assert_eq!(dom.attr(entry, "id"), Some("x"));
        assert_eq!(dom.attr(entry, "otherprops"), Some("codeph"));
        assert_eq!(dom.text_content(entry), "c");
        assert!(dom.collect_tags(root, "p").is_empty());
    }

    #[test]
    fn footnote_notes_become_paragraphs() {
        let (mut dom, root) =
            tree("<conbody><p><fn><note>lead</note><note>more</note></fn></p></conbody>");
        let mut fwd = Forwards::new();
        let mut log = RunLog::new();
        footnotes_pass(&mut dom, root, &mut fwd, &mut log);
        assert_eq!(
            render(&dom, root),
            "<conbody><p><fn>lead<p>more</p></fn></p></conbody>"
        );
    }
}

//! Whitespace cleanup: formatting wrappers around pure whitespace, and
//! blank simple paragraphs.

use crate::dom::{Dom, NodeId};
use crate::log::RunLog;
use crate::refs::{self, Forwards};

use super::{is_blank, is_simple_paragraph};

const WRAPPERS: [&str; 3] = ["b", "i", "note"];

pub fn pass(dom: &mut Dom, body: NodeId, forwards: &mut Forwards, log: &mut RunLog) {
    // A wrapper whose only child is whitespace text loses the wrapper;
    // unwrapping may expose the parent as the next candidate, so loop to
    // a fixed point.
    loop {
        let mut hits = false;
        for tag in WRAPPERS {
            for node in dom.collect_tags(body, tag) {
                if dom.parent(node).is_none() {
                    continue;
                }
                let only = dom.first_child(node);
                if only.is_none() || dom.next_sibling(only).is_some() {
                    continue;
                }
                let Some(text) = dom.text(only) else { continue };
                if text.is_empty() || !text.trim().is_empty() {
                    continue;
                }
                dom.detach(only);
                dom.insert_before(node, only);
                refs::destroy_node(dom, forwards, log, node);
                hits = true;
            }
        }
        if !hits {
            break;
        }
    }

    // Blank simple paragraphs are emptied; the code-block pass still
    // sees them as separators before the final prune drops them.
    for p in dom.collect_tags(body, "p") {
        if is_simple_paragraph(dom, p) && is_blank(dom, p) {
            while dom.has_children(p) {
                let child = dom.first_child(p);
                refs::destroy_node(dom, forwards, log, child);
            }
        }
    }
}

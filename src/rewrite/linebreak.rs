//! Line-break splitting, and the elevation helper it shares with the
//! nesting pass.

use crate::dom::{Dom, NodeId};
use crate::log::RunLog;
use crate::refs::{self, Forwards};

/// Raise `node` until its parent's tag is in `allowed`, splitting each
/// intervening ancestor into a left and right clone around it. Returns
/// false (logging) when the document root is reached instead.
pub(crate) fn elevate(
    dom: &mut Dom,
    forwards: &mut Forwards,
    log: &mut RunLog,
    node: NodeId,
    allowed: &[&str],
) -> bool {
    loop {
        let parent = dom.parent(node);
        if parent.is_none() || dom.is_document(parent) {
            log.warning("element raised to the document root during elevation");
            return false;
        }
        if let Some(tag) = dom.tag(parent)
            && allowed.contains(&tag)
        {
            return true;
        }
        let grandparent = dom.parent(parent);
        if grandparent.is_none() {
            log.warning("element raised to a detached subtree during elevation");
            return false;
        }
        let parent_tag = dom.tag(parent).unwrap_or("p").to_string();

        // The parent's id stays with the leading content, which is the
        // raised node itself when nothing precedes it.
        let first = dom.first_child(parent);
        if dom.is_element(first) {
            refs::move_id(dom, forwards, parent, first);
        }

        if dom.prev_sibling(node).is_some() {
            let left = dom.create_element(&parent_tag);
            dom.copy_attrs(parent, left);
            dom.remove_attr(left, "id");
            dom.insert_before(parent, left);
            while dom.first_child(parent) != node {
                let c = dom.first_child(parent);
                dom.append(left, c);
            }
        }
        if dom.next_sibling(node).is_some() {
            let right = dom.create_element(&parent_tag);
            dom.copy_attrs(parent, right);
            dom.remove_attr(right, "id");
            dom.insert_after(parent, right);
            loop {
                let n = dom.next_sibling(node);
                if n.is_none() {
                    break;
                }
                dom.append(right, n);
            }
        }
        dom.insert_before(parent, node);
        // The old parent is now childless; any id still on it rescues to
        // a neighbor.
        refs::destroy_node(dom, forwards, log, parent);
    }
}

/// Split paragraphs at line-break markers: everything before the marker
/// moves into a new preceding paragraph, which also takes the original
/// paragraph's attributes and anchor.
pub fn pass(dom: &mut Dom, body: NodeId, forwards: &mut Forwards, log: &mut RunLog) {
    for marker in dom.collect_tags(body, "temp:linebreak") {
        if dom.parent(marker).is_none() {
            continue;
        }
        if !elevate(dom, forwards, log, marker, &["p"]) {
            refs::destroy_node(dom, forwards, log, marker);
            continue;
        }
        let paragraph = dom.parent(marker);
        let new_prev = dom.create_element("p");
        refs::move_id(dom, forwards, paragraph, new_prev);
        dom.copy_attrs(paragraph, new_prev);
        dom.insert_before(paragraph, new_prev);
        while dom.first_child(paragraph) != marker {
            let c = dom.first_child(paragraph);
            dom.append(new_prev, c);
        }
        refs::destroy_node(dom, forwards, log, marker);
    }
}

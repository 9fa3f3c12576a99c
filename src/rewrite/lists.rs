//! List merging: adjacent same-kind lists fuse, and single-item lists
//! holding only another list collapse away.

use std::collections::HashMap;

use crate::dom::{Dom, NodeId};
use crate::log::RunLog;
use crate::refs::{self, Forwards};

/// Merge runs of adjacent same-tag containers into the first of the run.
/// Shared with the inline pass.
pub(crate) fn join_adjacent(dom: &mut Dom, forwards: &mut Forwards, body: NodeId, tag: &str) {
    // Merged nodes stay linked until the end so that chains of three or
    // more all find their way to the run head.
    let mut merged_into: HashMap<NodeId, NodeId> = HashMap::new();
    for node in dom.collect_tags(body, tag) {
        let prev = dom.prev_sibling(node);
        if prev.is_none() || dom.tag(prev) != Some(tag) {
            continue;
        }
        let dest = *merged_into.get(&prev).unwrap_or(&prev);
        refs::move_id(dom, forwards, node, dest);
        dom.move_children(node, dest, None);
        merged_into.insert(node, dest);
    }
    for node in merged_into.keys() {
        dom.detach(*node);
    }
}

/// Merge adjacent lists of the same kind.
pub fn join_pass(dom: &mut Dom, body: NodeId, forwards: &mut Forwards, _log: &mut RunLog) {
    join_adjacent(dom, forwards, body, "ul");
    join_adjacent(dom, forwards, body, "ol");
}

/// Collapse a list whose single item holds nothing but another list: the
/// inner list takes the outer one's place.
pub fn collapse_pass(dom: &mut Dom, body: NodeId, forwards: &mut Forwards, log: &mut RunLog) {
    loop {
        let mut changed = false;
        let mut lists = dom.collect_tags(body, "ul");
        lists.extend(dom.collect_tags(body, "ol"));
        for list in lists {
            if dom.parent(list).is_none() || dom.child_count(list) != 1 {
                continue;
            }
            let li = dom.first_child(list);
            if !dom.is_tag(li, "li") || dom.child_count(li) != 1 {
                continue;
            }
            let inner = dom.first_child(li);
            if !dom.is_tag(inner, "ul") && !dom.is_tag(inner, "ol") {
                continue;
            }
            dom.insert_before(list, inner);
            refs::destroy_node(dom, forwards, log, list);
            changed = true;
            break;
        }
        if !changed {
            break;
        }
    }
}

//! Id and cross-reference maintenance.
//!
//! Bookmark anchors become `id` attributes in the working tree; every
//! structural rewrite that removes or splits an element must keep those
//! ids reachable. The forward table records where an id went when its
//! carrier changed (`Some(target)`) or that it is gone (`None`).

use std::collections::HashMap;

use crate::dom::{Dom, NodeId};
use crate::log::RunLog;

/// Bookmark name -> forwarded bookmark name, or `None` when broken.
pub type Forwards = HashMap<String, Option<String>>;

/// Containers an id must never be rescued onto: an id on one of these
/// would address a whole topic body rather than a location in it.
const NO_RESCUE_TAGS: [&str; 3] = ["conbody", "section", "context"];

/// Move the `id` attribute of `from` onto `to`.
///
/// When `to` already carries a different id, the moved id is forwarded to
/// it instead, and existing forwards pointing at the moved id are
/// repointed.
pub fn move_id(dom: &mut Dom, forwards: &mut Forwards, from: NodeId, to: NodeId) {
    if from.is_none() || to.is_none() {
        return;
    }
    let moved = match dom.attr(from, "id") {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return,
    };
    match dom.attr(to, "id") {
        Some(existing) if !existing.is_empty() && existing != moved => {
            let target = existing.to_string();
            repoint(forwards, &moved, Some(target.clone()));
            forwards.insert(moved, Some(target));
        }
        _ => {
            dom.set_attr(to, "id", &moved);
        }
    }
    dom.remove_attr(from, "id");
}

/// Keep the id of a node that is about to be removed, by moving it to the
/// nearest surviving element: next sibling, previous sibling, then the
/// parent. If nothing can take it, the id is recorded as broken.
pub fn rescue_id(dom: &mut Dom, forwards: &mut Forwards, log: &mut RunLog, node: NodeId) {
    let id = match dom.attr(node, "id") {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return,
    };

    let next = dom.next_element_sibling(node);
    if next.is_some() {
        move_id(dom, forwards, node, next);
        return;
    }
    let prev = dom.prev_element_sibling(node);
    if prev.is_some() {
        move_id(dom, forwards, node, prev);
        return;
    }
    let parent = dom.parent(node);
    if dom.is_element(parent)
        && let Some(tag) = dom.tag(parent)
        && !NO_RESCUE_TAGS.contains(&tag)
    {
        move_id(dom, forwards, node, parent);
        return;
    }

    log.error(format!("bookmark '{id}' lost its target"));
    repoint(forwards, &id, None);
    forwards.insert(id, None);
    dom.remove_attr(node, "id");
}

/// Remove a node and its subtree from the document, rescuing every id in
/// it, deepest first.
pub fn destroy_node(dom: &mut Dom, forwards: &mut Forwards, log: &mut RunLog, node: NodeId) {
    loop {
        let child = dom.first_child(node);
        if child.is_none() {
            break;
        }
        destroy_node(dom, forwards, log, child);
    }
    rescue_id(dom, forwards, log, node);
    dom.detach(node);
}

fn repoint(forwards: &mut Forwards, old_target: &str, new_target: Option<String>) {
    for value in forwards.values_mut() {
        if value.as_deref() == Some(old_target) {
            *value = new_target.clone();
        }
    }
}

/// Follow a forward chain to its final bookmark name. `None` when the
/// chain ends broken or cycles.
pub fn resolve_forward<'a>(forwards: &'a Forwards, name: &'a str) -> Option<&'a str> {
    let mut current = name;
    let mut seen = vec![current];
    while let Some(next) = forwards.get(current) {
        match next {
            Some(target) => {
                if seen.contains(&target.as_str()) {
                    return None;
                }
                current = target;
                seen.push(current);
            }
            None => return None,
        }
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let root = dom.create_element("conbody");
        dom.append(dom.document(), root);
        (dom, root)
    }

    #[test]
    fn move_id_to_bare_target() {
        let (mut dom, root) = body();
        let a = dom.create_element("p");
        dom.set_attr(a, "id", "anchor");
        dom.append(root, a);
        let b = dom.create_element("p");
        dom.append(root, b);
        let mut fwd = Forwards::new();
        move_id(&mut dom, &mut fwd, a, b);
        assert_eq!(dom.attr(a, "id"), None);
        assert_eq!(dom.attr(b, "id"), Some("anchor"));
        assert!(fwd.is_empty());
    }

    #[test]
    fn move_id_onto_occupied_target_forwards() {
        let (mut dom, root) = body();
        let a = dom.create_element("p");
        dom.set_attr(a, "id", "one");
        dom.append(root, a);
        let b = dom.create_element("p");
        dom.set_attr(b, "id", "two");
        dom.append(root, b);
        let mut fwd = Forwards::new();
        move_id(&mut dom, &mut fwd, a, b);
        assert_eq!(dom.attr(b, "id"), Some("two"));
        assert_eq!(fwd.get("one"), Some(&Some("two".to_string())));
    }

    #[test]
    fn rescue_prefers_next_then_prev_then_parent() {
        let (mut dom, root) = body();
        let wrapper = dom.create_element("note");
        dom.append(root, wrapper);
        let doomed = dom.create_element("p");
        dom.set_attr(doomed, "id", "x");
        dom.append(wrapper, doomed);
        let mut fwd = Forwards::new();
        let mut log = RunLog::new();
        rescue_id(&mut dom, &mut fwd, &mut log, doomed);
        assert_eq!(dom.attr(wrapper, "id"), Some("x"));

        // Sibling beats parent.
        let doomed2 = dom.create_element("p");
        dom.set_attr(doomed2, "id", "y");
        dom.append(wrapper, doomed2);
        let next = dom.create_element("p");
        dom.append(wrapper, next);
        rescue_id(&mut dom, &mut fwd, &mut log, doomed2);
        assert_eq!(dom.attr(next, "id"), Some("y"));
    }

    #[test]
    fn rescue_refuses_body_containers() {
        let (mut dom, root) = body();
        let doomed = dom.create_element("p");
        dom.set_attr(doomed, "id", "gone");
        dom.append(root, doomed);
        let mut fwd = Forwards::new();
        let mut log = RunLog::new();
        rescue_id(&mut dom, &mut fwd, &mut log, doomed);
        assert_eq!(dom.attr(root, "id"), None);
        assert_eq!(fwd.get("gone"), Some(&None));
        assert_eq!(log.max_severity(), Some(crate::log::Severity::Error));
    }

    #[test]
    fn destroy_rescues_nested_ids() {
        let (mut dom, root) = body();
        let keep = dom.create_element("p");
        dom.append(root, keep);
        let doomed = dom.create_element("p");
        dom.append(root, doomed);
        let inner = dom.create_element("b");
        dom.set_attr(inner, "id", "deep");
        dom.append(doomed, inner);
        let mut fwd = Forwards::new();
        let mut log = RunLog::new();
        destroy_node(&mut dom, &mut fwd, &mut log, doomed);
        assert_eq!(dom.child_count(root), 1);
        // Rescued to the doomed wrapper first, then out to the survivor.
        assert_eq!(dom.attr(keep, "id"), Some("deep"));
    }

    #[test]
    fn forward_chains_resolve_and_cycles_break() {
        let mut fwd = Forwards::new();
        fwd.insert("a".to_string(), Some("b".to_string()));
        fwd.insert("b".to_string(), Some("c".to_string()));
        assert_eq!(resolve_forward(&fwd, "a"), Some("c"));
        assert_eq!(resolve_forward(&fwd, "c"), Some("c"));

        fwd.insert("c".to_string(), Some("a".to_string()));
        assert_eq!(resolve_forward(&fwd, "a"), None);

        fwd.insert("d".to_string(), None);
        assert_eq!(resolve_forward(&fwd, "d"), None);
    }
}

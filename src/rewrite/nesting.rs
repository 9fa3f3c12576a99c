//! Nesting legality: paragraphs may only live in containers that allow
//! them; offenders are elevated out.

use std::collections::HashSet;

use crate::dom::{Dom, NodeId};
use crate::log::RunLog;
use crate::refs::Forwards;

use super::linebreak::elevate;

/// Containers a `p` may sit in directly.
const CAN_CONTAIN_P: [&str; 5] = ["conbody", "li", "entry", "fn", "note"];

pub fn pass(dom: &mut Dom, body: NodeId, forwards: &mut Forwards, log: &mut RunLog) {
    // Each round either fixes an offender, moves it strictly closer to a
    // legal ancestor, or retires it to the skip set, so the scan ends.
    let mut skipped: HashSet<NodeId> = HashSet::new();
    loop {
        let offender = dom.collect_tags(body, "p").into_iter().find(|p| {
            if skipped.contains(p) {
                return false;
            }
            let parent = dom.parent(*p);
            dom.is_element(parent)
                && !CAN_CONTAIN_P.contains(&dom.tag(parent).unwrap_or(""))
        });
        let Some(p) = offender else { break };
        let parent_before = dom.parent(p);
        if !elevate(dom, forwards, log, p, &CAN_CONTAIN_P) && dom.parent(p) == parent_before {
            skipped.insert(p);
        }
    }
}

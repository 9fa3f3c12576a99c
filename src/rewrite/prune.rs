//! Removal of childless formatting wrappers and empty paragraphs.

use crate::dom::{Dom, NodeId};
use crate::log::RunLog;
use crate::refs::{self, Forwards};

/// Tags that carry no meaning without content.
const PRUNABLE: [&str; 6] = ["p", "b", "i", "u", "codeph", "note"];

/// Remove childless prunable elements under `root`, bottom-up so that
/// emptied wrappers cascade. `root` itself is never removed. Ids on
/// pruned elements are rescued.
pub fn prune_childless(dom: &mut Dom, forwards: &mut Forwards, log: &mut RunLog, root: NodeId) {
    for child in dom.child_ids(root) {
        prune_childless(dom, forwards, log, child);
        if let Some(tag) = dom.tag(child)
            && PRUNABLE.contains(&tag)
            && !dom.has_children(child)
        {
            refs::destroy_node(dom, forwards, log, child);
        }
    }
}

//! Inline merging: immediately adjacent same-tag formatting elements fuse.

use crate::dom::{Dom, NodeId};
use crate::log::RunLog;
use crate::refs::Forwards;

use super::lists::join_adjacent;

const JOINABLE: [&str; 4] = ["b", "i", "u", "codeph"];

pub fn pass(dom: &mut Dom, body: NodeId, forwards: &mut Forwards, _log: &mut RunLog) {
    for tag in JOINABLE {
        join_adjacent(dom, forwards, body, tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::tests::{render, tree};

    fn run(fragment: &str) -> String {
        let (mut dom, root) = tree(fragment);
        let mut fwd = Forwards::new();
        let mut log = RunLog::new();
        pass(&mut dom, root, &mut fwd, &mut log);
        render(&dom, root)
    }

    #[test]
    fn adjacent_bold_runs_fuse_with_text_merge() {
        assert_eq!(
            run("<conbody><p><b>one</b><b> two</b></p></conbody>"),
            "<conbody><p><b>one two</b></p></conbody>"
        );
    }

    #[test]
    fn text_between_runs_blocks_fusing() {
        let fragment = "<conbody><p><b>one</b> and <b>two</b></p></conbody>";
        assert_eq!(run(fragment), fragment);
    }

    #[test]
    fn codeph_runs_fuse() {
        assert_eq!(
            run("<conbody><p><codeph>ls</codeph><codeph> -la</codeph></p></conbody>"),
            "<conbody><p><codeph>ls -la</codeph></p></conbody>"
        );
    }
}

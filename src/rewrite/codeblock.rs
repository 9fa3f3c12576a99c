//! Code-block detection: monospace paragraphs fuse into `codeblock`
//! elements, with blank paragraphs acting as separators.

use std::collections::HashSet;

use crate::dom::{Dom, NodeId};
use crate::log::RunLog;
use crate::refs::{self, Forwards};

use super::is_simple_paragraph;

pub fn pass(dom: &mut Dom, body: NodeId, forwards: &mut Forwards, _log: &mut RunLog) {
    let mut absorbed: HashSet<NodeId> = HashSet::new();

    for p in dom.collect_tags(body, "p") {
        if !is_simple_paragraph(dom, p) {
            continue;
        }

        let mut is_code = false;
        let mut is_blank_para = false;
        if dom.has_children(p) {
            if dom
                .attr(p, "otherprops")
                .is_some_and(|v| v.contains("codeph"))
            {
                // The paragraph-wide monospace wrapper is redundant once
                // the paragraph itself becomes the code container.
                if let Some(wrapper) = find_sole_codeph(dom, p) {
                    let parent = dom.parent(wrapper);
                    dom.move_children(wrapper, parent, None);
                    dom.detach(wrapper);
                }
                is_code = true;
            }
        } else {
            is_blank_para = true;
        }

        let mut prev = dom.prev_sibling(p);
        while prev.is_some() && absorbed.contains(&prev) {
            prev = dom.prev_sibling(prev);
        }
        let prev_is_block = dom.is_tag(prev, "codeblock");

        if prev_is_block && (is_code || is_blank_para) {
            dom.move_children(p, prev, Some("\n"));
            refs::move_id(dom, forwards, p, prev);
            absorbed.insert(p);
        } else if is_code {
            dom.set_tag(p, "codeblock");
        }
    }

    for p in absorbed {
        dom.detach(p);
    }

    // Blank separators at the end of a block would render as trailing
    // empty lines.
    for block in dom.collect_tags(body, "codeblock") {
        let last = dom.last_child(block);
        if let Some(text) = dom.text(last) {
            let trimmed = text.trim_end_matches('\n').to_string();
            if trimmed.is_empty() {
                dom.detach(last);
            } else {
                dom.set_text(last, trimmed);
            }
        }
    }
}

/// Find the formatting wrapper chain's `codeph`, if the paragraph is
/// wrapped whole.
fn find_sole_codeph(dom: &Dom, p: NodeId) -> Option<NodeId> {
    let mut current = p;
    loop {
        if dom.child_count(current) != 1 {
            return None;
        }
        let only = dom.first_child(current);
        if !dom.is_element(only) {
            return None;
        }
        if dom.is_tag(only, "codeph") {
            return Some(only);
        }
        current = only;
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
    fn lone_code_paragraph_becomes_codeblock() {
        assert_eq!(
            run(r#"<conbody><p otherprops="codeph"><codeph>ls -la</codeph></p></conbody>"#),
            r#"<conbody><codeblock otherprops="codeph">ls -la</codeblock></conbody>"#
        );
    }

    #[test]
    fn consecutive_code_paragraphs_fuse_with_newlines() {
        assert_eq!(
            run(concat!(
                r#"<conbody><p otherprops="codeph"><codeph>line one</codeph></p>"#,
                r#"<p otherprops="codeph"><codeph>line two</codeph></p></conbody>"#
            )),
            r#"<conbody><codeblock otherprops="codeph">line one
line two</codeblock></conbody>"#
        );
    }

    #[test]
    fn blank_paragraph_between_code_lines_is_a_separator() {
        assert_eq!(
            run(concat!(
                r#"<conbody><p otherprops="codeph"><codeph>a</codeph></p>"#,
                r#"<p></p>"#,
                r#"<p otherprops="codeph"><codeph>b</codeph></p></conbody>"#
            )),
            "<conbody><codeblock otherprops=\"codeph\">a\n\nb</codeblock></conbody>"
        );
    }

    #[test]
    fn trailing_blank_lines_trimmed() {
        assert_eq!(
            run(concat!(
                r#"<conbody><p otherprops="codeph"><codeph>a</codeph></p>"#,
                r#"<p></p></conbody>"#
            )),
            r#"<conbody><codeblock otherprops="codeph">a</codeblock></conbody>"#
        );
    }

    #[test]
    fn blank_paragraph_without_preceding_code_survives() {
        assert_eq!(run("<conbody><p></p><p>x</p></conbody>"), "<conbody><p></p><p>x</p></conbody>");
    }

    #[test]
    fn structured_paragraph_breaks_the_block() {
        let out = run(concat!(
            r#"<conbody><p otherprops="codeph"><codeph>a</codeph></p>"#,
            r#"<p otherprops="codeph"><codeph>b</codeph><image href="x.png"></image></p></conbody>"#
        ));
        // The second paragraph is not simple, so it stays a paragraph.
        assert!(out.contains("<codeblock otherprops=\"codeph\">a</codeblock>"));
        assert!(out.contains("<image"));
    }
}

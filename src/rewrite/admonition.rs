//! Admonition typing: leading keywords in notes and plain paragraphs
//! select the DITA note type.

use crate::dom::{Dom, NodeId};
use crate::log::RunLog;
use crate::refs::{self, Forwards};

use super::is_simple_paragraph;

/// Recognized admonition keywords, which double as `type` values.
const NOTE_TYPES: [&str; 9] = [
    "note",
    "attention",
    "caution",
    "danger",
    "fastpath",
    "important",
    "remember",
    "restriction",
    "tip",
];

/// Type `note` elements from their leading keyword, dropping the keyword
/// text (the rendered label replaces it).
pub fn notes_pass(dom: &mut Dom, body: NodeId, forwards: &mut Forwards, log: &mut RunLog) {
    for note in dom.collect_tags(body, "note") {
        let tnode = dom.first_text(note);
        if tnode.is_none() {
            continue;
        }
        let Some(text) = dom.text(tnode).map(str::to_string) else {
            continue;
        };
        if let Some((kind, rest)) = match_keyword(&text, false) {
            dom.set_attr(note, "type", kind);
            replace_leading_text(dom, forwards, log, note, tnode, &rest);
        }
    }
}

/// Plain simple paragraphs starting with "<keyword>:" become typed notes.
pub fn paragraphs_pass(dom: &mut Dom, body: NodeId, forwards: &mut Forwards, log: &mut RunLog) {
    for p in dom.collect_tags(body, "p") {
        if !is_simple_paragraph(dom, p) {
            continue;
        }
        let tnode = dom.first_text(p);
        if tnode.is_none() {
            continue;
        }
        let Some(text) = dom.text(tnode).map(str::to_string) else {
            continue;
        };
        if let Some((kind, rest)) = match_keyword(&text, true) {
            dom.set_tag(p, "note");
            dom.set_attr(p, "type", kind);
            replace_leading_text(dom, forwards, log, p, tnode, &rest);
        }
    }
}

/// Match a leading admonition keyword, optionally requiring the colon
/// form. Returns the type and the text with keyword and punctuation
/// stripped.
fn match_keyword(text: &str, require_colon: bool) -> Option<(&'static str, String)> {
    let trimmed = text.trim_start();
    let lower = trimmed.to_lowercase();
    for kind in NOTE_TYPES {
        let matched = if require_colon {
            lower.starts_with(&format!("{kind}:"))
        } else {
            lower.starts_with(kind)
        };
        if matched {
            let rest: String = trimmed[kind.len()..]
                .chars()
                .skip_while(|c| !c.is_alphanumeric())
                .collect();
            return Some((kind, rest));
        }
    }
    None
}

fn replace_leading_text(
    dom: &mut Dom,
    forwards: &mut Forwards,
    log: &mut RunLog,
    container: NodeId,
    tnode: NodeId,
    rest: &str,
) {
    if rest.is_empty() {
        refs::destroy_node(dom, forwards, log, tnode);
        super::prune::prune_childless(dom, forwards, log, container);
    } else {
        dom.set_text(tnode, rest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::tests::{render, tree};

    fn run_both(fragment: &str) -> String {
        let (mut dom, root) = tree(fragment);
        let mut fwd = Forwards::new();
        let mut log = RunLog::new();
        notes_pass(&mut dom, root, &mut fwd, &mut log);
        paragraphs_pass(&mut dom, root, &mut fwd, &mut log);
        render(&dom, root)
    }

    #[test]
    fn note_element_gets_type_from_keyword() {
        assert_eq!(
            run_both("<conbody><note>Attention: check the cable.</note></conbody>"),
            r#"<conbody><note type="attention">check the cable.</note></conbody>"#
        );
    }

    #[test]
    fn keyword_paragraph_becomes_typed_note() {
        assert_eq!(
            run_both("<conbody><p>Tip: use the short form.</p></conbody>"),
            r#"<conbody><note type="tip">use the short form.</note></conbody>"#
        );
    }

    #[test]
    fn paragraph_without_colon_is_untouched() {
        let fragment = "<conbody><p>Tips are everywhere.</p></conbody>";
        assert_eq!(run_both(fragment), fragment);
    }

    #[test]
    fn note_with_only_keyword_loses_text_node() {
        assert_eq!(
            run_both("<conbody><p><note>Note:</note>x</p></conbody>"),
            "<conbody><p><note type=\"note\"></note>x</p></conbody>"
        );
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert_eq!(
            run_both("<conbody><p>IMPORTANT: stop.</p></conbody>"),
            r#"<conbody><note type="important">stop.</note></conbody>"#
        );
    }

    #[test]
    fn formatted_lead_in_is_matched_through_first_text() {
        // The emptied bold wrapper is pruned with the keyword.
        assert_eq!(
            run_both("<conbody><p><b>Caution:</b> hot.</p></conbody>"),
            r#"<conbody><note type="caution"> hot.</note></conbody>"#
        );
    }
}

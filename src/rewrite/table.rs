//! Table restructuring: caption promotion, full-width first rows, header
//! rows into `thead`, and removal of degenerate tables.

use crate::dom::{Dom, NodeId};
use crate::log::RunLog;
use crate::refs::{self, Forwards};

use super::is_simple_paragraph;

pub fn pass(dom: &mut Dom, body: NodeId, forwards: &mut Forwards, log: &mut RunLog) {
    for table in dom.collect_tags(body, "table") {
        if dom.parent(table).is_none() {
            continue;
        }
        restructure(dom, forwards, log, table);
    }
}

fn restructure(dom: &mut Dom, forwards: &mut Forwards, log: &mut RunLog, table: NodeId) {
    let mut tgroup = NodeId::NONE;
    for child in dom.children(table) {
        if dom.is_tag(child, "tgroup") {
            tgroup = child;
            break;
        }
    }
    if tgroup.is_none() {
        log.warning("table without a tgroup removed");
        refs::destroy_node(dom, forwards, log, table);
        return;
    }

    let mut title = NodeId::NONE;

    // A simple caption paragraph right before the table becomes its
    // title.
    let prev = dom.prev_sibling(table);
    if dom.is_tag(prev, "p")
        && dom
            .attr(prev, "otherprops")
            .is_some_and(|v| v.contains("caption"))
        && dom.has_children(prev)
        && is_simple_paragraph(dom, prev)
    {
        let source = descend_sole_chain(dom, prev);
        if dom.has_children(source) {
            title = make_title(dom, table);
            dom.move_children(source, title, None);
            refs::move_id(dom, forwards, prev, table);
        }
        refs::destroy_node(dom, forwards, log, prev);
    }

    let colspecs: Vec<NodeId> = dom
        .children(tgroup)
        .filter(|c| dom.is_tag(*c, "colspec"))
        .collect();
    let first_col = colspecs
        .first()
        .and_then(|c| dom.attr(*c, "colname"))
        .unwrap_or("")
        .to_string();
    let last_col = colspecs
        .last()
        .and_then(|c| dom.attr(*c, "colname"))
        .unwrap_or("")
        .to_string();
    let single_col = dom.attr(tgroup, "cols") == Some("1");

    let mut tbody = NodeId::NONE;
    for child in dom.children(tgroup) {
        if dom.is_tag(child, "tbody") {
            tbody = child;
            break;
        }
    }
    if tbody.is_none() {
        log.warning("table without a tbody element removed");
        refs::destroy_node(dom, forwards, log, table);
        return;
    }

    // A first row spanning the full width is not tabular data: flagged
    // header it becomes the title, otherwise its content moves above the
    // table.
    let first_row = dom.first_child(tbody);
    let first_entry = dom.first_child(first_row);
    if first_entry.is_some() {
        let full_width = !first_col.is_empty()
            && dom.attr(first_entry, "namest") == Some(first_col.as_str())
            && dom.attr(first_entry, "nameend") == Some(last_col.as_str());
        if full_width || single_col {
            let header = dom
                .attr(first_entry, "otherprops")
                .is_some_and(|v| v.contains("header"));
            if header && title.is_none() {
                let source = descend_sole_chain(dom, first_entry);
                if dom.has_children(source) {
                    title = make_title(dom, table);
                    dom.move_children(source, title, None);
                    refs::move_id(dom, forwards, first_entry, table);
                }
                refs::destroy_node(dom, forwards, log, first_row);
            } else if !header {
                move_from_entry(dom, forwards, first_entry, table);
                refs::destroy_node(dom, forwards, log, first_row);
            }
        }
    }

    // Leading all-header rows become a thead; the last row always stays
    // in the body.
    let mut thead = NodeId::NONE;
    loop {
        let row = dom.first_child(tbody);
        if row.is_none() || dom.next_sibling(row).is_none() {
            break;
        }
        let entries: Vec<NodeId> = dom
            .children(row)
            .filter(|c| dom.is_tag(*c, "entry"))
            .collect();
        let all_header = !entries.is_empty()
            && entries.iter().all(|e| {
                dom.attr(*e, "otherprops")
                    .is_some_and(|v| v.contains("header"))
            });
        if !all_header {
            break;
        }
        if thead.is_none() {
            thead = dom.create_element("thead");
            dom.insert_before(tbody, thead);
        }
        dom.append(thead, row);
        for entry in entries {
            strip_sole_formatting(dom, entry);
        }
    }

    if !dom.has_children(tbody) {
        log.warning("table without any rows removed");
        refs::destroy_node(dom, forwards, log, table);
        return;
    }

    if title.is_some() {
        strip_table_label(dom, forwards, log, title);
    }
}

/// Create an empty title as the table's first child.
fn make_title(dom: &mut Dom, table: NodeId) -> NodeId {
    let title = dom.create_element("title");
    let first = dom.first_child(table);
    if first.is_some() {
        dom.insert_before(first, title);
    } else {
        dom.append(table, title);
    }
    title
}

/// Follow a chain of sole element children (formatting wrappers) to the
/// innermost container.
fn descend_sole_chain(dom: &Dom, node: NodeId) -> NodeId {
    let mut current = node;
    loop {
        let first = dom.first_child(current);
        if dom.is_element(first) && dom.child_count(current) == 1 {
            current = first;
        } else {
            return current;
        }
    }
}

/// Move an entry's content out of the table, in front of it. Leading
/// inline content is wrapped in a paragraph; existing paragraphs move as
/// they are. The entry's anchor follows the leading content.
fn move_from_entry(dom: &mut Dom, forwards: &mut Forwards, entry: NodeId, table: NodeId) {
    let first = dom.first_child(entry);
    if first.is_none() {
        return;
    }
    let id_target;
    if dom.is_tag(first, "p") {
        id_target = first;
    } else {
        let p = dom.create_element("p");
        if let Some(props) = dom.attr(entry, "otherprops").map(str::to_string) {
            dom.set_attr(p, "otherprops", &props);
        }
        dom.insert_before(table, p);
        loop {
            let child = dom.first_child(entry);
            if child.is_none() || dom.is_tag(child, "p") {
                break;
            }
            dom.append(p, child);
        }
        id_target = p;
    }
    refs::move_id(dom, forwards, entry, id_target);
    loop {
        let child = dom.first_child(entry);
        if child.is_none() {
            break;
        }
        dom.insert_before(table, child);
    }
}

/// Header cells keep their text; a bold or italic wrapper around the
/// whole cell is noise under `thead`.
fn strip_sole_formatting(dom: &mut Dom, entry: NodeId) {
    loop {
        let only = dom.first_child(entry);
        if dom.next_sibling(only).is_some() || !matches!(dom.tag(only), Some("b" | "i")) {
            return;
        }
        dom.move_children(only, entry, None);
        dom.detach(only);
    }
}

/// Drop a leading "Table <n>" label from a promoted title.
fn strip_table_label(dom: &mut Dom, forwards: &mut Forwards, log: &mut RunLog, title: NodeId) {
    let tnode = dom.first_text(title);
    if tnode.is_none() {
        return;
    }
    let Some(text) = dom.text(tnode).map(str::to_string) else {
        return;
    };
    let trimmed = text.trim_start();
    if !trimmed.to_lowercase().starts_with("table") {
        return;
    }
    let rest: String = trimmed[5..]
        .chars()
        .skip_while(|c| !c.is_alphabetic())
        .collect();
    if rest.is_empty() {
        refs::destroy_node(dom, forwards, log, tnode);
        super::prune::prune_childless(dom, forwards, log, title);
    } else {
        dom.set_text(tnode, rest);
    }
}

//! Segmentation: the flat working tree into per-topic trees, plus
//! per-topic finalization (link resolution, attribute cleanup, renames).

pub mod steps;

use std::collections::{HashMap, HashSet};

use crate::convert::ConvertOptions;
use crate::dom::{Dom, NodeId};
use crate::log::RunLog;
use crate::refs::{self, Forwards};

/// The DITA topic kinds this converter produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    Concept,
    Task,
    Reference,
}

impl TopicKind {
    pub fn root_tag(self) -> &'static str {
        match self {
            TopicKind::Concept => "concept",
            TopicKind::Task => "task",
            TopicKind::Reference => "reference",
        }
    }

    pub fn id_prefix(self) -> &'static str {
        match self {
            TopicKind::Concept => "c_",
            TopicKind::Task => "t_",
            TopicKind::Reference => "r_",
        }
    }
}

/// One segmented topic with its own tree.
pub struct Topic {
    pub id: String,
    pub kind: TopicKind,
    pub level: u32,
    pub dom: Dom,
    pub root: NodeId,
    /// Where body content lands (`conbody`, `section`, or `context`).
    body: NodeId,
}

/// Where a bookmark name now points.
pub struct Anchor {
    pub topic_id: String,
    /// `#topic` or `#topic/element`.
    pub fragment: String,
}

/// The result of segmentation.
pub struct Segmented {
    pub topics: Vec<Topic>,
    pub bookmarks: HashMap<String, Anchor>,
}

/// Split the working body at its topic markers.
pub fn segment(
    dom: &mut Dom,
    body: NodeId,
    forwards: &mut Forwards,
    opts: &ConvertOptions,
    log: &mut RunLog,
) -> Segmented {
    let mut seg = Segmented {
        topics: Vec::new(),
        bookmarks: HashMap::new(),
    };
    let mut used_ids: HashSet<String> = HashSet::new();

    for child in dom.child_ids(body) {
        if dom.is_tag(child, "temp:topic") {
            open_topic(dom, child, forwards, opts, log, &mut seg, &mut used_ids);
        } else if dom.is_element(child) {
            let Some(topic) = seg.topics.last_mut() else {
                log.warning("content before the first topic marker dropped");
                continue;
            };
            let target = topic.body;
            let topic_id = topic.id.clone();
            copy_into(
                dom,
                child,
                &mut topic.dom,
                target,
                &topic_id,
                &mut used_ids,
                &mut seg.bookmarks,
                log,
            );
        } else if let Some(text) = dom.text(child)
            && !text.trim().is_empty()
        {
            log.debug("stray text between topics ignored");
        }
    }

    seg
}

#[allow(clippy::too_many_arguments)]
fn open_topic(
    dom: &mut Dom,
    marker: NodeId,
    forwards: &mut Forwards,
    opts: &ConvertOptions,
    log: &mut RunLog,
    seg: &mut Segmented,
    used_ids: &mut HashSet<String>,
) {
    let level = match dom.attr(marker, "level").map(str::parse::<u32>) {
        Some(Ok(n)) if n >= 1 => n,
        _ => {
            log.warning("topic marker without a valid level, assuming 1");
            1
        }
    };

    let title_src = dom.first_child(marker);
    let title_text = dom.text_content(title_src).trim().to_string();

    // A heading with no text merges with an immediately following
    // heading; its anchor carries over.
    if title_text.is_empty() {
        let next = dom.next_element_sibling(marker);
        if dom.is_tag(next, "temp:topic") {
            refs::move_id(dom, forwards, marker, next);
            return;
        }
    }

    // Kind markers in the title select the topic kind and disappear.
    let mut kind = TopicKind::Concept;
    for (tag, selected) in [
        ("[c]", None),
        ("[r]", Some(TopicKind::Reference)),
        ("[t]", Some(TopicKind::Task)),
    ] {
        if dom.text_content(title_src).contains(tag) {
            if let Some(k) = selected {
                kind = k;
            }
            dom.replace_text(title_src, tag, "");
            dom.replace_text(title_src, "  ", " ");
            let last = dom.last_text(title_src);
            if let Some(text) = dom.text(last) {
                let trimmed = text.trim_end_matches(' ').to_string();
                dom.set_text(last, trimmed);
            }
        }
    }

    let id_text = {
        let cleaned = dom.text_content(title_src).trim().to_lowercase();
        if cleaned.is_empty() {
            "notitle".to_string()
        } else {
            cleaned
        }
    };
    let mut id = slugify(&id_text, kind, opts.id_prefix);
    let mut serial = 1;
    while used_ids.contains(&id) {
        id = format!("{}{serial}", slugify(&id_text, kind, opts.id_prefix));
        serial += 1;
    }
    used_ids.insert(id.clone());

    let mut tdom = Dom::new();
    let root = tdom.create_element(kind.root_tag());
    tdom.set_attr(root, "id", &id);
    tdom.set_attr(
        root,
        "xmlns:ditaarch",
        "http://dita.oasis-open.org/architecture/2005/",
    );
    let doc = tdom.document();
    tdom.append(doc, root);

    if let Some(marker_id) = dom.attr(marker, "id")
        && !marker_id.is_empty()
    {
        seg.bookmarks.insert(
            marker_id.to_string(),
            Anchor {
                topic_id: id.clone(),
                fragment: format!("#{id}"),
            },
        );
    }

    let title_out = tdom.create_element("title");
    tdom.append(root, title_out);
    for child in dom.child_ids(title_src) {
        copy_into(
            dom,
            child,
            &mut tdom,
            title_out,
            &id,
            used_ids,
            &mut seg.bookmarks,
            log,
        );
    }
    let shortdesc = tdom.create_element("shortdesc");
    tdom.append(root, shortdesc);

    // The prolog travels only when it actually indexes something.
    for child in dom.child_ids(marker) {
        if dom.is_tag(child, "prolog") && !dom.collect_tags(child, "indexterm").is_empty() {
            copy_into(
                dom,
                child,
                &mut tdom,
                root,
                &id,
                used_ids,
                &mut seg.bookmarks,
                log,
            );
        }
    }

    let body = match kind {
        TopicKind::Concept => {
            let conbody = tdom.create_element("conbody");
            tdom.append(root, conbody);
            conbody
        }
        TopicKind::Reference => {
            let refbody = tdom.create_element("refbody");
            tdom.append(root, refbody);
            let section = tdom.create_element("section");
            tdom.append(refbody, section);
            section
        }
        TopicKind::Task => {
            let taskbody = tdom.create_element("taskbody");
            tdom.append(root, taskbody);
            let context = tdom.create_element("context");
            tdom.append(taskbody, context);
            let steps = tdom.create_element("steps");
            tdom.append(taskbody, steps);
            let step = tdom.create_element("step");
            tdom.append(steps, step);
            let cmd = tdom.create_element("cmd");
            tdom.append_text(cmd, "Place steps here");
            tdom.append(step, cmd);
            context
        }
    };

    seg.topics.push(Topic {
        id,
        kind,
        level,
        dom: tdom,
        root,
        body,
    });
}

/// Deep-copy a node into a topic tree, registering every element id as a
/// bookmark anchor in the topic.
#[allow(clippy::too_many_arguments)]
fn copy_into(
    src: &Dom,
    node: NodeId,
    out: &mut Dom,
    parent: NodeId,
    topic_id: &str,
    used_ids: &mut HashSet<String>,
    bookmarks: &mut HashMap<String, Anchor>,
    log: &mut RunLog,
) {
    if let Some(text) = src.text(node) {
        out.append_text(parent, text);
        return;
    }
    let Some(tag) = src.tag(node) else { return };
    let el = out.create_element(tag);
    for (name, value) in src.attrs(node).to_vec() {
        out.set_attr(el, &name, &value);
    }
    out.append(parent, el);

    if let Some(id) = src.attr(node, "id")
        && !id.is_empty()
    {
        if used_ids.contains(id) {
            log.warning(format!("duplicate bookmark id '{id}'"));
        } else {
            used_ids.insert(id.to_string());
            bookmarks.insert(
                id.to_string(),
                Anchor {
                    topic_id: topic_id.to_string(),
                    fragment: format!("#{topic_id}/{id}"),
                },
            );
        }
    }

    for child in src.child_ids(node) {
        copy_into(src, child, out, el, topic_id, used_ids, bookmarks, log);
    }
}

/// Build a topic id from title text: non-alphanumerics collapse to
/// single underscores, length is capped, a kind prefix (or a leading
/// letter guard) is applied, and anything non-ASCII degrades to an
/// underscore.
fn slugify(text: &str, kind: TopicKind, prefix: bool) -> String {
    let mut slug: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    while slug.contains("__") {
        slug = slug.replace("__", "_");
    }
    slug = slug.chars().take(30).collect();
    if prefix {
        slug = format!("{}{slug}", kind.id_prefix());
    } else if !slug.chars().next().is_some_and(|c| c.is_alphabetic()) {
        slug.insert(0, 'a');
    }
    while slug.chars().count() > 5 && slug.ends_with('_') {
        slug.pop();
    }
    slug.chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect()
}

/// Finalize one topic: resolve local cross-references through the
/// forward chains, strip working attributes, extract task steps, apply
/// tag replacements.
pub fn finalize(
    topic: &mut Topic,
    bookmarks: &HashMap<String, Anchor>,
    forwards: &Forwards,
    opts: &ConvertOptions,
    log: &mut RunLog,
) {
    let mut scratch = Forwards::new();

    for xref in topic.dom.collect_tags(topic.root, "xref") {
        if topic.dom.attr(xref, "scope") != Some("local") {
            continue;
        }
        let name = topic.dom.attr(xref, "href").unwrap_or("").to_string();
        let anchor = refs::resolve_forward(forwards, &name).and_then(|n| bookmarks.get(n));
        match anchor {
            Some(anchor) => {
                let href = if anchor.topic_id == topic.id {
                    anchor.fragment.clone()
                } else {
                    format!("{}.dita{}", anchor.topic_id, anchor.fragment)
                };
                topic.dom.set_attr(xref, "href", &href);
            }
            None => {
                log.error(format!("bad bookmark '{name}'"));
                if opts.delete_bad_links {
                    refs::destroy_node(&mut topic.dom, &mut scratch, log, xref);
                }
            }
        }
    }

    strip_attr(&mut topic.dom, topic.root, "otherprops");

    if opts.task_steps && topic.kind == TopicKind::Task {
        steps::extract(topic, log);
    }

    if let Some(tag) = opts.bold_tag.clone() {
        for node in topic.dom.collect_tags(topic.root, "b") {
            topic.dom.set_tag(node, &tag);
        }
    }
    if let Some(tag) = opts.italic_tag.clone() {
        for node in topic.dom.collect_tags(topic.root, "i") {
            topic.dom.set_tag(node, &tag);
        }
    }
}

fn strip_attr(dom: &mut Dom, root: NodeId, name: &str) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        dom.remove_attr(node, name);
        for child in dom.children(node) {
            stack.push(child);
        }
    }
}

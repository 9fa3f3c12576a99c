//! The formatting-stack engine for paragraph content.
//!
//! Character formatting arrives as nested `text:span`s with resolved
//! property sets; output formatting is a stack of open tags above the
//! paragraph element. While the stack only ever grows (each span adds
//! properties) tags nest naturally. The first time a span needs fewer
//! properties than are open, the whole stack is peeled to the paragraph
//! and from then on every formatting change rebuilds the stack from the
//! bottom.

use crate::dom::{Dom, NodeId};
use crate::odt::tags::{self, SourceTag};
use crate::rewrite::prune;
use crate::style::{CHARACTER_PROPS, PropSet};

use super::Engine;
use super::block::is_formula_frame;

/// How the open-tag stack may be changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackState {
    /// Tags so far strictly nest; supersets may open on top.
    Clean,
    /// Nesting was broken once; every change peels to the paragraph and
    /// reopens the full effective set.
    MustFullyReopen,
}

struct InlineWalk {
    /// Open output nodes; index 0 is the paragraph element itself.
    stack: Vec<NodeId>,
    state: StackState,
    is_title: bool,
}

impl InlineWalk {
    fn top(&self) -> NodeId {
        *self.stack.last().unwrap_or(&NodeId::NONE)
    }

    fn peel(&mut self) {
        self.stack.truncate(1);
    }

    fn root(&self) -> NodeId {
        self.stack[0]
    }
}

/// Result of adjusting the stack for a span, used to restore it after.
enum Adjust {
    Opened(usize),
    Rebuilt,
}

impl Engine {
    /// Process the inline content of `src_node` into `out_node`, with the
    /// paragraph's own properties already resolved by the caller.
    pub(crate) fn process_paragraph(
        &mut self,
        src: &Dom,
        src_node: NodeId,
        out_node: NodeId,
        props: PropSet,
        is_title: bool,
    ) {
        self.set_start_para(true);
        let mut walk = InlineWalk {
            stack: vec![out_node],
            state: StackState::Clean,
            is_title,
        };
        // Paragraph-level character formatting opens immediately.
        for prop in CHARACTER_PROPS {
            if props.contains(prop) {
                self.open_tag(&mut walk, prop.character_tag().unwrap_or("b"));
            }
        }
        self.walk_inline(src, src_node, props, &mut walk);

        // Drop speculative wrappers that ended up empty.
        prune::prune_childless(
            &mut self.dom,
            &mut self.forwards,
            &mut self.log,
            out_node,
        );
    }

    fn walk_inline(&mut self, src: &Dom, node: NodeId, current: PropSet, walk: &mut InlineWalk) {
        for child in src.child_ids(node) {
            if let Some(text) = src.text(child) {
                let text = text.to_string();
                self.add_text(walk.top(), &text);
                continue;
            }
            let Some(tag) = src.tag(child) else { continue };
            match tags::classify(tag) {
                SourceTag::Span => self.handle_span(src, child, current, walk),
                SourceTag::InlineText => self.walk_inline(src, child, current, walk),
                SourceTag::Space => {
                    let count = match src.attr(child, "text:c").map(str::parse::<usize>) {
                        Some(Ok(n)) => n,
                        _ => 1,
                    };
                    self.add_spaces(walk.top(), count);
                }
                SourceTag::Tab => self.add_spaces(walk.top(), 6),
                SourceTag::Anchor => self.handle_anchor(src, child, current, walk),
                SourceTag::LineBreak => {
                    if !walk.is_title {
                        let marker = self.dom.create_element("temp:linebreak");
                        self.dom.append(walk.top(), marker);
                    }
                }
                SourceTag::Bookmark => self.handle_bookmark(src, child, walk),
                SourceTag::BookmarkRef => self.handle_bookmark_ref(src, child, current, walk),
                SourceTag::IndexMark => self.handle_index_mark(src, child, walk),
                SourceTag::Footnote => {
                    if !walk.is_title {
                        self.handle_footnote(src, child, walk);
                    }
                }
                SourceTag::Image => {
                    if !walk.is_title {
                        let root = walk.root();
                        self.emit_image(src, child, root);
                    }
                }
                SourceTag::Object => {
                    if !walk.is_title {
                        let root = walk.root();
                        self.emit_object(src, child, root, false);
                    }
                }
                SourceTag::Drawing => {
                    if !walk.is_title {
                        let formula = is_formula_frame(src, child);
                        let root = walk.root();
                        self.process_block(src, child, root, formula);
                    }
                }
                SourceTag::Ignored => {}
                _ => {
                    self.log.info(format!("tag '{tag}' not processed"));
                }
            }
        }
    }

    fn handle_span(&mut self, src: &Dom, span: NodeId, current: PropSet, walk: &mut InlineWalk) {
        let style = src.attr(span, "text:style-name").unwrap_or("");
        let own = self.styles.resolve(style, &mut self.log);
        let effective = current.effective_with(own);

        if effective.character() == current.character() {
            self.walk_inline(src, span, effective, walk);
            return;
        }

        let adjust = self.enter_props(walk, current, effective);
        self.walk_inline(src, span, effective, walk);
        self.exit_props(walk, current, adjust);
    }

    fn enter_props(&mut self, walk: &mut InlineWalk, current: PropSet, effective: PropSet) -> Adjust {
        if walk.state == StackState::Clean && effective.character_superset_of(current) {
            let added = effective.character_added_over(current);
            let count = added.len();
            for prop in added {
                self.open_tag(walk, prop.character_tag().unwrap_or("b"));
            }
            return Adjust::Opened(count);
        }
        walk.state = StackState::MustFullyReopen;
        walk.peel();
        for prop in CHARACTER_PROPS {
            if effective.contains(prop) {
                self.open_tag(walk, prop.character_tag().unwrap_or("b"));
            }
        }
        Adjust::Rebuilt
    }

    fn exit_props(&mut self, walk: &mut InlineWalk, current: PropSet, adjust: Adjust) {
        // Once nesting has broken anywhere in the paragraph the stack no
        // longer matches the entry adjustment; every exit rebuilds, even
        // one whose entry merely opened tags on a then-clean stack.
        if walk.state == StackState::MustFullyReopen {
            walk.peel();
            for prop in CHARACTER_PROPS {
                if current.contains(prop) {
                    self.open_tag(walk, prop.character_tag().unwrap_or("b"));
                }
            }
            return;
        }
        let Adjust::Opened(count) = adjust else { return };
        let keep = walk.stack.len().saturating_sub(count);
        walk.stack.truncate(keep.max(1));
    }

    fn open_tag(&mut self, walk: &mut InlineWalk, tag: &str) {
        let node = self.dom.create_element(tag);
        self.dom.append(walk.top(), node);
        walk.stack.push(node);
    }

    /// Hyperlinks with a scheme become external cross-references; other
    /// anchors (internal jumps, relative files) keep their text only.
    fn handle_anchor(&mut self, src: &Dom, anchor: NodeId, current: PropSet, walk: &mut InlineWalk) {
        let href = src.attr(anchor, "xlink:href").unwrap_or("");
        let linkable = href.contains("://") || href.starts_with("mailto");
        if walk.is_title || !linkable {
            self.walk_inline(src, anchor, current, walk);
            return;
        }
        let xref = self.dom.create_element("xref");
        self.dom.set_attr(xref, "href", href);
        self.dom.set_attr(xref, "scope", "external");
        self.dom.set_attr(xref, "format", "html");
        self.dom.append(walk.top(), xref);
        walk.stack.push(xref);
        self.walk_inline(src, anchor, current, walk);
        walk.stack.pop();
    }

    /// A bookmark anchors the paragraph. A second bookmark in the same
    /// paragraph forwards to the first one's id.
    fn handle_bookmark(&mut self, src: &Dom, bookmark: NodeId, walk: &mut InlineWalk) {
        let Some(name) = src.attr(bookmark, "text:name") else {
            return;
        };
        if name.is_empty() {
            return;
        }
        let root = walk.root();
        match self.dom.attr(root, "id") {
            Some(existing) if !existing.is_empty() => {
                let target = existing.to_string();
                self.forwards.insert(name.to_string(), Some(target));
            }
            _ => self.dom.set_attr(root, "id", name),
        }
    }

    fn handle_bookmark_ref(
        &mut self,
        src: &Dom,
        node: NodeId,
        current: PropSet,
        walk: &mut InlineWalk,
    ) {
        let name = src.attr(node, "text:ref-name").unwrap_or("");
        let xref = self.dom.create_element("xref");
        self.dom.set_attr(xref, "href", name);
        self.dom.set_attr(xref, "scope", "local");
        self.dom.append(walk.top(), xref);
        walk.stack.push(xref);
        self.walk_inline(src, node, current, walk);
        walk.stack.pop();
    }

    /// Index marks become `indexterm`s: into the topic keywords when seen
    /// in a title, else at the front of the paragraph.
    fn handle_index_mark(&mut self, src: &Dom, mark: NodeId, walk: &mut InlineWalk) {
        let Some(value) = src.attr(mark, "text:string-value") else {
            return;
        };
        let term = self.dom.create_element("indexterm");
        match src.attr(mark, "text:key1") {
            Some(key) if !key.is_empty() => {
                self.dom.append_text(term, key);
                let inner = self.dom.create_element("indexterm");
                self.dom.append_text(inner, value);
                self.dom.append(term, inner);
            }
            _ => self.dom.append_text(term, value),
        }

        let keywords = self.keywords_node();
        if walk.is_title && keywords.is_some() {
            self.dom.append(keywords, term);
        } else {
            let root = walk.root();
            let first = self.dom.first_child(root);
            if first.is_some() {
                self.dom.insert_before(first, term);
            } else {
                self.dom.append(root, term);
            }
        }
    }

    /// Footnotes become `fn` elements holding the processed note body.
    fn handle_footnote(&mut self, src: &Dom, note: NodeId, walk: &mut InlineWalk) {
        let fn_node = self.dom.create_element("fn");
        self.dom.append(walk.top(), fn_node);
        for child in src.children(note) {
            if src.is_tag(child, "text:note-body") {
                let was_start = self.start_para;
                self.process_block(src, child, fn_node, false);
                self.start_para = was_start;
                break;
            }
        }
    }

    // ------------------------------------------------------------------
    // Text emission
    // ------------------------------------------------------------------

    pub(crate) fn set_start_para(&mut self, value: bool) {
        self.start_para = value;
    }

    /// Append text with whitespace collapsing: runs of whitespace become
    /// one space, and leading whitespace at the start of the paragraph is
    /// swallowed entirely.
    fn add_text(&mut self, parent: NodeId, text: &str) {
        let mut out = String::new();
        for c in text.chars() {
            if c.is_whitespace() {
                if self.start_para {
                    continue;
                }
                let pending_space = out.ends_with(' ')
                    || (out.is_empty() && last_char_is_space(&self.dom, parent));
                if !pending_space {
                    out.push(' ');
                }
            } else {
                self.start_para = false;
                out.push(c);
            }
        }
        self.dom.append_text(parent, &out);
    }

    /// Explicit spaces (from `text:s` and `text:tab`) are emitted
    /// literally, outside the collapsing rules.
    fn add_spaces(&mut self, parent: NodeId, count: usize) {
        if count == 0 {
            return;
        }
        self.start_para = false;
        self.dom.append_text(parent, &" ".repeat(count));
    }
}

fn last_char_is_space(dom: &Dom, parent: NodeId) -> bool {
    let last = dom.last_child(parent);
    match dom.text(last) {
        Some(text) => text.ends_with(' '),
        None => false,
    }
}

//! The conversion walk: ODT body content into one working DITA tree.
//!
//! One [`Engine`] value owns every piece of per-run state (options, run
//! log, style tables, the working tree, nesting counters, the bookmark
//! forward table). Nothing here is global; two runs never share state.

mod block;
mod list;
mod paragraph;
mod table;

use std::collections::BTreeSet;

use crate::dom::{Dom, NodeId};
use crate::log::RunLog;
use crate::refs::Forwards;
use crate::style::StyleTable;

/// Options for a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Replacement tag for `b` in the final output, if any.
    pub bold_tag: Option<String>,
    /// Replacement tag for `i` in the final output, if any.
    pub italic_tag: Option<String>,
    /// Rebuild the first ordered list of each task topic into steps.
    pub task_steps: bool,
    /// Prefix topic ids with their kind (`c_`, `t_`, `r_`).
    pub id_prefix: bool,
    /// Treat "antiqua" fonts as bold.
    pub antiqua_is_bold: bool,
    /// Delete local cross-references whose bookmark cannot be resolved.
    pub delete_bad_links: bool,
    /// Treat every embedded object as a formula, not just the marked ones.
    pub aggressive_formula: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            bold_tag: None,
            italic_tag: None,
            task_steps: true,
            id_prefix: true,
            antiqua_is_bold: false,
            delete_bad_links: false,
            aggressive_formula: false,
        }
    }
}

/// Per-run conversion state.
pub struct Engine {
    pub opts: ConvertOptions,
    pub log: RunLog,
    pub styles: StyleTable,
    /// The working output tree.
    pub dom: Dom,
    /// The `conbody` element all output lands under before segmentation.
    pub body: NodeId,
    /// Bookmark forward table.
    pub forwards: Forwards,
    /// Package members to extract alongside the topics (embedded math).
    pub extract: BTreeSet<String>,

    /// Keywords container of the current topic marker, for index marks
    /// seen inside titles.
    cur_keywords: NodeId,
    /// Table nesting depth; headings inside tables are plain paragraphs.
    in_table: u32,
    /// Current list nesting depth.
    list_level: u32,
    /// Stack of list style names in effect.
    list_stack: Vec<String>,
    /// True until the first non-space character of the current paragraph.
    start_para: bool,
}

impl Engine {
    pub fn new(opts: ConvertOptions) -> Self {
        let mut dom = Dom::new();
        let body = dom.create_element("conbody");
        let doc = dom.document();
        dom.append(doc, body);
        let mut engine = Self {
            opts,
            log: RunLog::new(),
            styles: StyleTable::new(),
            dom,
            body,
            forwards: Forwards::new(),
            extract: BTreeSet::new(),
            cur_keywords: NodeId::NONE,
            in_table: 0,
            list_level: 0,
            list_stack: Vec::new(),
            start_para: true,
        };
        // Content before the first heading belongs to an untitled topic.
        engine.new_topic_marker(1);
        engine
    }

    /// Walk an `office:text` body element into the working tree.
    pub fn walk_body(&mut self, src: &Dom, text_body: NodeId) {
        self.process_block(src, text_body, self.body, false);
    }

    /// Create a topic marker under the body and make it current. Returns
    /// the marker and its empty title element.
    pub(crate) fn new_topic_marker(&mut self, level: u32) -> (NodeId, NodeId) {
        let marker = self.dom.create_element("temp:topic");
        self.dom.set_attr(marker, "level", &level.to_string());
        self.dom.append(self.body, marker);

        let title = self.dom.create_element("title");
        self.dom.append(marker, title);

        let prolog = self.dom.create_element("prolog");
        self.dom.append(marker, prolog);
        let metadata = self.dom.create_element("metadata");
        self.dom.append(prolog, metadata);
        let keywords = self.dom.create_element("keywords");
        self.dom.append(metadata, keywords);
        self.cur_keywords = keywords;

        (marker, title)
    }

    pub(crate) fn keywords_node(&self) -> NodeId {
        self.cur_keywords
    }

    pub(crate) fn in_table(&self) -> bool {
        self.in_table > 0
    }
}

/// Append a token to a node's `otherprops` attribute.
pub(crate) fn add_otherprops(dom: &mut Dom, node: NodeId, token: &str) {
    let value = match dom.attr(node, "otherprops") {
        Some(existing) => format!("{existing}{token}"),
        None => token.to_string(),
    };
    dom.set_attr(node, "otherprops", &value);
}

//! Arena-based working tree.
//!
//! Both the parsed ODT source documents and the DITA output under
//! construction live in this tree shape. All nodes are stored in a
//! contiguous vector; parent/child/sibling links use indices into it.
//! Detached nodes stay allocated in the arena but are unreachable from
//! the document root.

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value for no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node type in the arena.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Element with tag name and attributes in definition order.
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    /// Text content.
    Text(String),
}

/// A node in the arena.
#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// Arena-allocated document tree.
pub struct Dom {
    nodes: Vec<Node>,
    document: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create a new empty tree with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: NodeId::NONE,
        };
        dom.document = dom.alloc(Node::new(NodeData::Document));
        dom
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a new element node (detached).
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Node::new(NodeData::Element {
            tag: tag.to_string(),
            attrs: Vec::new(),
        }))
    }

    /// Create a new text node (detached).
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text.into())))
    }

    // ------------------------------------------------------------------
    // Link accessors
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> NodeId {
        self.get(id).map_or(NodeId::NONE, |n| n.parent)
    }

    pub fn first_child(&self, id: NodeId) -> NodeId {
        self.get(id).map_or(NodeId::NONE, |n| n.first_child)
    }

    pub fn last_child(&self, id: NodeId) -> NodeId {
        self.get(id).map_or(NodeId::NONE, |n| n.last_child)
    }

    pub fn prev_sibling(&self, id: NodeId) -> NodeId {
        self.get(id).map_or(NodeId::NONE, |n| n.prev_sibling)
    }

    pub fn next_sibling(&self, id: NodeId) -> NodeId {
        self.get(id).map_or(NodeId::NONE, |n| n.next_sibling)
    }

    /// Nearest following sibling that is an element.
    pub fn next_element_sibling(&self, id: NodeId) -> NodeId {
        let mut cur = self.next_sibling(id);
        while cur.is_some() && !self.is_element(cur) {
            cur = self.next_sibling(cur);
        }
        cur
    }

    /// Nearest preceding sibling that is an element.
    pub fn prev_element_sibling(&self, id: NodeId) -> NodeId {
        let mut cur = self.prev_sibling(id);
        while cur.is_some() && !self.is_element(cur) {
            cur = self.prev_sibling(cur);
        }
        cur
    }

    /// Iterate over the children of a node.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            dom: self,
            next: self.first_child(id),
        }
    }

    /// Snapshot of the current child list, safe to iterate while mutating.
    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).collect()
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.first_child(id).is_some()
    }

    /// Count of direct children.
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    // ------------------------------------------------------------------
    // Node inspection
    // ------------------------------------------------------------------

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(
            self.get(id).map(|n| &n.data),
            Some(NodeData::Element { .. })
        )
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.get(id).map(|n| &n.data), Some(NodeData::Text(_)))
    }

    pub fn is_document(&self, id: NodeId) -> bool {
        matches!(self.get(id).map(|n| &n.data), Some(NodeData::Document))
    }

    /// Tag name of an element node.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Element { tag, .. }) => Some(tag.as_str()),
            _ => None,
        }
    }

    /// True if the node is an element with the given tag.
    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == Some(tag)
    }

    /// Rename an element in place.
    pub fn set_tag(&mut self, id: NodeId, new_tag: &str) {
        if let Some(node) = self.get_mut(id)
            && let NodeData::Element { tag, .. } = &mut node.data
        {
            *tag = new_tag.to_string();
        }
    }

    /// Text of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, new_text: impl Into<String>) {
        if let Some(node) = self.get_mut(id)
            && let NodeData::Text(text) = &mut node.data
        {
            *text = new_text.into();
        }
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Element { attrs, .. }) => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(node) = self.get_mut(id)
            && let NodeData::Element { attrs, .. } = &mut node.data
        {
            if let Some(entry) = attrs.iter_mut().find(|(k, _)| k == name) {
                entry.1 = value.to_string();
            } else {
                attrs.push((name.to_string(), value.to_string()));
            }
        }
    }

    /// Remove an attribute, returning its value if present.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        if let Some(node) = self.get_mut(id)
            && let NodeData::Element { attrs, .. } = &mut node.data
            && let Some(pos) = attrs.iter().position(|(k, _)| k == name)
        {
            return Some(attrs.remove(pos).1);
        }
        None
    }

    /// Copy every attribute of `from` onto `to` (existing values replaced).
    pub fn copy_attrs(&mut self, from: NodeId, to: NodeId) {
        let copied: Vec<(String, String)> = match self.get(from).map(|n| &n.data) {
            Some(NodeData::Element { attrs, .. }) => attrs.clone(),
            _ => return,
        };
        for (name, value) in copied {
            self.set_attr(to, &name, &value);
        }
    }

    /// All attributes of an element, in order.
    pub fn attrs(&self, id: NodeId) -> &[(String, String)] {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Element { attrs, .. }) => attrs,
            _ => &[],
        }
    }

    // ------------------------------------------------------------------
    // Tree mutation
    // ------------------------------------------------------------------

    /// Append a child to a parent. The child is detached first if linked.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let last = self.last_child(parent);
        if last.is_some() {
            if let Some(n) = self.get_mut(last) {
                n.next_sibling = child;
            }
            if let Some(n) = self.get_mut(child) {
                n.prev_sibling = last;
            }
        } else if let Some(n) = self.get_mut(parent) {
            n.first_child = child;
        }
        if let Some(n) = self.get_mut(parent) {
            n.last_child = child;
        }
        if let Some(n) = self.get_mut(child) {
            n.parent = parent;
        }
    }

    /// Insert `new_node` immediately before `sibling` under the same parent.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        self.detach(new_node);
        let parent = self.parent(sibling);
        let prev = self.prev_sibling(sibling);
        if prev.is_some() {
            if let Some(n) = self.get_mut(prev) {
                n.next_sibling = new_node;
            }
        } else if let Some(n) = self.get_mut(parent) {
            n.first_child = new_node;
        }
        if let Some(n) = self.get_mut(new_node) {
            n.prev_sibling = prev;
            n.next_sibling = sibling;
            n.parent = parent;
        }
        if let Some(n) = self.get_mut(sibling) {
            n.prev_sibling = new_node;
        }
    }

    /// Insert `new_node` immediately after `sibling` under the same parent.
    pub fn insert_after(&mut self, sibling: NodeId, new_node: NodeId) {
        let next = self.next_sibling(sibling);
        if next.is_some() {
            self.insert_before(next, new_node);
        } else {
            let parent = self.parent(sibling);
            self.append(parent, new_node);
        }
    }

    /// Unlink a node from its parent and siblings. The subtree below the
    /// node stays intact.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = match self.get(id) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };
        if parent.is_none() {
            return;
        }
        if prev.is_some() {
            if let Some(n) = self.get_mut(prev) {
                n.next_sibling = next;
            }
        } else if let Some(n) = self.get_mut(parent) {
            n.first_child = next;
        }
        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(n) = self.get_mut(parent) {
            n.last_child = prev;
        }
        if let Some(n) = self.get_mut(id) {
            n.parent = NodeId::NONE;
            n.prev_sibling = NodeId::NONE;
            n.next_sibling = NodeId::NONE;
        }
    }

    /// Append text under a parent, merging into a trailing text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        let last = self.last_child(parent);
        if last.is_some()
            && let Some(node) = self.get_mut(last)
            && let NodeData::Text(existing) = &mut node.data
        {
            existing.push_str(text);
            return;
        }
        let tn = self.create_text(text);
        self.append(parent, tn);
    }

    /// Move every child of `from` to the end of `to`, in order. If
    /// `separator` is given it is appended to `to` first, even when `from`
    /// is empty. Adjacent text runs merge at the seam.
    pub fn move_children(&mut self, from: NodeId, to: NodeId, separator: Option<&str>) {
        if let Some(sep) = separator {
            self.append_text(to, sep);
        }
        loop {
            let child = self.first_child(from);
            if child.is_none() {
                break;
            }
            if let Some(text) = self.text(child).map(str::to_string) {
                self.detach(child);
                self.append_text(to, &text);
            } else {
                self.append(to, child);
            }
        }
    }

    // ------------------------------------------------------------------
    // Queries over subtrees
    // ------------------------------------------------------------------

    /// All elements with the given tag in the subtree rooted at `root`,
    /// in document (pre-) order. `root` itself is included if it matches.
    pub fn collect_tags(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk_collect(root, tag, &mut out);
        out
    }

    fn walk_collect(&self, node: NodeId, tag: &str, out: &mut Vec<NodeId>) {
        if self.is_tag(node, tag) {
            out.push(node);
        }
        let mut child = self.first_child(node);
        while child.is_some() {
            self.walk_collect(child, tag, out);
            child = self.next_sibling(child);
        }
    }

    /// Concatenated text of every text node in the subtree.
    pub fn text_content(&self, root: NodeId) -> String {
        let mut out = String::new();
        self.walk_text(root, &mut out);
        out
    }

    fn walk_text(&self, node: NodeId, out: &mut String) {
        if let Some(text) = self.text(node) {
            out.push_str(text);
            return;
        }
        let mut child = self.first_child(node);
        while child.is_some() {
            self.walk_text(child, out);
            child = self.next_sibling(child);
        }
    }

    /// First text node in document order under `root`, if any.
    pub fn first_text(&self, root: NodeId) -> NodeId {
        if self.is_text(root) {
            return root;
        }
        let mut child = self.first_child(root);
        while child.is_some() {
            let found = self.first_text(child);
            if found.is_some() {
                return found;
            }
            child = self.next_sibling(child);
        }
        NodeId::NONE
    }

    /// Last text node in document order under `root`, if any.
    pub fn last_text(&self, root: NodeId) -> NodeId {
        if self.is_text(root) {
            return root;
        }
        let mut child = self.last_child(root);
        while child.is_some() {
            let found = self.last_text(child);
            if found.is_some() {
                return found;
            }
            child = self.prev_sibling(child);
        }
        NodeId::NONE
    }

    /// Replace every occurrence of `needle` in every text node of the
    /// subtree with `replacement`.
    pub fn replace_text(&mut self, root: NodeId, needle: &str, replacement: &str) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if let Some(text) = self.text(node) {
                if text.contains(needle) {
                    let replaced = text.replace(needle, replacement);
                    self.set_text(node, replaced);
                }
                continue;
            }
            let mut child = self.first_child(node);
            while child.is_some() {
                stack.push(child);
                child = self.next_sibling(child);
            }
        }
    }
}

/// Iterator over a node's children.
pub struct Children<'a> {
    dom: &'a Dom,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.next.is_none() {
            return None;
        }
        let current = self.next;
        self.next = self.dom.next_sibling(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Dom, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.create_element("conbody");
        dom.append(dom.document(), root);
        let p = dom.create_element("p");
        dom.append(root, p);
        let t = dom.create_text("hello");
        dom.append(p, t);
        (dom, root, p, t)
    }

    #[test]
    fn append_links_siblings() {
        let (mut dom, root, p, _) = sample();
        let q = dom.create_element("p");
        dom.append(root, q);
        assert_eq!(dom.first_child(root), p);
        assert_eq!(dom.last_child(root), q);
        assert_eq!(dom.next_sibling(p), q);
        assert_eq!(dom.prev_sibling(q), p);
    }

    #[test]
    fn detach_fixes_links() {
        let (mut dom, root, p, _) = sample();
        let q = dom.create_element("p");
        dom.append(root, q);
        let r = dom.create_element("p");
        dom.append(root, r);
        dom.detach(q);
        assert_eq!(dom.next_sibling(p), r);
        assert_eq!(dom.prev_sibling(r), p);
        assert!(dom.parent(q).is_none());
        assert_eq!(dom.child_count(root), 2);
    }

    #[test]
    fn insert_before_at_front() {
        let (mut dom, root, p, _) = sample();
        let q = dom.create_element("note");
        dom.insert_before(p, q);
        assert_eq!(dom.first_child(root), q);
        assert_eq!(dom.next_sibling(q), p);
    }

    #[test]
    fn append_text_merges_runs() {
        let (mut dom, _, p, _) = sample();
        dom.append_text(p, " world");
        assert_eq!(dom.child_count(p), 1);
        assert_eq!(dom.text_content(p), "hello world");
    }

    #[test]
    fn move_children_with_separator_merges_at_seam() {
        let mut dom = Dom::new();
        let a = dom.create_element("codeblock");
        dom.append(dom.document(), a);
        dom.append_text(a, "line one");
        let b = dom.create_element("p");
        dom.append(dom.document(), b);
        dom.append_text(b, "line two");
        dom.move_children(b, a, Some("\n"));
        assert_eq!(dom.child_count(a), 1);
        assert_eq!(dom.text_content(a), "line one\nline two");
        assert!(!dom.has_children(b));
    }

    #[test]
    fn collect_tags_pre_order() {
        let (mut dom, root, p, _) = sample();
        let inner = dom.create_element("p");
        dom.append(p, inner);
        let found = dom.collect_tags(root, "p");
        assert_eq!(found, vec![p, inner]);
    }

    #[test]
    fn attrs_set_and_remove() {
        let (mut dom, _, p, _) = sample();
        dom.set_attr(p, "id", "x1");
        dom.set_attr(p, "otherprops", "caption");
        dom.set_attr(p, "id", "x2");
        assert_eq!(dom.attr(p, "id"), Some("x2"));
        assert_eq!(dom.remove_attr(p, "id"), Some("x2".to_string()));
        assert_eq!(dom.attr(p, "id"), None);
    }

    #[test]
    fn replace_text_in_subtree() {
        let (mut dom, root, _, _) = sample();
        dom.replace_text(root, "hello", "hi");
        assert_eq!(dom.text_content(root), "hi");
    }

    #[test]
    fn first_and_last_text() {
        let (mut dom, root, p, t) = sample();
        let b = dom.create_element("b");
        dom.append(p, b);
        let t2 = dom.create_text("end");
        dom.append(b, t2);
        assert_eq!(dom.first_text(root), t);
        assert_eq!(dom.last_text(root), t2);
    }
}

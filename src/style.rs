//! Style resolution: ODF style definitions to semantic formatting flags.
//!
//! Named styles collapse into small sets of semantic properties (bold,
//! italic, monospace, note, ...). Resolution order per style: own-name
//! heuristics, union with the resolved parent, parent-name heuristics,
//! then explicit `*-properties` overrides, with "off" flags cancelling
//! inherited "on" flags.

use std::collections::{BTreeMap, HashMap};

use crate::dom::{Dom, NodeId};
use crate::log::RunLog;
use crate::odt::tags;

/// A semantic formatting property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prop {
    Bold,
    Italic,
    Monospace,
    Uicontrol,
    Note,
    Caption,
    Header,
    NotBold,
    NotItalic,
    NotMonospace,
}

impl Prop {
    const fn bit(self) -> u16 {
        match self {
            Prop::Bold => 1 << 0,
            Prop::Italic => 1 << 1,
            Prop::Monospace => 1 << 2,
            Prop::Uicontrol => 1 << 3,
            Prop::Note => 1 << 4,
            Prop::Caption => 1 << 5,
            Prop::Header => 1 << 6,
            Prop::NotBold => 1 << 7,
            Prop::NotItalic => 1 << 8,
            Prop::NotMonospace => 1 << 9,
        }
    }

    /// Output tag for a character-level property.
    pub fn character_tag(self) -> Option<&'static str> {
        match self {
            Prop::Bold => Some("b"),
            Prop::Italic => Some("i"),
            Prop::Monospace => Some("codeph"),
            Prop::Uicontrol => Some("uicontrol"),
            _ => None,
        }
    }

    /// Token recorded in the `otherprops` attribute, if any.
    pub fn otherprops_token(self) -> Option<&'static str> {
        match self {
            Prop::Caption => Some("caption"),
            Prop::Header => Some("header"),
            Prop::Monospace => Some("codeph"),
            _ => None,
        }
    }
}

/// Character-level properties, in the fixed order nested tags open.
pub const CHARACTER_PROPS: [Prop; 4] = [Prop::Bold, Prop::Italic, Prop::Monospace, Prop::Uicontrol];

/// Properties recorded as `otherprops` tokens on the paragraph.
pub const OTHERPROPS_PROPS: [Prop; 3] = [Prop::Caption, Prop::Header, Prop::Monospace];

/// A set of formatting properties, as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropSet(u16);

impl PropSet {
    pub const EMPTY: PropSet = PropSet(0);

    const CHARACTER_MASK: u16 = Prop::Bold.bit()
        | Prop::Italic.bit()
        | Prop::Monospace.bit()
        | Prop::Uicontrol.bit();

    pub fn contains(self, prop: Prop) -> bool {
        self.0 & prop.bit() != 0
    }

    pub fn insert(&mut self, prop: Prop) {
        self.0 |= prop.bit();
    }

    pub fn remove(&mut self, prop: Prop) {
        self.0 &= !prop.bit();
    }

    pub fn union(self, other: PropSet) -> PropSet {
        PropSet(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Just the character-level (nested-tag) properties.
    pub fn character(self) -> PropSet {
        PropSet(self.0 & Self::CHARACTER_MASK)
    }

    /// True if every character property of `other` is present here too.
    pub fn character_superset_of(self, other: PropSet) -> bool {
        let theirs = other.0 & Self::CHARACTER_MASK;
        self.0 & theirs == theirs
    }

    /// Character properties present here but not in `other`, in canonical
    /// order.
    pub fn character_added_over(self, other: PropSet) -> Vec<Prop> {
        CHARACTER_PROPS
            .into_iter()
            .filter(|p| self.contains(*p) && !other.contains(*p))
            .collect()
    }

    /// Set in effect inside a span: inherited plus the span's own
    /// properties, minus anything the span's off-flags switch off.
    pub fn effective_with(self, own: PropSet) -> PropSet {
        let mut out = self.union(own);
        if own.contains(Prop::NotBold) {
            out.remove(Prop::Bold);
        }
        if own.contains(Prop::NotItalic) {
            out.remove(Prop::Italic);
        }
        if own.contains(Prop::NotMonospace) {
            out.remove(Prop::Monospace);
        }
        out
    }

    /// The `otherprops` attribute value for this set, if any token applies.
    pub fn otherprops(self) -> Option<String> {
        let mut out = String::new();
        for prop in OTHERPROPS_PROPS {
            if self.contains(prop)
                && let Some(token) = prop.otherprops_token()
            {
                out.push_str(token);
            }
        }
        if out.is_empty() { None } else { Some(out) }
    }
}

/// Kind of a list level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Ordered,
}

impl ListKind {
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// Resolved style tables for one document.
#[derive(Debug, Default)]
pub struct StyleTable {
    styles: HashMap<String, PropSet>,
    list_styles: HashMap<String, BTreeMap<u32, ListKind>>,
}

impl StyleTable {
    pub fn new() -> Self {
        let mut table = Self::default();
        // The empty style name resolves to no formatting.
        table.styles.insert(String::new(), PropSet::EMPTY);
        table
    }

    /// Resolved property set for a style name. Unknown names resolve to
    /// the empty set and are logged.
    pub fn resolve(&self, name: &str, log: &mut RunLog) -> PropSet {
        match self.styles.get(name) {
            Some(set) => *set,
            None => {
                log.info(format!("unknown style '{name}' treated as plain"));
                PropSet::EMPTY
            }
        }
    }

    /// Kind for a list style at a level, falling back to the nearest
    /// defined lower level. None if the style or every level is unknown.
    pub fn list_kind(&self, name: &str, level: u32) -> Option<ListKind> {
        let levels = self.list_styles.get(name)?;
        levels.range(..=level).next_back().map(|(_, kind)| *kind)
    }

    pub fn has_list_style(&self, name: &str) -> bool {
        self.list_styles.contains_key(name)
    }

    /// Fold the style definitions under `container` (an `office:styles`
    /// or `office:automatic-styles` element) into the tables.
    pub fn collect(
        &mut self,
        dom: &Dom,
        container: NodeId,
        antiqua_is_bold: bool,
        log: &mut RunLog,
    ) {
        for child in dom.children(container) {
            match dom.tag(child) {
                Some("style:style") => self.collect_style(dom, child, antiqua_is_bold, log),
                Some("text:list-style") => self.collect_list_style(dom, child, log),
                _ => {}
            }
        }
    }

    fn collect_style(&mut self, dom: &Dom, node: NodeId, antiqua_is_bold: bool, log: &mut RunLog) {
        let name = match dom.attr(node, "style:name") {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => return,
        };
        if self.styles.contains_key(&name) {
            log.warning(format!("style '{name}' already defined, first wins"));
            return;
        }

        let mut set = PropSet::EMPTY;
        apply_name_heuristics(&name, &mut set);

        if let Some(parent) = dom.attr(node, "style:parent-style-name") {
            if let Some(parent_set) = self.styles.get(parent) {
                set = set.union(*parent_set);
            }
            apply_name_heuristics(parent, &mut set);
        }

        for child in dom.children(node) {
            let Some(tag) = dom.tag(child) else { continue };
            if !tags::is_properties(tag) {
                continue;
            }
            if let Some(weight) = dom.attr(child, "fo:font-weight") {
                if weight.contains("bold") {
                    set.insert(Prop::Bold);
                } else if weight.contains("normal") {
                    set.remove(Prop::Bold);
                    set.insert(Prop::NotBold);
                }
            }
            if let Some(style) = dom.attr(child, "fo:font-style") {
                if style.contains("italic") {
                    set.insert(Prop::Italic);
                } else if style.contains("normal") {
                    set.remove(Prop::Italic);
                    set.insert(Prop::NotItalic);
                }
            }
            if let Some(font) = dom.attr(child, "style:font-name") {
                let font = font.to_lowercase();
                if !font.is_empty() {
                    if font.contains("cour") {
                        set.insert(Prop::Monospace);
                    } else {
                        set.remove(Prop::Monospace);
                        set.insert(Prop::NotMonospace);
                    }
                    if font.contains("antiqua") && antiqua_is_bold {
                        set.insert(Prop::Bold);
                    }
                }
            }
        }

        self.styles.insert(name, set);
    }

    fn collect_list_style(&mut self, dom: &Dom, node: NodeId, log: &mut RunLog) {
        let name = match dom.attr(node, "style:name") {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => return,
        };
        let levels = self.list_styles.entry(name.clone()).or_default();
        for child in dom.children(node) {
            let kind = match dom.tag(child) {
                Some("text:list-level-style-bullet") => ListKind::Bullet,
                Some("text:list-level-style-number") => ListKind::Ordered,
                _ => continue,
            };
            let level = match dom.attr(child, "text:level").map(str::parse::<u32>) {
                Some(Ok(n)) if n >= 1 => n,
                _ => {
                    log.warning(format!("list style '{name}' has a bad level, assuming 1"));
                    1
                }
            };
            levels.insert(level, kind);
        }
    }
}

fn apply_name_heuristics(name: &str, set: &mut PropSet) {
    let lower = name.to_lowercase();
    if lower.contains("note") {
        set.insert(Prop::Note);
    }
    if lower.contains("head") {
        set.insert(Prop::Header);
    }
    if lower.contains("caption") {
        set.insert(Prop::Caption);
    }
}

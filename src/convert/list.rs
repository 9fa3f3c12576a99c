//! List conversion: `text:list` into `ul`/`ol` with `li` items.

use crate::dom::{Dom, NodeId};
use crate::style::ListKind;

use super::Engine;

impl Engine {
    /// Convert a `text:list`. The list-style name may sit on this element
    /// or be inherited from an enclosing list; the item kind comes from
    /// the style's level map, falling back to the nearest lower level and
    /// finally to a bullet.
    pub(crate) fn process_list(&mut self, src: &Dom, list: NodeId, out: NodeId) {
        let own_style = src.attr(list, "text:style-name").unwrap_or("").to_string();
        let pushed = !own_style.is_empty();
        if pushed {
            self.list_stack.push(own_style);
        }
        self.list_level += 1;

        let style_name = self.list_stack.last().cloned().unwrap_or_default();
        let kind = match self.styles.list_kind(&style_name, self.list_level) {
            Some(kind) => kind,
            None => {
                self.log
                    .warning("list with undefined list type, assuming a bullet list");
                ListKind::Bullet
            }
        };

        // The container appears at the first item, so a list without
        // items leaves nothing behind and header content written into
        // the parent stays ahead of it.
        let mut list_el = NodeId::NONE;
        for child in src.child_ids(list) {
            match src.tag(child) {
                Some("text:list-item") => {
                    if list_el.is_none() {
                        list_el = self.dom.create_element(kind.tag());
                        self.dom.append(out, list_el);
                    }
                    let li = self.dom.create_element("li");
                    self.dom.append(list_el, li);
                    self.process_block(src, child, li, false);
                }
                // Header content is not an item; it pours into the
                // list's container.
                Some("text:list-header") => self.process_block(src, child, out, false),
                _ => {}
            }
        }

        self.list_level -= 1;
        if pushed {
            self.list_stack.pop();
        }
    }
}

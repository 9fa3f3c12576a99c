//! Block-level dispatch: paragraphs, headings, tables, lists, drawings.

use crate::dom::{Dom, NodeId};
use crate::odt::tags::{self, SourceTag};
use crate::refs;

use super::Engine;

impl Engine {
    /// Process every child of a block container into `out`.
    ///
    /// `formula` marks a drawing frame whose description identified it as
    /// an embedded formula; it changes how `draw:object` children are
    /// rendered.
    pub(crate) fn process_block(&mut self, src: &Dom, container: NodeId, out: NodeId, formula: bool) {
        // Set when an object was rendered as math, to drop the bitmap
        // fallback that follows it inside the same frame.
        let mut skip_image = false;
        for child in src.child_ids(container) {
            self.process_block_child(src, child, out, formula, &mut skip_image);
        }
    }

    fn process_block_child(
        &mut self,
        src: &Dom,
        node: NodeId,
        out: NodeId,
        formula: bool,
        skip_image: &mut bool,
    ) {
        let Some(tag) = src.tag(node) else {
            // Stray block-level text (usually indentation in the source).
            return;
        };
        match tags::classify(tag) {
            SourceTag::Paragraph => self.emit_paragraph(src, node, out),
            SourceTag::Heading => {
                if self.in_table() {
                    self.emit_paragraph(src, node, out);
                } else {
                    self.emit_heading(src, node);
                }
            }
            SourceTag::Table => self.process_table(src, node, out),
            SourceTag::List => self.process_list(src, node, out),
            // Sections are transparent containers.
            SourceTag::Section => self.process_block(src, node, out, formula),
            SourceTag::Image => {
                if *skip_image {
                    *skip_image = false;
                } else {
                    self.emit_image(src, node, out);
                }
            }
            SourceTag::Object => {
                if self.emit_object(src, node, out, formula) {
                    *skip_image = true;
                }
            }
            SourceTag::Drawing => {
                let nested_formula = is_formula_frame(src, node);
                self.process_block(src, node, out, nested_formula);
            }
            SourceTag::Ignored => {}
            _ => {
                self.log.info(format!("tag '{tag}' not processed"));
            }
        }
    }

    /// `text:p` (or an in-table heading) becomes a `p` with resolved
    /// formatting. Note-styled paragraphs become `note` elements directly.
    fn emit_paragraph(&mut self, src: &Dom, node: NodeId, out: NodeId) {
        let style = src.attr(node, "text:style-name").unwrap_or("");
        let props = self.styles.resolve(style, &mut self.log);
        let tag = if props.contains(crate::style::Prop::Note) {
            "note"
        } else {
            "p"
        };
        let p = self.dom.create_element(tag);
        if let Some(tokens) = props.otherprops() {
            self.dom.set_attr(p, "otherprops", &tokens);
        }
        self.dom.append(out, p);
        self.process_paragraph(src, node, p, props, false);
    }

    /// `text:h` outside tables starts a new topic: a marker with a level,
    /// a processed title, and a fresh keywords container.
    fn emit_heading(&mut self, src: &Dom, node: NodeId) {
        let level = match src.attr(node, "text:outline-level").map(str::parse::<u32>) {
            Some(Ok(n)) if n >= 1 => n,
            _ => {
                self.log.warning("heading without a valid outline level, assuming 1");
                1
            }
        };
        let (marker, title) = self.new_topic_marker(level);

        let style = src.attr(node, "text:style-name").unwrap_or("");
        let props = self.styles.resolve(style, &mut self.log);
        self.process_paragraph(src, node, title, props, true);

        // A bookmark in the heading addresses the topic, not the title.
        refs::move_id(&mut self.dom, &mut self.forwards, title, marker);
    }

    /// `draw:image` becomes an `image` reference with the extension
    /// normalized to the formats DITA renderers expect.
    pub(crate) fn emit_image(&mut self, src: &Dom, node: NodeId, out: NodeId) {
        let Some(href) = src.attr(node, "xlink:href") else {
            self.log.info("image without a reference skipped");
            return;
        };
        let image = self.dom.create_element("image");
        self.dom.set_attr(image, "href", &normalize_image_href(href));
        self.dom.set_attr(image, "placement", "break");
        self.dom.append(out, image);
    }

    /// `draw:object`: embedded math becomes an equation reference and its
    /// member stream is queued for extraction. Returns true when math was
    /// emitted (so the fallback image can be skipped).
    pub(crate) fn emit_object(
        &mut self,
        src: &Dom,
        node: NodeId,
        out: NodeId,
        formula: bool,
    ) -> bool {
        if !formula && !self.opts.aggressive_formula {
            self.log.info("embedded object not processed");
            return false;
        }
        let Some(href) = src.attr(node, "xlink:href") else {
            self.log.info("embedded object without a reference skipped");
            return false;
        };
        let base = href.strip_prefix("./").unwrap_or(href);
        let member = format!("{base}/content.xml");

        let equation = self.dom.create_element("equation-inline");
        let mathml = self.dom.create_element("mathml");
        let mathmlref = self.dom.create_element("mathmlref");
        self.dom.set_attr(mathmlref, "href", &member);
        self.dom.append(equation, mathml);
        self.dom.append(mathml, mathmlref);
        self.dom.append(out, equation);

        self.extract.insert(member);
        true
    }
}

/// A drawing frame renders as a formula when its description says so.
pub(crate) fn is_formula_frame(src: &Dom, frame: NodeId) -> bool {
    for child in src.children(frame) {
        if src.is_tag(child, "svg:desc") {
            return src.text_content(child).trim().eq_ignore_ascii_case("formula");
        }
    }
    false
}

fn normalize_image_href(href: &str) -> String {
    let (stem, ext) = match href.rsplit_once('.') {
        Some((stem, ext)) => (stem, ext.to_lowercase()),
        None => (href, String::new()),
    };
    match ext.as_str() {
        "jpg" | "jpeg" => format!("{stem}.jpg"),
        _ => format!("{stem}.png"),
    }
}

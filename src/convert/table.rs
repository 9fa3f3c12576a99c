//! Table conversion: ODF tables into CALS `table`/`tgroup` structures.

use crate::dom::{Dom, NodeId};

use super::{Engine, add_otherprops};

impl Engine {
    /// Convert a `table:table` element into `table > tgroup > colspec* +
    /// tbody > row > entry`. Header rows flag every entry so the
    /// restructuring pass can build `thead` and table titles later.
    pub(crate) fn process_table(&mut self, src: &Dom, table: NodeId, out: NodeId) {
        self.in_table += 1;

        let cols = count_columns(src, table).max(1);

        let table_el = self.dom.create_element("table");
        self.dom.append(out, table_el);
        let tgroup = self.dom.create_element("tgroup");
        self.dom.set_attr(tgroup, "cols", &cols.to_string());
        self.dom.append(table_el, tgroup);
        for index in 1..=cols {
            let colspec = self.dom.create_element("colspec");
            self.dom.set_attr(colspec, "colname", &format!("col{index}"));
            self.dom.append(tgroup, colspec);
        }
        let tbody = self.dom.create_element("tbody");
        self.dom.append(tgroup, tbody);

        for child in src.child_ids(table) {
            match src.tag(child) {
                Some("table:table-row") => self.process_row(src, child, tbody, false),
                Some("table:table-header-rows") => {
                    for row in src.child_ids(child) {
                        if src.is_tag(row, "table:table-row") {
                            self.process_row(src, row, tbody, true);
                        }
                    }
                }
                _ => {}
            }
        }

        self.in_table -= 1;
    }

    fn process_row(&mut self, src: &Dom, row: NodeId, tbody: NodeId, header: bool) {
        let row_el = self.dom.create_element("row");
        self.dom.append(tbody, row_el);

        let mut col = 1usize;
        for cell in src.child_ids(row) {
            match src.tag(cell) {
                Some("table:table-cell") => {
                    let span = match src
                        .attr(cell, "table:number-columns-spanned")
                        .map(str::parse::<usize>)
                    {
                        Some(Ok(n)) if n >= 1 => n,
                        _ => 1,
                    };
                    let entry = self.dom.create_element("entry");
                    if span > 1 {
                        self.dom.set_attr(entry, "namest", &format!("col{col}"));
                        self.dom
                            .set_attr(entry, "nameend", &format!("col{}", col + span - 1));
                        self.dom.set_attr(entry, "align", "center");
                    }
                    if header {
                        add_otherprops(&mut self.dom, entry, "header");
                    }
                    self.dom.append(row_el, entry);
                    self.process_block(src, cell, entry, false);
                    col += span;
                }
                Some("table:covered-table-cell") => {
                    col += 1;
                }
                _ => {}
            }
        }
    }
}

/// Count the table's columns from its column declarations, honoring
/// repetition counts. Malformed counts are taken as 1.
fn count_columns(src: &Dom, table: NodeId) -> usize {
    let mut cols = 0;
    for child in src.children(table) {
        match src.tag(child) {
            Some("table:table-column") => cols += repeat_count(src, child),
            Some("table:table-header-columns") => {
                for inner in src.children(child) {
                    if src.is_tag(inner, "table:table-column") {
                        cols += repeat_count(src, inner);
                    }
                }
            }
            _ => {}
        }
    }
    cols
}

fn repeat_count(src: &Dom, column: NodeId) -> usize {
    match src
        .attr(column, "table:number-columns-repeated")
        .map(str::parse::<usize>)
    {
        Some(Ok(n)) if n >= 1 => n,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::walk_fragment;
    use crate::convert::ConvertOptions;

    const TABLE: &str = r#"<table:table table:name="T1">
        <table:table-column table:number-columns-repeated="2"/>
        <table:table-column/>
        <table:table-header-rows>
            <table:table-row>
                <table:table-cell><text:p>H1</text:p></table:table-cell>
                <table:table-cell><text:p>H2</text:p></table:table-cell>
                <table:table-cell><text:p>H3</text:p></table:table-cell>
            </table:table-row>
        </table:table-header-rows>
        <table:table-row>
            <table:table-cell table:number-columns-spanned="2"><text:p>wide</text:p></table:table-cell>
            <table:covered-table-cell/>
            <table:table-cell><text:p>c</text:p></table:table-cell>
        </table:table-row>
    </table:table>"#;

    #[test]
    fn counts_repeated_columns_and_builds_colspecs() {
        let engine = walk_fragment("", TABLE, ConvertOptions::default());
        let dom = &engine.dom;
        let tgroup = dom.collect_tags(engine.body, "tgroup")[0];
        assert_eq!(dom.attr(tgroup, "cols"), Some("3"));
        let colspecs = dom.collect_tags(tgroup, "colspec");
        assert_eq!(colspecs.len(), 3);
        assert_eq!(dom.attr(colspecs[2], "colname"), Some("col3"));
    }

    #[test]
    fn header_rows_flag_entries() {
        let engine = walk_fragment("", TABLE, ConvertOptions::default());
        let dom = &engine.dom;
        let rows = dom.collect_tags(engine.body, "row");
        assert_eq!(rows.len(), 2);
        let header_entry = dom.first_child(rows[0]);
        assert_eq!(dom.attr(header_entry, "otherprops"), Some("header"));
        let body_entry = dom.first_child(rows[1]);
        assert_eq!(dom.attr(body_entry, "otherprops"), None);
    }

    #[test]
    fn spans_set_namest_nameend() {
        let engine = walk_fragment("", TABLE, ConvertOptions::default());
        let dom = &engine.dom;
        let rows = dom.collect_tags(engine.body, "row");
        let wide = dom.first_child(rows[1]);
        assert_eq!(dom.attr(wide, "namest"), Some("col1"));
        assert_eq!(dom.attr(wide, "nameend"), Some("col2"));
        assert_eq!(dom.attr(wide, "align"), Some("center"));
        // The covered cell advances the column counter.
        let narrow = dom.next_sibling(wide);
        assert_eq!(dom.attr(narrow, "namest"), None);
        assert_eq!(dom.text_content(narrow), "c");
    }

    #[test]
    fn heading_inside_table_is_a_paragraph() {
        let engine = walk_fragment(
            "",
            r#"<table:table><table:table-column/><table:table-row><table:table-cell><text:h text:outline-level="1">not a topic</text:h></table:table-cell></table:table-row></table:table>"#,
            ConvertOptions::default(),
        );
        // Only the initial untitled marker exists.
        assert_eq!(engine.dom.collect_tags(engine.body, "temp:topic").len(), 1);
        let entries = engine.dom.collect_tags(engine.body, "entry");
        assert_eq!(engine.dom.text_content(entries[0]), "not a topic");
    }
}

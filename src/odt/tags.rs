//! Source-tag taxonomy for ODF content.
//!
//! Every tag the walker reacts to is classified here in one closed match,
//! so the dispatch sites stay free of string comparisons. The only prefix
//! rule is the `draw:` family catch-all.

/// What a source element means to the conversion walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTag {
    /// `text:p`
    Paragraph,
    /// `text:h`
    Heading,
    /// `text:span`
    Span,
    /// `text:description`, `text:sequence`: contents taken as inline text.
    InlineText,
    /// `text:s`
    Space,
    /// `text:tab`
    Tab,
    /// `text:a`
    Anchor,
    /// `text:line-break`
    LineBreak,
    /// `text:bookmark`, `text:bookmark-start`
    Bookmark,
    /// `text:bookmark-ref`
    BookmarkRef,
    /// `text:alphabetical-index-mark`
    IndexMark,
    /// `text:note`
    Footnote,
    /// `draw:image`
    Image,
    /// `draw:object`
    Object,
    /// Any other `draw:*` container (frames, text boxes).
    Drawing,
    /// `table:table`
    Table,
    /// `text:list`
    List,
    /// `text:section` (transparent container)
    Section,
    /// Known and deliberately skipped, never logged.
    Ignored,
    /// Unknown to the converter; logged and skipped.
    Other,
}

/// Classify a qualified source tag name.
pub fn classify(tag: &str) -> SourceTag {
    match tag {
        "text:p" => SourceTag::Paragraph,
        "text:h" => SourceTag::Heading,
        "text:span" => SourceTag::Span,
        "text:description" | "text:sequence" => SourceTag::InlineText,
        "text:s" => SourceTag::Space,
        "text:tab" => SourceTag::Tab,
        "text:a" => SourceTag::Anchor,
        "text:line-break" => SourceTag::LineBreak,
        "text:bookmark" | "text:bookmark-start" => SourceTag::Bookmark,
        "text:bookmark-ref" => SourceTag::BookmarkRef,
        "text:alphabetical-index-mark" => SourceTag::IndexMark,
        "text:note" => SourceTag::Footnote,
        "draw:image" => SourceTag::Image,
        "draw:object" => SourceTag::Object,
        "table:table" => SourceTag::Table,
        "text:list" => SourceTag::List,
        "text:section" => SourceTag::Section,
        "text:table-of-content"
        | "text:sequence-decls"
        | "office:forms"
        | "text:bookmark-end"
        | "text:soft-page-break"
        // Consumed by the drawing-frame formula check.
        | "svg:desc"
        | "svg:title" => SourceTag::Ignored,
        _ if tag.starts_with("draw:") => SourceTag::Drawing,
        _ => SourceTag::Other,
    }
}

/// True for the closed set of `*-properties` style children that carry
/// explicit formatting overrides.
pub fn is_properties(tag: &str) -> bool {
    matches!(
        tag,
        "style:text-properties"
            | "style:paragraph-properties"
            | "style:table-properties"
            | "style:table-cell-properties"
            | "style:table-row-properties"
            | "style:table-column-properties"
            | "style:graphic-properties"
            | "style:section-properties"
            | "style:list-level-properties"
            | "style:properties"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_tags() {
        assert_eq!(classify("text:p"), SourceTag::Paragraph);
        assert_eq!(classify("text:bookmark-start"), SourceTag::Bookmark);
        assert_eq!(classify("text:bookmark-end"), SourceTag::Ignored);
        assert_eq!(classify("draw:object"), SourceTag::Object);
        assert_eq!(classify("draw:frame"), SourceTag::Drawing);
        assert_eq!(classify("text:change-start"), SourceTag::Other);
    }

    #[test]
    fn properties_set_is_closed() {
        assert!(is_properties("style:text-properties"));
        assert!(is_properties("style:properties"));
        assert!(!is_properties("style:style"));
        assert!(!is_properties("text:properties-like"));
    }
}

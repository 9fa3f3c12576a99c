//! End-to-end conversion tests over in-memory ODT packages.

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use odt2dita::{ConvertOptions, Converted, convert, convert_file};

fn odt_package(styles: &str, automatic: &str, body: &str) -> Cursor<Vec<u8>> {
    let meta = "<office:document-meta><office:meta><dc:title>Test Guide</dc:title></office:meta></office:document-meta>";
    let styles_doc = format!(
        "<office:document-styles><office:styles>{styles}</office:styles></office:document-styles>"
    );
    let content_doc = format!(
        "<office:document-content><office:automatic-styles>{automatic}</office:automatic-styles><office:body><office:text>{body}</office:text></office:body></office:document-content>"
    );

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    zip.start_file("meta.xml", options).unwrap();
    zip.write_all(meta.as_bytes()).unwrap();
    zip.start_file("styles.xml", options).unwrap();
    zip.write_all(styles_doc.as_bytes()).unwrap();
    zip.start_file("content.xml", options).unwrap();
    zip.write_all(content_doc.as_bytes()).unwrap();
    zip.start_file("Pictures/logo.png", options).unwrap();
    zip.write_all(&[0x89, b'P', b'N', b'G']).unwrap();
    zip.finish().unwrap()
}

fn run(styles: &str, automatic: &str, body: &str) -> Converted {
    convert(
        odt_package(styles, automatic, body),
        "test",
        &ConvertOptions::default(),
    )
    .unwrap()
}

#[test]
fn headings_become_topics_and_a_map() {
    let converted = run(
        "",
        "",
        concat!(
            r#"<text:h text:outline-level="1">Overview</text:h>"#,
            "<text:p>First paragraph.</text:p>",
            r#"<text:h text:outline-level="2">Details</text:h>"#,
            "<text:p>More text.</text:p>",
        ),
    );

    // The implicit untitled topic before the first heading is empty and
    // merges into it.
    assert_eq!(converted.topics.len(), 2);
    assert_eq!(converted.topics[0].name, "c_overview.dita");
    assert_eq!(converted.topics[1].name, "c_details.dita");
    assert_eq!(
        converted.topics[0].content,
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<!DOCTYPE concept PUBLIC \"-//OASIS//DTD DITA Concept//EN\" \"concept.dtd\">\n",
            "<concept id=\"c_overview\" xmlns:ditaarch=\"http://dita.oasis-open.org/architecture/2005/\">",
            "<title>Overview</title><shortdesc/>",
            "<conbody><p>First paragraph.</p></conbody>",
            "</concept>\n",
        )
    );

    assert_eq!(converted.map.name, "test.ditamap");
    assert!(converted.map.content.contains("<title>Test Guide</title>"));
    assert!(converted.map.content.contains(
        r#"<topicref href="c_overview.dita" format="dita"><topicref href="c_details.dita" format="dita"/></topicref>"#
    ));
}

#[test]
fn character_styles_and_admonitions_resolve() {
    let converted = run(
        "",
        r#"<style:style style:name="T1" style:family="text"><style:text-properties fo:font-weight="bold"/></style:style>"#,
        concat!(
            "<text:p>plain <text:span text:style-name=\"T1\">bold</text:span> after</text:p>",
            "<text:p>Note: mind the gap.</text:p>",
        ),
    );

    assert_eq!(converted.topics.len(), 1);
    assert_eq!(converted.topics[0].name, "c_notitle.dita");
    let doc = &converted.topics[0].content;
    assert!(doc.contains("<p>plain <b>bold</b> after</p>"));
    assert!(doc.contains(r#"<note type="note">mind the gap.</note>"#));
}

#[test]
fn task_topic_gets_steps_from_first_list() {
    let converted = run(
        "",
        r#"<text:list-style style:name="L1"><text:list-level-style-number text:level="1"/></text:list-style>"#,
        concat!(
            r#"<text:h text:outline-level="1">Install the unit [t]</text:h>"#,
            "<text:p>Context.</text:p>",
            r#"<text:list text:style-name="L1">"#,
            "<text:list-item><text:p>Open the box.</text:p></text:list-item>",
            "<text:list-item><text:p>Remove the unit.</text:p></text:list-item>",
            "</text:list>",
        ),
    );

    assert_eq!(converted.topics.len(), 1);
    assert_eq!(converted.topics[0].name, "t_install_the_unit.dita");
    let doc = &converted.topics[0].content;
    assert!(doc.contains("<!DOCTYPE task PUBLIC \"-//OASIS//DTD DITA Task//EN\" \"task.dtd\">"));
    assert!(doc.contains("<title>Install the unit</title>"));
    assert!(doc.contains("<context><p>Context.</p></context>"));
    assert!(doc.contains(
        "<steps><step><cmd>Open the box.</cmd></step><step><cmd>Remove the unit.</cmd></step></steps>"
    ));
    assert!(!doc.contains("Place steps here"));
}

#[test]
fn bookmarks_resolve_across_topics() {
    let converted = run(
        "",
        "",
        concat!(
            r#"<text:h text:outline-level="1">One</text:h>"#,
            r#"<text:p><text:bookmark text:name="target"/>Anchor here.</text:p>"#,
            r#"<text:h text:outline-level="1">Two</text:h>"#,
            r#"<text:p>See <text:bookmark-ref text:ref-name="target">here</text:bookmark-ref>.</text:p>"#,
        ),
    );

    assert_eq!(converted.topics.len(), 2);
    assert!(converted.topics[0].content.contains(r#"<p id="target">Anchor here.</p>"#));
    assert!(converted.topics[1].content.contains(
        r#"<xref href="c_one.dita#c_one/target" scope="local">here</xref>"#
    ));
}

#[test]
fn unresolved_bookmark_is_an_error_in_the_log() {
    let converted = run(
        "",
        "",
        concat!(
            r#"<text:h text:outline-level="1">One</text:h>"#,
            r#"<text:p>See <text:bookmark-ref text:ref-name="nowhere">there</text:bookmark-ref>.</text:p>"#,
        ),
    );
    assert!(
        converted
            .log
            .entries()
            .iter()
            .any(|e| e.message.contains("nowhere"))
    );
}

#[test]
fn registered_trademark_signs_are_dropped() {
    let converted = run(
        "",
        "",
        concat!(
            r#"<text:h text:outline-level="1">One</text:h>"#,
            "<text:p>Widget\u{ae} rules.</text:p>",
        ),
    );
    assert!(converted.topics[0].content.contains("<p>Widget rules.</p>"));
}

#[test]
fn convert_file_writes_topics_map_and_assets() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("guide.odt");
    let package = odt_package(
        "",
        "",
        concat!(
            r#"<text:h text:outline-level="1">Overview</text:h>"#,
            "<text:p>Body text.</text:p>",
            r#"<text:p><draw:frame><draw:image xlink:href="Pictures/logo.png"/></draw:frame></text:p>"#,
        ),
    );
    std::fs::write(&input, package.into_inner()).unwrap();

    let out_dir = dir.path().join("out");
    let log = convert_file(&input, &out_dir, &ConvertOptions::default()).unwrap();

    assert!(out_dir.join("c_overview.dita").exists());
    assert!(out_dir.join("guide.ditamap").exists());
    assert!(out_dir.join("Pictures/logo.png").exists());
    assert!(log.max_severity() <= Some(odt2dita::Severity::Warning));
}

#[test]
fn missing_package_members_fail() {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    zip.start_file("meta.xml", options).unwrap();
    zip.write_all(b"<office:document-meta/>").unwrap();
    let cursor = zip.finish().unwrap();

    let result = convert(cursor, "broken", &ConvertOptions::default());
    assert!(matches!(result, Err(odt2dita::Error::MissingMember(_))));
}

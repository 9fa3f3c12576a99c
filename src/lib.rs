//! # odt2dita
//!
//! Convert OpenDocument Text (ODT) manuals into OASIS DITA topics and a
//! map.
//!
//! ## Features
//!
//! - Resolves named and automatic ODF styles into semantic formatting
//! - Splits documents into concept, task, and reference topics at
//!   headings, with kind markers (`[c]`, `[t]`, `[r]`) in heading text
//! - Keeps bookmarks and cross-references valid through every rewrite
//! - Restructures lists, tables, footnotes, admonitions, and code blocks
//!   into their DITA shapes
//!
//! ## Quick Start
//!
//! ```no_run
//! use odt2dita::{ConvertOptions, Severity, convert_file};
//!
//! let log = convert_file(
//!     "manual.odt".as_ref(),
//!     "dita_out".as_ref(),
//!     &ConvertOptions::default(),
//! )
//! .unwrap();
//! print!("{}", log.render(Severity::Warning));
//! ```
//!
//! For in-memory use, [`convert`] takes any `Read + Seek` source and
//! returns the generated documents as strings.

pub mod convert;
pub mod dom;
pub mod emit;
pub mod error;
pub mod log;
pub mod odt;
pub mod refs;
pub mod rewrite;
pub mod style;
pub mod topic;

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{Read, Seek};
use std::path::Path;

pub use convert::ConvertOptions;
pub use error::{Error, Result};
pub use log::{RunLog, Severity};
pub use odt::Package;

use crate::convert::Engine;
use crate::odt::xml;
use crate::topic::Topic;

/// One generated output document.
pub struct OutputFile {
    pub name: String,
    pub content: String,
}

/// Everything a conversion produces.
pub struct Converted {
    /// The topic documents, one `.dita` file each.
    pub topics: Vec<OutputFile>,
    /// The `.ditamap` tying the topics together.
    pub map: OutputFile,
    /// Package members (embedded math) to copy alongside the topics.
    pub extract: BTreeSet<String>,
    /// Everything logged during the run.
    pub log: RunLog,
}

/// Convert an ODT package read from any seekable source. `name` is the
/// base name for the map file.
pub fn convert<R: Read + Seek>(reader: R, name: &str, opts: &ConvertOptions) -> Result<Converted> {
    let mut package = Package::open(reader)?;
    convert_package(&mut package, name, opts)
}

/// Convert an already-open package.
pub fn convert_package<R: Read + Seek>(
    package: &mut Package<R>,
    name: &str,
    opts: &ConvertOptions,
) -> Result<Converted> {
    let meta = xml::parse(&package.member_string("meta.xml")?)?;
    let map_title = xml::document_title(&meta).unwrap_or_else(|| name.to_string());

    let mut engine = Engine::new(opts.clone());
    let antiqua = engine.opts.antiqua_is_bold;

    let styles = xml::parse(&package.member_string("styles.xml")?)?;
    let styles_root = xml::root_element(&styles);
    for section in ["office:styles", "office:automatic-styles"] {
        let container = xml::find_first(&styles, styles_root, section);
        if container.is_some() {
            engine
                .styles
                .collect(&styles, container, antiqua, &mut engine.log);
        }
    }

    let content = xml::parse(&package.member_string("content.xml")?)?;
    let content_root = xml::root_element(&content);
    let autos = xml::find_first(&content, content_root, "office:automatic-styles");
    if autos.is_some() {
        engine
            .styles
            .collect(&content, autos, antiqua, &mut engine.log);
    }

    let text_body = xml::find_first(&content, content_root, "office:text");
    if text_body.is_none() {
        return Err(Error::InvalidPackage(
            "content.xml has no office:text body".to_string(),
        ));
    }
    engine.walk_body(&content, text_body);

    // Registered-trademark signs never survive into the output.
    let body = engine.body;
    engine.dom.replace_text(body, "\u{ae}", "");

    rewrite::run(
        &mut engine.dom,
        engine.body,
        &mut engine.forwards,
        &mut engine.log,
    );

    let mut seg = topic::segment(
        &mut engine.dom,
        engine.body,
        &mut engine.forwards,
        &engine.opts,
        &mut engine.log,
    );
    for i in 0..seg.topics.len() {
        topic::finalize(
            &mut seg.topics[i],
            &seg.bookmarks,
            &engine.forwards,
            &engine.opts,
            &mut engine.log,
        );
    }

    for t in &seg.topics {
        if !emit::has_text(t) {
            engine.log.info(format!("topic '{}' has no content, skipped", t.id));
        }
    }
    let kept: Vec<&Topic> = seg.topics.iter().filter(|t| emit::has_text(t)).collect();

    let map = OutputFile {
        name: format!("{name}.ditamap"),
        content: emit::map_document(&map_title, &kept),
    };
    let topics = kept
        .iter()
        .map(|t| OutputFile {
            name: emit::topic_file_name(t),
            content: emit::topic_document(t),
        })
        .collect();

    Ok(Converted {
        topics,
        map,
        extract: engine.extract,
        log: engine.log,
    })
}

/// Convert an ODT file into a directory of DITA files, copying images
/// and extracted math members along. Returns the run log.
pub fn convert_file(input: &Path, out_dir: &Path, opts: &ConvertOptions) -> Result<RunLog> {
    let base = input
        .file_stem()
        .map_or_else(|| "document".to_string(), |s| s.to_string_lossy().into_owned());
    let mut package = Package::open(File::open(input)?)?;
    let converted = convert_package(&mut package, &base, opts)?;

    fs::create_dir_all(out_dir)?;
    for topic in &converted.topics {
        fs::write(out_dir.join(&topic.name), &topic.content)?;
    }
    fs::write(out_dir.join(&converted.map.name), &converted.map.content)?;

    let mut assets: Vec<String> = package
        .member_names()
        .into_iter()
        .filter(|n| n.starts_with("Pictures/") && !n.ends_with('/'))
        .collect();
    assets.extend(converted.extract.iter().cloned());
    for member in assets {
        if !package.has_member(&member) {
            continue;
        }
        let data = package.member_bytes(&member)?;
        let target = out_dir.join(&member);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, data)?;
    }

    Ok(converted.log)
}

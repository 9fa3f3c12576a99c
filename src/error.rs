//! Error types for odt2dita operations.

use thiserror::Error;

/// Errors that can occur while reading an ODT package or writing DITA output.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid ODT package: {0}")]
    InvalidPackage(String),

    #[error("Missing package member: {0}")]
    MissingMember(String),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;

//! ODT zip package access.
//!
//! An ODT file is a zip archive with well-known member names
//! (`content.xml`, `styles.xml`, `meta.xml`, `Pictures/…`). This wrapper
//! reads members by name and decodes text members tolerantly.

use std::io::{Read, Seek};

use zip::ZipArchive;

use crate::error::{Error, Result};

/// An open ODT package.
pub struct Package<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> Package<R> {
    /// Open a package from any readable, seekable source.
    pub fn open(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)
            .map_err(|e| Error::InvalidPackage(format!("not a zip archive: {e}")))?;
        Ok(Self { archive })
    }

    /// Raw bytes of a member.
    pub fn member_bytes(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(name)
            .map_err(|_| Error::MissingMember(name.to_string()))?;
        let mut buf = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// A text member, decoded to a string.
    pub fn member_string(&mut self, name: &str) -> Result<String> {
        let bytes = self.member_bytes(name)?;
        Ok(decode_member(&bytes))
    }

    /// Names of every member in the package.
    pub fn member_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }
}

/// Decode member bytes: strict UTF-8 first (the normal case for ODF),
/// Windows-1252 as the lossless fallback for stray legacy content.
fn decode_member(bytes: &[u8]) -> String {
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if !had_errors {
        return text.into_owned();
    }
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    text.into_owned()
}

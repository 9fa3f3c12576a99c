//! ODT package reading: zip members, XML parsing, source-tag taxonomy.

pub mod package;
pub mod tags;
pub mod xml;

pub use package::Package;
pub use tags::SourceTag;

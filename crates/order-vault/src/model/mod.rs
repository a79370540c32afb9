//! Data structures: the composite [`OrderDocument`] and the four normalized
//! rows it decomposes into.

pub mod document;
pub mod records;

pub use document::*;
pub use records::*;

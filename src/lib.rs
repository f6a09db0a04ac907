// Veratag - Structural Tag Extraction Library
//!
//! Veratag extracts code navigation tags from OpenVera hardware-verification
//! sources with a lightweight declaration parser: no grammar, no syntax
//! tree, just enough statement tracking to find the declarations worth
//! tagging and keep going on input that does not fully parse.

pub mod extractors;
pub mod source;

#[cfg(test)]
pub mod tests;

// Re-export common types
pub use extractors::{
    Access, ExtractError, ExtractorConfig, Tag, TagBuffer, TagHandle, TagKind, TagSink,
    VeraExtractor,
};
pub use source::{CharSource, MacroDef, MacroTable, SourceText};

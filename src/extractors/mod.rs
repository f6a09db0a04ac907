// Veratag's Language Extractors Module
//
// Each extractor owns declaration parsing for one language and turns source
// text into Tag records. base holds the shared data model; language engines
// are deliberately independent of one another.

pub mod base;
pub mod vera;

// Re-export the types callers actually touch
pub use base::{
    generate_id, Access, ExtractError, ExtractorConfig, Tag, TagBuffer, TagHandle, TagKind,
    TagSink,
};
pub use vera::VeraExtractor;

// Base Extractor Types for Veratag
//
// Shared data model for the per-language declaration parsers: the tag record
// handed to sinks, the tag-kind taxonomy, capability configuration, and the
// crate's public error type. Language engines live in sibling modules and
// only depend on what is defined here.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// A code tag (class, function, member, signal, etc.) extracted from source.
///
/// One record per qualifying declarator. Records are handed to a [`TagSink`]
/// as soon as the declarator is classified; the only later mutation is the
/// end-line patch applied when the matching block closes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    /// Unique identifier for this tag (MD5 of file:name:line)
    pub id: String,
    /// Tag name as it appears in code
    pub name: String,
    /// Kind of tag (class, member, etc.)
    pub kind: TagKind,
    /// Language the tag was extracted from
    pub language: String,
    /// File path where this tag is defined
    pub file_path: String,
    /// Line number (1-based)
    pub line: u32,
    /// Byte offset near the start of the name token
    pub byte_offset: u32,
    /// Visible only within the defining file (never set for headers)
    pub file_scope: bool,
    /// True for the scope-prefixed duplicate emitted alongside a primary tag
    pub qualified: bool,
    /// Kind of the enclosing scope, when the tag is a member of one
    pub scope_kind: Option<TagKind>,
    /// Scope prefix, each component followed by the `::` separator
    pub scope_name: Option<String>,
    /// Comma-joined parent classes (class/interface tags only)
    pub inheritance: Option<String>,
    /// Access level, when the tag is a member
    pub access: Option<Access>,
    /// (declared kind name, resolved type name) for typedefs and variables
    pub type_ref: Option<(String, String)>,
    /// Captured signature text (function/prototype tags only)
    pub signature: Option<String>,
    /// Line of the statement or block end, patched after emission
    pub end_line: Option<u32>,
}

/// Tag kinds produced by the declaration parsers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Class,
    Enum,
    Enumerator,
    Event,
    Function,
    Interface,
    Local,
    Member,
    Program,
    Prototype,
    Signal,
    Task,
    Typedef,
    Variable,
    ExternVariable,
    Label,
}

impl TagKind {
    /// Kind name as it appears in tag-file output.
    pub fn as_str(&self) -> &'static str {
        match self {
            TagKind::Class => "class",
            TagKind::Enum => "enum",
            TagKind::Enumerator => "enumerator",
            TagKind::Event => "event",
            TagKind::Function => "function",
            TagKind::Interface => "interface",
            TagKind::Local => "local",
            TagKind::Member => "member",
            TagKind::Program => "program",
            TagKind::Prototype => "prototype",
            TagKind::Signal => "signal",
            TagKind::Task => "task",
            TagKind::Typedef => "typedef",
            TagKind::Variable => "variable",
            TagKind::ExternVariable => "externvar",
            TagKind::Label => "label",
        }
    }
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access level attached to member tags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Local,
    Private,
    Protected,
    Public,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Local => "local",
            Access::Private => "private",
            Access::Protected => "protected",
            Access::Public => "public",
        }
    }
}

/// Handle to an emitted tag, used to patch its end line later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHandle(pub usize);

/// Receiver for completed tag records.
///
/// The engine emits a tag exactly once and may later patch its end line when
/// the block it opened is finally closed. Sinks must never retract records:
/// tags emitted before a parse failure stay valid.
pub trait TagSink {
    fn emit(&mut self, tag: Tag) -> TagHandle;
    fn patch_end_line(&mut self, handle: TagHandle, line: u32);
}

/// Vec-backed sink, the default storage for extracted tags.
#[derive(Debug, Default)]
pub struct TagBuffer {
    tags: Vec<Tag>,
}

impl TagBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn into_tags(self) -> Vec<Tag> {
        self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl TagSink for TagBuffer {
    fn emit(&mut self, tag: Tag) -> TagHandle {
        self.tags.push(tag);
        TagHandle(self.tags.len() - 1)
    }

    fn patch_end_line(&mut self, handle: TagHandle, line: u32) {
        if let Some(tag) = self.tags.get_mut(handle.0) {
            tag.end_line = Some(line);
        }
    }
}

/// Capability configuration consulted by the engine. Pure reads only.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Emit tags flagged as file-scoped (suppressed wholesale when false)
    pub file_scope_tags: bool,
    /// Additionally emit a scope-prefixed duplicate of every scoped tag
    pub qualified_tags: bool,
    /// Current file is a header: nothing in it is considered file-scoped
    pub header_file: bool,
    disabled_kinds: HashSet<TagKind>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        // Local and Label are navigation noise, off unless asked for.
        let mut disabled_kinds = HashSet::new();
        disabled_kinds.insert(TagKind::Local);
        disabled_kinds.insert(TagKind::Label);
        Self {
            file_scope_tags: true,
            qualified_tags: false,
            header_file: false,
            disabled_kinds,
        }
    }
}

impl ExtractorConfig {
    pub fn kind_enabled(&self, kind: TagKind) -> bool {
        !self.disabled_kinds.contains(&kind)
    }

    pub fn enable_kind(&mut self, kind: TagKind) -> &mut Self {
        self.disabled_kinds.remove(&kind);
        self
    }

    pub fn disable_kind(&mut self, kind: TagKind) -> &mut Self {
        self.disabled_kinds.insert(kind);
        self
    }

    /// Header detection by extension, for callers that want the convention.
    pub fn is_header_extension(path: &str) -> bool {
        let lower = path.to_ascii_lowercase();
        lower.ends_with(".vrh") || lower.ends_with(".vri")
    }
}

/// Errors that end processing of one input file.
///
/// Diagnostics carry the file name, the failing line, and the offending
/// character. Tags already handed to the sink before the failure point are
/// kept.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("{file}: failed to find match for '{found}' at line {line}")]
    UnbalancedConstruct { file: String, line: u32, found: char },
    #[error("{file}: brace mismatch at line {line}; fallback brace matching also failed")]
    BraceMismatch { file: String, line: u32 },
}

/// Generate a stable id for a tag (MD5 hash of file, name, and line).
pub fn generate_id(file_path: &str, name: &str, line: u32) -> String {
    let input = format!("{}:{}:{}", file_path, name, line);
    let digest = md5::compute(input.as_bytes());
    format!("{:x}", digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generation() {
        let id1 = generate_id("test.vr", "clk", 4);
        let id2 = generate_id("test.vr", "clk", 4);
        let id3 = generate_id("test.vr", "clk", 5);

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1.len(), 32);
    }

    #[test]
    fn test_default_config_kinds() {
        let config = ExtractorConfig::default();
        assert!(config.kind_enabled(TagKind::Class));
        assert!(config.kind_enabled(TagKind::ExternVariable));
        assert!(!config.kind_enabled(TagKind::Local));
        assert!(!config.kind_enabled(TagKind::Label));
    }

    #[test]
    fn test_header_extension() {
        assert!(ExtractorConfig::is_header_extension("pkt.vrh"));
        assert!(ExtractorConfig::is_header_extension("defs.VRI"));
        assert!(!ExtractorConfig::is_header_extension("top.vr"));
    }

    #[test]
    fn test_tag_buffer_patches_end_line() {
        let mut buffer = TagBuffer::new();
        let handle = buffer.emit(Tag {
            id: generate_id("t.vr", "f", 1),
            name: "f".into(),
            kind: TagKind::Function,
            language: "vera".into(),
            file_path: "t.vr".into(),
            line: 1,
            byte_offset: 0,
            file_scope: false,
            qualified: false,
            scope_kind: None,
            scope_name: None,
            inheritance: None,
            access: None,
            type_ref: None,
            signature: None,
            end_line: None,
        });
        buffer.patch_end_line(handle, 9);
        assert_eq!(buffer.tags()[0].end_line, Some(9));
    }
}

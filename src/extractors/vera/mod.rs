// Vera Extractor
//
// Declaration parser for OpenVera testbench sources (.vr) and headers
// (.vrh/.vri). This is not a grammar-complete parser: it recognizes the
// declaration shapes that produce tags (classes, interfaces, programs,
// enums, functions, tasks, members, signals, variables) and skips the rest,
// which keeps it robust against partial or slightly broken input.
//
// Extraction runs in passes. The first pass trusts brace nesting; when it
// detects a brace mismatch, the whole file is rescanned once with a fallback
// that pairs an unmatched open brace with the next closing brace in column
// one. Tags emitted before a failure are never retracted, so a sink may see
// duplicates across the two passes of a retried file.

mod keywords;
mod parens;
mod parser;
mod statement;
mod tags;
mod token;

use tracing::warn;

use self::keywords::KeywordTable;
use self::parser::{Parser, Unwind};
use crate::extractors::base::{ExtractError, ExtractorConfig, Tag, TagBuffer, TagSink};
use crate::source::{MacroDef, MacroTable, SourceText};

enum PassEnd {
    Finished,
    Unbalanced { line: u32, found: char },
    BraceMismatch { line: u32 },
}

pub struct VeraExtractor {
    language: String,
    file_path: String,
    content: String,
    config: ExtractorConfig,
    keywords: KeywordTable,
    macros: MacroTable,
}

impl VeraExtractor {
    pub fn new(language: String, file_path: String, content: String) -> Self {
        let mut config = ExtractorConfig::default();
        config.header_file = ExtractorConfig::is_header_extension(&file_path);
        Self::with_config(language, file_path, content, config)
    }

    pub fn with_config(
        language: String,
        file_path: String,
        content: String,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            language,
            file_path,
            content,
            config,
            keywords: KeywordTable::new(),
            macros: MacroTable::new(),
        }
    }

    pub fn config_mut(&mut self) -> &mut ExtractorConfig {
        &mut self.config
    }

    /// Predefine a macro, as if a `#define` had been seen before line one.
    pub fn define_macro(&mut self, name: &str, def: MacroDef) {
        self.macros.insert(name.to_string(), def);
    }

    /// Extract all tags from the file into a fresh buffer.
    ///
    /// On error the tags collected so far are lost with the buffer; use
    /// [`extract_into`](Self::extract_into) to keep them.
    pub fn extract_tags(&mut self) -> Result<Vec<Tag>, ExtractError> {
        let mut buffer = TagBuffer::new();
        self.extract_into(&mut buffer)?;
        Ok(buffer.into_tags())
    }

    /// Extract into a caller-provided sink, retrying once with fallback
    /// brace matching when the first pass hits a brace mismatch.
    pub fn extract_into(&mut self, sink: &mut dyn TagSink) -> Result<(), ExtractError> {
        match self.run_pass(false, sink) {
            PassEnd::Finished => Ok(()),
            PassEnd::Unbalanced { line, found } => Err(ExtractError::UnbalancedConstruct {
                file: self.file_path.clone(),
                line,
                found,
            }),
            PassEnd::BraceMismatch { .. } => {
                warn!(
                    "{}: retrying file with fallback brace matching",
                    self.file_path
                );
                match self.run_pass(true, sink) {
                    PassEnd::Finished => Ok(()),
                    PassEnd::Unbalanced { line, found } => {
                        Err(ExtractError::UnbalancedConstruct {
                            file: self.file_path.clone(),
                            line,
                            found,
                        })
                    }
                    PassEnd::BraceMismatch { line } => Err(ExtractError::BraceMismatch {
                        file: self.file_path.clone(),
                        line,
                    }),
                }
            }
        }
    }

    /// Run exactly one pass, with or without fallback brace matching, and
    /// never retry. Mostly useful for testing pass behavior in isolation.
    pub fn extract_pass_into(
        &mut self,
        fallback: bool,
        sink: &mut dyn TagSink,
    ) -> Result<(), ExtractError> {
        match self.run_pass(fallback, sink) {
            PassEnd::Finished => Ok(()),
            PassEnd::Unbalanced { line, found } => Err(ExtractError::UnbalancedConstruct {
                file: self.file_path.clone(),
                line,
                found,
            }),
            PassEnd::BraceMismatch { line } => Err(ExtractError::BraceMismatch {
                file: self.file_path.clone(),
                line,
            }),
        }
    }

    fn run_pass(&self, fallback: bool, sink: &mut dyn TagSink) -> PassEnd {
        let mut src = SourceText::with_macros(&self.content, self.macros.clone(), fallback);
        let mut parser = Parser::new(
            &mut src,
            sink,
            &self.config,
            &self.keywords,
            &self.language,
            &self.file_path,
        );
        match parser.create_tags(0, None) {
            // reaching end of input is how a pass finishes
            Err(Unwind::Eof) | Ok(()) => PassEnd::Finished,
            Err(Unwind::Formatting { line, found }) => PassEnd::Unbalanced { line, found },
            Err(Unwind::BraceFormatting { line }) => PassEnd::BraceMismatch { line },
        }
    }
}

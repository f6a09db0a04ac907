// Character Source for Veratag
//
// The declaration parsers never touch raw text. They pull characters from a
// CharSource, which hides comments, string and character literals, and
// preprocessor directives. SourceText is the built-in implementation over an
// in-memory buffer; tests or embedders can substitute their own.

use std::collections::HashMap;
use tracing::debug;

/// Sentinel returned in place of an entire string literal.
pub const STRING_SYMBOL: char = '\u{E001}';
/// Sentinel returned in place of an entire character literal.
pub const CHAR_SYMBOL: char = '\u{E002}';

/// First character of an identifier.
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Continuation character of an identifier.
pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// One `#define` captured while scanning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroDef {
    /// Defined with a parameter list; an argument list at a use site is
    /// consumed and discarded.
    pub has_params: bool,
    /// Replacement text, None for an empty definition. Substitution is a
    /// single level: the replacement is never rescanned for further macros.
    pub replacement: Option<String>,
}

/// Macro definitions visible to identifier analysis, keyed by name.
pub type MacroTable = HashMap<String, MacroDef>;

/// Stream of preprocessed characters consumed by a declaration parser.
pub trait CharSource {
    /// Next significant character, None at end of input.
    fn get_char(&mut self) -> Option<char>;
    /// Push a character back; multiple pushbacks are returned in LIFO order.
    fn unget_char(&mut self, c: char);
    /// 1-based line of the read position.
    fn line(&self) -> u32;
    /// Byte offset of the read position.
    fn byte_offset(&self) -> u32;
    /// Look up a macro definition seen so far.
    fn find_macro(&self, name: &str) -> Option<MacroDef>;
    /// Current `#if`/`#ifdef` nesting depth.
    fn directive_depth(&self) -> u32;
    /// Fallback brace matching is armed for this pass.
    fn brace_format(&self) -> bool;
}

/// In-memory [`CharSource`] with preprocessor handling.
///
/// Comments read as a single space, literals as sentinel characters, and
/// directives are consumed transparently while `#define`s are recorded and
/// conditional nesting depth is tracked.
#[derive(Debug)]
pub struct SourceText {
    chars: Vec<char>,
    idx: usize,
    pushback: Vec<char>,
    line: u32,
    byte: u32,
    at_bol: bool,
    depth: u32,
    macros: MacroTable,
    brace_format: bool,
}

impl SourceText {
    pub fn new(content: &str) -> Self {
        Self::with_macros(content, MacroTable::new(), false)
    }

    pub fn with_macros(content: &str, macros: MacroTable, brace_format: bool) -> Self {
        Self {
            chars: content.chars().collect(),
            idx: 0,
            pushback: Vec::new(),
            line: 1,
            byte: 0,
            at_bol: true,
            depth: 0,
            macros,
            brace_format,
        }
    }

    fn next_raw(&mut self) -> Option<char> {
        let c = *self.chars.get(self.idx)?;
        self.idx += 1;
        self.byte += c.len_utf8() as u32;
        if c == '\n' {
            self.line += 1;
            self.at_bol = true;
        } else if !c.is_ascii_whitespace() {
            self.at_bol = false;
        }
        Some(c)
    }

    fn peek_raw(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek_raw() {
            if c == '\n' {
                break;
            }
            self.next_raw();
        }
    }

    fn skip_block_comment(&mut self) {
        loop {
            match self.next_raw() {
                None => break,
                Some('*') if self.peek_raw() == Some('/') => {
                    self.next_raw();
                    break;
                }
                _ => {}
            }
        }
    }

    fn skip_literal(&mut self, quote: char) {
        loop {
            match self.next_raw() {
                None => break,
                Some('\\') => {
                    self.next_raw();
                }
                Some(c) if c == quote => break,
                _ => {}
            }
        }
    }

    fn skip_inline_space(&mut self) {
        while matches!(self.peek_raw(), Some(' ' | '\t')) {
            self.next_raw();
        }
    }

    /// Consume the rest of a logical directive line, honoring backslash
    /// continuations, and return its text.
    fn directive_tail(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek_raw() {
            if c == '\n' {
                break;
            }
            self.next_raw();
            if c == '\\' && self.peek_raw() == Some('\n') {
                self.next_raw();
                text.push(' ');
                continue;
            }
            text.push(c);
        }
        text
    }

    fn read_define(&mut self) {
        self.skip_inline_space();
        let mut name = String::new();
        while let Some(c) = self.peek_raw() {
            if is_ident_continue(c) {
                self.next_raw();
                name.push(c);
            } else {
                break;
            }
        }
        if name.is_empty() {
            self.directive_tail();
            return;
        }
        // A parameter list is only such when the paren is flush against the
        // name; the parameters themselves are irrelevant here.
        let has_params = self.peek_raw() == Some('(');
        if has_params {
            while let Some(c) = self.peek_raw() {
                if c == '\n' {
                    break;
                }
                self.next_raw();
                if c == ')' {
                    break;
                }
            }
        }
        let tail = self.directive_tail();
        let trimmed = tail.trim();
        let replacement = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        debug!(name = %name, has_params, "recorded macro definition");
        self.macros.insert(name, MacroDef { has_params, replacement });
    }

    fn handle_directive(&mut self) {
        self.skip_inline_space();
        let mut word = String::new();
        while let Some(c) = self.peek_raw() {
            if c.is_ascii_alphabetic() {
                self.next_raw();
                word.push(c);
            } else {
                break;
            }
        }
        match word.as_str() {
            "if" | "ifdef" | "ifndef" => {
                self.depth += 1;
                self.directive_tail();
            }
            "endif" => {
                self.depth = self.depth.saturating_sub(1);
                self.directive_tail();
            }
            "define" => self.read_define(),
            _ => {
                self.directive_tail();
            }
        }
    }
}

impl CharSource for SourceText {
    fn get_char(&mut self) -> Option<char> {
        if let Some(c) = self.pushback.pop() {
            return Some(c);
        }
        loop {
            let bol = self.at_bol;
            let c = self.next_raw()?;
            match c {
                '/' => match self.peek_raw() {
                    Some('/') => {
                        self.skip_line_comment();
                        return Some(' ');
                    }
                    Some('*') => {
                        self.next_raw();
                        self.skip_block_comment();
                        return Some(' ');
                    }
                    _ => return Some('/'),
                },
                '"' => {
                    self.skip_literal('"');
                    return Some(STRING_SYMBOL);
                }
                '\'' => {
                    self.skip_literal('\'');
                    return Some(CHAR_SYMBOL);
                }
                '#' if bol => {
                    self.handle_directive();
                    continue;
                }
                _ => return Some(c),
            }
        }
    }

    fn unget_char(&mut self, c: char) {
        self.pushback.push(c);
    }

    fn line(&self) -> u32 {
        self.line
    }

    fn byte_offset(&self) -> u32 {
        self.byte
    }

    fn find_macro(&self, name: &str) -> Option<MacroDef> {
        self.macros.get(name).cloned()
    }

    fn directive_depth(&self) -> u32 {
        self.depth
    }

    fn brace_format(&self) -> bool {
        self.brace_format
    }
}

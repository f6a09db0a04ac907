// Statement parser for Vera source.
//
// One Parser runs one pass over one file. It pulls preprocessed characters
// from a CharSource, groups them into tokens on the statement ring, and asks
// the classifier (tags.rs) to emit tags at classification points. Parsing
// never returns normally from the top level: it runs until the source raises
// end of input or a formatting failure, both modeled as `Unwind` and carried
// with `?` through every level of block recursion.

use tracing::{debug, warn};

use super::keywords::{Keyword, KeywordTable};
use super::statement::{
    is_contextual_decl, is_contextual_keyword, is_signal_direction, DeclKind, ImplKind,
    MemberAccess, Statement, StatementId, StorageScope, NUM_TOKENS,
};
use super::token::{Token, TokenKind};
use crate::extractors::base::{Access, ExtractorConfig, TagHandle, TagKind, TagSink};
use crate::source::{is_ident_continue, is_ident_start, CharSource, STRING_SYMBOL};

/// Block recursion deeper than this is treated as a formatting failure.
const MAX_NESTING: u32 = 64;

/// Non-local exits of a parse pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Unwind {
    /// End of input; the normal way a pass finishes
    Eof,
    /// A construct could not be matched; fatal for the file
    Formatting { line: u32, found: char },
    /// Unbalanced braces; a fallback pass may still succeed
    BraceFormatting { line: u32 },
}

pub(super) type PResult<T> = Result<T, Unwind>;

/// Records raw argument-list text between explicit start/stop marks.
#[derive(Debug, Default)]
pub(super) struct SignatureRecorder {
    active: bool,
    pub(super) text: String,
}

impl SignatureRecorder {
    pub(super) fn start(&mut self) {
        self.active = true;
        self.text.clear();
    }

    pub(super) fn stop(&mut self) {
        self.active = false;
    }

    pub(super) fn put(&mut self, c: char) {
        if self.active {
            self.text.push(c);
        }
    }

    pub(super) fn put_str(&mut self, s: &str) {
        if self.active {
            self.text.push_str(s);
        }
    }

    pub(super) fn clear_text(&mut self) {
        self.text.clear();
    }

    pub(super) fn chop(&mut self) {
        self.text.pop();
    }
}

pub(super) struct Parser<'a, S: CharSource> {
    pub(super) src: &'a mut S,
    pub(super) sink: &'a mut dyn TagSink,
    pub(super) config: &'a ExtractorConfig,
    pub(super) keywords: &'a KeywordTable,
    pub(super) language: &'a str,
    pub(super) file_path: &'a str,
    pub(super) arena: Vec<Statement>,
    pub(super) anon_id: u32,
    pub(super) sig: SignatureRecorder,
}

impl<'a, S: CharSource> Parser<'a, S> {
    pub(super) fn new(
        src: &'a mut S,
        sink: &'a mut dyn TagSink,
        config: &'a ExtractorConfig,
        keywords: &'a KeywordTable,
        language: &'a str,
        file_path: &'a str,
    ) -> Self {
        Self {
            src,
            sink,
            config,
            keywords,
            language,
            file_path,
            arena: Vec::new(),
            anon_id: 0,
            sig: SignatureRecorder::default(),
        }
    }

    // ---- statement and token ring plumbing ----

    pub(super) fn st(&self, id: StatementId) -> &Statement {
        &self.arena[id]
    }

    pub(super) fn st_mut(&mut self, id: StatementId) -> &mut Statement {
        &mut self.arena[id]
    }

    pub(super) fn active(&self, id: StatementId) -> &Token {
        self.st(id).active()
    }

    pub(super) fn active_mut(&mut self, id: StatementId) -> &mut Token {
        self.st_mut(id).active_mut()
    }

    pub(super) fn prev(&self, id: StatementId, n: usize) -> &Token {
        self.st(id).prev(n)
    }

    pub(super) fn blank_token(&self) -> Token {
        Token::blank(self.src.line(), self.src.byte_offset())
    }

    pub(super) fn init_active(&mut self, id: StatementId) {
        let blank = self.blank_token();
        *self.active_mut(id) = blank;
    }

    pub(super) fn set_token(&mut self, id: StatementId, kind: TokenKind) {
        self.init_active(id);
        self.active_mut(id).kind = kind;
    }

    pub(super) fn advance_token(&mut self, id: StatementId) {
        let blank = self.blank_token();
        let st = self.st_mut(id);
        st.token_index = (st.token_index + 1) % NUM_TOKENS;
        st.tokens[st.token_index] = blank;
    }

    pub(super) fn retard_token(&mut self, id: StatementId) {
        let st = self.st_mut(id);
        st.token_index = (st.token_index + NUM_TOKENS - 1) % NUM_TOKENS;
        self.set_token(id, TokenKind::None);
    }

    pub(super) fn new_statement(&mut self, parent: Option<StatementId>) -> StatementId {
        let blank = self.blank_token();
        let access_default = match parent.map(|p| self.st(p).declaration) {
            Some(DeclKind::Class) => MemberAccess::Known(Access::Private),
            Some(DeclKind::Interface) => MemberAccess::Known(Access::Public),
            _ => MemberAccess::Undefined,
        };
        self.arena.push(Statement::new(blank, parent, access_default));
        let id = self.arena.len() - 1;
        self.reinit_statement(id, false);
        id
    }

    pub(super) fn reinit_statement(&mut self, id: StatementId, partial: bool) {
        let parent = self.st(id).parent;
        let parent_contextual = self.is_contextual_statement(parent);
        let parent_in_function = parent.map_or(false, |p| self.st(p).in_function);
        let blank = self.blank_token();
        let st = self.st_mut(id);
        if !partial {
            st.scope = StorageScope::Global;
            st.declaration = if parent_contextual {
                DeclKind::Base
            } else {
                DeclKind::None
            };
        }
        st.got_paren_name = false;
        st.is_pointer = false;
        st.in_function = parent_in_function;
        st.assignment = false;
        st.not_variable = false;
        st.implementation = ImplKind::Default;
        st.got_args = false;
        st.got_name = false;
        st.have_qualifying_name = false;
        st.token_index = 0;
        for t in st.tokens.iter_mut() {
            *t = blank.clone();
        }
        st.context = blank.clone();
        if !partial {
            st.block_name = blank;
            st.access = st.access_default;
        }
        st.parent_classes.clear();
    }

    pub(super) fn is_contextual_statement(&self, id: Option<StatementId>) -> bool {
        id.map_or(false, |id| is_contextual_decl(self.st(id).declaration))
    }

    pub(super) fn parent_decl(&self, id: StatementId) -> DeclKind {
        self.st(id)
            .parent
            .map_or(DeclKind::None, |p| self.st(p).declaration)
    }

    pub(super) fn inside_enum_body(&self, id: StatementId) -> bool {
        self.parent_decl(id) == DeclKind::Enum
    }

    pub(super) fn inside_interface_body(&self, id: StatementId) -> bool {
        self.parent_decl(id) == DeclKind::Interface
    }

    /// A member belongs to an explicit `::` context or a class-like parent.
    pub(super) fn is_member(&self, id: StatementId) -> bool {
        self.st(id).context.is(TokenKind::Name)
            || self.is_contextual_statement(self.st(id).parent)
    }

    fn add_context(&mut self, id: StatementId, prev: &Token) {
        if prev.is(TokenKind::Name) {
            let st = self.st_mut(id);
            st.context.text.push_str(&prev.text);
            st.context.text.push_str("::");
            st.context.kind = TokenKind::Name;
        }
    }

    // ---- low level character scanning ----

    /// Skip whitespace; a run of it leaves one space in the signature.
    pub(super) fn skip_to_non_white(&mut self) -> Option<char> {
        let mut found = false;
        let c = loop {
            match self.src.get_char() {
                Some(c) if c.is_ascii_whitespace() => found = true,
                other => break other,
            }
        };
        if found {
            self.sig.put(' ');
        }
        c
    }

    /// Skip over a pair of matched characters, honoring nesting.
    ///
    /// When skipping braces on a fallback pass, a preprocessor conditional
    /// that opened or closed inside the construct switches to indentation
    /// matching: scan forward to a closing brace in column one.
    pub(super) fn skip_to_match(&mut self, open: char, close: char) -> PResult<()> {
        let brace_matching = open == '{';
        let brace_formatting = brace_matching && self.src.brace_format();
        let initial_depth = self.src.directive_depth();
        let start_line = self.src.line();
        let mut level = 1u32;
        while level > 0 {
            let Some(c) = self.skip_to_non_white() else {
                warn!(
                    "{}: failed to find match for '{}' at line {}",
                    self.file_path, open, start_line
                );
                return Err(if brace_matching {
                    Unwind::BraceFormatting { line: start_line }
                } else {
                    Unwind::Formatting {
                        line: start_line,
                        found: open,
                    }
                });
            };
            self.sig.put(c);
            if c == open {
                level += 1;
                if brace_formatting && self.src.directive_depth() != initial_depth {
                    self.skip_to_formatted_brace_match();
                    break;
                }
            } else if c == close {
                level -= 1;
                if brace_formatting && self.src.directive_depth() != initial_depth {
                    self.skip_to_formatted_brace_match();
                    break;
                }
            }
        }
        Ok(())
    }

    /// Scan forward to a closing brace in column one.
    fn skip_to_formatted_brace_match(&mut self) {
        let mut c = self.src.get_char();
        let mut next = self.src.get_char();
        while let Some(cur) = c {
            if cur == '\n' && next == Some('}') {
                break;
            }
            c = next;
            next = self.src.get_char();
        }
    }

    /// Disambiguate `<`: shift operators and `<<=` are consumed, a template
    /// style bracket is left for the caller.
    pub(super) fn process_angle_bracket(&mut self) {
        match self.src.get_char() {
            Some('>') => {}
            Some('<') => match self.src.get_char() {
                Some('=') => {}
                Some(c) => self.src.unget_char(c),
                None => {}
            },
            Some(c) => self.src.unget_char(c),
            None => {}
        }
    }

    // ---- identifiers ----

    /// Read an identifier starting with `first` and classify it.
    pub(super) fn read_identifier(&mut self, first: char) -> PResult<Token> {
        let mut token = self.blank_token();
        token.text.push(first);
        loop {
            match self.src.get_char() {
                Some(c) if is_ident_continue(c) => {
                    self.sig.put(c);
                    token.text.push(c);
                }
                Some(c) => {
                    self.src.unget_char(c);
                    break;
                }
                None => break,
            }
        }
        self.analyze_identifier(&mut token)?;
        Ok(token)
    }

    /// Resolve macros, then decide keyword versus name.
    ///
    /// A parameterless macro substitutes its replacement for classification
    /// while the token keeps its original spelling. An empty macro drops the
    /// token entirely; a parameterized one additionally swallows any
    /// argument list at the use site.
    fn analyze_identifier(&mut self, token: &mut Token) -> PResult<()> {
        let mut effective = token.text.clone();
        if let Some(macro_def) = self.src.find_macro(&effective) {
            if macro_def.has_params {
                match self.skip_to_non_white() {
                    Some('(') => self.skip_to_match('(', ')')?,
                    Some(c) => self.src.unget_char(c),
                    None => {}
                }
            }
            match macro_def.replacement {
                Some(replacement) => effective = replacement,
                None => {
                    let blank = self.blank_token();
                    *token = blank;
                    return Ok(());
                }
            }
        }
        token.keyword = self.keywords.lookup(&effective);
        token.kind = if token.keyword.is_some() {
            TokenKind::Keyword
        } else {
            TokenKind::Name
        };
        Ok(())
    }

    // ---- keyword and name dispatch ----

    /// A plain name: the second one promotes the declaration to Base.
    pub(super) fn process_name(&mut self, id: StatementId) {
        debug_assert!(self.active(id).is(TokenKind::Name));
        let st = self.st_mut(id);
        if st.got_name && st.declaration == DeclKind::None {
            st.declaration = DeclKind::Base;
        }
        st.got_name = true;
        st.have_qualifying_name = true;
    }

    fn set_access(&mut self, id: StatementId, access: Access) {
        if self.is_member(id) {
            self.st_mut(id).access = MemberAccess::Known(access);
        }
    }

    fn push_parent_class(&mut self, id: StatementId, name: &str) {
        let st = self.st_mut(id);
        if !name.is_empty() && !st.parent_classes.is_empty() {
            st.parent_classes.push(',');
        }
        st.parent_classes.push_str(name);
    }

    /// Collect parent class names from an extends clause up to the opening
    /// brace, which is left in the stream.
    fn read_parents(&mut self, id: StatementId, qualifier: char) -> PResult<()> {
        let mut parent = String::new();
        let mut last: Option<Token> = None;
        loop {
            let Some(c) = self.skip_to_non_white() else {
                break;
            };
            if is_ident_start(c) {
                let token = self.read_identifier(c)?;
                if token.is(TokenKind::Name) {
                    parent.push_str(&token.text);
                } else {
                    let done = std::mem::take(&mut parent);
                    self.push_parent_class(id, &done);
                }
                last = Some(token);
            } else if c == qualifier {
                parent.push(c);
            } else if c == '<' {
                self.skip_to_match('<', '>')?;
            } else if matches!(&last, Some(t) if t.is(TokenKind::Name)) {
                let done = std::mem::take(&mut parent);
                self.push_parent_class(id, &done);
            }
            if c == '{' {
                self.src.unget_char('{');
                break;
            }
        }
        Ok(())
    }

    /// Apply a classified token to statement state.
    pub(super) fn process_token(&mut self, id: StatementId) -> PResult<()> {
        match self.active(id).keyword {
            None => {
                if self.active(id).is(TokenKind::Name) {
                    self.process_name(id);
                }
            }
            Some(
                Keyword::Bind
                | Keyword::Bit
                | Keyword::Function
                | Keyword::Integer
                | Keyword::String
                | Keyword::Void,
            ) => self.st_mut(id).declaration = DeclKind::Base,
            Some(Keyword::Class) => self.st_mut(id).declaration = DeclKind::Class,
            Some(Keyword::Enum) => self.st_mut(id).declaration = DeclKind::Enum,
            Some(Keyword::Event) => self.st_mut(id).declaration = DeclKind::Event,
            Some(Keyword::Interface) => self.st_mut(id).declaration = DeclKind::Interface,
            Some(Keyword::Program) => self.st_mut(id).declaration = DeclKind::Program,
            Some(Keyword::Task) => self.st_mut(id).declaration = DeclKind::Task,
            Some(Keyword::Extends) => {
                self.read_parents(id, '.')?;
                self.set_token(id, TokenKind::None);
            }
            Some(Keyword::Local) => self.set_access(id, Access::Local),
            Some(Keyword::Protected) => self.set_access(id, Access::Protected),
            Some(Keyword::Public) => self.set_access(id, Access::Public),
            Some(Keyword::Virtual) => self.st_mut(id).implementation = ImplKind::Virtual,
            Some(Keyword::Typedef) => {
                self.reinit_statement(id, false);
                self.st_mut(id).scope = StorageScope::Typedef;
            }
            Some(Keyword::Extern) => {
                self.reinit_statement(id, false);
                self.st_mut(id).scope = StorageScope::Extern;
                self.st_mut(id).declaration = DeclKind::Base;
            }
            Some(Keyword::Static) => {
                self.reinit_statement(id, false);
                self.st_mut(id).scope = StorageScope::Static;
                self.st_mut(id).declaration = DeclKind::Base;
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Restart interpretation of the statement from the active token.
    pub(super) fn restart_statement(&mut self, id: StatementId) -> PResult<()> {
        let saved = self.active(id).clone();
        debug!("statement restarted at line {}", saved.line);
        self.reinit_statement(id, false);
        *self.active_mut(id) = saved;
        self.process_token(id)
    }

    // ---- punctuation handlers ----

    /// `::` becomes a token and cancels the qualifying name; a single colon
    /// after anything at inner nesting is a label.
    fn process_colon(&mut self, id: StatementId) -> PResult<()> {
        let c = self.skip_to_non_white();
        if c == Some(':') {
            self.set_token(id, TokenKind::DoubleColon);
            self.st_mut(id).have_qualifying_name = false;
        } else {
            if let Some(c) = c {
                self.src.unget_char(c);
            }
            if self.st(id).parent.is_some() {
                let prev = self.prev(id, 1).clone();
                self.make_tag(&prev, id, false, TagKind::Label);
                self.reinit_statement(id, false);
            }
        }
        Ok(())
    }

    /// Skip over an initializer value, returning the character that ended it.
    fn skip_initializer(&mut self, id: StatementId) -> PResult<char> {
        loop {
            let Some(c) = self.skip_to_non_white() else {
                return Err(Unwind::Formatting {
                    line: self.src.line(),
                    found: '=',
                });
            };
            match c {
                ',' | ';' => return Ok(c),
                '0' => {
                    if self.st(id).implementation == ImplKind::Virtual {
                        self.st_mut(id).implementation = ImplKind::PureVirtual;
                    }
                }
                '[' => self.skip_to_match('[', ']')?,
                '(' => self.skip_to_match('(', ')')?,
                '{' => self.skip_to_match('{', '}')?,
                '<' => self.process_angle_bracket(),
                '}' => {
                    if self.inside_enum_body(id) {
                        return Ok(c);
                    } else if !self.src.brace_format() {
                        warn!(
                            "{}: unexpected closing brace at line {}",
                            self.file_path,
                            self.src.line()
                        );
                        return Err(Unwind::BraceFormatting {
                            line: self.src.line(),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    /// `=` starts an initializer unless it is half of `==`.
    fn process_initializer(&mut self, id: StatementId) -> PResult<()> {
        let in_enum_body = self.inside_enum_body(id);
        let c = self.src.get_char();
        if c == Some('=') {
            return Ok(());
        }
        if let Some(c) = c {
            self.src.unget_char(c);
        }
        let end = self.skip_initializer(id)?;
        self.st_mut(id).assignment = true;
        match end {
            ';' => self.set_token(id, TokenKind::Semicolon),
            ',' => self.set_token(id, TokenKind::Comma),
            '}' if in_enum_body => {
                self.src.unget_char('}');
                self.set_token(id, TokenKind::Comma);
            }
            _ => {}
        }
        // an assigned extern is a definition after all
        if self.st(id).scope == StorageScope::Extern {
            self.st_mut(id).scope = StorageScope::Global;
        }
        Ok(())
    }

    fn parse_identifier(&mut self, id: StatementId, c: char) -> PResult<()> {
        let token = self.read_identifier(c)?;
        let dropped = token.is(TokenKind::None);
        *self.active_mut(id) = token;
        if !dropped {
            self.process_token(id)?;
        }
        // a name after a complete qualified name starts a fresh context
        if self.st(id).context.is(TokenKind::Name)
            && self.active(id).is(TokenKind::Name)
            && self.prev(id, 1).is(TokenKind::Name)
        {
            let blank = self.blank_token();
            self.st_mut(id).context = blank;
        }
        Ok(())
    }

    fn parse_general_token(&mut self, id: StatementId, c: char) -> PResult<()> {
        if is_ident_start(c) {
            self.parse_identifier(id, c)?;
        } else if c == '.' || c == '-' {
            if !self.st(id).assignment {
                self.st_mut(id).not_variable = true;
            }
            if c == '-' {
                match self.src.get_char() {
                    Some('>') | None => {}
                    Some(other) => self.src.unget_char(other),
                }
            }
        } else if c == '!' || c == '>' {
            match self.src.get_char() {
                Some('=') | None => {}
                Some(other) => self.src.unget_char(other),
            }
        } else if c == STRING_SYMBOL {
            self.set_token(id, TokenKind::None);
        }
        Ok(())
    }

    /// Read tokens until one lands in the active slot.
    fn next_token(&mut self, id: StatementId) -> PResult<()> {
        loop {
            let Some(c) = self.skip_to_non_white() else {
                return Err(Unwind::Eof);
            };
            match c {
                '(' => self.analyze_parens(id)?,
                '<' => self.process_angle_bracket(),
                '*' => self.st_mut(id).have_qualifying_name = false,
                ',' => self.set_token(id, TokenKind::Comma),
                ':' => self.process_colon(id)?,
                ';' => self.set_token(id, TokenKind::Semicolon),
                '=' => self.process_initializer(id)?,
                '[' => self.skip_to_match('[', ']')?,
                '{' => self.set_token(id, TokenKind::BraceOpen),
                '}' => self.set_token(id, TokenKind::BraceClose),
                _ => self.parse_general_token(id, c)?,
            }
            if !self.active(id).is(TokenKind::None) {
                return Ok(());
            }
        }
    }

    // ---- statement loop ----

    fn is_statement_end(&self, id: StatementId) -> bool {
        match self.active(id).kind {
            TokenKind::Semicolon => true,
            // a closing brace ends the statement unless a declarator list
            // may still follow the class-like body
            TokenKind::BraceClose => !self.is_contextual_statement(Some(id)),
            _ => false,
        }
    }

    fn check_statement_end(&mut self, id: StatementId, handle: Option<TagHandle>) {
        let line = self.active(id).line;
        if let Some(handle) = handle {
            self.sink.patch_end_line(handle, line);
        }
        if self.active(id).is(TokenKind::Comma) {
            self.reinit_statement(id, true);
        } else if self.is_statement_end(id) {
            debug!("statement end at line {}", line);
            self.reinit_statement(id, false);
        } else {
            self.advance_token(id);
        }
    }

    /// Enter the block just opened by this statement.
    fn nest(&mut self, id: StatementId, nest_level: u32) -> PResult<()> {
        match self.st(id).declaration {
            DeclKind::Class | DeclKind::Enum | DeclKind::Interface => {
                self.create_tags(nest_level, Some(id))?;
            }
            decl => {
                if decl == DeclKind::Function || decl == DeclKind::Task {
                    self.st_mut(id).in_function = true;
                }
                let want_body = self.include_tag(TagKind::Local, false)
                    || self.include_tag(TagKind::Label, false);
                if want_body {
                    self.create_tags(nest_level, Some(id))?;
                } else {
                    self.skip_to_match('{', '}')?;
                }
            }
        }
        self.advance_token(id);
        self.set_token(id, TokenKind::BraceClose);
        Ok(())
    }

    /// Parse statements at one nesting level until the enclosing block
    /// closes. The top level only leaves by unwinding.
    pub(super) fn create_tags(
        &mut self,
        nest_level: u32,
        parent: Option<StatementId>,
    ) -> PResult<()> {
        if nest_level > MAX_NESTING {
            warn!(
                "{}: nesting depth limit exceeded at line {}",
                self.file_path,
                self.src.line()
            );
            return Err(Unwind::Formatting {
                line: self.src.line(),
                found: '{',
            });
        }
        let id = self.new_statement(parent);
        let result = self.create_tags_at(id, nest_level);
        if result.is_ok() {
            // statements unwind LIFO; on error the arena is dropped whole
            self.arena.pop();
        }
        result
    }

    fn create_tags_at(&mut self, id: StatementId, nest_level: u32) -> PResult<()> {
        loop {
            self.next_token(id)?;
            match self.active(id).kind {
                TokenKind::BraceClose => {
                    if nest_level > 0 {
                        return Ok(());
                    }
                    warn!(
                        "{}: unexpected closing brace at line {}",
                        self.file_path,
                        self.active(id).line
                    );
                    return Err(Unwind::BraceFormatting {
                        line: self.active(id).line,
                    });
                }
                TokenKind::DoubleColon => {
                    let prev = self.prev(id, 1).clone();
                    self.add_context(id, &prev);
                    self.advance_token(id);
                }
                _ => {
                    let handle = self.tag_check(id);
                    if self.active(id).is(TokenKind::BraceOpen) {
                        self.nest(id, nest_level + 1)?;
                    }
                    self.check_statement_end(id, handle);
                }
            }
        }
    }

    /// Classification point: decide whether the active token completes a
    /// taggable declarator and emit accordingly.
    fn tag_check(&mut self, id: StatementId) -> Option<TagHandle> {
        let token = self.active(id).clone();
        let prev = self.prev(id, 1).clone();
        let prev2 = self.prev(id, 2).clone();
        let mut handle = None;
        match token.kind {
            TokenKind::Name => {
                if self.inside_enum_body(id) {
                    handle = self.qualify_enumerator_tag(id, &token);
                }
                if self.inside_interface_body(id)
                    && ((prev.is(TokenKind::Keyword) && is_signal_direction(&prev))
                        || (prev2.is(TokenKind::Keyword) && is_signal_direction(&prev)))
                {
                    handle = self.make_tag(&token, id, false, TagKind::Signal);
                }
            }
            TokenKind::BraceOpen => {
                if prev.is(TokenKind::Args) {
                    if self.st(id).have_qualifying_name {
                        if self.st(id).declaration != DeclKind::Task {
                            self.st_mut(id).declaration = DeclKind::Function;
                        }
                        if prev2.is(TokenKind::Name) {
                            self.st_mut(id).block_name = prev2.clone();
                        }
                        handle = self.qualify_function_tag(id, &prev2);
                    }
                } else if self.is_contextual_statement(Some(id))
                    || self.st(id).declaration == DeclKind::Program
                {
                    if prev.is(TokenKind::Name) {
                        self.st_mut(id).block_name = prev.clone();
                    } else {
                        self.anon_id += 1;
                        let name = format!("__anon{}", self.anon_id);
                        let st = self.st_mut(id);
                        st.block_name.text = name;
                        st.block_name.kind = TokenKind::Name;
                        st.block_name.keyword = None;
                    }
                    handle = self.qualify_block_tag(id, &prev);
                }
            }
            TokenKind::Semicolon | TokenKind::Comma => {
                if self.inside_enum_body(id) {
                    // enumerators were tagged when their names were read
                } else if prev.is(TokenKind::Name) {
                    if is_contextual_keyword(&prev2) {
                        // a class-like forward declaration
                        handle = self.make_tag(&prev, id, true, TagKind::ExternVariable);
                    } else {
                        handle = self.qualify_variable_tag(id, &prev);
                    }
                } else if prev.is(TokenKind::Args) && prev2.is(TokenKind::Name) {
                    if self.st(id).is_pointer || self.st(id).in_function {
                        // a function pointer or a function call
                        handle = self.qualify_variable_tag(id, &prev2);
                    } else {
                        handle = self.qualify_function_decl_tag(id, &prev2);
                    }
                }
            }
            _ => {}
        }
        handle
    }
}

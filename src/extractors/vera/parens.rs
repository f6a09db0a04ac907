// Parenthesis analysis for the Vera declaration parser.
//
// A parenthesized group is the most ambiguous construct in a declaration:
// it may be an argument list, a parenthesized declarator, a macro argument
// list, or expression grouping. parse_parens scans one group while
// collecting evidence, and analyze_parens renders the verdict.

use tracing::warn;

use super::keywords::Keyword;
use super::parser::{PResult, Parser, Unwind};
use super::statement::{DeclKind, ImplKind, StatementId, StorageScope};
use super::token::TokenKind;
use crate::source::{is_ident_start, CharSource};

/// Evidence gathered while scanning one parenthesized group.
#[derive(Debug)]
pub(super) struct ParenInfo {
    pub is_pointer: bool,
    /// Still consistent with a parameter list
    pub is_param_list: bool,
    /// Still consistent with a single parenthesized name
    pub is_name_candidate: bool,
    /// Contained something no declaration allows
    pub invalid_contents: bool,
    /// A second group follows the name immediately, as in `name(args)`
    pub nested_args: bool,
}

impl ParenInfo {
    fn new() -> Self {
        Self {
            is_pointer: false,
            is_param_list: true,
            is_name_candidate: true,
            invalid_contents: false,
            nested_args: false,
        }
    }
}

impl<'a, S: CharSource> Parser<'a, S> {
    /// Skip a macro argument list; a name two slots back was the macro name
    /// and is retracted from the ring.
    fn skip_macro(&mut self, id: StatementId) -> PResult<()> {
        if self.prev(id, 2).is(TokenKind::Name) {
            self.retard_token(id);
        }
        self.skip_to_match('(', ')')
    }

    /// Scan a parenthesized group, recording its signature text and
    /// collecting classification evidence.
    fn parse_parens(&mut self, id: StatementId, info: &mut ParenInfo) -> PResult<()> {
        let mut depth = 1u32;
        let mut first_char = true;
        self.sig.start();
        self.sig.put('(');
        loop {
            let Some(c) = self.skip_to_non_white() else {
                // let the drain below report the mismatch
                info.is_param_list = false;
                info.is_name_candidate = false;
                info.invalid_contents = true;
                break;
            };
            self.sig.put(c);
            match c {
                '^' | ':' => {}
                '&' | '*' => {
                    info.is_pointer = true;
                    info.is_param_list = false;
                    self.init_active(id);
                }
                '.' => {
                    info.is_name_candidate = false;
                    match self.src.get_char() {
                        Some('.') => match self.src.get_char() {
                            // variable argument list
                            Some('.') => self.sig.put_str("..."),
                            Some(other) => self.src.unget_char(other),
                            None => {}
                        },
                        Some(other) => self.src.unget_char(other),
                        None => {}
                    }
                }
                ',' => info.is_name_candidate = false,
                '=' => {
                    info.is_name_candidate = false;
                    if first_char {
                        info.is_param_list = false;
                        self.skip_macro(id)?;
                        depth = 0;
                    }
                }
                '[' => self.skip_to_match('[', ']')?,
                '<' => self.process_angle_bracket(),
                ')' => depth -= 1,
                '(' => {
                    if first_char {
                        // an enclosing macro invocation, not a declarator
                        info.is_name_candidate = false;
                        self.src.unget_char(c);
                        self.sig.clear_text();
                        self.skip_macro(id)?;
                        depth = 0;
                        self.sig.chop();
                    } else if self.active(id).is(TokenKind::ParenName) {
                        let next = self.skip_to_non_white();
                        if next == Some('*') {
                            // function pointer declarator
                            self.skip_to_match('(', ')')?;
                            match self.skip_to_non_white() {
                                Some('(') => self.skip_to_match('(', ')')?,
                                Some(other) => self.src.unget_char(other),
                                None => {}
                            }
                        } else {
                            if let Some(other) = next {
                                self.src.unget_char(other);
                            }
                            self.src.unget_char('(');
                            info.nested_args = true;
                        }
                    } else {
                        depth += 1;
                    }
                }
                _ => {
                    if is_ident_start(c) {
                        let mut token = self.read_identifier(c)?;
                        if token.is(TokenKind::Name) && info.is_name_candidate {
                            token.kind = TokenKind::ParenName;
                        } else if token.is(TokenKind::Keyword) {
                            info.is_name_candidate = false;
                        }
                        *self.active_mut(id) = token;
                    } else {
                        info.is_param_list = false;
                        info.is_name_candidate = false;
                        info.invalid_contents = true;
                    }
                }
            }
            first_char = false;
            if info.nested_args || depth == 0 || !info.is_name_candidate {
                break;
            }
        }
        if !info.nested_args {
            while depth > 0 {
                self.skip_to_match('(', ')')?;
                depth -= 1;
            }
        }
        if !info.is_name_candidate {
            self.init_active(id);
        }
        self.sig.stop();
        Ok(())
    }

    /// Constructor-initializer style lists between the argument list and
    /// the statement end.
    fn skip_member_initializer_list(&mut self, id: StatementId) -> PResult<()> {
        loop {
            let mut c = self.skip_to_non_white();
            while let Some(cur) = c {
                if cur == ':' {
                    // continue
                } else if is_ident_start(cur) {
                    let token = self.read_identifier(cur)?;
                    *self.active_mut(id) = token;
                } else {
                    break;
                }
                c = self.skip_to_non_white();
            }
            if c == Some('<') {
                self.skip_to_match('<', '>')?;
                c = self.skip_to_non_white();
            }
            if c == Some('(') {
                self.skip_to_match('(', ')')?;
                c = self.skip_to_non_white();
            }
            if c != Some(',') {
                if let Some(cur) = c {
                    self.src.unget_char(cur);
                }
                return Ok(());
            }
        }
    }

    /// Consume whatever appears between an argument list and the statement
    /// end. Returns false when input ran out, which the caller treats as a
    /// formatting failure.
    fn skip_post_argument_stuff(&mut self, id: StatementId) -> PResult<bool> {
        let mut restart = false;
        let mut end = false;
        let mut c = self.skip_to_non_white();
        while !end {
            if let Some(cur) = c {
                match cur {
                    ')' => {}
                    ':' => self.skip_member_initializer_list(id)?,
                    '[' => self.skip_to_match('[', ']')?,
                    '=' | '{' | '}' | ';' => {
                        self.src.unget_char(cur);
                        end = true;
                    }
                    '(' => self.skip_to_match('(', ')')?,
                    _ => {
                        if is_ident_start(cur) {
                            let token = self.read_identifier(cur)?;
                            match token.keyword {
                                Some(
                                    Keyword::Class
                                    | Keyword::Extern
                                    | Keyword::Newcov
                                    | Keyword::Protected
                                    | Keyword::Public
                                    | Keyword::Static
                                    | Keyword::Typedef
                                    | Keyword::Virtual,
                                ) => {
                                    // never allowed within parameter lists
                                    restart = true;
                                    end = true;
                                }
                                _ => {
                                    if !token.is(TokenKind::None) {
                                        // an identifier straight after the
                                        // argument list is almost always a
                                        // generated macro; cut the statement
                                        restart = true;
                                        end = true;
                                    }
                                }
                            }
                            *self.active_mut(id) = token;
                        }
                    }
                }
            }
            if !end {
                c = self.skip_to_non_white();
                if c.is_none() {
                    end = true;
                }
            }
        }
        if restart {
            self.restart_statement(id)?;
        } else {
            self.set_token(id, TokenKind::None);
        }
        Ok(c.is_some())
    }

    /// Decide what follows a completed argument list.
    fn analyze_post_parens(&mut self, id: StatementId) -> PResult<()> {
        let start_line = self.src.line();
        let c = self.skip_to_non_white();
        if let Some(cur) = c {
            self.src.unget_char(cur);
        }
        if matches!(c, Some('{' | ';' | ',' | '=')) {
            return Ok(());
        }
        if !self.skip_post_argument_stuff(id)? {
            warn!(
                "{}: confusing argument declarations beginning at line {}",
                self.file_path, start_line
            );
            return Err(Unwind::Formatting {
                line: start_line,
                found: '(',
            });
        }
        Ok(())
    }

    /// Entry point for an open paren seen in token position.
    pub(super) fn analyze_parens(&mut self, id: StatementId) -> PResult<()> {
        if self.st(id).in_function && !self.st(id).assignment {
            self.st_mut(id).not_variable = true;
        }
        // ignored enclosing macros leave no previous token; scan on through
        if self.prev(id, 1).is(TokenKind::None) {
            return Ok(());
        }
        let mut info = ParenInfo::new();
        self.parse_parens(id, &mut info)?;
        let c = self.skip_to_non_white();
        if let Some(cur) = c {
            self.src.unget_char(cur);
        }
        if info.invalid_contents {
            // also triggered by constant arguments, as in `Type var(0)`
            self.reinit_statement(id, false);
        } else if info.is_name_candidate
            && self.active(id).is(TokenKind::ParenName)
            && !self.st(id).got_paren_name
            && (!info.is_param_list
                || !self.st(id).have_qualifying_name
                || c == Some('(')
                || (c == Some('=') && self.st(id).implementation != ImplKind::Virtual)
                || (self.st(id).declaration == DeclKind::None && matches!(c, Some(',' | ';'))))
        {
            self.active_mut(id).kind = TokenKind::Name;
            self.process_name(id);
            self.st_mut(id).got_paren_name = true;
            if !(c == Some('(') && info.nested_args) {
                self.st_mut(id).is_pointer = info.is_pointer;
            }
        } else if !self.st(id).got_args && info.is_param_list {
            self.st_mut(id).got_args = true;
            self.set_token(id, TokenKind::Args);
            self.advance_token(id);
            if self.st(id).scope != StorageScope::Typedef {
                self.analyze_post_parens(id)?;
            }
        } else {
            self.set_token(id, TokenKind::None);
        }
        Ok(())
    }
}

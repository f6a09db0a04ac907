// Statement state for the Vera declaration parser.
//
// A statement tracks everything learned since the last statement boundary:
// the three-token ring, storage scope, declaration kind, access, and the
// assorted one-shot flags the classifier consults. Statements form a stack
// that mirrors block nesting; children refer to parents by arena index so
// scope walks never chase dangling references.

use super::keywords::Keyword;
use super::token::Token;
use crate::extractors::base::Access;

pub(crate) const NUM_TOKENS: usize = 3;

/// Index into the parser's statement arena.
pub(crate) type StatementId = usize;

/// Storage scope accumulated from keywords seen so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StorageScope {
    Global,
    Static,
    Extern,
    Typedef,
}

/// What kind of declaration this statement has turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeclKind {
    None,
    /// A basic type or other ordinary specifier was seen
    Base,
    Class,
    Enum,
    Event,
    Function,
    Interface,
    Program,
    Task,
}

/// Implementation qualifier for member functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImplKind {
    Default,
    Virtual,
    PureVirtual,
}

/// Member access, Undefined outside class-like bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MemberAccess {
    Undefined,
    Known(Access),
}

impl MemberAccess {
    pub(crate) fn as_access(self) -> Option<Access> {
        match self {
            MemberAccess::Undefined => None,
            MemberAccess::Known(a) => Some(a),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Statement {
    pub scope: StorageScope,
    pub declaration: DeclKind,
    pub implementation: ImplKind,
    /// A name has been read in this statement
    pub got_name: bool,
    /// The most recent name can still qualify the declaration
    pub have_qualifying_name: bool,
    /// A parenthesized name was already accepted
    pub got_paren_name: bool,
    /// An argument list was consumed
    pub got_args: bool,
    pub is_pointer: bool,
    /// Inside a function or task body, inherited by children
    pub in_function: bool,
    /// An initializer assignment was seen
    pub assignment: bool,
    /// Something ruled out a variable declaration
    pub not_variable: bool,
    pub token_index: usize,
    pub tokens: [Token; NUM_TOKENS],
    /// Scope accumulated from `::` qualifiers, components ending in `::`
    pub context: Token,
    /// Name of the block this statement opened, possibly synthesized
    pub block_name: Token,
    pub access: MemberAccess,
    pub access_default: MemberAccess,
    /// Comma-joined parents collected from an extends clause
    pub parent_classes: String,
    pub parent: Option<StatementId>,
}

impl Statement {
    pub(crate) fn new(blank: Token, parent: Option<StatementId>, access_default: MemberAccess) -> Self {
        Self {
            scope: StorageScope::Global,
            declaration: DeclKind::None,
            implementation: ImplKind::Default,
            got_name: false,
            have_qualifying_name: false,
            got_paren_name: false,
            got_args: false,
            is_pointer: false,
            in_function: false,
            assignment: false,
            not_variable: false,
            token_index: 0,
            tokens: [blank.clone(), blank.clone(), blank.clone()],
            context: blank.clone(),
            block_name: blank,
            access: access_default,
            access_default,
            parent_classes: String::new(),
            parent,
        }
    }

    pub(crate) fn active(&self) -> &Token {
        &self.tokens[self.token_index]
    }

    pub(crate) fn active_mut(&mut self) -> &mut Token {
        &mut self.tokens[self.token_index]
    }

    /// Token `n` places behind the active one in the ring.
    pub(crate) fn prev(&self, n: usize) -> &Token {
        debug_assert!(n < NUM_TOKENS);
        &self.tokens[(self.token_index + NUM_TOKENS - n) % NUM_TOKENS]
    }
}

/// Class-like declarations open a member scope.
pub(crate) fn is_contextual_decl(decl: DeclKind) -> bool {
    matches!(decl, DeclKind::Class | DeclKind::Enum | DeclKind::Interface)
}

/// Keywords that introduce a contextual declaration.
pub(crate) fn is_contextual_keyword(token: &Token) -> bool {
    matches!(
        token.keyword,
        Some(Keyword::Class | Keyword::Enum | Keyword::Interface)
    )
}

/// Interface signal directions.
pub(crate) fn is_signal_direction(token: &Token) -> bool {
    matches!(
        token.keyword,
        Some(Keyword::Inout | Keyword::Input | Keyword::Output)
    )
}

/// Declaration kinds a variable declarator may follow.
pub(crate) fn is_valid_type_specifier(decl: DeclKind) -> bool {
    matches!(
        decl,
        DeclKind::Base | DeclKind::Class | DeclKind::Enum | DeclKind::Event
    )
}

#[cfg(test)]
mod tests {
    use super::super::token::TokenKind;
    use super::*;

    fn blank() -> Token {
        Token::blank(1, 0)
    }

    #[test]
    fn test_ring_neighbors() {
        let mut st = Statement::new(blank(), None, MemberAccess::Undefined);
        st.active_mut().kind = TokenKind::Name;
        st.active_mut().text.push_str("a");
        st.token_index = (st.token_index + 1) % NUM_TOKENS;
        st.tokens[st.token_index] = blank();
        st.active_mut().kind = TokenKind::Semicolon;

        assert!(st.active().is(TokenKind::Semicolon));
        assert_eq!(st.prev(1).text, "a");
        assert!(st.prev(2).is(TokenKind::None));
    }

    #[test]
    fn test_classifier_predicates() {
        assert!(is_contextual_decl(DeclKind::Class));
        assert!(is_contextual_decl(DeclKind::Enum));
        assert!(!is_contextual_decl(DeclKind::Function));
        assert!(is_valid_type_specifier(DeclKind::Event));
        assert!(!is_valid_type_specifier(DeclKind::Task));
    }
}

// Tag construction for the Vera declaration parser.
//
// The qualify_* family is called from classification points with the name
// token under consideration; each applies the kind-specific acceptance rules
// and file-scope policy, then funnels into make_tag, which builds the record,
// attaches extension fields, and hands it to the sink.

use tracing::debug;

use super::parser::Parser;
use super::statement::{is_contextual_decl, DeclKind, is_valid_type_specifier, MemberAccess, StatementId, StorageScope};
use super::token::{Token, TokenKind};
use crate::extractors::base::{generate_id, Access, Tag, TagHandle, TagKind};
use crate::source::CharSource;

fn decl_to_tag_kind(decl: DeclKind) -> Option<TagKind> {
    match decl {
        DeclKind::Class => Some(TagKind::Class),
        DeclKind::Enum => Some(TagKind::Enum),
        DeclKind::Event => Some(TagKind::Event),
        DeclKind::Function => Some(TagKind::Function),
        DeclKind::Interface => Some(TagKind::Interface),
        DeclKind::Program => Some(TagKind::Program),
        DeclKind::Task => Some(TagKind::Task),
        DeclKind::None | DeclKind::Base => None,
    }
}

/// Remove the last component from a scope string, keeping its `::`.
fn strip_last_component(scope: &str) -> String {
    let trimmed = scope.strip_suffix("::").unwrap_or(scope);
    match trimmed.rfind("::") {
        Some(idx) => trimmed[..idx + 2].to_string(),
        None => String::new(),
    }
}

impl<'a, S: CharSource> Parser<'a, S> {
    pub(super) fn include_tag(&self, kind: TagKind, is_file_scope: bool) -> bool {
        if is_file_scope && !self.config.file_scope_tags {
            return false;
        }
        self.config.kind_enabled(kind)
    }

    /// Build the scope prefix for a statement by walking its parent chain.
    /// Returns the prefix and whether a complete hierarchy was assembled.
    fn find_scope_hierarchy(&self, id: StatementId) -> (String, bool) {
        let mut scope = String::new();
        let mut found = false;
        if self.st(id).context.is(TokenKind::Name) {
            scope = self.st(id).context.text.clone();
            found = true;
        }
        let mut cur = self.st(id).parent;
        while let Some(pid) = cur {
            let parent = self.st(pid);
            if is_contextual_decl(parent.declaration) || parent.declaration == DeclKind::Program {
                found = true;
                let inner = std::mem::take(&mut scope);
                if parent.block_name.is(TokenKind::Name) {
                    if parent.context.is(TokenKind::Name) && !parent.context.text.is_empty() {
                        scope.push_str(&parent.context.text);
                    }
                    scope.push_str(&parent.block_name.text);
                    scope.push_str("::");
                    scope.push_str(&inner);
                } else {
                    // not enough information; input may be broken
                    found = false;
                }
            }
            cur = parent.parent;
        }
        (scope, found)
    }

    fn add_extension_fields(&self, tag: &mut Tag, kind: TagKind, id: StatementId, scope: &str) {
        let extended = matches!(
            kind,
            TagKind::Function
                | TagKind::Prototype
                | TagKind::Class
                | TagKind::Enum
                | TagKind::Enumerator
                | TagKind::Event
                | TagKind::Interface
                | TagKind::Member
                | TagKind::Signal
                | TagKind::Task
                | TagKind::Typedef
        );
        if matches!(kind, TagKind::Function | TagKind::Prototype) && !self.sig.text.is_empty() {
            tag.signature = Some(self.sig.text.clone());
        }
        if extended {
            if !scope.is_empty() && self.is_member(id) {
                if self.st(id).context.is(TokenKind::Name) {
                    tag.scope_kind = Some(TagKind::Class);
                    tag.scope_name = Some(scope.to_string());
                } else if let Some(ptype) = decl_to_tag_kind(self.parent_decl(id)) {
                    if self.config.kind_enabled(ptype) {
                        tag.scope_kind = Some(ptype);
                        tag.scope_name = Some(scope.to_string());
                    }
                }
            }
            if matches!(kind, TagKind::Class | TagKind::Interface)
                && !self.st(id).parent_classes.is_empty()
            {
                tag.inheritance = Some(self.st(id).parent_classes.clone());
            }
            if self.is_member(id) {
                tag.access = self.st(id).access.as_access();
            }
        }
        // type reference: the declared kind plus the block or named type
        if matches!(kind, TagKind::Typedef | TagKind::Variable | TagKind::Member)
            && is_contextual_decl(self.st(id).declaration)
        {
            if let Some(ref_kind) = decl_to_tag_kind(self.st(id).declaration) {
                let mut name = self.st(id).block_name.text.clone();
                if name.is_empty() {
                    // no {} block: the type name sits just before the
                    // declarator in the ring
                    let prev2 = self.prev(id, 2);
                    if prev2.is(TokenKind::Name) {
                        name = prev2.text.clone();
                    }
                }
                if !scope.is_empty() {
                    name = format!("{}{}", scope, name);
                }
                tag.type_ref = Some((ref_kind.as_str().to_string(), name));
            }
        }
    }

    /// Scope-prefixed duplicate, with the enumeration name stripped for
    /// enumerators.
    fn make_qualified_tag(&mut self, kind: TagKind, mut base: Tag, scope: &str) {
        if !self.config.qualified_tags || scope.is_empty() {
            return;
        }
        let prefix = if kind == TagKind::Enumerator {
            strip_last_component(scope)
        } else {
            scope.to_string()
        };
        if prefix.is_empty() {
            return;
        }
        base.name = format!("{}{}", prefix, base.name);
        base.qualified = true;
        self.sink.emit(base);
    }

    pub(super) fn make_tag(
        &mut self,
        token: &Token,
        id: StatementId,
        is_file_scope: bool,
        kind: TagKind,
    ) -> Option<TagHandle> {
        // nothing is really of file scope when it appears in a header
        let file_scope = is_file_scope && !self.config.header_file;
        if !token.is(TokenKind::Name)
            || token.text.is_empty()
            || !self.include_tag(kind, file_scope)
        {
            return None;
        }
        let (scope, scope_built) = self.find_scope_hierarchy(id);
        let mut tag = Tag {
            id: generate_id(self.file_path, &token.text, token.line),
            name: token.text.clone(),
            kind,
            language: self.language.to_string(),
            file_path: self.file_path.to_string(),
            line: token.line,
            byte_offset: token.byte,
            file_scope,
            qualified: false,
            scope_kind: None,
            scope_name: None,
            inheritance: None,
            access: None,
            type_ref: None,
            signature: None,
            end_line: None,
        };
        self.add_extension_fields(&mut tag, kind, id, &scope);
        debug!(name = %tag.name, kind = %tag.kind, line = tag.line, "tag");
        let handle = self.sink.emit(tag.clone());
        if scope_built {
            self.make_qualified_tag(kind, tag, &scope);
        }
        Some(handle)
    }

    pub(super) fn qualify_enumerator_tag(
        &mut self,
        id: StatementId,
        name_token: &Token,
    ) -> Option<TagHandle> {
        if name_token.is(TokenKind::Name) {
            self.make_tag(name_token, id, true, TagKind::Enumerator)
        } else {
            None
        }
    }

    pub(super) fn qualify_function_tag(
        &mut self,
        id: StatementId,
        name_token: &Token,
    ) -> Option<TagHandle> {
        if !name_token.is(TokenKind::Name) {
            return None;
        }
        let st = self.st(id);
        let is_file_scope = st.access == MemberAccess::Known(Access::Private)
            || (!self.is_member(id) && st.scope == StorageScope::Static);
        let kind = if st.declaration == DeclKind::Task {
            TagKind::Task
        } else {
            TagKind::Function
        };
        self.make_tag(name_token, id, is_file_scope, kind)
    }

    pub(super) fn qualify_function_decl_tag(
        &mut self,
        id: StatementId,
        name_token: &Token,
    ) -> Option<TagHandle> {
        if !name_token.is(TokenKind::Name) {
            None
        } else if self.st(id).scope == StorageScope::Typedef {
            self.make_tag(name_token, id, true, TagKind::Typedef)
        } else if is_valid_type_specifier(self.st(id).declaration) {
            self.make_tag(name_token, id, true, TagKind::Prototype)
        } else {
            None
        }
    }

    fn qualify_compound_tag(&mut self, id: StatementId, name_token: &Token) -> Option<TagHandle> {
        if !name_token.is(TokenKind::Name) {
            return None;
        }
        let kind = decl_to_tag_kind(self.st(id).declaration)?;
        self.make_tag(name_token, id, false, kind)
    }

    pub(super) fn qualify_block_tag(
        &mut self,
        id: StatementId,
        name_token: &Token,
    ) -> Option<TagHandle> {
        match self.st(id).declaration {
            DeclKind::Class | DeclKind::Enum | DeclKind::Interface | DeclKind::Program => {
                self.qualify_compound_tag(id, name_token)
            }
            _ => None,
        }
    }

    pub(super) fn qualify_variable_tag(
        &mut self,
        id: StatementId,
        name_token: &Token,
    ) -> Option<TagHandle> {
        // a forward declaration of the form `class tag;` must not read as a
        // variable; the token before the name is a keyword in that case and
        // the caller routed it away already
        if !name_token.is(TokenKind::Name) {
            return None;
        }
        let st = self.st(id);
        if st.scope == StorageScope::Typedef {
            return self.make_tag(name_token, id, true, TagKind::Typedef);
        }
        if st.declaration == DeclKind::Event {
            let private = st.access == MemberAccess::Known(Access::Private);
            return self.make_tag(name_token, id, private, TagKind::Event);
        }
        if !is_valid_type_specifier(st.declaration) {
            return None;
        }
        if st.not_variable {
            return None;
        }
        if self.is_member(id) {
            if matches!(
                self.st(id).scope,
                StorageScope::Global | StorageScope::Static
            ) {
                return self.make_tag(name_token, id, true, TagKind::Member);
            }
            return None;
        }
        let st = self.st(id);
        if st.scope == StorageScope::Extern || !st.have_qualifying_name {
            self.make_tag(name_token, id, false, TagKind::ExternVariable)
        } else if st.in_function {
            let static_scope = st.scope == StorageScope::Static;
            self.make_tag(name_token, id, static_scope, TagKind::Local)
        } else {
            let static_scope = st.scope == StorageScope::Static;
            self.make_tag(name_token, id, static_scope, TagKind::Variable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_last_component() {
        assert_eq!(strip_last_component("Color::"), "");
        assert_eq!(strip_last_component("Pkt::Color::"), "Pkt::");
        assert_eq!(strip_last_component("A::B::C::"), "A::B::");
        assert_eq!(strip_last_component(""), "");
    }
}

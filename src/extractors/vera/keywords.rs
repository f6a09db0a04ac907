// Keyword table for the Vera declaration parser.

use std::collections::HashMap;

/// Reserved words recognized by the parser. Only a handful drive statement
/// state; the rest are recognized so they are never mistaken for names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Keyword {
    BadState,
    BadTrans,
    Bind,
    BindVar,
    Bit,
    Class,
    Clock,
    Constraint,
    CoverageBlock,
    CoverageDef,
    Enum,
    Event,
    Extends,
    Extern,
    Function,
    HdlNode,
    Inout,
    Input,
    Integer,
    Interface,
    Local,
    MBadState,
    MBadTrans,
    MState,
    MTrans,
    Newcov,
    Nhold,
    Nsample,
    Output,
    Packed,
    Phold,
    Port,
    Program,
    Protected,
    Psample,
    Public,
    Shadow,
    State,
    Static,
    String,
    Task,
    Trans,
    Transition,
    Typedef,
    Virtual,
    Void,
}

const KEYWORDS: &[(&str, Keyword)] = &[
    ("bad_state", Keyword::BadState),
    ("bad_trans", Keyword::BadTrans),
    ("bind", Keyword::Bind),
    ("bind_var", Keyword::BindVar),
    ("bit", Keyword::Bit),
    ("class", Keyword::Class),
    ("CLOCK", Keyword::Clock),
    ("constraint", Keyword::Constraint),
    ("coverage_block", Keyword::CoverageBlock),
    ("coverage_def", Keyword::CoverageDef),
    ("enum", Keyword::Enum),
    ("event", Keyword::Event),
    ("extends", Keyword::Extends),
    ("extern", Keyword::Extern),
    ("function", Keyword::Function),
    ("hdl_node", Keyword::HdlNode),
    ("inout", Keyword::Inout),
    ("input", Keyword::Input),
    ("integer", Keyword::Integer),
    ("interface", Keyword::Interface),
    ("local", Keyword::Local),
    ("m_bad_state", Keyword::MBadState),
    ("m_bad_trans", Keyword::MBadTrans),
    ("m_state", Keyword::MState),
    ("m_trans", Keyword::MTrans),
    ("newcov", Keyword::Newcov),
    ("NHOLD", Keyword::Nhold),
    ("NSAMPLE", Keyword::Nsample),
    ("output", Keyword::Output),
    ("packed", Keyword::Packed),
    ("PHOLD", Keyword::Phold),
    ("port", Keyword::Port),
    ("program", Keyword::Program),
    ("protected", Keyword::Protected),
    ("PSAMPLE", Keyword::Psample),
    ("public", Keyword::Public),
    ("shadow", Keyword::Shadow),
    ("state", Keyword::State),
    ("static", Keyword::Static),
    ("string", Keyword::String),
    ("task", Keyword::Task),
    ("trans", Keyword::Trans),
    ("transition", Keyword::Transition),
    ("typedef", Keyword::Typedef),
    ("virtual", Keyword::Virtual),
    ("void", Keyword::Void),
];

/// Case-sensitive keyword lookup built once per extractor.
#[derive(Debug)]
pub(crate) struct KeywordTable {
    map: HashMap<&'static str, Keyword>,
}

impl KeywordTable {
    pub(crate) fn new() -> Self {
        Self {
            map: KEYWORDS.iter().copied().collect(),
        }
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<Keyword> {
        self.map.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_sensitive() {
        let table = KeywordTable::new();
        assert_eq!(table.lookup("class"), Some(Keyword::Class));
        assert_eq!(table.lookup("CLOCK"), Some(Keyword::Clock));
        assert_eq!(table.lookup("Class"), None);
        assert_eq!(table.lookup("clock"), None);
        assert_eq!(table.lookup("my_signal"), None);
    }
}

// Vera Extractor Tests
//
// Scenario coverage for the Vera declaration parser: classes, interfaces,
// enums, functions and tasks, signals, storage scopes, macros, and the
// fallback rescan behavior on broken input.

use crate::extractors::base::{
    Access, ExtractError, ExtractorConfig, Tag, TagBuffer, TagKind,
};
use crate::extractors::vera::VeraExtractor;

#[cfg(test)]
mod vera_extractor_tests {
    use super::*;

    fn extractor(code: &str) -> VeraExtractor {
        VeraExtractor::new("vera".to_string(), "test.vr".to_string(), code.to_string())
    }

    fn extract(code: &str) -> Vec<Tag> {
        extractor(code).extract_tags().expect("extraction failed")
    }

    fn extract_with(code: &str, configure: impl FnOnce(&mut ExtractorConfig)) -> Vec<Tag> {
        let mut config = ExtractorConfig::default();
        configure(&mut config);
        VeraExtractor::with_config(
            "vera".to_string(),
            "test.vr".to_string(),
            code.to_string(),
            config,
        )
        .extract_tags()
        .expect("extraction failed")
    }

    fn find<'a>(tags: &'a [Tag], name: &str) -> &'a Tag {
        tags.iter()
            .find(|t| t.name == name)
            .unwrap_or_else(|| panic!("no tag named {:?} in {:?}", name, names(tags)))
    }

    fn names(tags: &[Tag]) -> Vec<&str> {
        tags.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_class_with_member_and_function() {
        let code = r#"class Foo {
    integer x;
    function void bar() {
    }
}"#;
        let tags = extract(code);
        assert_eq!(names(&tags), vec!["Foo", "x", "bar"]);

        let foo = find(&tags, "Foo");
        assert_eq!(foo.kind, TagKind::Class);
        assert_eq!(foo.line, 1);
        assert_eq!(foo.end_line, Some(5));
        assert_eq!(foo.scope_name, None);
        assert!(!foo.file_scope);

        let x = find(&tags, "x");
        assert_eq!(x.kind, TagKind::Member);
        assert_eq!(x.line, 2);
        assert_eq!(x.scope_name.as_deref(), Some("Foo::"));
        assert_eq!(x.scope_kind, Some(TagKind::Class));
        assert_eq!(x.access, Some(Access::Private));
        assert!(x.file_scope);

        let bar = find(&tags, "bar");
        assert_eq!(bar.kind, TagKind::Function);
        assert_eq!(bar.line, 3);
        assert_eq!(bar.end_line, Some(4));
        assert_eq!(bar.scope_name.as_deref(), Some("Foo::"));
        assert_eq!(bar.signature.as_deref(), Some("()"));
        // default member access in a class body is private
        assert_eq!(bar.access, Some(Access::Private));
        assert!(bar.file_scope);
    }

    #[test]
    fn test_enum_with_enumerators() {
        let tags = extract("enum Color { red, green, blue };\n");
        assert_eq!(names(&tags), vec!["Color", "red", "green", "blue"]);
        assert_eq!(find(&tags, "Color").kind, TagKind::Enum);
        let red = find(&tags, "red");
        assert_eq!(red.kind, TagKind::Enumerator);
        assert_eq!(red.scope_name.as_deref(), Some("Color::"));
        assert_eq!(red.scope_kind, Some(TagKind::Enum));
        assert!(red.file_scope);
    }

    #[test]
    fn test_enum_variable_gets_type_ref() {
        let tags = extract("enum Color { red, green } shade;\n");
        let shade = find(&tags, "shade");
        assert_eq!(shade.kind, TagKind::Variable);
        assert_eq!(
            shade.type_ref,
            Some(("enum".to_string(), "Color".to_string()))
        );
        assert!(!shade.file_scope);
    }

    #[test]
    fn test_typedef_of_anonymous_enum() {
        let tags = extract("typedef enum { red, green } Colors;\n");
        // the anonymous block itself gets no tag, only a synthesized name
        assert_eq!(names(&tags), vec!["red", "green", "Colors"]);
        let red = find(&tags, "red");
        assert_eq!(red.scope_name.as_deref(), Some("__anon1::"));
        let colors = find(&tags, "Colors");
        assert_eq!(colors.kind, TagKind::Typedef);
        assert_eq!(
            colors.type_ref,
            Some(("enum".to_string(), "__anon1".to_string()))
        );
    }

    #[test]
    fn test_typedef_of_named_class() {
        let tags = extract("typedef class Base NewType;\n");
        let alias = find(&tags, "NewType");
        assert_eq!(alias.kind, TagKind::Typedef);
        assert_eq!(
            alias.type_ref,
            Some(("class".to_string(), "Base".to_string()))
        );
    }

    #[test]
    fn test_extern_and_static_variables() {
        let code = "static integer s;\nextern integer g;\ninteger plain;\n";
        let tags = extract(code);

        let s = find(&tags, "s");
        assert_eq!(s.kind, TagKind::Variable);
        assert!(s.file_scope);

        // the extern keyword resets the statement, so the static above
        // cannot leak into this declaration
        let g = find(&tags, "g");
        assert_eq!(g.kind, TagKind::ExternVariable);
        assert!(!g.file_scope);

        let plain = find(&tags, "plain");
        assert_eq!(plain.kind, TagKind::Variable);
        assert!(!plain.file_scope);
    }

    #[test]
    fn test_extern_with_initializer_becomes_definition() {
        let tags = extract("extern integer count = 3;\n");
        let count = find(&tags, "count");
        assert_eq!(count.kind, TagKind::Variable);
    }

    #[test]
    fn test_forward_class_declaration() {
        let tags = extract("class Packet;\n");
        let fwd = find(&tags, "Packet");
        assert_eq!(fwd.kind, TagKind::ExternVariable);
        assert!(fwd.file_scope);
    }

    #[test]
    fn test_top_level_event() {
        let tags = extract("event done;\n");
        let done = find(&tags, "done");
        assert_eq!(done.kind, TagKind::Event);
        assert!(!done.file_scope);
    }

    #[test]
    fn test_task_and_out_of_body_definition() {
        let code = "task Foo::run() {\n}\n";
        let tags = extract(code);
        let run = find(&tags, "run");
        assert_eq!(run.kind, TagKind::Task);
        assert_eq!(run.scope_name.as_deref(), Some("Foo::"));
        assert_eq!(run.scope_kind, Some(TagKind::Class));
        assert_eq!(run.end_line, Some(2));
        assert!(!run.file_scope);
    }

    #[test]
    fn test_interface_signals() {
        let code = r#"interface bus {
    input clk CLOCK;
    output [7:0] data PSAMPLE;
    integer width;
}"#;
        let tags = extract(code);
        assert_eq!(find(&tags, "bus").kind, TagKind::Interface);

        let clk = find(&tags, "clk");
        assert_eq!(clk.kind, TagKind::Signal);
        assert_eq!(clk.scope_name.as_deref(), Some("bus::"));
        assert!(!clk.file_scope);

        let data = find(&tags, "data");
        assert_eq!(data.kind, TagKind::Signal);

        // default member access in an interface body is public
        let width = find(&tags, "width");
        assert_eq!(width.kind, TagKind::Member);
        assert_eq!(width.access, Some(Access::Public));
    }

    #[test]
    fn test_member_access_modifiers() {
        let code = r#"class C {
    local integer a;
    protected integer b;
    public integer c;
}"#;
        let tags = extract(code);
        assert_eq!(find(&tags, "a").access, Some(Access::Local));
        assert_eq!(find(&tags, "b").access, Some(Access::Protected));
        assert_eq!(find(&tags, "c").access, Some(Access::Public));
    }

    #[test]
    fn test_function_locals_and_labels() {
        let code = r#"task t1() {
    integer i;
    foo:
    i = 1;
}
function void f() {
    integer n;
}"#;
        let tags = extract_with(code, |c| {
            c.enable_kind(TagKind::Local).enable_kind(TagKind::Label);
        });

        assert_eq!(find(&tags, "t1").kind, TagKind::Task);
        assert_eq!(find(&tags, "f").kind, TagKind::Function);
        let i = find(&tags, "i");
        assert_eq!(i.kind, TagKind::Local);
        assert!(!i.file_scope);
        assert_eq!(find(&tags, "n").kind, TagKind::Local);
        let label = find(&tags, "foo");
        assert_eq!(label.kind, TagKind::Label);
        assert_eq!(label.line, 3);
    }

    #[test]
    fn test_locals_disabled_by_default() {
        let code = "task t1() {\n    integer i;\n}\n";
        let tags = extract(code);
        assert_eq!(names(&tags), vec!["t1"]);
    }

    #[test]
    fn test_prototype_with_signature() {
        let tags = extract("extern function integer compute(integer a, integer b);\n");
        let proto = find(&tags, "compute");
        assert_eq!(proto.kind, TagKind::Prototype);
        assert_eq!(proto.signature.as_deref(), Some("(integer a, integer b)"));
        assert!(proto.file_scope);
    }

    #[test]
    fn test_function_pointer_is_variable() {
        let tags = extract("integer (*fp)();\n");
        let fp = find(&tags, "fp");
        assert_eq!(fp.kind, TagKind::Variable);
    }

    #[test]
    fn test_inheritance() {
        let code = "class B extends A {\n}\nclass D extends A.C {\n}\n";
        let tags = extract(code);
        assert_eq!(find(&tags, "B").inheritance.as_deref(), Some("A"));
        assert_eq!(find(&tags, "D").inheritance.as_deref(), Some("A.C"));
    }

    #[test]
    fn test_program_block() {
        let code = "program main {\n    integer status;\n}\n";
        let tags = extract(code);
        // the body is skipped when local declarations are not wanted
        assert_eq!(names(&tags), vec!["main"]);
        assert_eq!(find(&tags, "main").kind, TagKind::Program);

        let tags = extract_with(code, |c| {
            c.enable_kind(TagKind::Local);
        });
        let status = find(&tags, "status");
        assert_eq!(status.kind, TagKind::Variable);
        assert_eq!(status.scope_name, None);
    }

    #[test]
    fn test_nested_scope_names() {
        let code = r#"class Outer {
    class Inner {
        integer deep;
    }
}"#;
        let tags = extract(code);
        assert_eq!(find(&tags, "Inner").scope_name.as_deref(), Some("Outer::"));
        assert_eq!(
            find(&tags, "deep").scope_name.as_deref(),
            Some("Outer::Inner::")
        );
    }

    #[test]
    fn test_qualified_tags() {
        let code = r#"class Pkt {
    integer len;
    enum Color { red }
}"#;
        let tags = extract_with(code, |c| {
            c.qualified_tags = true;
        });

        let qualified: Vec<&str> = tags
            .iter()
            .filter(|t| t.qualified)
            .map(|t| t.name.as_str())
            .collect();
        // the enumeration name is stripped from enumerator scope prefixes
        assert_eq!(qualified, vec!["Pkt::len", "Pkt::Color", "Pkt::red"]);

        // primaries are all still present and unmarked
        assert!(!find(&tags, "len").qualified);
        assert!(!find(&tags, "red").qualified);
    }

    #[test]
    fn test_enumerator_initializers() {
        let tags = extract("enum State { IDLE = 0, RUN = 2 };\n");
        assert_eq!(names(&tags), vec!["State", "IDLE", "RUN"]);
        assert_eq!(find(&tags, "RUN").kind, TagKind::Enumerator);
    }

    #[test]
    fn test_declarator_list_with_initializer() {
        let tags = extract("integer a = 5, b;\n");
        assert_eq!(find(&tags, "a").kind, TagKind::Variable);
        assert_eq!(find(&tags, "b").kind, TagKind::Variable);
    }

    #[test]
    fn test_assignment_is_not_a_declaration() {
        let code = "task t() {\n    integer i;\n    i = 2;\n    check(i);\n}\n";
        let tags = extract_with(code, |c| {
            c.enable_kind(TagKind::Local);
        });
        assert_eq!(names(&tags), vec!["t", "i"]);
    }

    #[test]
    fn test_macro_replacement() {
        let code = r#"#define REG_DEF class
#define EMPTY()
#define TYPE integer
REG_DEF MyReg {
    TYPE r;
}
EMPTY() integer z;
"#;
        let tags = extract(code);
        let reg = find(&tags, "MyReg");
        assert_eq!(reg.kind, TagKind::Class);
        assert_eq!(find(&tags, "r").kind, TagKind::Member);
        assert_eq!(find(&tags, "z").kind, TagKind::Variable);
    }

    #[test]
    fn test_comments_and_strings_are_ignored() {
        let code = "// class NotReal {\ninteger real_one; /* class AlsoFake { */\nstring msg = \"class Fake3 {\";\n";
        let tags = extract(code);
        assert_eq!(names(&tags), vec!["real_one", "msg"]);
    }

    #[test]
    fn test_header_file_suppresses_file_scope() {
        let tags = extract_with("static integer s;\nclass C {\n    integer m;\n}\n", |c| {
            c.header_file = true;
        });
        assert!(!find(&tags, "s").file_scope);
        assert!(!find(&tags, "m").file_scope);
    }

    #[test]
    fn test_header_extension_autodetected() {
        let mut ex = VeraExtractor::new(
            "vera".to_string(),
            "pkt.vrh".to_string(),
            "static integer s;\n".to_string(),
        );
        let tags = ex.extract_tags().expect("extraction failed");
        assert!(!find(&tags, "s").file_scope);
    }

    #[test]
    fn test_file_scope_tags_disabled() {
        let code = "class Foo {\n    integer x;\n}\n";
        let tags = extract_with(code, |c| {
            c.file_scope_tags = false;
        });
        // members are file-scoped and vanish; the class itself is not
        assert_eq!(names(&tags), vec!["Foo"]);
    }

    #[test]
    fn test_unmatched_brace_retries_once_then_fails() {
        let code = "function void f() {\n";
        let mut ex = extractor(code);
        let mut sink = TagBuffer::new();
        let err = ex.extract_into(&mut sink).unwrap_err();
        assert!(matches!(err, ExtractError::BraceMismatch { .. }));
        // one retry: the function tag from each pass survives in the sink
        let kept = names(sink.tags());
        assert_eq!(kept, vec!["f", "f"]);
    }

    #[test]
    fn test_stray_closing_brace_fails() {
        let mut ex = extractor("}\n");
        let mut sink = TagBuffer::new();
        let err = ex.extract_into(&mut sink).unwrap_err();
        assert!(matches!(err, ExtractError::BraceMismatch { line: 1, .. }));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_fallback_brace_matching_recovers() {
        // the conditional injects an extra close brace on the normal pass;
        // the fallback pass pairs the open brace with the brace in column one
        let code = r#"task t() {
#ifdef BROKEN
    }
    integer trailing;
}
class After {
}
"#;
        let mut ex = extractor(code);
        let mut sink = TagBuffer::new();
        ex.extract_into(&mut sink).expect("fallback pass failed");
        let kept = names(sink.tags());
        assert!(kept.contains(&"After"), "missing After in {:?}", kept);
    }

    #[test]
    fn test_single_pass_results_agree_on_clean_input() {
        let code = "class Foo {\n    integer x;\n}\n";
        let mut plain = TagBuffer::new();
        let mut fallback = TagBuffer::new();
        extractor(code)
            .extract_pass_into(false, &mut plain)
            .expect("plain pass failed");
        extractor(code)
            .extract_pass_into(true, &mut fallback)
            .expect("fallback pass failed");
        assert_eq!(plain.tags(), fallback.tags());
    }

    #[test]
    fn test_nesting_depth_limit() {
        let mut code = String::new();
        for i in 0..70 {
            code.push_str(&format!("class C{} {{ ", i));
        }
        code.push_str(&"} ".repeat(70));
        let err = extractor(&code).extract_tags().unwrap_err();
        assert!(matches!(err, ExtractError::UnbalancedConstruct { .. }));
    }

    #[test]
    fn test_predefined_macro() {
        let mut ex = extractor("WIDE data;\n");
        ex.define_macro(
            "WIDE",
            crate::source::MacroDef {
                has_params: false,
                replacement: Some("bit".to_string()),
            },
        );
        let tags = ex.extract_tags().expect("extraction failed");
        assert_eq!(find(&tags, "data").kind, TagKind::Variable);
    }

    #[test]
    fn test_tag_serialization_round_trip() {
        let tags = extract("class Foo {\n    integer x;\n}\n");
        let json = serde_json::to_string(&tags).expect("serialize");
        assert!(json.contains("\"kind\":\"class\""));
        assert!(json.contains("\"scope_name\":\"Foo::\""));
        let back: Vec<Tag> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(tags, back);
    }
}

/**
 * Template Binding Tests
 *
 * Directive shorthand values: `let` declarations, `as` aliases, prefixed
 * keys, bound expressions and their spans.
 */

#[path = "utils/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::humanize_errors;
    use pretty_assertions::assert_eq;
    use template_parser::expression_parser::ast::*;
    use template_parser::expression_parser::{Parser, TemplateBindingParseResult};

    fn parse_template_bindings(key: &str, value: &str) -> TemplateBindingParseResult {
        Parser::new().parse_template_bindings(key, value, 0, 0)
    }

    /// `(key, value, is_variable)` per binding; values print as source text.
    fn humanize(bindings: &[TemplateBinding]) -> Vec<(String, Option<String>, bool)> {
        bindings
            .iter()
            .map(|binding| match binding {
                TemplateBinding::Variable(variable) => (
                    variable.key.source.clone(),
                    variable.value.as_ref().map(|value| value.source.clone()),
                    true,
                ),
                TemplateBinding::Expression(expression) => (
                    expression.key.source.clone(),
                    expression.value.as_ref().map(|value| value.source.clone()),
                    false,
                ),
            })
            .collect()
    }

    fn humanize_without_errors(key: &str, value: &str) -> Vec<(String, Option<String>, bool)> {
        let result = parse_template_bindings(key, value);
        assert!(
            result.errors.is_empty(),
            "Unexpected errors:\n{}",
            humanize_errors(&result.errors).join("\n")
        );
        humanize(&result.template_bindings)
    }

    fn row(key: &str, value: Option<&str>, is_variable: bool) -> (String, Option<String>, bool) {
        (key.to_string(), value.map(str::to_string), is_variable)
    }

    #[test]
    fn should_bind_the_directive_key_first() {
        assert_eq!(
            humanize_without_errors("ngIf", "cond"),
            vec![row("ngIf", Some("cond"), false)]
        );
    }

    #[test]
    fn should_parse_an_empty_value() {
        assert_eq!(humanize_without_errors("a", ""), vec![row("a", None, false)]);
    }

    #[test]
    fn should_parse_a_for_of_shorthand() {
        assert_eq!(
            humanize_without_errors("ngFor", "let item of items; index as i; trackBy: byId"),
            vec![
                row("ngFor", None, false),
                row("item", None, true),
                row("ngForOf", Some("items"), false),
                row("i", Some("index"), true),
                row("ngForTrackBy", Some("byId"), false),
            ]
        );
    }

    #[test]
    fn should_alias_the_directive_value() {
        assert_eq!(
            humanize_without_errors("ngIf", "user.name as name"),
            vec![row("ngIf", Some("user.name"), false), row("name", Some("ngIf"), true)]
        );
    }

    #[test]
    fn should_alias_a_prefixed_key() {
        assert_eq!(
            humanize_without_errors("ngFor", "let item of items as list"),
            vec![
                row("ngFor", None, false),
                row("item", None, true),
                row("ngForOf", Some("items"), false),
                row("list", Some("ngForOf"), true),
            ]
        );
    }

    #[test]
    fn should_parse_let_with_a_value() {
        assert_eq!(
            humanize_without_errors("dir", "let a = b, let c"),
            vec![row("dir", None, false), row("a", Some("b"), true), row("c", None, true)]
        );
    }

    #[test]
    fn should_prefix_and_capitalize_bare_keys() {
        assert_eq!(
            humanize_without_errors("ngIf", "cond; else elseBlock"),
            vec![row("ngIf", Some("cond"), false), row("ngIfElse", Some("elseBlock"), false)]
        );
    }

    #[test]
    fn should_accept_a_colon_after_a_key() {
        assert_eq!(
            humanize_without_errors("dir", "let x; when: a + b"),
            vec![row("dir", None, false), row("x", None, true), row("dirWhen", Some("a + b"), false)]
        );
    }

    #[test]
    fn should_join_dashed_keys() {
        assert_eq!(
            humanize_without_errors("dir", "let my-item"),
            vec![row("dir", None, false), row("my-item", None, true)]
        );
    }

    #[test]
    fn should_keep_the_parsed_expression() {
        let result = parse_template_bindings("ngIf", "a && b");
        let TemplateBinding::Expression(binding) = &result.template_bindings[0] else {
            panic!("expected expression binding");
        };
        let value = binding.value.as_ref().expect("value");
        assert!(matches!(value.ast, AST::Binary(ref and) if and.operation == "&&"));
    }

    mod spans {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_offset_key_and_value_spans() {
            // <div *ngIf="cond">
            let result = Parser::new().parse_template_bindings("ngIf", "cond", 6, 12);
            let TemplateBinding::Expression(binding) = &result.template_bindings[0] else {
                panic!("expected expression binding");
            };
            assert_eq!(binding.key.span, AbsoluteSourceSpan::new(6, 10));
            assert_eq!(binding.source_span, AbsoluteSourceSpan::new(6, 16));
            let value = binding.value.as_ref().expect("value");
            assert_eq!(value.absolute_offset, 12);
            assert_eq!(value.ast.source_span(), AbsoluteSourceSpan::new(12, 16));
        }

        #[test]
        fn should_span_let_declarations() {
            let result = parse_template_bindings("ngFor", "let item of items");
            let TemplateBinding::Variable(item) = &result.template_bindings[1] else {
                panic!("expected variable binding");
            };
            assert_eq!(item.key.span, AbsoluteSourceSpan::new(4, 8));
            assert_eq!(item.source_span.start, 0);
        }
    }

    mod errors {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_report_a_missing_let_name() {
            let result = parse_template_bindings("ngFor", "let");
            assert_eq!(
                humanize_errors(&result.errors),
                vec!["Parser Error: Unexpected end of input, expected identifier, keyword, or string at the end of the expression [let]"]
            );
        }

        #[test]
        fn should_report_a_missing_alias_name() {
            let result = parse_template_bindings("ngIf", "cond as");
            assert_eq!(result.errors.len(), 1);
            assert_eq!(result.template_bindings.len(), 2);
        }

        #[test]
        fn should_make_progress_on_stray_tokens() {
            let result = parse_template_bindings("ngFor", "let item of items )");
            assert!(!result.errors.is_empty());
            let keys: Vec<&str> = result
                .template_bindings
                .iter()
                .map(|binding| binding.key().source.as_str())
                .collect();
            assert_eq!(&keys[..3], &["ngFor", "item", "ngForOf"]);
        }
    }
}

/**
 * Markup Tree Builder Tests
 *
 * Element nesting, attributes, void and self-closed elements, text and
 * comment nodes, source spans and tree errors.
 */

#[path = "util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::{humanize_dom, humanize_dom_source_spans, humanize_line_column};
    use pretty_assertions::assert_eq;
    use template_parser::ml_parser::ast::{Element, Node};
    use template_parser::ml_parser::html_tags::{html_tag_definitions, HtmlTagDefinitions};
    use template_parser::ml_parser::lexer::TokenizeOptions;
    use template_parser::ml_parser::parser::{ParseTreeResult, Parser};
    use template_parser::ml_parser::tags::{TagContentType, TagDefinition};
    use template_parser::parse_util::ParseError;

    fn parse(html: &str) -> ParseTreeResult {
        Parser::new(html_tag_definitions()).parse(html, "TestComp", &TokenizeOptions::default())
    }

    fn rows(expected: &[&[&str]]) -> Vec<Vec<String>> {
        expected
            .iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    fn humanize_errors(errors: &[ParseError]) -> Vec<Vec<String>> {
        errors
            .iter()
            .map(|e| vec![e.msg.clone(), humanize_line_column(&e.span.start)])
            .collect()
    }

    fn root_element(result: &ParseTreeResult) -> &Element {
        match &result.root_nodes[0] {
            Node::Element(el) => el,
            other => panic!("expected element, got {:?}", other),
        }
    }

    mod text_nodes {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_parse_root_level_text_nodes() {
            assert_eq!(humanize_dom(&parse("a")), rows(&[&["Text", "a", "0"]]));
        }

        #[test]
        fn should_parse_text_nodes_inside_regular_elements() {
            assert_eq!(
                humanize_dom(&parse("<div>a</div>")),
                rows(&[&["Element", "div", "0"], &["Text", "a", "1"]])
            );
        }

        #[test]
        fn should_join_text_and_interpolation_into_one_node() {
            let result = parse("a{{ b }}c");
            assert_eq!(humanize_dom(&result), rows(&[&["Text", "a{{ b }}c", "0"]]));
            match &result.root_nodes[0] {
                Node::Text(text) => assert_eq!(text.tokens.len(), 3),
                other => panic!("expected text, got {:?}", other),
            }
        }

        #[test]
        fn should_parse_cdata_as_text() {
            assert_eq!(
                humanize_dom(&parse("<div><![CDATA[x<y]]></div>")),
                rows(&[&["Element", "div", "0"], &["Text", "x<y", "1"]])
            );
        }

        #[test]
        fn should_parse_raw_text_elements() {
            assert_eq!(
                humanize_dom(&parse("<script>if (a < b) {}</script>")),
                rows(&[&["Element", "script", "0"], &["Text", "if (a < b) {}", "1"]])
            );
        }
    }

    mod elements {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_parse_nested_elements_with_attributes() {
            assert_eq!(
                humanize_dom(&parse("<div a='1'><span>x</span></div>")),
                rows(&[
                    &["Element", "div", "0"],
                    &["Attribute", "a", "1"],
                    &["Element", "span", "1"],
                    &["Text", "x", "2"],
                ])
            );
        }

        #[test]
        fn should_parse_void_elements_without_children() {
            assert_eq!(
                humanize_dom(&parse("<div><br>a</div>")),
                rows(&[&["Element", "div", "0"], &["Element", "br", "1"], &["Text", "a", "1"]])
            );
        }

        #[test]
        fn should_parse_self_closed_void_elements() {
            let result = parse("<br/>");
            assert!(result.errors.is_empty());
            let br = root_element(&result);
            assert!(br.is_self_closing);
            assert!(br.children.is_empty());
            assert!(br.end_source_span.is_none());
        }

        #[test]
        fn should_allow_foreign_elements_to_self_close() {
            assert_eq!(
                humanize_dom(&parse("<svg:rect/><div></div>")),
                rows(&[&["Element", "svg:rect", "0"], &["Element", "div", "0"]])
            );
        }

        #[test]
        fn should_close_unclosed_children_with_their_parent() {
            let result = parse("<div><p>a</div>");
            assert_eq!(
                humanize_dom(&result),
                rows(&[&["Element", "div", "0"], &["Element", "p", "1"], &["Text", "a", "2"]])
            );
            let div = root_element(&result);
            assert!(div.end_source_span.is_some());
            match &div.children[0] {
                Node::Element(p) => assert!(p.end_source_span.is_none()),
                other => panic!("expected element, got {:?}", other),
            }
        }

        #[test]
        fn should_pop_elements_open_at_the_end_of_input() {
            let result = parse("<div><span>");
            assert!(result.errors.is_empty());
            assert_eq!(
                humanize_dom(&result),
                rows(&[&["Element", "div", "0"], &["Element", "span", "1"]])
            );
            assert!(root_element(&result).end_source_span.is_none());
        }

        #[test]
        fn should_set_end_spans_for_balanced_elements() {
            fn count_closed(nodes: &[Node]) -> usize {
                nodes
                    .iter()
                    .map(|node| match node {
                        Node::Element(el) => usize::from(el.end_source_span.is_some()) + count_closed(&el.children),
                        _ => 0,
                    })
                    .sum()
            }
            let result = parse("<a><b></b><c><d></d></c></a><e></e>");
            assert!(result.errors.is_empty());
            assert_eq!(count_closed(&result.root_nodes), 5);
        }

        #[test]
        fn should_use_an_injected_tag_lookup() {
            let lookup = |name: &str| {
                if name == "leaf" {
                    TagDefinition::void()
                } else {
                    TagDefinition::with_content_type(TagContentType::ParsableData)
                }
            };
            let result = Parser::new(&lookup).parse("<leaf><x></x>", "TestComp", &TokenizeOptions::default());
            assert_eq!(
                humanize_dom(&result),
                rows(&[&["Element", "leaf", "0"], &["Element", "x", "0"]])
            );
        }

        #[test]
        fn should_use_an_extended_html_table() {
            let mut tags = HtmlTagDefinitions::new();
            tags.insert("x-icon", TagDefinition::void());
            assert!(tags.names().any(|name| name == "x-icon"));
            let result = Parser::new(&tags).parse("<x-icon>t", "TestComp", &TokenizeOptions::default());
            assert!(result.errors.is_empty());
            assert_eq!(
                humanize_dom(&result),
                rows(&[&["Element", "x-icon", "0"], &["Text", "t", "0"]])
            );
        }
    }

    mod comments {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_parse_and_trim_comments() {
            assert_eq!(
                humanize_dom(&parse("<div><!-- a --></div>")),
                rows(&[&["Element", "div", "0"], &["Comment", "a", "1"]])
            );
        }

        #[test]
        fn should_skip_doctypes() {
            assert_eq!(
                humanize_dom(&parse("<!DOCTYPE html><p></p>")),
                rows(&[&["Element", "p", "0"]])
            );
        }
    }

    mod source_spans {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_store_the_source_text_of_nodes() {
            assert_eq!(
                humanize_dom_source_spans(&parse("<div a=\"b\">t</div>")),
                rows(&[
                    &["Element", "div", "0", "<div a=\"b\">t</div>"],
                    &["Attribute", "a", "b", "a=\"b\""],
                    &["Text", "t", "1", "t"],
                ])
            );
        }

        #[test]
        fn should_set_attribute_key_and_value_spans() {
            let result = parse("<div key=\"value\"></div>");
            let attr = &root_element(&result).attrs[0];
            assert_eq!((attr.key_span.start.offset, attr.key_span.end.offset), (5, 8));
            let value_span = attr.value_span.expect("value span");
            assert_eq!((value_span.start.offset, value_span.end.offset), (10, 15));
            assert!(attr.value_tokens.is_none());
        }

        #[test]
        fn should_keep_value_tokens_for_interpolated_attributes() {
            let result = parse("<div title=\"a{{b}}\"></div>");
            let attr = &root_element(&result).attrs[0];
            assert_eq!(attr.value, "a{{b}}");
            assert_eq!(attr.value_tokens.as_ref().map(Vec::len), Some(3));
        }
    }

    mod errors {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_report_unexpected_closing_tags() {
            let result = parse("<div></p></div>");
            assert_eq!(
                humanize_errors(&result.errors),
                rows(&[&[
                    "Unexpected closing tag \"p\". It may happen when the tag has already been closed by another tag.",
                    "0:5",
                ]])
            );
        }

        #[test]
        fn should_report_closing_tags_for_void_elements() {
            let result = parse("<input></input>");
            assert_eq!(
                humanize_errors(&result.errors),
                rows(&[&["Void elements do not have end tags \"input\"", "0:7"]])
            );
        }

        #[test]
        fn should_report_self_closing_html_elements() {
            let result = parse("<p />");
            assert_eq!(
                humanize_errors(&result.errors),
                rows(&[&["Only void and foreign elements can be self closed \"p\"", "0:0"]])
            );
        }

        #[test]
        fn should_report_unterminated_open_tags() {
            let result = parse("<div class=\"a\"<span>");
            assert_eq!(
                humanize_errors(&result.errors),
                rows(&[&["Opening tag \"div\" not terminated.", "0:0"]])
            );
            assert_eq!(result.root_nodes.len(), 2);
        }

        #[test]
        fn should_still_return_a_tree_with_errors() {
            let result = parse("<div></span>text</div>");
            assert_eq!(result.errors.len(), 1);
            assert_eq!(root_element(&result).children.len(), 1);
        }

        #[test]
        fn should_render_contextual_messages() {
            let result = parse("<div>\n</p>");
            let located = result.errors[0].located(&result.file).to_string();
            assert!(located.contains("[ERROR ->]</p>"));
            assert!(located.ends_with("TestComp@1:0"));
        }
    }

    mod batch {
        use super::*;
        use pretty_assertions::assert_eq;
        use template_parser::parse_util::ParseSourceFile;

        #[test]
        fn should_parse_many_templates_in_order() {
            let files: Vec<ParseSourceFile> = (0..16)
                .map(|i| ParseSourceFile::new(format!("<n{}></n{}>", i, i), format!("t{}.html", i)))
                .collect();
            let results = Parser::new(html_tag_definitions()).parse_all(&files, &TokenizeOptions::default());
            for (i, result) in results.iter().enumerate() {
                assert_eq!(root_element(result).name, format!("n{}", i));
                assert_eq!(result.file.url, format!("t{}.html", i));
            }
        }
    }
}

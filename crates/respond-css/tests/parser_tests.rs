//! Integration tests for the CSS rule parser.

use respond_css::parser::{AtRuleBlock, CSSParser, Rule, parse_stylesheet};
use respond_css::tokenizer::CSSTokenizer;

fn media_rules(rule: &Rule) -> &[Rule] {
    match rule {
        Rule::At(at) => match &at.block {
            Some(AtRuleBlock::Rules(rules)) => rules,
            other => panic!("Expected nested rules, got {other:?}"),
        },
        Rule::Style(_) => panic!("Expected at-rule"),
    }
}

#[test]
fn test_parse_style_rule() {
    let sheet = parse_stylesheet("body { color: red; margin: 0 auto }");
    assert_eq!(sheet.rules.len(), 1);
    let Rule::Style(rule) = &sheet.rules[0] else {
        panic!("Expected style rule");
    };
    assert_eq!(rule.selector, "body");
    assert!(rule.closed);
    let decls: Vec<(&str, &str)> = rule
        .declarations
        .iter()
        .map(|d| (d.name.as_str(), d.value.as_str()))
        .collect();
    assert_eq!(decls, vec![("color", "red"), ("margin", "0 auto")]);
}

#[test]
fn test_selector_list_text_is_kept() {
    let sheet = parse_stylesheet("h1,  .title >\n a { x: y }");
    let Rule::Style(rule) = &sheet.rules[0] else {
        panic!("Expected style rule");
    };
    assert_eq!(rule.selector, "h1, .title > a");
}

#[test]
fn test_value_keeps_source_text() {
    let sheet = parse_stylesheet(
        "a { background: url(img/bg.png) no-repeat, rgba(0,0,0,.5); font-family: \"A;B\", serif }",
    );
    let Rule::Style(rule) = &sheet.rules[0] else {
        panic!("Expected style rule");
    };
    assert_eq!(
        rule.declarations[0].value,
        "url(img/bg.png) no-repeat, rgba(0,0,0,.5)"
    );
    assert_eq!(rule.declarations[1].value, "\"A;B\", serif");
}

#[test]
fn test_important_is_flagged_and_kept_in_value() {
    let sheet = parse_stylesheet("p { color: red !important; }");
    let Rule::Style(rule) = &sheet.rules[0] else {
        panic!("Expected style rule");
    };
    assert!(rule.declarations[0].important);
    assert_eq!(rule.declarations[0].value, "red !important");
}

#[test]
fn test_comments_inside_values_disappear() {
    let sheet = parse_stylesheet("p { margin: 0 /* top */ auto; }");
    let Rule::Style(rule) = &sheet.rules[0] else {
        panic!("Expected style rule");
    };
    assert_eq!(rule.declarations[0].value, "0 auto");
}

#[test]
fn test_bad_declarations_are_dropped() {
    let sheet = parse_stylesheet("p { color; : red; width: ; height: 10px }");
    let Rule::Style(rule) = &sheet.rules[0] else {
        panic!("Expected style rule");
    };
    assert_eq!(rule.declarations.len(), 1);
    assert_eq!(rule.declarations[0].name, "height");
}

#[test]
fn test_media_block_contains_rules() {
    let css = "@media only screen and (max-width: 600px) {\n\n\tbody {\n\t\tcolor: red;\n\t}\n\n}\n";
    let sheet = parse_stylesheet(css);
    assert_eq!(sheet.rules.len(), 1);
    let Rule::At(at) = &sheet.rules[0] else {
        panic!("Expected at-rule");
    };
    assert_eq!(at.name, "media");
    assert_eq!(at.prelude_text, "only screen and (max-width: 600px)");
    assert!(at.closed);

    let inner = media_rules(&sheet.rules[0]);
    assert_eq!(inner.len(), 1);
    let Rule::Style(rule) = &inner[0] else {
        panic!("Expected style rule");
    };
    assert_eq!(rule.selector, "body");
    assert_eq!(rule.line, 3);
    assert_eq!(rule.declarations[0].line, 4);
}

#[test]
fn test_consecutive_media_blocks() {
    let css = "@media (max-width: 900px) { a { b: c } }\n@media (max-width: 300px) { d { e: f } }";
    let sheet = parse_stylesheet(css);
    assert_eq!(sheet.rules.len(), 2);
    assert_eq!(sheet.rules[1].line(), 2);
    assert_eq!(media_rules(&sheet.rules[1]).len(), 1);
}

#[test]
fn test_unterminated_media_block_is_not_closed() {
    let sheet = parse_stylesheet("@media (max-width: 600px) { a { b: c }");
    let Rule::At(at) = &sheet.rules[0] else {
        panic!("Expected at-rule");
    };
    assert!(!at.closed);
}

#[test]
fn test_non_group_at_rule_block_is_raw() {
    let sheet = parse_stylesheet("@font-face { font-family: X; src: url(x.woff) }");
    let Rule::At(at) = &sheet.rules[0] else {
        panic!("Expected at-rule");
    };
    assert_eq!(
        at.block,
        Some(AtRuleBlock::Raw("font-family: X; src: url(x.woff)".to_string()))
    );
}

#[test]
fn test_statement_at_rule() {
    let sheet = parse_stylesheet("@import url(a.css); body { x: y }");
    assert_eq!(sheet.rules.len(), 2);
    let Rule::At(at) = &sheet.rules[0] else {
        panic!("Expected at-rule");
    };
    assert_eq!(at.name, "import");
    assert!(at.block.is_none());
}

#[test]
fn test_stray_declaration_in_media_block_is_dropped() {
    let sheet = parse_stylesheet("@media (max-width: 600px) { color: red; a { b: c } }");
    let inner = media_rules(&sheet.rules[0]);
    assert_eq!(inner.len(), 1);
    let Rule::Style(rule) = &inner[0] else {
        panic!("Expected style rule");
    };
    assert_eq!(rule.selector, "a");
}

#[test]
fn test_stray_closing_brace_at_top_level_is_ignored() {
    let sheet = parse_stylesheet("} a { b: c }");
    assert_eq!(sheet.rules.len(), 1);
}

#[test]
fn test_parse_declaration_list() {
    let source = "color: red; width: 10px";
    let mut tokenizer = CSSTokenizer::new(source);
    tokenizer.run();
    let decls = CSSParser::new(source, tokenizer.into_tokens()).parse_declaration_list();
    assert_eq!(decls.len(), 2);
    assert_eq!(decls[1].value, "10px");
}

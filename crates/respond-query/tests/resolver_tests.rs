//! Tests for the breakpoint cascade and the inline editor rendering.

use respond_query::{
    LineHighlight, NO_SEED, Provenance, QueryError, QueryManager, ResolvedRule, RuleResolver,
    render_editor,
};

fn manager_with_rules(rules: &[(u32, &str, &str)]) -> QueryManager {
    let mut manager = QueryManager::new();
    for &(width, selector, line) in rules {
        let query = manager.add(width).unwrap();
        if !line.is_empty() {
            assert!(query.add_rule(selector, line), "bad fixture line {line:?}");
        }
    }
    manager
}

fn summary(rules: &[ResolvedRule]) -> Vec<(&str, &str, Option<u32>, bool)> {
    rules
        .iter()
        .map(|rule| {
            (
                rule.property.as_str(),
                rule.value.as_str(),
                rule.provenance.map(|p| p.width),
                rule.provenance.is_some_and(|p| p.inherited),
            )
        })
        .collect()
}

// ========== cascade ==========

#[test]
fn test_wider_query_shows_through() {
    let manager = manager_with_rules(&[(600, "body", "color: red"), (300, "body", "")]);
    let rules = RuleResolver::new(&manager).resolve(300, "body", NO_SEED).unwrap();

    assert_eq!(
        rules,
        vec![ResolvedRule {
            property: "color".to_string(),
            value: "red".to_string(),
            provenance: Some(Provenance {
                width: 600,
                color_index: 0,
                inherited: true,
            }),
        }]
    );
}

#[test]
fn test_own_value_beats_wider_query() {
    let manager = manager_with_rules(&[(600, "body", "color: red"), (300, "body", "color: blue")]);
    let rules = RuleResolver::new(&manager).resolve(300, "body", NO_SEED).unwrap();

    assert_eq!(summary(&rules), vec![("color", "blue", Some(300), false)]);
    assert_eq!(rules[0].provenance.unwrap().color_index, 1);
}

#[test]
fn test_narrowest_wider_query_wins() {
    let manager = manager_with_rules(&[
        (1200, "p", "color: black"),
        (900, "p", "color: green"),
        (600, "p", "color: red"),
        (300, "p", ""),
    ]);
    let rules = RuleResolver::new(&manager).resolve(300, "p", NO_SEED).unwrap();
    assert_eq!(summary(&rules), vec![("color", "red", Some(600), true)]);

    let rules = RuleResolver::new(&manager).resolve(600, "p", NO_SEED).unwrap();
    assert_eq!(summary(&rules), vec![("color", "red", Some(600), false)]);

    let rules = RuleResolver::new(&manager).resolve(700, "p", NO_SEED);
    assert_eq!(rules, Err(QueryError::NotFound(700)));
}

#[test]
fn test_narrower_queries_never_apply() {
    let manager = manager_with_rules(&[(300, "body", "color: blue"), (600, "body", "")]);
    let rules = RuleResolver::new(&manager).resolve(600, "body", NO_SEED).unwrap();
    assert!(rules.is_empty());
}

#[test]
fn test_seed_fills_gaps_and_orders_first() {
    let manager = manager_with_rules(&[
        (900, "h1", "margin: 0"),
        (900, "h1", "color: red"),
        (600, "h1", "font-size: 2em"),
    ]);
    let seed = [("color", "black;"), ("display", " block ")];
    let rules = RuleResolver::new(&manager).resolve(600, "h1", &seed).unwrap();

    assert_eq!(
        summary(&rules),
        vec![
            ("color", "red", Some(900), true),
            ("display", "block", None, false),
            ("font-size", "2em", Some(600), false),
            ("margin", "0", Some(900), true),
        ]
    );
}

#[test]
fn test_selectors_do_not_mix() {
    let manager = manager_with_rules(&[(900, "a", "color: red"), (600, "b", "color: blue")]);
    let rules = RuleResolver::new(&manager).resolve(600, "a", NO_SEED).unwrap();
    assert_eq!(summary(&rules), vec![("color", "red", Some(900), true)]);

    let rules = RuleResolver::new(&manager).resolve(600, "c", NO_SEED).unwrap();
    assert!(rules.is_empty());
}

#[test]
fn test_resolve_current_needs_selection() {
    let mut manager = manager_with_rules(&[(600, "body", "color: red"), (300, "body", "")]);
    let resolver = RuleResolver::new(&manager);
    assert_eq!(
        resolver.resolve_current("body", NO_SEED),
        Err(QueryError::NoCurrentQuery)
    );

    let _ = manager.set_current(300).unwrap();
    let rules = RuleResolver::new(&manager)
        .resolve_current("body", NO_SEED)
        .unwrap();
    assert_eq!(summary(&rules), vec![("color", "red", Some(600), true)]);
}

#[test]
fn test_resolved_rule_json_shape() {
    let manager = manager_with_rules(&[(600, "body", "color: red")]);
    let rules = RuleResolver::new(&manager).resolve(600, "body", NO_SEED).unwrap();
    let json = serde_json::to_value(&rules).unwrap();

    assert_eq!(json[0]["property"], "color");
    assert_eq!(json[0]["provenance"]["width"], 600);
    assert_eq!(json[0]["provenance"]["colorIndex"], 0);
    assert_eq!(json[0]["provenance"]["inherited"], false);
}

// ========== editor ==========

#[test]
fn test_editor_lists_rules_with_highlights() {
    let manager = manager_with_rules(&[(600, "body", "color: red"), (300, "body", "margin: 0")]);
    let rules = RuleResolver::new(&manager)
        .resolve(300, "body", &[("display", "block")])
        .unwrap();
    let editor = render_editor("body", &rules);

    assert_eq!(
        editor.contents,
        "body {\n\tdisplay: block;\n\tmargin: 0;\n\tcolor: red;\n}"
    );
    assert_eq!(editor.num_lines, 3);
    assert_eq!(
        editor.highlights,
        vec![
            LineHighlight {
                line: 2,
                width: 300,
                color_index: 1,
            },
            LineHighlight {
                line: 3,
                width: 600,
                color_index: 0,
            },
        ]
    );
    assert_eq!(editor.highlights[0].class_name(), "pq1");
}

#[test]
fn test_editor_without_rules_has_blank_line() {
    let editor = render_editor(".empty", &[]);
    assert_eq!(editor.contents, ".empty {\n\t\n}");
    assert_eq!(editor.num_lines, 0);
    assert!(editor.highlights.is_empty());
}

//! Stylesheet text for a registry.
//!
//! ```text
//! @media only screen and (max-width: 600px) {
//!
//! 	body {
//! 		color: red;
//! 	}
//!
//! }
//! ```

use std::fmt::Write;

use crate::manager::QueryManager;
use crate::query::Query;

/// Every query as an `@media` block, widest first.
///
/// Wider breakpoints come first so that narrower ones, later in the file,
/// override them in the browser cascade.
#[must_use]
pub fn serialize(manager: &QueryManager) -> String {
    let mut css = String::new();
    for query in manager.sorted().rev() {
        write_query(&mut css, query);
    }
    css
}

fn write_query(out: &mut String, query: &Query) {
    let _ = writeln!(out, "@media only screen and (max-width: {}px) {{", query.width());
    out.push('\n');
    for (selector, rules) in query.selectors() {
        let _ = writeln!(out, "\t{selector} {{");
        for (property, value) in rules.iter() {
            let _ = writeln!(out, "\t\t{property}: {value};");
        }
        out.push_str("\t}\n\n");
    }
    out.push_str("}\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_still_emits_block() {
        let mut manager = QueryManager::new();
        let _ = manager.add(480).unwrap();
        assert_eq!(
            serialize(&manager),
            "@media only screen and (max-width: 480px) {\n\n}\n"
        );
    }

    #[test]
    fn empty_registry_is_empty_text() {
        assert_eq!(serialize(&QueryManager::new()), "");
    }
}

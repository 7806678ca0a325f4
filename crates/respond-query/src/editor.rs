//! Text shown in the inline rule editor for one selector.

use std::fmt::Write;

use serde::Serialize;

use crate::resolver::ResolvedRule;

/// Marks an editor line whose value comes from a breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineHighlight {
    /// 0-based line in [`EditorContents::contents`].
    pub line: usize,
    /// Width of the contributing breakpoint.
    pub width: u32,
    /// Palette slot of the contributing breakpoint.
    pub color_index: usize,
}

impl LineHighlight {
    /// CSS class used to paint the line, `pq<color_index>`.
    #[must_use]
    pub fn class_name(&self) -> String {
        format!("pq{}", self.color_index)
    }
}

/// Rendered editor text plus its highlights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorContents {
    /// `selector {`, one line per property, `}`.
    pub contents: String,
    /// One entry per line with a breakpoint provenance.
    pub highlights: Vec<LineHighlight>,
    /// Number of property lines.
    pub num_lines: usize,
}

/// Renders resolved rules the way the inline editor shows them.
///
/// With no rules the body is a single indented empty line, ready for typing.
#[must_use]
pub fn render_editor(selector: &str, rules: &[ResolvedRule]) -> EditorContents {
    let mut contents = format!("{selector} {{\n");
    let mut highlights = Vec::new();

    for (index, rule) in rules.iter().enumerate() {
        let _ = writeln!(contents, "\t{}: {};", rule.property, rule.value.trim());
        if let Some(provenance) = rule.provenance {
            highlights.push(LineHighlight {
                line: index + 1,
                width: provenance.width,
                color_index: provenance.color_index,
            });
        }
    }
    if rules.is_empty() {
        contents.push_str("\t\n");
    }
    contents.push('}');

    EditorContents {
        contents,
        highlights,
        num_lines: rules.len(),
    }
}

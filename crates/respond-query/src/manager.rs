//! The breakpoint registry.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use respond_common::warning::warn_once;
use respond_css::{AtRule, AtRuleBlock, MediaCondition, Rule, parse_stylesheet};
use serde::Serialize;
use thiserror::Error;

use crate::error::QueryError;
use crate::query::{PALETTE, Query};
use crate::serializer;

/// How [`QueryManager::parse`] treats queries already in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Upsert parsed rules into the existing registry.
    Merge,
    /// Clear the registry first; the stylesheet becomes the whole model.
    #[default]
    Replace,
}

/// Why a block of the stylesheet was left out of the model.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum SkipReason {
    /// A top-level rule that is not an `@media` block.
    #[error("rule outside of a media block")]
    OutsideMediaBlock,
    /// An `@media` prelude that is not a single max-width condition.
    #[error("{0}")]
    UnsupportedCondition(String),
    /// A max-width of zero or less.
    #[error("breakpoint width {0} is not positive")]
    InvalidWidth(i64),
    /// A max-width beyond the largest supported breakpoint.
    #[error("breakpoint width {0}px is too large (at most {max}px)", max = u32::MAX)]
    WidthTooLarge(i64),
    /// The block was still open at the end of the file.
    #[error("block is not terminated")]
    Unterminated,
    /// An at-rule nested inside a media block.
    #[error("nested @{0} rule inside a media block")]
    NestedAtRule(String),
    /// A style rule with no selector.
    #[error("style rule without a selector")]
    EmptySelector,
}

/// A block that [`QueryManager::parse`] skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedBlock {
    /// 1-based line where the block starts.
    pub line: usize,
    /// What was wrong with it.
    pub reason: SkipReason,
}

impl fmt::Display for SkippedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// Outcome of a best-effort stylesheet parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseReport {
    /// Media blocks merged into the registry.
    pub applied: usize,
    /// Blocks left out, in source order.
    pub skipped: Vec<SkippedBlock>,
}

impl ParseReport {
    /// True when nothing was skipped.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    fn skip(&mut self, line: usize, reason: SkipReason) {
        self.skipped.push(SkippedBlock { line, reason });
    }
}

/// Ordered set of breakpoints keyed by width, plus the current selection.
///
/// Colors are handed out from a creation counter, so removing a query never
/// recolors the others. The counter only restarts on [`QueryManager::clear`].
#[derive(Debug, Clone, Default)]
pub struct QueryManager {
    queries: BTreeMap<u32, Query>,
    current: Option<u32>,
    created: usize,
}

impl QueryManager {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from stylesheet text.
    #[must_use]
    pub fn from_css(css: &str) -> (Self, ParseReport) {
        let mut manager = Self::new();
        let report = manager.parse(css, ParseMode::Replace);
        (manager, report)
    }

    /// Returns the query for `width`, creating it if needed.
    ///
    /// An existing query is returned as is; its rules and color are kept.
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidWidth`] when `width` is zero.
    pub fn add(&mut self, width: u32) -> Result<&mut Query, QueryError> {
        match self.queries.entry(width) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let query = Query::with_color(width, self.created % PALETTE.len())?;
                self.created += 1;
                Ok(entry.insert(query))
            }
        }
    }

    /// Removes the query for `width`, unselecting it if it was current.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotFound`] if no query has that width.
    pub fn remove(&mut self, width: u32) -> Result<Query, QueryError> {
        let query = self.queries.remove(&width).ok_or(QueryError::NotFound(width))?;
        if self.current == Some(width) {
            self.current = None;
        }
        Ok(query)
    }

    /// Removes every query and restarts color assignment.
    pub fn clear(&mut self) {
        self.queries.clear();
        self.current = None;
        self.created = 0;
    }

    /// Makes the query for `width` the one being edited.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotRegistered`] if no query has that width.
    pub fn set_current(&mut self, width: u32) -> Result<&Query, QueryError> {
        let query = self
            .queries
            .get(&width)
            .ok_or(QueryError::NotRegistered(width))?;
        self.current = Some(width);
        Ok(query)
    }

    /// Unselects the current query.
    pub const fn clear_current(&mut self) {
        self.current = None;
    }

    /// The query being edited, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Query> {
        self.current.and_then(|width| self.queries.get(&width))
    }

    /// Mutable access to the query being edited.
    pub fn current_mut(&mut self) -> Option<&mut Query> {
        self.current.and_then(|width| self.queries.get_mut(&width))
    }

    /// Width of the query being edited.
    #[must_use]
    pub const fn current_width(&self) -> Option<u32> {
        self.current
    }

    /// Queries in ascending width order.
    pub fn sorted(&self) -> impl DoubleEndedIterator<Item = &Query> + ExactSizeIterator {
        self.queries.values()
    }

    /// Registered widths, ascending.
    pub fn widths(&self) -> impl DoubleEndedIterator<Item = u32> + '_ {
        self.queries.keys().copied()
    }

    /// Query for `width`.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotFound`] if no query has that width.
    pub fn get(&self, width: u32) -> Result<&Query, QueryError> {
        self.queries.get(&width).ok_or(QueryError::NotFound(width))
    }

    /// Mutable query for `width`.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotFound`] if no query has that width.
    pub fn get_mut(&mut self, width: u32) -> Result<&mut Query, QueryError> {
        self.queries.get_mut(&width).ok_or(QueryError::NotFound(width))
    }

    /// True if a query with `width` is registered.
    #[must_use]
    pub fn contains(&self, width: u32) -> bool {
        self.queries.contains_key(&width)
    }

    /// Number of queries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// True when no query is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Loads breakpoint blocks from stylesheet text.
    ///
    /// Parsing never fails. Blocks that do not describe a breakpoint are
    /// skipped, listed in the report and printed once as warnings.
    pub fn parse(&mut self, css: &str, mode: ParseMode) -> ParseReport {
        if mode == ParseMode::Replace {
            self.clear();
        }

        let mut report = ParseReport::default();
        for rule in parse_stylesheet(css).rules {
            match rule {
                Rule::At(at) if at.name.eq_ignore_ascii_case("media") => {
                    self.apply_media_rule(&at, &mut report);
                }
                other => report.skip(other.line(), SkipReason::OutsideMediaBlock),
            }
        }

        for skipped in &report.skipped {
            warn_once("Stylesheet", &skipped.to_string());
        }
        report
    }

    fn apply_media_rule(&mut self, at: &AtRule, report: &mut ParseReport) {
        if !at.closed {
            report.skip(at.line, SkipReason::Unterminated);
            return;
        }

        let condition = match MediaCondition::from_prelude(&at.prelude, &at.prelude_text) {
            Ok(condition) => condition,
            Err(error) => {
                report.skip(at.line, SkipReason::UnsupportedCondition(error.to_string()));
                return;
            }
        };
        let width = match u32::try_from(condition.max_width) {
            Ok(width) if width > 0 => width,
            Err(_) if condition.max_width > 0 => {
                report.skip(at.line, SkipReason::WidthTooLarge(condition.max_width));
                return;
            }
            _ => {
                report.skip(at.line, SkipReason::InvalidWidth(condition.max_width));
                return;
            }
        };
        let Some(AtRuleBlock::Rules(rules)) = &at.block else {
            report.skip(
                at.line,
                SkipReason::UnsupportedCondition(format!("@media {} has no block", at.prelude_text)),
            );
            return;
        };

        let query = match self.add(width) {
            Ok(query) => query,
            Err(error) => {
                report.skip(at.line, SkipReason::UnsupportedCondition(error.to_string()));
                return;
            }
        };
        for rule in rules {
            match rule {
                Rule::Style(style) if style.selector.is_empty() => {
                    report.skip(style.line, SkipReason::EmptySelector);
                }
                Rule::Style(style) => {
                    let rule_set = query.rules_mut(&style.selector);
                    for declaration in &style.declarations {
                        let _ = rule_set.upsert(&declaration.name, &declaration.value);
                    }
                }
                Rule::At(nested) => {
                    report.skip(nested.line, SkipReason::NestedAtRule(nested.name.clone()));
                }
            }
        }
        report.applied += 1;
    }

    /// Stylesheet text for the whole registry, widest breakpoint first.
    #[must_use]
    pub fn serialize(&self) -> String {
        serializer::serialize(self)
    }
}

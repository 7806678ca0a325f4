//! Cascade of breakpoint rules as seen from one breakpoint.
//!
//! A `max-width` query also applies at every narrower viewport, so while a
//! breakpoint is being edited the rules of all wider breakpoints show
//! through. Narrower breakpoints never apply.

use respond_css::{normalize_selector, normalize_value};
use serde::Serialize;

use crate::error::QueryError;
use crate::manager::QueryManager;
use crate::query::Query;

/// Which breakpoint a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    /// Width of the contributing query.
    pub width: u32,
    /// Its palette slot, for highlighting.
    pub color_index: usize,
    /// True when the value comes from a wider query than the active one.
    pub inherited: bool,
}

impl Provenance {
    fn from_query(query: &Query, inherited: bool) -> Self {
        Self {
            width: query.width(),
            color_index: query.color_index(),
            inherited,
        }
    }
}

/// One property with the value that applies at the active breakpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRule {
    /// Property name.
    pub property: String,
    /// Winning value, normalized.
    pub value: String,
    /// The query that set it; `None` for seeded values.
    pub provenance: Option<Provenance>,
}

/// Seed for callers with no author styles.
pub const NO_SEED: &[(&str, &str)] = &[];

/// Resolves rules for a selector against a [`QueryManager`].
#[derive(Debug, Clone, Copy)]
pub struct RuleResolver<'a> {
    manager: &'a QueryManager,
}

impl<'a> RuleResolver<'a> {
    /// Resolver over `manager`.
    #[must_use]
    pub const fn new(manager: &'a QueryManager) -> Self {
        Self { manager }
    }

    /// Rules for `selector` as they apply at `active_width`.
    ///
    /// `seed` holds the selector's base declarations; they come first in the
    /// result and win only where no applicable query sets the property. For
    /// every other property the active query wins over wider ones, and among
    /// wider queries the narrowest wins.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotFound`] if `active_width` is not registered.
    pub fn resolve<P, V>(
        &self,
        active_width: u32,
        selector: &str,
        seed: &[(P, V)],
    ) -> Result<Vec<ResolvedRule>, QueryError>
    where
        P: AsRef<str>,
        V: AsRef<str>,
    {
        let active = self.manager.get(active_width)?;
        let key = normalize_selector(selector).unwrap_or_else(|_| selector.trim().to_string());
        let selector = key.as_str();
        let wider: Vec<&Query> = self
            .manager
            .sorted()
            .filter(|query| query.width() > active_width)
            .collect();

        let mut properties: Vec<&str> = Vec::new();
        for (property, _) in seed {
            push_unique(&mut properties, property.as_ref());
        }
        for query in std::iter::once(active).chain(wider.iter().copied()) {
            if let Some(rules) = query.stored_rules(selector) {
                for (property, _) in rules.iter() {
                    push_unique(&mut properties, property);
                }
            }
        }

        let resolved = properties
            .into_iter()
            .map(|property| {
                let (value, provenance) = if let Some(value) = stored_value(active, selector, property) {
                    (value, Some(Provenance::from_query(active, false)))
                } else if let Some((query, value)) = wider
                    .iter()
                    .find_map(|query| stored_value(query, selector, property).map(|value| (*query, value)))
                {
                    (value, Some(Provenance::from_query(query, true)))
                } else {
                    let seeded = seed
                        .iter()
                        .find(|(name, _)| name.as_ref() == property)
                        .map_or("", |(_, value)| value.as_ref());
                    (seeded, None)
                };
                ResolvedRule {
                    property: property.to_string(),
                    value: normalize_value(value),
                    provenance,
                }
            })
            .collect();
        Ok(resolved)
    }

    /// [`RuleResolver::resolve`] at the current breakpoint.
    ///
    /// # Errors
    ///
    /// [`QueryError::NoCurrentQuery`] when no breakpoint is selected.
    pub fn resolve_current<P, V>(
        &self,
        selector: &str,
        seed: &[(P, V)],
    ) -> Result<Vec<ResolvedRule>, QueryError>
    where
        P: AsRef<str>,
        V: AsRef<str>,
    {
        let width = self
            .manager
            .current_width()
            .ok_or(QueryError::NoCurrentQuery)?;
        self.resolve(width, selector, seed)
    }
}

fn push_unique<'s>(list: &mut Vec<&'s str>, item: &'s str) {
    if !list.contains(&item) {
        list.push(item);
    }
}

fn stored_value<'q>(query: &'q Query, key: &str, property: &str) -> Option<&'q str> {
    query.stored_rules(key).and_then(|rules| rules.get(property))
}

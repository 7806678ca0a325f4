//! A single breakpoint: a max-width media query and the rules authored for it.

use respond_css::{normalize_selector, normalize_value, parse_declaration_line};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::error::QueryError;

/// Gradient pair used to paint a breakpoint in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryColor {
    /// Top stop of the gradient.
    pub top: &'static str,
    /// Bottom stop of the gradient.
    pub bottom: &'static str,
}

/// Fixed breakpoint palette, cycled in creation order.
pub const PALETTE: [QueryColor; 8] = [
    QueryColor { top: "#7cc6f7", bottom: "#2f8fd8" },
    QueryColor { top: "#a9e07a", bottom: "#66ae2b" },
    QueryColor { top: "#ffd67a", bottom: "#f3a21d" },
    QueryColor { top: "#f79a93", bottom: "#d6473f" },
    QueryColor { top: "#c9a3f2", bottom: "#8c56d4" },
    QueryColor { top: "#85e3d6", bottom: "#27ad9a" },
    QueryColor { top: "#f6acd9", bottom: "#d2569f" },
    QueryColor { top: "#cfcfcf", bottom: "#8a8a8a" },
];

/// Parses breakpoint input typed by a user: `"600"` or `"600px"`.
///
/// # Errors
///
/// [`QueryError::InvalidWidth`] for anything that is not a positive integer.
pub fn parse_width(text: &str) -> Result<u32, QueryError> {
    let trimmed = text.trim();
    let number = trimmed
        .len()
        .checked_sub(2)
        .filter(|&at| trimmed.is_char_boundary(at))
        .map(|at| trimmed.split_at(at))
        .filter(|(_, unit)| unit.eq_ignore_ascii_case("px"))
        .map_or(trimmed, |(number, _)| number.trim_end());

    match number.parse::<u32>() {
        Ok(width) if width > 0 => Ok(width),
        _ => Err(QueryError::InvalidWidth(text.to_string())),
    }
}

/// Outcome of [`Query::edit_rule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleEdit {
    /// Not a declaration, or not a usable selector; nothing was stored.
    Rejected,
    /// The rule already had this value.
    Unchanged,
    /// The rule was added or its value replaced.
    Changed,
}

impl RuleEdit {
    /// True unless the input was rejected.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// Property → value map for one selector, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<(String, String)>,
}

impl RuleSet {
    /// Value stored for `property`.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    /// Sets `property`, keeping its original position when it already exists.
    ///
    /// Returns whether the stored value changed.
    pub fn upsert(&mut self, property: &str, value: &str) -> bool {
        let value = normalize_value(value);
        if let Some((_, existing)) = self.rules.iter_mut().find(|(name, _)| name == property) {
            if *existing == value {
                return false;
            }
            *existing = value;
        } else {
            self.rules.push((property.to_string(), value));
        }
        true
    }

    /// `(property, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of properties.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when no property is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Serialize for RuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rules.len()))?;
        for (property, value) in &self.rules {
            map.serialize_entry(property, value)?;
        }
        map.end()
    }
}

/// One `@media only screen and (max-width: Npx)` block.
///
/// The width is fixed for the life of the query. Rules change only through
/// [`Query::add_rule`] or a full reparse by the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    width: u32,
    color_index: usize,
    selectors: Vec<(String, RuleSet)>,
}

impl Query {
    /// Creates an empty query with the first palette color.
    ///
    /// Registries assign colors themselves; see [`crate::QueryManager::add`].
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidWidth`] when `width` is zero.
    pub fn new(width: u32) -> Result<Self, QueryError> {
        Self::with_color(width, 0)
    }

    pub(crate) fn with_color(width: u32, color_index: usize) -> Result<Self, QueryError> {
        if width == 0 {
            return Err(QueryError::InvalidWidth(width.to_string()));
        }
        Ok(Self {
            width,
            color_index: color_index % PALETTE.len(),
            selectors: Vec::new(),
        })
    }

    /// Breakpoint width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Palette slot assigned when the query was created.
    #[must_use]
    pub const fn color_index(&self) -> usize {
        self.color_index
    }

    /// Gradient for this query.
    #[must_use]
    pub const fn color(&self) -> QueryColor {
        PALETTE[self.color_index % PALETTE.len()]
    }

    /// Adds or replaces a rule from an editor line such as `color: red;`.
    ///
    /// A line that is not a declaration, or a selector that cannot be
    /// written back into a stylesheet, leaves the query untouched and
    /// returns `false`.
    pub fn add_rule(&mut self, selector: &str, line: &str) -> bool {
        self.edit_rule(selector, line).is_accepted()
    }

    /// [`Query::add_rule`], reporting whether the stored rules changed.
    pub fn edit_rule(&mut self, selector: &str, line: &str) -> RuleEdit {
        let (Ok(selector), Ok(declaration)) =
            (normalize_selector(selector), parse_declaration_line(line))
        else {
            return RuleEdit::Rejected;
        };
        if self
            .rules_mut(&selector)
            .upsert(&declaration.property, &declaration.value)
        {
            RuleEdit::Changed
        } else {
            RuleEdit::Unchanged
        }
    }

    /// Rule set stored under the normalized `key`, created empty if missing.
    pub(crate) fn rules_mut(&mut self, key: &str) -> &mut RuleSet {
        let index = match self.selectors.iter().position(|(name, _)| name == key) {
            Some(index) => index,
            None => {
                self.selectors.push((key.to_string(), RuleSet::default()));
                self.selectors.len() - 1
            }
        };
        &mut self.selectors[index].1
    }

    /// Rule set stored under an already normalized `key`.
    pub(crate) fn stored_rules(&self, key: &str) -> Option<&RuleSet> {
        self.selectors
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, rules)| rules)
    }

    /// True if any rule was ever added for `selector`.
    #[must_use]
    pub fn has_selector(&self, selector: &str) -> bool {
        self.rules(selector).is_some()
    }

    /// Rules authored for `selector`.
    ///
    /// Selectors are compared in normalized form, so `ul  li` finds `ul li`.
    #[must_use]
    pub fn rules(&self, selector: &str) -> Option<&RuleSet> {
        let key = normalize_selector(selector).ok()?;
        self.stored_rules(&key)
    }

    /// Value of `property` under `selector`.
    #[must_use]
    pub fn rule(&self, selector: &str, property: &str) -> Option<&str> {
        self.rules(selector).and_then(|rules| rules.get(property))
    }

    /// Selectors with their rule sets, in insertion order.
    pub fn selectors(&self) -> impl Iterator<Item = (&str, &RuleSet)> {
        self.selectors
            .iter()
            .map(|(selector, rules)| (selector.as_str(), rules))
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Selectors<'a>(&'a [(String, RuleSet)]);

        impl Serialize for Selectors<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (selector, rules) in self.0 {
                    map.serialize_entry(selector, rules)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("width", &self.width)?;
        map.serialize_entry("colorIndex", &self.color_index)?;
        map.serialize_entry("color", &self.color())?;
        map.serialize_entry("selectors", &Selectors(&self.selectors))?;
        map.end()
    }
}

//! Errors surfaced by the breakpoint registry.

use thiserror::Error;

/// Structural errors: the caller asked for something the registry cannot do.
///
/// Parse problems and malformed declaration lines are not errors; they are
/// recovered locally (see [`crate::ParseReport`] and [`crate::Query::add_rule`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A width that is not a positive integer number of pixels.
    #[error("invalid breakpoint width '{0}': expected a positive integer")]
    InvalidWidth(String),
    /// The breakpoint to select is not part of the registry.
    #[error("no breakpoint at {0}px is registered")]
    NotRegistered(u32),
    /// Lookup by width found nothing.
    #[error("no breakpoint at {0}px")]
    NotFound(u32),
    /// The operation needs a current breakpoint and none is selected.
    #[error("no breakpoint is selected")]
    NoCurrentQuery,
}

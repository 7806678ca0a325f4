//! Responsive breakpoint model.
//!
//! A [`QueryManager`] holds one [`Query`] per `max-width` breakpoint, each
//! with the rules authored for it. The [`RuleResolver`] computes which value
//! applies to a selector at a given breakpoint, the serializer turns the
//! registry back into stylesheet text, and [`Session`] ties both to a
//! stylesheet on disk.
//!
//! ```
//! use respond_query::{QueryManager, RuleResolver, NO_SEED};
//!
//! let mut manager = QueryManager::new();
//! let _ = manager.add(600).unwrap().add_rule("body", "color: red;");
//! let _ = manager.add(300).unwrap();
//!
//! let rules = RuleResolver::new(&manager).resolve(300, "body", NO_SEED).unwrap();
//! assert_eq!(rules[0].value, "red");
//! assert_eq!(rules[0].provenance.map(|p| p.width), Some(600));
//! ```

pub mod editor;
pub mod error;
pub mod manager;
pub mod query;
pub mod resolver;
pub mod serializer;
pub mod session;

pub use editor::{EditorContents, LineHighlight, render_editor};
pub use error::QueryError;
pub use manager::{ParseMode, ParseReport, QueryManager, SkipReason, SkippedBlock};
pub use query::{PALETTE, Query, QueryColor, RuleEdit, RuleSet, parse_width};
pub use resolver::{NO_SEED, Provenance, ResolvedRule, RuleResolver};
pub use session::{FileStore, MemoryStore, Session, SessionError, SharedSession, StoreError, StylesheetStore};

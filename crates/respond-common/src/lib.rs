//! Common utilities for the respond authoring tools.
//!
//! This crate provides shared infrastructure used by the stylesheet
//! parser, the breakpoint model and the command line front end:
//! - **Warning System** - colored, deduplicated terminal diagnostics
//! - **Preferences** - the per-project `.respond.json` settings file

pub mod prefs;
pub mod warning;

pub use prefs::{PreferredLayout, Preferences, PrefsError};

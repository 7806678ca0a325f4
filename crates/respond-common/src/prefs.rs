//! Per-project preferences.
//!
//! Preferences live in a `.respond.json` file at the project root. Every key
//! is optional; a missing file means "all defaults". The stylesheet path
//! drives the tools; the layout and preview settings are carried for the
//! host UI and shown by `respond list`.
//!
//! ```json
//! {
//!   "mediaQueryFile": "css/media-queries.css",
//!   "preferredLayout": "vertical",
//!   "useLivePreviewUrl": false
//! }
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Name of the preferences file, relative to the project root.
pub const PREFERENCES_FILE: &str = ".respond.json";

/// Default location of the generated stylesheet, relative to the project root.
pub const DEFAULT_MEDIA_QUERY_FILE: &str = "css/media-queries.css";

/// Errors raised while loading preferences.
#[derive(Debug, Error)]
pub enum PrefsError {
    /// The preferences file exists but could not be read.
    #[error("failed to read preferences '{}': {source}", path.display())]
    Read {
        /// Path of the preferences file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The preferences file is not valid JSON for [`Preferences`].
    #[error("invalid preferences: {0}")]
    Json(#[from] serde_json::Error),
}

/// Arrangement of the preview pane relative to the code editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PreferredLayout {
    /// Preview pane above the code editor.
    #[default]
    Vertical,
    /// Preview pane beside the code editor.
    Horizontal,
}

/// Anything that is not recognizably "horizontal" falls back to vertical.
fn layout_or_default<'de, D>(deserializer: D) -> Result<PreferredLayout, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(PreferredLayout::from_str(raw.trim()).unwrap_or_default())
}

/// Project preferences for the authoring tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    /// Generated stylesheet path, relative to the project root.
    pub media_query_file: PathBuf,
    /// Preview pane layout.
    #[serde(deserialize_with = "layout_or_default")]
    pub preferred_layout: PreferredLayout,
    /// Preview the project's live preview URL instead of the open HTML file.
    pub use_live_preview_url: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            media_query_file: PathBuf::from(DEFAULT_MEDIA_QUERY_FILE),
            preferred_layout: PreferredLayout::default(),
            use_live_preview_url: false,
        }
    }
}

impl Preferences {
    /// Parse preferences from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError::Json`] if the text is not a valid preferences object.
    pub fn from_json(text: &str) -> Result<Self, PrefsError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load `.respond.json` from `project_root`, or defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(project_root: &Path) -> Result<Self, PrefsError> {
        let path = project_root.join(PREFERENCES_FILE);
        match std::fs::read_to_string(&path) {
            Ok(text) => Self::from_json(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(PrefsError::Read { path, source }),
        }
    }

    /// Absolute location of the generated stylesheet for `project_root`.
    #[must_use]
    pub fn media_query_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.media_query_file)
    }
}

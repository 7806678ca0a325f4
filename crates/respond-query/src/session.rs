//! Authoring-mode flow: load the stylesheet, edit breakpoints, write it back.
//!
//! The in-memory registry is the source of truth. Every mutation is
//! followed by a flush that regenerates the whole stylesheet; a failed write
//! keeps the model as is and marks the session dirty so the next mutation
//! tries again.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use respond_common::warning::{clear_warnings, warn_once};
use thiserror::Error;

use crate::editor::{EditorContents, render_editor};
use crate::error::QueryError;
use crate::manager::{ParseMode, ParseReport, QueryManager};
use crate::query::{Query, RuleEdit};
use crate::resolver::{ResolvedRule, RuleResolver};

/// Failure talking to the stylesheet's backing storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stylesheet exists but could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        /// Stylesheet location.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The stylesheet could not be written.
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        /// Stylesheet location.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A non-file store refused the operation.
    #[error("stylesheet store unavailable: {0}")]
    Unavailable(String),
}

/// Errors from [`Session`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The registry rejected the operation.
    #[error(transparent)]
    Query(#[from] QueryError),
    /// Reading or writing the stylesheet failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A shared session was used while already in use.
    #[error("session is already being modified")]
    Reentrant,
}

/// Where the generated stylesheet lives.
pub trait StylesheetStore {
    /// Current stylesheet text, or `None` if it does not exist yet.
    ///
    /// # Errors
    ///
    /// [`StoreError`] when the stylesheet exists but cannot be read.
    fn read(&mut self) -> Result<Option<String>, StoreError>;

    /// Replaces the stylesheet text.
    ///
    /// # Errors
    ///
    /// [`StoreError`] when the text cannot be stored.
    fn write(&mut self, css: &str) -> Result<(), StoreError>;
}

/// A stylesheet file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the stylesheet.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StylesheetStore for FileStore {
    fn read(&mut self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(css) => Ok(Some(css)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write(&mut self, css: &str) -> Result<(), StoreError> {
        let write_error = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(&self.path, css).map_err(write_error)
    }
}

/// In-memory stylesheet, for tests and embedding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    /// Stored text; `None` until something is written.
    pub contents: Option<String>,
    /// Number of successful writes.
    pub writes: usize,
    /// When set, every write fails.
    pub fail_writes: bool,
}

impl MemoryStore {
    /// A store that already holds `css`.
    #[must_use]
    pub fn with_contents(css: impl Into<String>) -> Self {
        Self {
            contents: Some(css.into()),
            ..Self::default()
        }
    }
}

impl StylesheetStore for MemoryStore {
    fn read(&mut self) -> Result<Option<String>, StoreError> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, css: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("writes are disabled".to_string()));
        }
        self.contents = Some(css.to_string());
        self.writes += 1;
        Ok(())
    }
}

type PreviewListener = Box<dyn FnMut(&str)>;

/// One authoring session over a stylesheet store.
pub struct Session<S> {
    manager: QueryManager,
    store: S,
    dirty: bool,
    preview: Option<PreviewListener>,
}

impl<S: StylesheetStore> Session<S> {
    /// Enters authoring mode.
    ///
    /// A missing stylesheet is created empty. The returned report lists the
    /// blocks of an existing stylesheet that could not be loaded.
    ///
    /// # Errors
    ///
    /// [`SessionError::Store`] when the stylesheet cannot be read or created.
    pub fn enter(mut store: S) -> Result<(Self, ParseReport), SessionError> {
        clear_warnings();
        let css = if let Some(css) = store.read()? {
            css
        } else {
            store.write("")?;
            String::new()
        };

        let mut manager = QueryManager::new();
        let report = manager.parse(&css, ParseMode::Replace);
        let session = Self {
            manager,
            store,
            dirty: false,
            preview: None,
        };
        Ok((session, report))
    }

    /// Calls `listener` with the regenerated stylesheet on every flush.
    #[must_use]
    pub fn with_preview(mut self, listener: impl FnMut(&str) + 'static) -> Self {
        self.preview = Some(Box::new(listener));
        self
    }

    /// The breakpoint registry.
    #[must_use]
    pub const fn manager(&self) -> &QueryManager {
        &self.manager
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the backing store.
    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// True when the last write failed and the store is behind the model.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Adds a breakpoint (or reuses an existing one), selects it and flushes.
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidWidth`] for zero, [`SessionError::Store`] if the
    /// flush fails. In the latter case the breakpoint stays in the model.
    pub fn add_breakpoint(&mut self, width: u32) -> Result<&Query, SessionError> {
        let _ = self.manager.add(width)?;
        let _ = self.manager.set_current(width)?;
        self.flush()?;
        Ok(self.manager.get(width)?)
    }

    /// Selects an existing breakpoint for editing.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotRegistered`] if no breakpoint has that width.
    pub fn select(&mut self, width: u32) -> Result<&Query, SessionError> {
        Ok(self.manager.set_current(width)?)
    }

    /// Removes a breakpoint and flushes.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotFound`] if absent, [`SessionError::Store`] if the flush fails.
    pub fn remove_breakpoint(&mut self, width: u32) -> Result<Query, SessionError> {
        let query = self.manager.remove(width)?;
        self.flush()?;
        Ok(query)
    }

    /// Applies an editor line such as `color: red;` to the current breakpoint.
    ///
    /// Returns whether the line was a declaration. Malformed lines change
    /// nothing and are not flushed.
    ///
    /// # Errors
    ///
    /// [`QueryError::NoCurrentQuery`] when nothing is selected,
    /// [`SessionError::Store`] if the flush fails.
    pub fn edit_rule(&mut self, selector: &str, line: &str) -> Result<bool, SessionError> {
        let query = self
            .manager
            .current_mut()
            .ok_or(QueryError::NoCurrentQuery)?;
        match query.edit_rule(selector, line) {
            RuleEdit::Rejected => Ok(false),
            RuleEdit::Unchanged => Ok(true),
            RuleEdit::Changed => {
                self.flush()?;
                Ok(true)
            }
        }
    }

    /// Regenerates the stylesheet, shows it in the preview and stores it.
    ///
    /// # Errors
    ///
    /// [`SessionError::Store`] when the write fails; the session is then dirty.
    pub fn flush(&mut self) -> Result<(), SessionError> {
        let css = self.manager.serialize();
        if let Some(preview) = self.preview.as_mut() {
            preview(&css);
        }
        match self.store.write(&css) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(error) => {
                self.dirty = true;
                warn_once("Session", &error.to_string());
                Err(error.into())
            }
        }
    }

    /// Resolved rules for `selector` at the current breakpoint.
    ///
    /// # Errors
    ///
    /// [`QueryError::NoCurrentQuery`] when nothing is selected.
    pub fn resolve<P, V>(&self, selector: &str, seed: &[(P, V)]) -> Result<Vec<ResolvedRule>, QueryError>
    where
        P: AsRef<str>,
        V: AsRef<str>,
    {
        RuleResolver::new(&self.manager).resolve_current(selector, seed)
    }

    /// Inline editor text for `selector` at the current breakpoint.
    ///
    /// # Errors
    ///
    /// [`QueryError::NoCurrentQuery`] when nothing is selected.
    pub fn editor<P, V>(&self, selector: &str, seed: &[(P, V)]) -> Result<EditorContents, QueryError>
    where
        P: AsRef<str>,
        V: AsRef<str>,
    {
        let rules = self.resolve(selector, seed)?;
        Ok(render_editor(selector, &rules))
    }

    /// Leaves authoring mode and hands the store back.
    ///
    /// A dirty session gets one last flush attempt first.
    ///
    /// # Errors
    ///
    /// [`SessionError::Store`] if that final flush fails.
    pub fn exit(mut self) -> Result<S, SessionError> {
        if self.dirty {
            self.flush()?;
        }
        self.manager.clear();
        Ok(self.store)
    }
}

/// A [`Session`] shared between UI handlers.
///
/// Handlers run one at a time; a handler that reaches the session while
/// another one is still using it gets [`SessionError::Reentrant`].
pub struct SharedSession<S> {
    inner: Rc<RefCell<Session<S>>>,
}

impl<S> Clone for SharedSession<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: StylesheetStore> SharedSession<S> {
    /// Shares `session`.
    #[must_use]
    pub fn new(session: Session<S>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(session)),
        }
    }

    /// Runs `f` with exclusive access to the session.
    ///
    /// # Errors
    ///
    /// [`SessionError::Reentrant`] if the session is already in use, or
    /// whatever `f` returns.
    pub fn with<T>(
        &self,
        f: impl FnOnce(&mut Session<S>) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut session = self
            .inner
            .try_borrow_mut()
            .map_err(|_| SessionError::Reentrant)?;
        f(&mut session)
    }

    /// Runs `f` with read access to the session.
    ///
    /// # Errors
    ///
    /// [`SessionError::Reentrant`] if the session is being modified.
    pub fn read<T>(&self, f: impl FnOnce(&Session<S>) -> T) -> Result<T, SessionError> {
        let session = self
            .inner
            .try_borrow()
            .map_err(|_| SessionError::Reentrant)?;
        Ok(f(&session))
    }
}

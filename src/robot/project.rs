//! Project parsing
//!
//!     Parses many files in parallel into a shared registry keyed by path. Each file is
//!     parsed on its own by a rayon worker; only inserting the result takes the registry
//!     lock. Cancellation is cooperative: the flag is checked before each file, so a file
//!     that has started parsing always finishes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::robot::error::RobotError;
use crate::robot::keywords::KeywordDefinition;
use crate::robot::parsing::{parse_path, ParseOptions, ParseOutput};

#[derive(Debug, Default)]
pub struct Project {
    options: ParseOptions,
    registry: RwLock<BTreeMap<PathBuf, ParseOutput>>,
    cancelled: AtomicBool,
}

impl Project {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            registry: RwLock::new(BTreeMap::new()),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Stops parsing of files that have not started yet.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Parses `paths` in parallel. Results come back in input order; parsed files are
    /// registered, replacing an earlier parse of the same path.
    pub fn parse_all<P>(&self, paths: &[P]) -> Vec<Result<PathBuf, RobotError>>
    where
        P: AsRef<Path> + Sync,
    {
        paths.par_iter().map(|path| self.parse_one(path.as_ref())).collect()
    }

    pub fn parse_one(&self, path: &Path) -> Result<PathBuf, RobotError> {
        if self.is_cancelled() {
            return Err(RobotError::Cancelled(path.to_path_buf()));
        }
        let output = parse_path(path, &self.options)?;
        if !output.is_passed() {
            warn!(path = %path.display(), errors = output.errors().count(), "file parsed with errors");
        }
        self.registry.write().insert(path.to_path_buf(), output);
        debug!(path = %path.display(), "registered");
        Ok(path.to_path_buf())
    }

    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.read().is_empty()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.registry.read().keys().cloned().collect()
    }

    /// Runs `f` on the registered output for `path` while holding the read lock.
    pub fn with_output<R>(&self, path: &Path, f: impl FnOnce(&ParseOutput) -> R) -> Option<R> {
        self.registry.read().get(path).map(f)
    }

    pub fn remove(&self, path: &Path) -> Option<ParseOutput> {
        self.registry.write().remove(path)
    }

    /// User keywords of every registered file, qualified by the file stem.
    pub fn keyword_definitions(&self) -> Vec<KeywordDefinition> {
        let registry = self.registry.read();
        registry
            .iter()
            .flat_map(|(path, output)| {
                let source = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                KeywordDefinition::collect(&output.file, &source)
            })
            .collect()
    }
}

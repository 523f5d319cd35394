//! Storage module for the partitioned document layout
//!
//! Raw documents, derived records, and review snippets all live in plain
//! files; presence on disk is the pipeline's only completion marker, which is
//! what makes every phase idempotent.

mod layout;

pub use layout::Layout;

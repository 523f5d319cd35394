//! Crawler module for document fetching and recovery
//!
//! This module contains the fetch side of the pipeline:
//! - Single-document HTTP fetching with presence-check idempotence
//! - The recovery controller's bounded concurrent retry passes
//! - The review snippet collaborator, a simpler instance of the same policy

mod fetcher;
mod recovery;
mod reviews;

pub use fetcher::{build_http_client, fetch_document, FetchFailure};
pub use recovery::RecoveryController;
pub use reviews::{fetch_all_reviews, fetch_review_snippets, parse_review_snippets};

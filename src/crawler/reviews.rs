//! Review snippet fetching
//!
//! A simpler, per-target instance of the retry policy used by the recovery
//! controller: skip if the snippet file already exists, otherwise request the
//! target's reviews page, backing off linearly (a starting wait, increased by
//! a fixed step per attempt) while the server answers with a failure status.
//! The attempt budget makes exhaustion an error for that one target; the
//! sweep isolates it and moves on.

use crate::catalog::Target;
use crate::config::ReviewsConfig;
use crate::progress::Progress;
use crate::storage::Layout;
use crate::HarvestError;
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// The review page indents the snippet body with this fixed run of spaces;
/// text before it is reviewer metadata.
const SNIPPET_DELIMITER: &str = "                          ";

/// Maximum snippet length in characters
const SNIPPET_MAX_CHARS: usize = 500;

/// Fetches review snippets for one target into its companion text file
///
/// Skips immediately if the file exists. On a non-success status, sleeps the
/// current wait and retries with the wait increased by the configured step,
/// up to `max_attempts`. Transport faults propagate as `Err`, mirroring the
/// document fetcher's policy; the sweep in [`fetch_all_reviews`] isolates
/// them per target.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `layout` - Storage layout for the snippet file path
/// * `config` - Review fetching configuration
/// * `seq` - 1-based sequence index of the target
/// * `target` - The target whose reviews page is fetched
pub async fn fetch_review_snippets(
    client: &Client,
    layout: &Layout,
    config: &ReviewsConfig,
    seq: usize,
    target: &Target,
) -> Result<(), HarvestError> {
    let path = layout.review_path(seq);
    if path.exists() {
        tracing::trace!("Skipping {}, already on disk", path.display());
        return Ok(());
    }

    let reviews_url = format!("{}/reviews", target.address.trim_end());
    let mut wait = Duration::from_secs(config.initial_wait_secs);
    let mut body = None;

    for attempt in 1..=config.max_attempts {
        let response = client.get(&reviews_url).send().await?;
        let status = response.status();

        if status.is_success() {
            body = Some(response.text().await?);
            break;
        }

        tracing::debug!(
            "HTTP {} for {} (attempt {}/{})",
            status.as_u16(),
            reviews_url,
            attempt,
            config.max_attempts
        );

        if attempt < config.max_attempts {
            tokio::time::sleep(wait).await;
            wait += Duration::from_secs(config.wait_increment_secs);
        }
    }

    let body = body.ok_or(HarvestError::ReviewsExhausted {
        seq,
        attempts: config.max_attempts,
    })?;

    let snippets = parse_review_snippets(&body, config.limit);
    tokio::fs::write(&path, snippets.join("\n\n")).await?;

    Ok(())
}

/// Extracts up to `limit` review snippets from a reviews page
///
/// Each `div.borderDark` block contributes the text of its last
/// `div.spaceit`, end-trimmed, split once on the fixed indentation run
/// (blocks without it are skipped), with tabs, double spaces and line breaks
/// removed, truncated to 500 characters.
pub fn parse_review_snippets(html: &str, limit: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut snippets = Vec::new();

    let block_selector = match Selector::parse("div.borderDark") {
        Ok(s) => s,
        Err(_) => return snippets,
    };
    let body_selector = match Selector::parse("div.spaceit") {
        Ok(s) => s,
        Err(_) => return snippets,
    };

    for block in document.select(&block_selector).take(limit) {
        let body = match block.select(&body_selector).last() {
            Some(div) => div.text().collect::<String>(),
            None => continue,
        };

        let trimmed = body.trim_end();
        let after_metadata = match trimmed.splitn(2, SNIPPET_DELIMITER).nth(1) {
            Some(text) => text,
            None => continue,
        };

        let cleaned = after_metadata
            .replace('\t', "")
            .replace("  ", "")
            .replace('\n', "")
            .replace('\r', "");

        snippets.push(cleaned.chars().take(SNIPPET_MAX_CHARS).collect());
    }

    snippets
}

/// Sweeps the whole target list for review snippets
///
/// Bounded fan-out like the recovery controller's passes. A target whose
/// reviews cannot be fetched is logged and skipped; it never aborts the
/// sweep.
///
/// # Returns
///
/// The number of targets whose reviews could not be fetched.
pub async fn fetch_all_reviews(
    client: &Client,
    layout: &Layout,
    config: &ReviewsConfig,
    targets: &[Target],
    progress: Arc<dyn Progress>,
) -> Result<usize, HarvestError> {
    layout.prepare_reviews()?;

    progress.begin("Fetching review snippets", targets.len());

    let semaphore = Arc::new(Semaphore::new(config.workers.max(1) as usize));
    let mut tasks = JoinSet::new();

    for (i, target) in targets.iter().enumerate() {
        let seq = i + 1;
        let client = client.clone();
        let layout = layout.clone();
        let config = config.clone();
        let target = target.clone();
        let semaphore = Arc::clone(&semaphore);
        let progress = Arc::clone(&progress);

        tasks.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return 1usize,
            };

            let result = fetch_review_snippets(&client, &layout, &config, seq, &target).await;
            progress.item_done();

            match result {
                Ok(()) => 0,
                Err(e) => {
                    tracing::warn!("Reviews for target {} failed: {}", seq, e);
                    1
                }
            }
        });
    }

    let mut failed = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(count) => failed += count,
            Err(e) => {
                tracing::error!("Review task failed: {}", e);
                failed += 1;
            }
        }
    }

    progress.finish();
    if failed > 0 {
        tracing::warn!("{} targets have no review file", failed);
    }

    Ok(failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_block(metadata: &str, body: &str) -> String {
        format!(
            r#"<div class="borderDark">
                 <div class="spaceit">{}{}{}</div>
               </div>"#,
            metadata, SNIPPET_DELIMITER, body
        )
    }

    #[test]
    fn test_parse_single_snippet() {
        let html = format!(
            "<html><body>{}</body></html>",
            review_block("by someone", "A show worth watching.")
        );

        let snippets = parse_review_snippets(&html, 5);
        assert_eq!(snippets, vec!["A show worth watching."]);
    }

    #[test]
    fn test_limit_respected() {
        let blocks: String = (0..8)
            .map(|i| review_block("meta", &format!("review {}", i)))
            .collect();
        let html = format!("<html><body>{}</body></html>", blocks);

        let snippets = parse_review_snippets(&html, 3);
        assert_eq!(snippets.len(), 3);
    }

    #[test]
    fn test_block_without_delimiter_is_skipped() {
        let html = r#"<html><body>
            <div class="borderDark"><div class="spaceit">no indentation here</div></div>
        </body></html>"#;

        let snippets = parse_review_snippets(html, 5);
        assert!(snippets.is_empty());
    }

    #[test]
    fn test_whitespace_cleanup() {
        let body = "line one\nline\ttwo  crowded\r";
        let html = format!("<html><body>{}</body></html>", review_block("m", body));

        let snippets = parse_review_snippets(&html, 5);
        assert_eq!(snippets, vec!["line onelinetwocrowded"]);
    }

    #[test]
    fn test_truncation_to_500_chars() {
        let long_body: String = "a".repeat(800);
        let html = format!("<html><body>{}</body></html>", review_block("m", &long_body));

        let snippets = parse_review_snippets(&html, 5);
        assert_eq!(snippets[0].chars().count(), 500);
    }

    #[test]
    fn test_last_spaceit_wins() {
        let html = format!(
            r#"<html><body><div class="borderDark">
                 <div class="spaceit">header stuff</div>
                 <div class="spaceit">meta{}the actual review</div>
               </div></body></html>"#,
            SNIPPET_DELIMITER
        );

        let snippets = parse_review_snippets(&html, 5);
        assert_eq!(snippets, vec!["the actual review"]);
    }
}

//! Catalog enumerator
//!
//! Fetches successive pages of the fixed-size ranking list and extracts one
//! target per valid row. A failed page fetch propagates immediately: this
//! phase runs once ahead of the bulk fetch, is cheap to redo in full, and is
//! never retried internally.

use crate::catalog::Target;
use crate::config::CatalogConfig;
use crate::progress::Progress;
use crate::HarvestError;
use reqwest::Client;
use scraper::{Html, Selector};

/// Enumerates the full catalog in rank order
///
/// For each of `page_count` listing pages, fetches
/// `<list-url>?limit=<page * page_size>` and parses its ranking table rows.
/// Targets are produced in catalog rank order with their listing page index
/// attached as the storage partition.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `config` - Catalog configuration (endpoint, page count, page size)
/// * `progress` - Progress sink, advanced once per listing page
///
/// # Returns
///
/// * `Ok(Vec<Target>)` - The full ordered target list
/// * `Err(HarvestError)` - A listing page fetch failed
pub async fn enumerate_catalog(
    client: &Client,
    config: &CatalogConfig,
    progress: &dyn Progress,
) -> Result<Vec<Target>, HarvestError> {
    let mut targets = Vec::new();

    progress.begin("Enumerating catalog pages", config.page_count as usize);

    for page in 0..config.page_count {
        let url = format!("{}?limit={}", config.list_url, page * config.page_size);
        tracing::debug!("Fetching listing page {}: {}", page, url);

        let response = client.get(&url).send().await?.error_for_status()?;
        let body = response.text().await?;

        let page_targets = parse_listing_rows(&body, page);
        tracing::debug!("Listing page {} yielded {} targets", page, page_targets.len());
        targets.extend(page_targets);

        progress.item_done();
    }

    progress.finish();
    tracing::info!("Enumerated {} targets", targets.len());

    Ok(targets)
}

/// Parses one listing page into targets
///
/// A valid row is a `<tr>` containing an anchor that carries an `id`
/// attribute, an `href`, and leading text longer than one character; anything
/// else (spacer rows, rank-number anchors, image links) is skipped.
///
/// # Arguments
///
/// * `html` - The listing page content
/// * `partition` - The listing page index, attached to every extracted target
pub fn parse_listing_rows(html: &str, partition: u32) -> Vec<Target> {
    let document = Html::parse_document(html);
    let mut targets = Vec::new();

    let row_selector = match Selector::parse("tr") {
        Ok(s) => s,
        Err(_) => return targets,
    };
    let anchor_selector = match Selector::parse("a[id][href]") {
        Ok(s) => s,
        Err(_) => return targets,
    };

    for row in document.select(&row_selector) {
        for anchor in row.select(&anchor_selector) {
            // The display name is the anchor's leading text node; entries
            // with empty or single-character text are not catalog rows.
            let name = match anchor.text().next() {
                Some(text) => text,
                None => continue,
            };
            if name.chars().count() <= 1 {
                continue;
            }

            let href = match anchor.value().attr("href") {
                Some(h) => h,
                None => continue,
            };

            targets.push(Target {
                partition,
                name: name.to_string(),
                address: href.to_string(),
            });
        }
    }

    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_row(id: &str, name: &str, href: &str) -> String {
        format!(
            r#"<tr><td>1</td><td><a id="{}" href="{}">{}</a></td></tr>"#,
            id, href, name
        )
    }

    #[test]
    fn test_parse_valid_rows() {
        let html = format!(
            "<html><body><table>{}{}</table></body></html>",
            listing_row("#area1", "Show A", "https://example.com/anime/1"),
            listing_row("#area2", "Show B", "https://example.com/anime/2"),
        );

        let targets = parse_listing_rows(&html, 3);
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].partition, 3);
        assert_eq!(targets[0].name, "Show A");
        assert_eq!(targets[0].address, "https://example.com/anime/1");
        assert_eq!(targets[1].name, "Show B");
    }

    #[test]
    fn test_skip_anchor_without_id() {
        let html = r#"<html><body><table><tr>
            <td><a href="https://example.com/anime/1">Show A</a></td>
        </tr></table></body></html>"#;

        let targets = parse_listing_rows(html, 0);
        assert!(targets.is_empty());
    }

    #[test]
    fn test_skip_short_display_text() {
        // Rank-number anchors carry a single character of text
        let html = format!(
            "<html><body><table>{}{}</table></body></html>",
            listing_row("#rank1", "1", "https://example.com/anime/1"),
            listing_row("#area1", "Show A", "https://example.com/anime/1"),
        );

        let targets = parse_listing_rows(&html, 0);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name, "Show A");
    }

    #[test]
    fn test_skip_anchor_without_text() {
        let html = r##"<html><body><table><tr>
            <td><a id="#area1" href="https://example.com/anime/1"><img src="x.jpg"></a></td>
        </tr></table></body></html>"##;

        let targets = parse_listing_rows(html, 0);
        assert!(targets.is_empty());
    }

    #[test]
    fn test_rank_order_preserved() {
        let html = format!(
            "<html><body><table>{}{}{}</table></body></html>",
            listing_row("#area1", "First", "https://example.com/anime/1"),
            listing_row("#area2", "Second", "https://example.com/anime/2"),
            listing_row("#area3", "Third", "https://example.com/anime/3"),
        );

        let names: Vec<_> = parse_listing_rows(&html, 0)
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }
}

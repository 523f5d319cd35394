//! Extraction pass over persisted raw documents
//!
//! Walks every partition directory, derives a structured record from each raw
//! document that does not already have one, and writes the record next to its
//! source. Partitions are processed in parallel; documents within a partition
//! sequentially. A document that fails extraction is logged and counted, and
//! never produces a partial record file.

use crate::catalog::Target;
use crate::progress::Progress;
use crate::storage::Layout;
use crate::{HarvestError, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Counts of per-document outcomes from one extraction pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Records written during this pass
    pub written: usize,
    /// Documents skipped because their record already existed
    pub skipped: usize,
    /// Documents that failed extraction
    pub failed: usize,
}

impl ExtractionSummary {
    fn merge(&mut self, other: ExtractionSummary) {
        self.written += other.written;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Derives and persists the structured record for one raw document
///
/// The target list supplies the source address: sequence index `seq` maps to
/// zero-based entry `seq - 1`. If the record file already exists the document
/// is left untouched.
///
/// # Arguments
///
/// * `layout` - Storage layout resolving document and record paths
/// * `partition` - Partition the document belongs to
/// * `seq` - One-based sequence index of the target
/// * `targets` - Full catalog target list
///
/// # Returns
///
/// * `Ok(())` - Record written, or already present
/// * `Err(HarvestError)` - The document was unreadable, the target list has
///   no entry for `seq`, or a required field was missing
pub fn extract_document(
    layout: &Layout,
    partition: u32,
    seq: usize,
    targets: &[Target],
) -> Result<()> {
    let record_path = layout.record_path(partition, seq);
    if record_path.is_file() {
        tracing::debug!("Record {} already exists, skipping", record_path.display());
        return Ok(());
    }

    let raw_path = layout.raw_document_path(partition, seq);
    let html = std::fs::read_to_string(&raw_path)?;

    let target = targets
        .get(seq.wrapping_sub(1))
        .ok_or(HarvestError::MissingTarget(seq))?;

    let record = crate::extract::parse_record(&html, &target.address)?;
    std::fs::write(&record_path, record.to_tsv())?;

    Ok(())
}

/// Runs one extraction pass over every partition
///
/// Each partition is handed to a blocking task of its own; documents inside a
/// partition are handled one at a time. Per-document failures are logged and
/// counted in the summary rather than aborting the pass.
pub async fn run_extraction(
    layout: &Layout,
    targets: Arc<Vec<Target>>,
    progress: Arc<dyn Progress>,
) -> Result<ExtractionSummary> {
    progress.begin("extract", layout.partitions() as usize);

    let mut tasks: JoinSet<ExtractionSummary> = JoinSet::new();
    for partition in 0..layout.partitions() {
        let layout = layout.clone();
        let targets = Arc::clone(&targets);
        tasks.spawn_blocking(move || extract_partition(&layout, partition, &targets));
    }

    let mut summary = ExtractionSummary::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(partial) => {
                summary.merge(partial);
                progress.item_done();
            }
            Err(e) => {
                tracing::error!("Extraction task panicked: {}", e);
                return Err(HarvestError::Task(e.to_string()));
            }
        }
    }

    progress.finish();
    tracing::info!(
        "Extraction pass complete: {} written, {} skipped, {} failed",
        summary.written,
        summary.skipped,
        summary.failed
    );

    Ok(summary)
}

fn extract_partition(layout: &Layout, partition: u32, targets: &[Target]) -> ExtractionSummary {
    let mut summary = ExtractionSummary::default();

    let dir = layout.partition_dir(partition);
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot read partition {}: {}", dir.display(), e);
            return summary;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map(|ext| ext == "html") != Some(true) {
            continue;
        }
        let seq = match sequence_of(&path) {
            Some(seq) => seq,
            None => {
                tracing::warn!("Unrecognized document name {}", path.display());
                continue;
            }
        };

        if layout.record_path(partition, seq).is_file() {
            summary.skipped += 1;
            continue;
        }

        match extract_document(layout, partition, seq, targets) {
            Ok(()) => summary.written += 1,
            Err(e) => {
                tracing::error!("Extraction failed for {}: {}", path.display(), e);
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Parses the sequence index out of an `article_<seq>.html` file name
fn sequence_of(path: &Path) -> Option<usize> {
    path.file_stem()?
        .to_str()?
        .rsplit('_')
        .next()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;

    fn sample_page(title: &str) -> String {
        format!(
            r#"<html><head><title>{} - MyAnimeList.net</title></head><body>
            <div class="spaceit_pad">Type: TV</div>
            <div class="spaceit_pad">Episodes: 12</div>
            <div class="spaceit_pad">Aired: Apr 5, 2009 to Jul 4, 2010</div>
            <div class="spaceit_pad">Members: 1,000</div>
            <div class="spaceit_pad">Score: 7.5 (scored by 2,500 users)</div>
            <div class="spaceit_pad">Ranked: #42x</div>
            <div class="spaceit_pad">Popularity: #7</div>
            <p itemprop="description">Plot summary.</p>
            </body></html>"#,
            title
        )
    }

    fn targets(count: usize) -> Vec<Target> {
        (1..=count)
            .map(|i| Target {
                partition: 0,
                name: format!("Show {}", i),
                address: format!("https://example.com/anime/{}", i),
            })
            .collect()
    }

    fn prepared_layout(dir: &Path) -> Layout {
        let layout = Layout::new(dir.join("htmls"), dir.join("reviews"), 1);
        layout.prepare().unwrap();
        layout
    }

    #[test]
    fn test_extract_writes_record() {
        let dir = tempfile::tempdir().unwrap();
        let layout = prepared_layout(dir.path());

        std::fs::write(layout.raw_document_path(0, 1), sample_page("Show 1")).unwrap();
        extract_document(&layout, 0, 1, &targets(1)).unwrap();

        let record = std::fs::read_to_string(layout.record_path(0, 1)).unwrap();
        assert!(record.contains("Show 1\t"));
        assert!(record.ends_with("https://example.com/anime/1"));
    }

    #[test]
    fn test_sequence_maps_to_previous_list_entry() {
        // Sequence index 5 resolves to the fifth list entry, zero-based
        // index 4.
        let dir = tempfile::tempdir().unwrap();
        let layout = prepared_layout(dir.path());

        std::fs::write(layout.raw_document_path(0, 5), sample_page("Show 5")).unwrap();
        extract_document(&layout, 0, 5, &targets(5)).unwrap();

        let record = std::fs::read_to_string(layout.record_path(0, 5)).unwrap();
        assert!(record.ends_with("https://example.com/anime/5"));
    }

    #[test]
    fn test_sequence_beyond_target_list_fails() {
        let dir = tempfile::tempdir().unwrap();
        let layout = prepared_layout(dir.path());

        std::fs::write(layout.raw_document_path(0, 9), sample_page("Show 9")).unwrap();
        let err = extract_document(&layout, 0, 9, &targets(3)).unwrap_err();

        assert!(matches!(err, HarvestError::MissingTarget(9)));
        assert!(!layout.record_path(0, 9).exists());
    }

    #[test]
    fn test_malformed_document_writes_no_record() {
        let dir = tempfile::tempdir().unwrap();
        let layout = prepared_layout(dir.path());

        std::fs::write(
            layout.raw_document_path(0, 1),
            "<html><head><title>Broken</title></head><body></body></html>",
        )
        .unwrap();
        let result = extract_document(&layout, 0, 1, &targets(1));

        assert!(result.is_err());
        assert!(!layout.record_path(0, 1).exists());
    }

    #[test]
    fn test_existing_record_is_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let layout = prepared_layout(dir.path());

        std::fs::write(layout.raw_document_path(0, 1), sample_page("Show 1")).unwrap();
        std::fs::write(layout.record_path(0, 1), "sentinel").unwrap();

        extract_document(&layout, 0, 1, &targets(1)).unwrap();

        let record = std::fs::read_to_string(layout.record_path(0, 1)).unwrap();
        assert_eq!(record, "sentinel");
    }

    #[test]
    fn test_sequence_of() {
        assert_eq!(sequence_of(Path::new("/x/0/article_351.html")), Some(351));
        assert_eq!(sequence_of(Path::new("/x/0/notes.html")), None);
    }

    #[tokio::test]
    async fn test_run_extraction_counts_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let layout = prepared_layout(dir.path());

        std::fs::write(layout.raw_document_path(0, 1), sample_page("Show 1")).unwrap();
        std::fs::write(layout.raw_document_path(0, 2), "<html></html>").unwrap();
        std::fs::write(layout.raw_document_path(0, 3), sample_page("Show 3")).unwrap();
        std::fs::write(layout.record_path(0, 3), "already done").unwrap();

        let summary = run_extraction(&layout, Arc::new(targets(3)), Arc::new(NullProgress))
            .await
            .unwrap();

        assert_eq!(
            summary,
            ExtractionSummary {
                written: 1,
                skipped: 1,
                failed: 1,
            }
        );
    }
}

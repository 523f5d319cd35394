//! Target list persistence
//!
//! The enumerated target list is serialized to a flat tab-delimited file
//! (`partition\tname\taddress` per line) so downstream phases can reload it
//! without re-enumerating. Loading reconstructs the identical ordered
//! structure; the save/load pair must round-trip without loss.

use crate::catalog::Target;
use crate::HarvestError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Saves the target list as a tab-delimited file
///
/// One target per line, fields `partition\tname\taddress\n`, in enumeration
/// order.
pub fn save_targets(path: &Path, targets: &[Target]) -> Result<(), HarvestError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    for target in targets {
        writeln!(
            writer,
            "{}\t{}\t{}",
            target.partition, target.name, target.address
        )?;
    }

    writer.flush()?;
    tracing::info!("Saved {} targets to {}", targets.len(), path.display());

    Ok(())
}

/// Loads a previously saved target list
///
/// Reconstructs the identical ordered structure written by [`save_targets`].
///
/// # Returns
///
/// * `Ok(Vec<Target>)` - The ordered target list
/// * `Err(HarvestError::ListFormat)` - A line did not have three tab-separated
///   fields or its partition was not a number
pub fn load_targets(path: &Path) -> Result<Vec<Target>, HarvestError> {
    let content = std::fs::read_to_string(path)?;
    let mut targets = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let mut fields = line.splitn(3, '\t');

        let partition = fields
            .next()
            .and_then(|f| f.parse::<u32>().ok())
            .ok_or_else(|| HarvestError::ListFormat {
                line: i + 1,
                reason: "partition is not a number".to_string(),
            })?;

        let name = fields.next().ok_or_else(|| HarvestError::ListFormat {
            line: i + 1,
            reason: "missing name field".to_string(),
        })?;

        let address = fields.next().ok_or_else(|| HarvestError::ListFormat {
            line: i + 1,
            reason: "missing address field".to_string(),
        })?;

        targets.push(Target {
            partition,
            name: name.to_string(),
            address: address.to_string(),
        });
    }

    tracing::info!("Loaded {} targets from {}", targets.len(), path.display());

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_targets() -> Vec<Target> {
        vec![
            Target {
                partition: 0,
                name: "Show A".to_string(),
                address: "https://example.com/anime/1".to_string(),
            },
            Target {
                partition: 0,
                name: "Show B: The Sequel".to_string(),
                address: "https://example.com/anime/2".to_string(),
            },
            Target {
                partition: 1,
                name: "Show C".to_string(),
                address: "https://example.com/anime/51".to_string(),
            },
        ]
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anime_url_list.txt");

        let targets = sample_targets();
        save_targets(&path, &targets).unwrap();
        let loaded = load_targets(&path).unwrap();

        assert_eq!(loaded, targets);
    }

    #[test]
    fn test_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");

        save_targets(&path, &sample_targets()[..1]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert_eq!(content, "0\tShow A\thttps://example.com/anime/1\n");
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();

        let loaded = load_targets(&path).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_load_malformed_partition() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, "zero\tShow A\thttps://example.com/anime/1\n").unwrap();

        let err = load_targets(&path).unwrap_err();
        assert!(matches!(err, HarvestError::ListFormat { line: 1, .. }));
    }

    #[test]
    fn test_load_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.txt");
        std::fs::write(&path, "0\tShow A\n").unwrap();

        let err = load_targets(&path).unwrap_err();
        assert!(matches!(err, HarvestError::ListFormat { line: 1, .. }));
    }
}

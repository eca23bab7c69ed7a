// Share text and CSV export for grouping results.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{QuoteStyle, WriterBuilder};
use thiserror::Error;

use super::engine::GroupingResult;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: no groups have been generated")]
    NoGroups,

    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Plain-text rendering for pasting into chat or email.
///
/// ```text
/// Group 1:
///  - Alice
///  - Bob
///
/// Group 2:
///  - Carol
/// ```
pub fn to_share_text(result: &GroupingResult) -> String {
    result
        .groups
        .iter()
        .map(|group| {
            let mut block = format!("{}:", group.name);
            for member in &group.members {
                block.push_str("\n - ");
                block.push_str(&member.name);
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `Group,Name` header, then one quoted row per (group, member).
pub fn to_csv(result: &GroupingResult) -> Result<String, ExportError> {
    let mut out = b"Group,Name\n".to_vec();
    {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Always)
            .from_writer(&mut out);
        for group in &result.groups {
            for member in &group.members {
                writer.write_record([group.name.as_str(), member.name.as_str()])?;
            }
        }
        writer.flush().map_err(csv::Error::from)?;
    }
    // Every field is written from a `&str`, so the buffer is valid UTF-8.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Download name for the CSV export, e.g. `grouping_results_2026-10-14.csv`.
pub fn csv_file_name(date: NaiveDate) -> String {
    format!("grouping_results_{}.csv", date.format("%Y-%m-%d"))
}

/// Write the CSV export into `dir`, creating it if needed.
pub fn write_csv(
    dir: &Path,
    result: &GroupingResult,
    date: NaiveDate,
) -> Result<PathBuf, ExportError> {
    if result.is_empty() {
        return Err(ExportError::NoGroups);
    }
    let content = to_csv(result)?;
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(csv_file_name(date));
    std::fs::write(&path, content).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

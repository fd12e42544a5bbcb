//! Journal export.

mod csv;

pub use self::csv::to_csv;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::models::IdeaRecord;

/// Write the journal as CSV into `dir/file_name`. Returns the full path.
pub async fn write_csv(
    dir: &Path,
    file_name: &str,
    records: &[IdeaRecord],
) -> Result<PathBuf> {
    let path = dir.join(file_name);
    let text = to_csv(records);

    tokio::fs::write(&path, text.as_bytes())
        .await
        .with_context(|| format!("Failed to write export file {}", path.display()))?;

    info!(path = %path.display(), rows = records.len(), "Exported journal");
    Ok(path)
}

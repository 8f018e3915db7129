use crate::config::PipelineConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Concrete paths for the four directory roles a file passes through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryLayout {
    pub intake: PathBuf,
    pub processing: PathBuf,
    pub accepted: PathBuf,
    pub rejected: PathBuf,
}

impl From<&PipelineConfig> for DirectoryLayout {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            intake: config.intake_dir.clone(),
            processing: config.processing_dir.clone(),
            accepted: config.accepted_dir.clone(),
            rejected: config.rejected_dir.clone(),
        }
    }
}

/// Regular files in `dir` carrying `extension` (case-insensitive), sorted by name.
pub(crate) fn list_intake(dir: &Path, extension: Option<&str>) -> io::Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!(path = %path.display(), "skipping intake file with non UTF-8 name");
            continue;
        };

        if let Some(expected) = extension {
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(expected));
            if !matches {
                debug!(file = %name, "ignoring intake file with unexpected extension");
                continue;
            }
        }

        files.push((name, path));
    }

    files.sort_by(|(left, _), (right, _)| left.cmp(right));
    Ok(files)
}

/// Renames `from` to `to`, copying and removing the source when a plain rename
/// is not possible (for example across file systems).
pub(crate) fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if to.exists() {
        warn!(destination = %to.display(), "replacing existing file at destination");
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if !from.is_file() {
                return Err(rename_err);
            }
            debug!(error = %rename_err, "rename failed, falling back to copy");
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// Write-temp-then-rename so a crash mid-write never leaves a truncated
/// catalog, TM store or project file behind. Rename replaces the target
/// in one step except on Windows, where the target must be removed
/// first.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&tmp, bytes)?;

    #[cfg(windows)]
    if path.exists() {
        fs::remove_file(path)?;
    }

    fs::rename(&tmp, path)?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "out".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

//! Config file writes. A crash mid-write leaves either the old file or the
//! new one in place, never a truncated mix.

use crate::error::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` with `data`: staged in a sibling temp file, synced, then
/// renamed over the target.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let tmp = staged(path, data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create `path` with `data` unless something is already there, including a
/// file that appeared while this one was being staged. Returns true if written.
pub fn write_if_missing(path: &Path, data: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    let tmp = staged(path, data)?;
    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.error.into()),
    }
}

fn staged(path: &Path, data: &[u8]) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

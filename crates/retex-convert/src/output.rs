//! Atomic output commit.
//!
//! A conversion must never leave a half-written destination file: the bytes
//! go to a temporary file in the destination directory first and replace the
//! destination only once everything is written.

use std::io::Write;
use std::path::Path;

use crate::{Error, Result};

/// Write `bytes` to `dest` atomically.
pub fn commit<P: AsRef<Path>>(dest: P, bytes: &[u8]) -> Result<()> {
    let dest = dest.as_ref();
    let dir = dest.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))?;
    tmp.write_all(bytes)?;
    tmp.persist(dest).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Create `dir` and any missing parents. An existing directory is not an error.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// Copy every byte of `from` into `to`, creating or truncating `to`.
///
/// Both handles are closed on every exit path. Returns the number of bytes
/// written once they have been flushed to disk.
pub fn copy_file(from: &Path, to: &Path) -> io::Result<u64> {
    let mut input = File::open(from)?;
    if let Some(parent) = to.parent() {
        ensure_dir(parent)?;
    }
    let mut output = File::create(to)?;
    let written = io::copy(&mut input, &mut output)?;
    output.sync_all()?;
    Ok(written)
}

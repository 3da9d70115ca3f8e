//! Atomic replacement of the credential file.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{CasinoError, Result};

/// Move `temp_path` over `destination`.
///
/// Where `rename` refuses to overwrite (Windows), the destination is
/// removed and the rename retried once. The temp file never outlives a
/// failed replace.
fn replace_file(temp_path: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(temp_path, destination) {
        Ok(()) => Ok(()),
        Err(first) => {
            let _ = fs::remove_file(destination);
            fs::rename(temp_path, destination).map_err(|second| {
                let _ = fs::remove_file(temp_path);
                io::Error::new(
                    second.kind(),
                    format!("replace failed twice ({}; then {})", first, second),
                )
            })
        }
    }
}

/// Replace `path` with `data` through a synced sibling temp file.
///
/// Readers observe either the previous contents or the new ones, never a
/// partial write. On Unix the file is created with mode `0600`.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| CasinoError::Storage(format!("System time error: {}", e)))?
        .as_nanos();
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CasinoError::Storage("Invalid credential filename".to_string()))?;
    let temp_path = parent.join(format!(".{}.{}.tmp", filename, nanos));

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(&temp_path)
        .map_err(|e| CasinoError::Storage(format!("Temp file create failed: {}", e)))?;
    let written = file.write_all(data).and_then(|_| file.sync_all());
    drop(file);
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(CasinoError::Storage(format!("Temp file write failed: {}", e)));
    }

    replace_file(&temp_path, path)
        .map_err(|e| CasinoError::Storage(format!("Credential file replace failed: {}", e)))?;

    Ok(())
}

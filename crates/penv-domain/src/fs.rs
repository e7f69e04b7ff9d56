use std::{
    fs,
    io::{self, Write},
    path::Path,
    time::SystemTime,
};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::debug;

/// Replace `dest` with `contents` by writing a sibling temp file and renaming
/// it over the original, so readers only ever see the old or the new file.
pub(crate) fn write_atomic(dest: &Path, contents: &str) -> Result<()> {
    let parent = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;
    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temp file under {}", parent.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("failed to stage {}", dest.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("failed to flush {}", dest.display()))?;
    if let Ok(meta) = fs::metadata(dest) {
        if let Err(err) = fs::set_permissions(tmp.path(), meta.permissions()) {
            debug!(%err, path = %dest.display(), "keeping default permissions for replacement");
        }
    }
    tmp.persist(dest)
        .map_err(|err| err.error)
        .with_context(|| format!("failed to replace {}", dest.display()))?;
    Ok(())
}

/// Reads a file, mapping a missing file to `None`.
pub(crate) fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Modification time of a regular file, or `None` when it does not exist.
pub(crate) fn modified_time(path: &Path) -> io::Result<Option<SystemTime>> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => meta.modified().map(Some),
        Ok(_) => Ok(None),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("target.txt");
        fs::write(&path, "old\n").unwrap();
        write_atomic(&path, "new\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "temp file should be renamed away");
    }

    #[test]
    fn atomic_write_creates_missing_parent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".penv").join("config");
        write_atomic(&path, "backend: venv\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "backend: venv\n");
    }

    #[cfg(unix)]
    #[test]
    fn atomic_write_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join(".gitignore");
        fs::write(&path, "old\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
        write_atomic(&path, "new\n").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn missing_paths_read_as_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent");
        assert!(read_optional(&path).unwrap().is_none());
        assert!(modified_time(&path).unwrap().is_none());
        assert!(modified_time(dir.path()).unwrap().is_none());
    }
}

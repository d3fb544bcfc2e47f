//! Single-directory scanner.
//!
//! Lists the immediate contents of one directory, splitting entries into
//! subdirectories and leaf files and attaching the metadata every read model
//! needs (size, mtime, visibility). Read-only; ordering is whatever the
//! filesystem yields.

use chrono::{DateTime, Utc};
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Name prefix for in-flight write staging files. Scans skip these so a
/// half-written or crash-orphaned staging file never surfaces as an object.
pub(crate) const STAGING_PREFIX: &str = ".tmp-";

/// Mode for a freshly created or re-published visible object.
pub const VISIBLE_MODE: u32 = 0o640;
/// Mode for a hidden object.
pub const HIDDEN_MODE: u32 = 0o600;

/// The group-read bit doubles as the visibility flag on leaf files.
const VISIBLE_BIT: u32 = 0o040;

/// Single interpretation of the visibility bit, shared by write, stat,
/// toggle, and scan so the representation cannot drift between them.
pub fn mode_is_visible(mode: u32) -> bool {
    mode & VISIBLE_BIT != 0
}

#[derive(Debug, Clone)]
pub struct ScanEntry {
    pub name: String,
    pub size: u64,
    pub modified_at: DateTime<Utc>,
    pub visible: bool,
}

/// Immediate contents of one directory.
#[derive(Debug, Default)]
pub struct DirScan {
    pub dirs: Vec<ScanEntry>,
    pub files: Vec<ScanEntry>,
}

/// List `path`, classifying entries as subdirectories or leaves.
///
/// A missing `path` surfaces as an `io::ErrorKind::NotFound` error; callers on
/// enumeration paths treat that as zero entries. Entries deleted between the
/// directory read and the per-entry stat are silently skipped, as are write
/// staging files and entries whose names are not valid UTF-8 (a lossy name
/// would produce an identifier that can never address the object).
pub async fn scan_dir(path: &Path) -> io::Result<DirScan> {
    let mut reader = fs::read_dir(path).await?;
    let mut scan = DirScan::default();

    while let Some(entry) = reader.next_entry().await? {
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                debug!("skipping non-UTF-8 entry {:?} in {}", raw, path.display());
                continue;
            }
        };
        if name.starts_with(STAGING_PREFIX) {
            continue;
        }
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(err),
        };
        let modified_at = metadata.modified().map(DateTime::<Utc>::from)?;
        let item = ScanEntry {
            name,
            size: metadata.len(),
            modified_at,
            visible: mode_is_visible(metadata.permissions().mode()),
        };
        if metadata.is_dir() {
            scan.dirs.push(item);
        } else {
            scan.files.push(item);
        }
    }

    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::Permissions;
    use tempfile::TempDir;

    #[tokio::test]
    async fn classifies_dirs_and_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("sub")).await.unwrap();
        fs::write(tmp.path().join("leaf.bin"), b"12345").await.unwrap();

        let scan = scan_dir(tmp.path()).await.unwrap();
        assert_eq!(scan.dirs.len(), 1);
        assert_eq!(scan.dirs[0].name, "sub");
        assert_eq!(scan.files.len(), 1);
        assert_eq!(scan.files[0].name, "leaf.bin");
        assert_eq!(scan.files[0].size, 5);
    }

    #[tokio::test]
    async fn skips_staging_and_non_utf8_entries() {
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("real.txt"), b"x").await.unwrap();
        fs::write(tmp.path().join(".tmp-1f6c0b2a"), b"half written")
            .await
            .unwrap();
        let mangled = std::ffi::OsStr::from_bytes(b"bad\xff.txt");
        std::fs::write(tmp.path().join(mangled), b"y").unwrap();

        let scan = scan_dir(tmp.path()).await.unwrap();
        let names: Vec<_> = scan.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["real.txt"]);
    }

    #[tokio::test]
    async fn missing_directory_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = scan_dir(&tmp.path().join("absent")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn visibility_tracks_group_read_bit() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.txt");
        fs::write(&path, b"x").await.unwrap();

        fs::set_permissions(&path, Permissions::from_mode(VISIBLE_MODE))
            .await
            .unwrap();
        let scan = scan_dir(tmp.path()).await.unwrap();
        assert!(scan.files[0].visible);

        fs::set_permissions(&path, Permissions::from_mode(HIDDEN_MODE))
            .await
            .unwrap();
        let scan = scan_dir(tmp.path()).await.unwrap();
        assert!(!scan.files[0].visible);
    }
}

//! Object identifiers.
//!
//! Every stored object is addressed by a three-segment key `date/owner/name`
//! that maps directly onto the on-disk layout `<root>/<YYYYMMDD>/<owner>/<name>`.
//! Parsing is the single sanitization point: anything that survives
//! [`FileId::parse`] is safe to join onto the store root.

use crate::errors::{StoreError, StoreResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A validated `date/owner/name` object identifier.
///
/// Immutable once constructed; `Display` reproduces the exact string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId {
    date: String,
    owner: String,
    name: String,
}

impl FileId {
    /// Compose an identifier from its three segments, validating each.
    pub fn new(
        date: impl Into<String>,
        owner: impl Into<String>,
        name: impl Into<String>,
    ) -> StoreResult<Self> {
        let (date, owner, name) = (date.into(), owner.into(), name.into());
        let id = || format!("{date}/{owner}/{name}");
        if !is_valid_date(&date) {
            return Err(StoreError::invalid_key(id(), "date must be 8 digits"));
        }
        check_segment(&owner).map_err(|reason| StoreError::invalid_key(id(), reason))?;
        check_segment(&name).map_err(|reason| StoreError::invalid_key(id(), reason))?;
        Ok(Self { date, owner, name })
    }

    /// Parse a raw `date/owner/name` string.
    ///
    /// Rejects anything that does not split into exactly three segments, a
    /// non-conforming date, or any trace of a parent-directory traversal.
    pub fn parse(raw: &str) -> StoreResult<Self> {
        if raw.contains("..") {
            return Err(StoreError::invalid_key(raw, "path traversal rejected"));
        }
        let mut segments = raw.split('/');
        match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(date), Some(owner), Some(name), None) => Self::new(date, owner, name),
            _ => Err(StoreError::invalid_key(
                raw,
                "expected exactly date/owner/name",
            )),
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical location of this object beneath `root`.
    pub fn path_under(&self, root: &Path) -> PathBuf {
        root.join(&self.date).join(&self.owner).join(&self.name)
    }

    /// Physical location of this object's owner directory beneath `root`.
    pub fn owner_dir_under(&self, root: &Path) -> PathBuf {
        root.join(&self.date).join(&self.owner)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.date, self.owner, self.name)
    }
}

impl FromStr for FileId {
    type Err = StoreError;

    fn from_str(s: &str) -> StoreResult<Self> {
        Self::parse(s)
    }
}

/// An 8-digit `YYYYMMDD` string; lexicographic order is calendar order.
pub fn is_valid_date(s: &str) -> bool {
    s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit())
}

fn check_segment(segment: &str) -> Result<(), &'static str> {
    if segment.is_empty() {
        return Err("empty segment");
    }
    if segment.contains("..") {
        return Err("path traversal rejected");
    }
    if segment
        .bytes()
        .any(|b| b == b'/' || b == b'\\' || b == b'\0' || b.is_ascii_control())
    {
        return Err("segment contains a path separator or control byte");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn parses_and_formats_round_trip() {
        let id = FileId::parse("20130104/mike/d.txt").unwrap();
        assert_eq!(id.date(), "20130104");
        assert_eq!(id.owner(), "mike");
        assert_eq!(id.name(), "d.txt");
        assert_eq!(id.to_string(), "20130104/mike/d.txt");
    }

    #[test]
    fn accepts_unicode_names() {
        let id = FileId::parse("20200101/olga/зима ❄.png").unwrap();
        assert_eq!(id.name(), "зима ❄.png");
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert!(FileId::parse("20130104/mike").is_err());
        assert!(FileId::parse("20130104/mike/sub/d.txt").is_err());
        assert!(FileId::parse("").is_err());
    }

    #[test]
    fn rejects_bad_dates() {
        assert!(FileId::parse("2013-01-04/mike/d.txt").is_err());
        assert!(FileId::parse("201301/mike/d.txt").is_err());
        assert!(FileId::parse("2013010a/mike/d.txt").is_err());
    }

    #[test]
    fn rejects_traversal_anywhere() {
        assert!(FileId::parse("20130104/../d.txt").is_err());
        assert!(FileId::parse("20130104/mike/..").is_err());
        assert!(FileId::parse("20130104/mike/a..b.txt").is_err());
        assert!(FileId::new("20130104", "mike", "..\\up").is_err());
    }

    #[test]
    fn rejects_empty_and_control_segments() {
        assert!(FileId::parse("20130104//d.txt").is_err());
        assert!(FileId::parse("20130104/mike/").is_err());
        assert!(FileId::new("20130104", "mike", "a\0b").is_err());
        assert!(FileId::new("20130104", "mi\nke", "a.txt").is_err());
    }

    #[test]
    fn maps_onto_partition_layout() {
        let id = FileId::parse("20130104/mike/d.txt").unwrap();
        assert_eq!(
            id.path_under(Path::new("/data")),
            Path::new("/data/20130104/mike/d.txt")
        );
    }

    #[test]
    fn date_validation() {
        assert!(is_valid_date("99999999"));
        assert!(!is_valid_date("9999999"));
        assert!(!is_valid_date("199912315"));
    }
}

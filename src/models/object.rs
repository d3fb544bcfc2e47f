//! Represents one stored object, derived from its on-disk entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Full record for one object, as produced by partition scans.
///
/// `visible` reflects the permission bit at the instant of the scan; there is
/// no cached visibility state anywhere.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ObjectRecord {
    /// The `date/owner/name` identifier in string form.
    pub file_id: String,

    /// User-supplied file name (the last identifier segment).
    pub name: String,

    /// Size in bytes.
    pub size: u64,

    /// Whether the object is included in public read models.
    pub visible: bool,

    /// Owning account identifier (the middle identifier segment).
    pub owner: String,

    /// Last modification time.
    pub modified_at: DateTime<Utc>,
}

/// Point-lookup result for a single identifier.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ObjectStat {
    pub file_id: String,
    pub size: u64,
    pub visible: bool,
}

//! Data models for the date-partitioned content store.
//!
//! All records are derived from the filesystem at scan time, never persisted
//! separately; they serialize naturally as JSON via `serde`.

pub mod day;
pub mod object;

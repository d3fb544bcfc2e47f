//! datevault — a date-partitioned filesystem content store.
//!
//! Objects are addressed by `date/owner/name` identifiers and stored at
//! `<root>/<YYYYMMDD>/<owner>/<name>`, with a single permission bit on the
//! leaf file encoding public visibility. On top of the point operations
//! (stat, streamed write/read, visibility toggle, idempotent delete) the
//! store offers three read models: a single-day listing, a full
//! year/month/day tree, and lazy reverse-chronological pagination that stops
//! scanning as soon as enough objects have been found.

pub mod config;
pub mod errors;
pub mod filters;
pub mod key;
pub mod models;
pub mod scan;
pub mod store;

pub use errors::{StoreError, StoreResult};
pub use key::FileId;
pub use store::FileStore;

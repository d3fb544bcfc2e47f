//! FileStore — the date-partitioned content store.
//!
//! Objects live at `<root>/<YYYYMMDD>/<owner>/<name>`; visibility is the
//! group-read bit on the leaf file. The store holds no in-process locks and
//! keeps no state beyond the root path: every answer is derived from the
//! filesystem at call time. Point operations are keyed on one identifier;
//! partition scans fan out over owner directories with a bounded concurrency
//! limit and fail as a whole on the first hard I/O error.

use crate::errors::{StoreError, StoreResult};
use crate::key::{self, FileId};
use crate::models::day::DayListing;
use crate::models::object::{ObjectRecord, ObjectStat};
use crate::scan::{self, scan_dir};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt, TryStreamExt, pin_mut, stream};
use std::fs::Permissions;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;
use uuid::Uuid;

/// Default cap on concurrent owner/partition scans.
pub const DEFAULT_SCAN_LIMIT: usize = 16;

/// One store instance per root path; cheap to clone and share.
///
/// The root must exist and be writable before the store is constructed; the
/// store never creates it.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
    scan_limit: usize,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            scan_limit: DEFAULT_SCAN_LIMIT,
        }
    }

    /// Cap the number of directory scans in flight during fan-out.
    pub fn with_scan_limit(mut self, scan_limit: usize) -> Self {
        self.scan_limit = scan_limit.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Point lookup: size and visibility for one identifier.
    ///
    /// Fails `NotFound` when the object is absent (a directory squatting on
    /// the identifier counts as absent).
    pub async fn stat(&self, id: &FileId) -> StoreResult<ObjectStat> {
        let metadata = fs::metadata(id.path_under(&self.root))
            .await
            .map_err(|err| missing_as_not_found(err, id))?;
        if !metadata.is_file() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(ObjectStat {
            file_id: id.to_string(),
            size: metadata.len(),
            visible: scan::mode_is_visible(metadata.permissions().mode()),
        })
    }

    /// Stream-store an object, replacing any previous content at `id`.
    ///
    /// Parent partition/owner directories are created on demand; creation is
    /// idempotent so concurrent writers for the same date never fail each
    /// other. Content is streamed to a uniquely named temp file carrying the
    /// final permission bits, fsynced, then renamed onto the final name — a
    /// concurrent reader observes either the old object or the new one,
    /// never a partial write. Racing writers to the same identifier are not
    /// serialized; the last rename wins.
    pub async fn write<S>(&self, id: &FileId, stream: S, visible: bool) -> StoreResult<ObjectRecord>
    where
        S: Stream<Item = io::Result<Bytes>>,
    {
        let final_path = id.path_under(&self.root);
        let owner_dir = id.owner_dir_under(&self.root);
        fs::create_dir_all(&owner_dir).await?;

        let mode = if visible {
            scan::VISIBLE_MODE
        } else {
            scan::HIDDEN_MODE
        };
        let tmp_path = owner_dir.join(format!("{}{}", scan::STAGING_PREFIX, Uuid::new_v4()));
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(mode)
            .open(&tmp_path)
            .await?;
        // create_new's mode is subject to the umask; pin the bits exactly so
        // the visibility flag cannot be stripped at birth
        fs::set_permissions(&tmp_path, Permissions::from_mode(mode)).await?;

        let mut size: u64 = 0;
        pin_mut!(stream);
        while let Some(chunk_res) = stream.next().await {
            let chunk = match chunk_res {
                Ok(chunk) => chunk,
                Err(err) => {
                    let _ = fs::remove_file(&tmp_path).await;
                    return Err(StoreError::Io(err));
                }
            };
            size += chunk.len() as u64;
            if let Err(err) = file.write_all(&chunk).await {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StoreError::Io(err));
            }
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }
        drop(file);

        if let Err(err) = fs::rename(&tmp_path, &final_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }

        let metadata = fs::metadata(&final_path).await?;
        let modified_at = metadata.modified().map(DateTime::<Utc>::from)?;
        debug!(file_id = %id, size, visible, "object stored");

        Ok(ObjectRecord {
            file_id: id.to_string(),
            name: id.name().to_string(),
            size,
            visible,
            owner: id.owner().to_string(),
            modified_at,
        })
    }

    /// Open an object for streaming out, together with its stat record.
    pub async fn open_reader(&self, id: &FileId) -> StoreResult<(ObjectStat, File)> {
        let stat = self.stat(id).await?;
        let file = File::open(id.path_under(&self.root))
            .await
            .map_err(|err| missing_as_not_found(err, id))?;
        Ok((stat, file))
    }

    /// Stream an object's content into `sink`; returns the byte count.
    pub async fn read_to<W>(&self, id: &FileId, sink: &mut W) -> StoreResult<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let (_, mut file) = self.open_reader(id).await?;
        let copied = tokio::io::copy(&mut file, sink).await?;
        sink.flush().await?;
        Ok(copied)
    }

    /// Flip the visibility bit in place; content and identifier untouched.
    pub async fn set_visibility(&self, id: &FileId, visible: bool) -> StoreResult<()> {
        let mode = if visible {
            scan::VISIBLE_MODE
        } else {
            scan::HIDDEN_MODE
        };
        fs::set_permissions(id.path_under(&self.root), Permissions::from_mode(mode))
            .await
            .map_err(|err| missing_as_not_found(err, id))?;
        debug!(file_id = %id, visible, "visibility updated");
        Ok(())
    }

    /// Remove an object. Deleting an absent identifier is a success.
    ///
    /// Owner directories are never removed, even when this leaves them empty;
    /// the read models tolerate them silently.
    pub async fn delete(&self, id: &FileId) -> StoreResult<()> {
        match fs::remove_file(id.path_under(&self.root)).await {
            Ok(()) => {
                debug!(file_id = %id, "object deleted");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(file_id = %id, "delete target already absent");
                Ok(())
            }
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    /// All objects of one date partition that pass `filter`, sorted by
    /// ascending modification time.
    ///
    /// An absent partition is an empty list. Owner directories are scanned
    /// concurrently up to the scan limit; an owner directory that disappears
    /// mid-listing counts as zero files, while any other I/O failure aborts
    /// the whole listing and discards partial results.
    pub async fn list_partition<F>(&self, date: &str, filter: F) -> StoreResult<Vec<ObjectRecord>>
    where
        F: Fn(&ObjectRecord) -> bool,
    {
        if !key::is_valid_date(date) {
            return Err(StoreError::invalid_key(date, "date must be 8 digits"));
        }
        let partition = self.root.join(date);
        let owners = match scan_dir(&partition).await {
            Ok(scan) => scan.dirs,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::Io(err)),
        };

        let scans = stream::iter(owners.into_iter().map(|owner| {
            let dir = partition.join(&owner.name);
            async move {
                match scan_dir(&dir).await {
                    Ok(scan) => Ok((owner.name, scan.files)),
                    Err(err) if err.kind() == io::ErrorKind::NotFound => {
                        Ok((owner.name, Vec::new()))
                    }
                    Err(err) => Err(err),
                }
            }
        }))
        .buffer_unordered(self.scan_limit)
        .try_collect::<Vec<_>>()
        .await?;

        let mut records = Vec::new();
        for (owner, files) in scans {
            for entry in files {
                let record = ObjectRecord {
                    file_id: format!("{date}/{owner}/{}", entry.name),
                    name: entry.name,
                    size: entry.size,
                    visible: entry.visible,
                    owner: owner.clone(),
                    modified_at: entry.modified_at,
                };
                if filter(&record) {
                    records.push(record);
                }
            }
        }
        records.sort_by_key(|record| record.modified_at);
        Ok(records)
    }

    /// Immediate subdirectories of the root whose names are 8-digit dates.
    ///
    /// Order unspecified. A missing root is a hard error: the root is
    /// required to pre-exist.
    pub async fn partition_dates(&self) -> StoreResult<Vec<String>> {
        let scan = scan_dir(&self.root).await?;
        Ok(scan
            .dirs
            .into_iter()
            .map(|dir| dir.name)
            .filter(|name| key::is_valid_date(name))
            .collect())
    }

    /// The full history grouped by day, empty days omitted.
    ///
    /// Partitions are scanned concurrently up to the scan limit; no cross-day
    /// ordering is guaranteed.
    pub async fn date_tree<F>(&self, filter: F) -> StoreResult<Vec<DayListing>>
    where
        F: Fn(&ObjectRecord) -> bool,
    {
        let dates = self.partition_dates().await?;
        let filter = &filter;
        let days = stream::iter(dates.into_iter().map(|date| async move {
            let objects = self.list_partition(&date, filter).await?;
            Ok::<_, StoreError>((date, objects))
        }))
        .buffer_unordered(self.scan_limit)
        .try_collect::<Vec<_>>()
        .await?;

        Ok(days
            .into_iter()
            .filter(|(_, objects)| !objects.is_empty())
            .map(|(date, objects)| DayListing::new(date, objects))
            .collect())
    }

    /// Reverse-chronological, limit-bounded page of day listings.
    ///
    /// Dates are walked newest-first and strictly sequentially so the walk can
    /// stop as soon as `limit` objects have been gathered; only the owner
    /// fan-out inside each partition runs concurrently. `older_than` is an
    /// exclusive cursor; passing the oldest previously returned date yields an
    /// empty page once history is exhausted. `limit` is a soft cap: the day
    /// that crosses it is still returned in full.
    pub async fn list_paged<F>(
        &self,
        limit: usize,
        filter: F,
        older_than: Option<&str>,
    ) -> StoreResult<Vec<DayListing>>
    where
        F: Fn(&ObjectRecord) -> bool,
    {
        if let Some(cursor) = older_than {
            if !key::is_valid_date(cursor) {
                return Err(StoreError::invalid_key(cursor, "cursor must be an 8-digit date"));
            }
        }

        let mut dates = self.partition_dates().await?;
        dates.sort();
        if let Some(cursor) = older_than {
            dates.retain(|date| date.as_str() < cursor);
        }

        let mut remaining = limit as i64;
        let mut pages = Vec::new();
        for date in dates.into_iter().rev() {
            let objects = self.list_partition(&date, &filter).await?;
            if objects.is_empty() {
                continue;
            }
            remaining -= objects.len() as i64;
            pages.push(DayListing::new(date, objects));
            if remaining <= 0 {
                break;
            }
        }
        Ok(pages)
    }
}

fn missing_as_not_found(err: io::Error, id: &FileId) -> StoreError {
    if err.kind() == io::ErrorKind::NotFound {
        StoreError::NotFound(id.to_string())
    } else {
        StoreError::Io(err)
    }
}

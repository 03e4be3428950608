//! Database-backed repository for download records.
//!
//! Every write is a single atomic statement scoped to one record's identity;
//! the completion path is the one two-statement transaction (final status
//! flip plus the history append) and stays scoped to a single record.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use riptide_core::{DownloadId, DownloadState, InfoHash};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DataError, Result, op};
use crate::model::{CompletedDownload, DownloadRecord, NewDownload, ProgressUpdate};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const INSERT_DOWNLOAD: &str = r"
    INSERT INTO downloads (
        info_hash, name, magnet, provider, total_bytes, status, progress,
        downloaded_bytes, download_bps, upload_bps, peers_connected,
        seeders, leechers, created_at, updated_at, download_path, selected_files
    ) VALUES (?, ?, ?, ?, ?, ?, 0.0, 0, 0, 0, 0, 0, 0, ?, ?, ?, ?)
    ON CONFLICT(info_hash) DO UPDATE SET
        name = excluded.name,
        magnet = excluded.magnet,
        provider = excluded.provider,
        total_bytes = excluded.total_bytes,
        status = excluded.status,
        progress = 0.0,
        downloaded_bytes = 0,
        completed_at = NULL,
        updated_at = excluded.updated_at,
        download_path = excluded.download_path,
        selected_files = excluded.selected_files
    RETURNING id
";

const UPDATE_PROGRESS: &str = r"
    UPDATE downloads SET
        status = ?, progress = ?, downloaded_bytes = ?,
        download_bps = ?, upload_bps = ?, peers_connected = ?,
        seeders = ?, leechers = ?, updated_at = ?
    WHERE id = ?
";

const UPDATE_STATUS: &str = r"
    UPDATE downloads SET status = ?, updated_at = ? WHERE id = ?
";

const SELECT_COLUMNS: &str = r"
    SELECT id, info_hash, name, magnet, provider, total_bytes, status,
           progress, downloaded_bytes, download_bps, upload_bps,
           peers_connected, seeders, leechers, created_at, updated_at,
           completed_at, download_path, selected_files
    FROM downloads
";

const COMPLETE_DOWNLOAD: &str = r"
    UPDATE downloads SET
        status = 'completed', progress = 100.0, completed_at = ?, updated_at = ?
    WHERE id = ?
";

const INSERT_HISTORY: &str = r"
    INSERT INTO download_history (
        info_hash, name, provider, total_bytes, completed_at, download_path, file_count
    ) VALUES (?, ?, ?, ?, ?, ?, ?)
";

const DELETE_DOWNLOAD: &str = r"DELETE FROM downloads WHERE id = ?";

const SELECT_HISTORY: &str = r"
    SELECT id, info_hash, name, provider, total_bytes, completed_at,
           download_path, file_count
    FROM download_history ORDER BY completed_at DESC LIMIT ?
";

const SELECT_SETTING: &str = r"SELECT value FROM settings WHERE key = ?";

const UPSERT_SETTING: &str = r"
    INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
";

/// Database-backed repository for download state.
#[derive(Clone)]
pub struct DownloadStore {
    pool: SqlitePool,
}

impl DownloadStore {
    /// Open (or create) the database file and apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub async fn connect(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(op("open database"))?;
        Self::from_pool(pool).await
    }

    /// Open an in-memory database, mainly for tests and dry runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or migrations fail.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new().in_memory(true);
        // A second pooled connection would see a different empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(op("open in-memory database"))?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Access the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a fresh download record in the `pending` state and return its
    /// row id. Re-inserting an identity hash that already has a row revives
    /// that row with reset counters instead of failing.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails or the selection cannot be
    /// encoded.
    pub async fn insert_download(&self, download: &NewDownload) -> Result<DownloadId> {
        let selected = encode_selection(&download.selected_files)?;
        let now = Utc::now();
        let row = sqlx::query(INSERT_DOWNLOAD)
            .bind(download.info_hash.as_str())
            .bind(&download.name)
            .bind(&download.magnet)
            .bind(&download.provider)
            .bind(download.total_bytes)
            .bind(DownloadState::Pending.as_str())
            .bind(now)
            .bind(now)
            .bind(&download.download_path)
            .bind(selected)
            .fetch_one(&self.pool)
            .await
            .map_err(op("insert download"))?;
        let id: i64 = row.try_get("id")?;
        debug!(info_hash = %download.info_hash, id, "download record inserted");
        Ok(DownloadId(id))
    }

    /// Overwrite one record's live counters (a monitor-tick write).
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_progress(&self, id: DownloadId, update: &ProgressUpdate) -> Result<()> {
        sqlx::query(UPDATE_PROGRESS)
            .bind(update.status.as_str())
            .bind(update.progress)
            .bind(update.downloaded_bytes)
            .bind(update.download_bps)
            .bind(update.upload_bps)
            .bind(update.peers_connected)
            .bind(update.seeders)
            .bind(update.leechers)
            .bind(Utc::now())
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(op("update progress"))?;
        Ok(())
    }

    /// Persist a lifecycle status change for one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_status(&self, id: DownloadId, status: DownloadState) -> Result<()> {
        sqlx::query(UPDATE_STATUS)
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(op("update status"))?;
        Ok(())
    }

    /// Fetch one record by identity hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row cannot be decoded.
    pub async fn get_by_hash(&self, hash: &InfoHash) -> Result<Option<DownloadRecord>> {
        let query = format!("{SELECT_COLUMNS} WHERE info_hash = ?");
        let row = sqlx::query(&query)
            .bind(hash.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(op("select download by hash"))?;
        row.as_ref().map(map_download).transpose()
    }

    /// Fetch every record that has not completed, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub async fn get_unfinished(&self) -> Result<Vec<DownloadRecord>> {
        let query = format!(
            "{SELECT_COLUMNS} WHERE status IN ('pending', 'downloading', 'paused') \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(op("select unfinished downloads"))?;
        rows.iter().map(map_download).collect()
    }

    /// Flip one record to `completed` and append its history row.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement in the transaction fails.
    pub async fn mark_completed(&self, id: DownloadId, file_count: i64) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(op("begin completion"))?;
        let now = Utc::now();
        sqlx::query(COMPLETE_DOWNLOAD)
            .bind(now)
            .bind(now)
            .bind(id.0)
            .execute(&mut *tx)
            .await
            .map_err(op("complete download"))?;
        let query = format!("{SELECT_COLUMNS} WHERE id = ?");
        let row = sqlx::query(&query)
            .bind(id.0)
            .fetch_one(&mut *tx)
            .await
            .map_err(op("select completed download"))?;
        let record = map_download(&row)?;
        sqlx::query(INSERT_HISTORY)
            .bind(record.info_hash.as_str())
            .bind(&record.name)
            .bind(&record.provider)
            .bind(record.total_bytes)
            .bind(now)
            .bind(&record.download_path)
            .bind(file_count)
            .execute(&mut *tx)
            .await
            .map_err(op("insert history"))?;
        tx.commit().await.map_err(op("commit completion"))?;
        Ok(())
    }

    /// Hard-delete one record (explicit removal by the user).
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_download(&self, id: DownloadId) -> Result<()> {
        sqlx::query(DELETE_DOWNLOAD)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(op("delete download"))?;
        Ok(())
    }

    /// Fetch completed-download history, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub async fn history(&self, limit: i64) -> Result<Vec<CompletedDownload>> {
        let rows = sqlx::query(SELECT_HISTORY)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(op("select history"))?;
        rows.iter().map(map_history).collect()
    }

    /// Read a settings value by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query(SELECT_SETTING)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(op("select setting"))?;
        row.map(|row| row.try_get("value").map_err(DataError::from))
            .transpose()
    }

    /// Write a settings value, overwriting any existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(UPSERT_SETTING)
            .bind(key)
            .bind(value)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(op("upsert setting"))?;
        Ok(())
    }
}

fn map_download(row: &SqliteRow) -> Result<DownloadRecord> {
    let status_label: String = row.try_get("status")?;
    let status = status_label
        .parse::<DownloadState>()
        .map_err(|err| DataError::Decode {
            context: "downloads.status",
            source: Box::new(err),
        })?;
    let info_hash: String = row.try_get("info_hash")?;
    let selected_raw: String = row.try_get("selected_files")?;
    let completed_at: Option<DateTime<Utc>> = row.try_get("completed_at")?;

    Ok(DownloadRecord {
        id: DownloadId(row.try_get("id")?),
        info_hash: InfoHash::new(info_hash),
        name: row.try_get("name")?,
        magnet: row.try_get("magnet")?,
        provider: row.try_get("provider")?,
        total_bytes: row.try_get("total_bytes")?,
        status,
        progress: row.try_get("progress")?,
        downloaded_bytes: row.try_get("downloaded_bytes")?,
        download_bps: row.try_get("download_bps")?,
        upload_bps: row.try_get("upload_bps")?,
        peers_connected: row.try_get("peers_connected")?,
        seeders: row.try_get("seeders")?,
        leechers: row.try_get("leechers")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        completed_at,
        download_path: row.try_get("download_path")?,
        selected_files: decode_selection(&selected_raw)?,
    })
}

fn map_history(row: &SqliteRow) -> Result<CompletedDownload> {
    let info_hash: String = row.try_get("info_hash")?;
    Ok(CompletedDownload {
        id: row.try_get("id")?,
        info_hash: InfoHash::new(info_hash),
        name: row.try_get("name")?,
        provider: row.try_get("provider")?,
        total_bytes: row.try_get("total_bytes")?,
        completed_at: row.try_get("completed_at")?,
        download_path: row.try_get("download_path")?,
        file_count: row.try_get("file_count")?,
    })
}

fn encode_selection(selected: &[u32]) -> Result<String> {
    serde_json::to_string(selected).map_err(|err| DataError::Decode {
        context: "downloads.selected_files",
        source: Box::new(err),
    })
}

fn decode_selection(raw: &str) -> Result<Vec<u32>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(|err| DataError::Decode {
        context: "downloads.selected_files",
        source: Box::new(err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_encoding_round_trips() {
        let encoded = encode_selection(&[0, 2, 5]).unwrap();
        assert_eq!(decode_selection(&encoded).unwrap(), vec![0, 2, 5]);
        assert!(decode_selection("").unwrap().is_empty());
        assert!(decode_selection("not-json").is_err());
    }
}

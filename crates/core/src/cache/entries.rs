//! Namespaced key-value entries.
//!
//! This is the persistence contract every cached function writes through:
//! `get`, `put` and namespace-clear, each atomic per key. Values are stored
//! as JSON text with the time they were produced.

use super::connection::CacheDb;
use super::hash::compute_content_hash;
use crate::Error;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A raw stored entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntry {
    pub namespace: String,
    pub cache_key: String,
    pub value_json: String,
    pub content_hash: String,
    pub fetched_at: String,
}

impl StoredEntry {
    /// Parse the stored RFC 3339 timestamp.
    pub fn fetched_at(&self) -> Result<DateTime<Utc>, Error> {
        parse_timestamp(&self.fetched_at)
    }
}

/// Entry metadata without the value, for status listings.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EntryMeta {
    pub namespace: String,
    pub cache_key: String,
    pub content_hash: String,
    pub fetched_at: String,
    pub size_bytes: i64,
}

/// Format a timestamp the way entries are stored.
///
/// Fixed precision keeps lexicographic order equal to chronological order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::ParseFailed(format!("invalid timestamp {raw:?}: {e}")))
}

impl CacheDb {
    /// Get an entry by namespace and key.
    ///
    /// Returns None if the key doesn't exist in the namespace.
    pub async fn get_entry(&self, namespace: &str, cache_key: &str) -> Result<Option<StoredEntry>, Error> {
        let namespace = namespace.to_string();
        let cache_key = cache_key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<StoredEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT namespace, cache_key, value_json, content_hash, fetched_at
                    FROM cache_entries WHERE namespace = ?1 AND cache_key = ?2",
                )?;

                let result = stmt.query_row(params![namespace, cache_key], |row| {
                    Ok(StoredEntry {
                        namespace: row.get(0)?,
                        cache_key: row.get(1)?,
                        value_json: row.get(2)?,
                        content_hash: row.get(3)?,
                        fetched_at: row.get(4)?,
                    })
                });

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or update an entry.
    ///
    /// Uses UPSERT semantics. Returns true when the stored content differs
    /// from what was there before (or nothing was there).
    pub async fn put_entry(
        &self, namespace: &str, cache_key: &str, value_json: &str, fetched_at: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let namespace = namespace.to_string();
        let cache_key = cache_key.to_string();
        let value_json = value_json.to_string();
        let content_hash = compute_content_hash(&value_json);
        let fetched_at = format_timestamp(fetched_at);

        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let previous: Option<String> = match conn.query_row(
                    "SELECT content_hash FROM cache_entries WHERE namespace = ?1 AND cache_key = ?2",
                    params![namespace, cache_key],
                    |row| row.get(0),
                ) {
                    Ok(hash) => Some(hash),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                };

                conn.execute(
                    "INSERT INTO cache_entries (namespace, cache_key, value_json, content_hash, fetched_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT(namespace, cache_key) DO UPDATE SET
                        value_json = excluded.value_json,
                        content_hash = excluded.content_hash,
                        fetched_at = excluded.fetched_at",
                    params![namespace, cache_key, value_json, content_hash, fetched_at],
                )?;

                Ok(previous.as_deref() != Some(content_hash.as_str()))
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a single entry.
    ///
    /// Returns true if an entry was removed.
    pub async fn delete_entry(&self, namespace: &str, cache_key: &str) -> Result<bool, Error> {
        let namespace = namespace.to_string();
        let cache_key = cache_key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM cache_entries WHERE namespace = ?1 AND cache_key = ?2",
                    params![namespace, cache_key],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every entry in a namespace.
    ///
    /// Returns the number of deleted entries.
    pub async fn clear_namespace(&self, namespace: &str) -> Result<u64, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM cache_entries WHERE namespace = ?1", params![namespace])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete entries produced before `cutoff`, across all namespaces.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        let cutoff = format_timestamp(cutoff);
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM cache_entries WHERE fetched_at < ?1", params![cutoff])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// List entry metadata, optionally restricted to one namespace.
    pub async fn list_entries(&self, namespace: Option<&str>) -> Result<Vec<EntryMeta>, Error> {
        let namespace = namespace.map(str::to_string);
        self.conn
            .call(move |conn| -> Result<Vec<EntryMeta>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT namespace, cache_key, content_hash, fetched_at, LENGTH(value_json)
                    FROM cache_entries
                    WHERE ?1 IS NULL OR namespace = ?1
                    ORDER BY namespace, cache_key",
                )?;

                let rows = stmt.query_map(params![namespace], |row| {
                    Ok(EntryMeta {
                        namespace: row.get(0)?,
                        cache_key: row.get(1)?,
                        content_hash: row.get(2)?,
                        fetched_at: row.get(3)?,
                        size_bytes: row.get(4)?,
                    })
                })?;

                let mut entries = Vec::new();
                for row in rows {
                    entries.push(row?);
                }
                Ok(entries)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_put_and_get_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let now = Utc::now();

        let changed = db.put_entry("strings-hotfixes", "", r#"{"Hello":"Hi"}"#, now).await.unwrap();
        assert!(changed);

        let entry = db.get_entry("strings-hotfixes", "").await.unwrap().unwrap();
        assert_eq!(entry.value_json, r#"{"Hello":"Hi"}"#);
        assert_eq!(entry.fetched_at().unwrap().timestamp_micros(), now.timestamp_micros());
    }

    #[tokio::test]
    async fn test_get_missing_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.get_entry("broken-features", "").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_entry("a", "k", "1", Utc::now()).await.unwrap();
        db.put_entry("b", "k", "2", Utc::now()).await.unwrap();

        assert_eq!(db.get_entry("a", "k").await.unwrap().unwrap().value_json, "1");
        assert_eq!(db.get_entry("b", "k").await.unwrap().unwrap().value_json, "2");
    }

    #[tokio::test]
    async fn test_upsert_reports_change() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.put_entry("ns", "k", "[1]", Utc::now()).await.unwrap());
        assert!(!db.put_entry("ns", "k", "[1]", Utc::now()).await.unwrap());
        assert!(db.put_entry("ns", "k", "[2]", Utc::now()).await.unwrap());

        assert_eq!(db.get_entry("ns", "k").await.unwrap().unwrap().value_json, "[2]");
    }

    #[tokio::test]
    async fn test_clear_namespace() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_entry("style-hotfixes", "", "\"a\"", Utc::now()).await.unwrap();
        db.put_entry("style-hotfixes", "other", "\"b\"", Utc::now()).await.unwrap();
        db.put_entry("strings-hotfixes", "", "{}", Utc::now()).await.unwrap();

        let deleted = db.clear_namespace("style-hotfixes").await.unwrap();
        assert_eq!(deleted, 2);
        assert!(db.get_entry("strings-hotfixes", "").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_entry("ns", "k", "1", Utc::now()).await.unwrap();
        assert!(db.delete_entry("ns", "k").await.unwrap());
        assert!(!db.delete_entry("ns", "k").await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_older_than() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let now = Utc::now();
        db.put_entry("ns", "old", "1", now - Duration::days(400)).await.unwrap();
        db.put_entry("ns", "new", "2", now).await.unwrap();

        let deleted = db.purge_older_than(now - Duration::days(301)).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(db.get_entry("ns", "old").await.unwrap().is_none());
        assert!(db.get_entry("ns", "new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_entry("b", "", "{}", Utc::now()).await.unwrap();
        db.put_entry("a", "", "[1,2]", Utc::now()).await.unwrap();

        let all = db.list_entries(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].namespace, "a");
        assert_eq!(all[0].size_bytes, 5);

        let only_b = db.list_entries(Some("b")).await.unwrap();
        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b[0].namespace, "b");
    }

    #[test]
    fn test_timestamp_round_trip_ordering() {
        let earlier = Utc::now();
        let later = earlier + Duration::milliseconds(1);
        assert!(format_timestamp(earlier) < format_timestamp(later));
        assert!(parse_timestamp("not a date").is_err());
    }
}

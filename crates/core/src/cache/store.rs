//! Bucketed cache store.
//!
//! A store holds named buckets (one per cache generation), each an ordered
//! collection of request → response entries. Workers only ever see the
//! [`CacheStore`] trait; [`CacheDb`] is the persistent SQLite implementation.

use async_trait::async_trait;
use bytes::Bytes;
use tokio_rusqlite::{params, rusqlite};

use super::connection::CacheDb;
use super::hash::compute_request_key;
use crate::Error;
use crate::http::{Headers, Request, Response};

/// One response to store under the GET request for `url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub url: String,
    pub response: Response,
}

impl CacheEntry {
    pub fn new(url: impl Into<String>, response: Response) -> Self {
        Self { url: url.into(), response }
    }
}

/// Keyed bucket store shared by every worker instance.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Create `bucket` if it does not exist yet.
    async fn open(&self, bucket: &str) -> Result<(), Error>;

    /// Store every entry in `bucket`, or none of them.
    ///
    /// Existing entries for the same request are replaced.
    async fn put_all(&self, bucket: &str, entries: Vec<CacheEntry>) -> Result<(), Error>;

    /// Find a stored response for `request` across all buckets, oldest bucket first.
    ///
    /// Non-GET requests never match.
    async fn match_request(&self, request: &Request) -> Result<Option<Response>, Error>;

    /// Shorthand for matching a plain GET to `url`.
    async fn match_url(&self, url: &str) -> Result<Option<Response>, Error> {
        self.match_request(&Request::get(url)).await
    }

    /// Bucket names in creation order.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Delete `bucket` and its entries. Returns whether it existed.
    async fn delete(&self, bucket: &str) -> Result<bool, Error>;

    /// URLs stored in `bucket`, in insertion order.
    async fn entries(&self, bucket: &str) -> Result<Vec<String>, Error>;
}

fn ensure_bucket(conn: &rusqlite::Connection, bucket: &str) -> Result<i64, Error> {
    conn.execute(
        "INSERT OR IGNORE INTO buckets (name, created_at) VALUES (?1, ?2)",
        params![bucket, chrono::Utc::now().to_rfc3339()],
    )?;
    let id = conn.query_row("SELECT id FROM buckets WHERE name = ?1", params![bucket], |row| row.get(0))?;
    Ok(id)
}

#[async_trait]
impl CacheStore for CacheDb {
    async fn open(&self, bucket: &str) -> Result<(), Error> {
        let bucket = bucket.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                ensure_bucket(conn, &bucket)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn put_all(&self, bucket: &str, entries: Vec<CacheEntry>) -> Result<(), Error> {
        let bucket = bucket.to_string();
        let count = entries.len();
        let mut rows = Vec::with_capacity(count);
        for entry in entries {
            let headers_json = serde_json::to_string(&entry.response.headers)
                .map_err(|e| Error::InvalidInput(format!("failed to encode headers: {e}")))?;
            rows.push((compute_request_key(&entry.url), entry, headers_json));
        }

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                let bucket_id = ensure_bucket(&tx, &bucket)?;
                let stored_at = chrono::Utc::now().to_rfc3339();

                for (request_key, entry, headers_json) in &rows {
                    tx.execute(
                        "DELETE FROM entries WHERE bucket_id = ?1 AND request_key = ?2",
                        params![bucket_id, request_key],
                    )?;
                    tx.execute(
                        "INSERT INTO entries (bucket_id, request_key, url, status, headers_json, body, stored_at)
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                        params![
                            bucket_id,
                            request_key,
                            &entry.url,
                            entry.response.status,
                            headers_json,
                            &entry.response.body[..],
                            &stored_at,
                        ],
                    )?;
                }

                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        tracing::debug!(count, "stored cache entries");
        Ok(())
    }

    async fn match_request(&self, request: &Request) -> Result<Option<Response>, Error> {
        if !request.is_get() {
            return Ok(None);
        }

        let request_key = compute_request_key(&request.url);
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(u16, String, Vec<u8>)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT e.status, e.headers_json, e.body
                    FROM entries e JOIN buckets b ON b.id = e.bucket_id
                    WHERE e.request_key = ?1
                    ORDER BY b.id ASC
                    LIMIT 1",
                )?;

                let result = stmt.query_row(params![request_key], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)));

                match result {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        let Some((status, headers_json, body)) = row else {
            return Ok(None);
        };

        let headers: Headers =
            serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(format!("{}: {e}", request.url)))?;

        Ok(Some(Response { status, headers, body: Bytes::from(body) }))
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM buckets ORDER BY id ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, bucket: &str) -> Result<bool, Error> {
        let bucket = bucket.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "DELETE FROM entries WHERE bucket_id IN (SELECT id FROM buckets WHERE name = ?1)",
                    params![bucket],
                )?;
                let deleted = tx.execute("DELETE FROM buckets WHERE name = ?1", params![bucket])?;
                tx.commit()?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn entries(&self, bucket: &str) -> Result<Vec<String>, Error> {
        let bucket = bucket.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT e.url FROM entries e JOIN buckets b ON b.id = e.bucket_id
                    WHERE b.name = ?1
                    ORDER BY e.seq ASC",
                )?;
                let urls = stmt
                    .query_map(params![bucket], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }
}

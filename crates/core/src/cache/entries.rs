//! Entry reads and writes.
//!
//! Entries are whole-row upserts keyed by (namespace, request key), so
//! concurrent writers to one key resolve as last write wins.

use super::connection::CacheDb;
use crate::Error;
use crate::request::Request;
use crate::response::{Response, ResponseKind};
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;
use url::Url;

/// Row form of a captured response.
#[derive(Debug, Clone)]
struct StoredEntry {
    key: String,
    method: String,
    url: String,
    response_url: String,
    status: u16,
    kind: String,
    redirected: bool,
    headers_json: String,
    body: Vec<u8>,
}

impl StoredEntry {
    fn capture(request: &Request, response: &Response) -> Result<Self, Error> {
        // Values are kept as raw bytes; header values need not be UTF-8.
        let headers: Vec<(&str, &[u8])> = response
            .headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_bytes()))
            .collect();
        let headers_json =
            serde_json::to_string(&headers).map_err(|e| Error::CorruptEntry(format!("headers: {e}")))?;

        Ok(Self {
            key: request.cache_key(),
            method: request.method.to_string(),
            url: request.url.to_string(),
            response_url: response.url.to_string(),
            status: response.status,
            kind: response.kind.as_str().to_string(),
            redirected: response.redirected,
            headers_json,
            body: response.body.to_vec(),
        })
    }

    fn into_response(self) -> Result<Response, Error> {
        let url = Url::parse(&self.response_url).map_err(|e| Error::CorruptEntry(format!("url: {e}")))?;
        let kind: ResponseKind = self.kind.parse()?;

        let pairs: Vec<(String, Vec<u8>)> =
            serde_json::from_str(&self.headers_json).map_err(|e| Error::CorruptEntry(format!("headers: {e}")))?;
        let mut headers = HeaderMap::with_capacity(pairs.len());
        for (name, value) in pairs {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::CorruptEntry(format!("header name {name:?}: {e}")))?;
            let value =
                HeaderValue::from_bytes(&value).map_err(|e| Error::CorruptEntry(format!("header {name}: {e}")))?;
            headers.append(name, value);
        }

        Ok(Response {
            url,
            status: self.status,
            kind,
            redirected: self.redirected,
            headers,
            body: Bytes::from(self.body),
        })
    }
}

fn ensure_namespace(conn: &rusqlite::Connection, namespace: &str, now: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO namespaces (name, created_at, ready) VALUES (?1, ?2, 0)",
        params![namespace, now],
    )?;
    Ok(())
}

fn upsert(conn: &rusqlite::Connection, namespace: &str, entry: &StoredEntry, now: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO entries (
            namespace, key, method, url, response_url, status, kind,
            redirected, headers_json, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT(namespace, key) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            response_url = excluded.response_url,
            status = excluded.status,
            kind = excluded.kind,
            redirected = excluded.redirected,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            namespace,
            &entry.key,
            &entry.method,
            &entry.url,
            &entry.response_url,
            entry.status,
            &entry.kind,
            entry.redirected as i32,
            &entry.headers_json,
            &entry.body,
            now,
        ],
    )?;
    Ok(())
}

impl CacheDb {
    /// Store a response for a request, creating the namespace if needed.
    pub async fn put_entry(&self, namespace: &str, request: &Request, response: &Response) -> Result<(), Error> {
        let entry = StoredEntry::capture(request, response)?;
        let namespace = namespace.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_namespace(&tx, &namespace, &now)?;
                upsert(&tx, &namespace, &entry, &now)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store a batch of entries and mark the namespace ready, all or nothing.
    pub async fn seed_namespace(&self, namespace: &str, entries: &[(Request, Response)]) -> Result<(), Error> {
        let rows = entries
            .iter()
            .map(|(request, response)| StoredEntry::capture(request, response))
            .collect::<Result<Vec<_>, Error>>()?;
        let namespace = namespace.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_namespace(&tx, &namespace, &now)?;
                for row in &rows {
                    upsert(&tx, &namespace, row, &now)?;
                }
                tx.execute("UPDATE namespaces SET ready = 1 WHERE name = ?1", params![namespace])?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the stored response for a request.
    ///
    /// Returns None if the namespace or the entry doesn't exist.
    pub async fn match_entry(&self, namespace: &str, request: &Request) -> Result<Option<Response>, Error> {
        let namespace = namespace.to_string();
        let key = request.cache_key();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<StoredEntry>, Error> {
                let result = conn.query_row(
                    "SELECT key, method, url, response_url, status, kind, redirected, headers_json, body
                     FROM entries WHERE namespace = ?1 AND key = ?2",
                    params![namespace, key],
                    |row| {
                        Ok(StoredEntry {
                            key: row.get(0)?,
                            method: row.get(1)?,
                            url: row.get(2)?,
                            response_url: row.get(3)?,
                            status: row.get(4)?,
                            kind: row.get(5)?,
                            redirected: row.get::<_, i32>(6)? == 1,
                            headers_json: row.get(7)?,
                            body: row.get(8)?,
                        })
                    },
                );

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        row.map(StoredEntry::into_response).transpose()
    }

    /// Number of entries in a namespace.
    pub async fn count_entries(&self, namespace: &str) -> Result<u64, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE namespace = ?1", params![namespace], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

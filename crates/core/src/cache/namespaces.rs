//! Namespace lifecycle: create, mark ready, list, delete.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Listing row for one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NamespaceSummary {
    pub name: String,
    pub created_at: String,
    /// True once the precache manifest was stored in full.
    pub ready: bool,
    pub entries: u64,
}

impl CacheDb {
    /// Create the namespace if it does not exist yet.
    pub async fn open_namespace(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO namespaces (name, created_at, ready) VALUES (?1, ?2, 0)",
                    params![name, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Whether the namespace exists and finished seeding.
    pub async fn is_namespace_ready(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let ready = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM namespaces WHERE name = ?1 AND ready = 1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(ready)
            })
            .await
            .map_err(Error::from)
    }

    /// Names of every namespace, oldest first.
    pub async fn namespace_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM namespaces ORDER BY created_at ASC, name ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, rusqlite::Error>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Every namespace with its entry count.
    pub async fn namespace_summaries(&self) -> Result<Vec<NamespaceSummary>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<NamespaceSummary>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT n.name, n.created_at, n.ready, COUNT(e.key)
                     FROM namespaces n LEFT JOIN entries e ON e.namespace = n.name
                     GROUP BY n.name
                     ORDER BY n.created_at ASC, n.name ASC",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(NamespaceSummary {
                            name: row.get(0)?,
                            created_at: row.get(1)?,
                            ready: row.get::<_, i32>(2)? == 1,
                            entries: row.get::<_, i64>(3)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a namespace and, through the cascade, all of its entries.
    ///
    /// Returns false if no such namespace existed.
    pub async fn delete_namespace(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM namespaces WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }
}

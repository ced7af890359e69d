//! Named cache stores.
//!
//! A cache store is a versioned bucket of request-keyed response snapshots.
//! Stores are created on first open and removed wholesale; entries cascade.

use super::connection::OriginDb;
use super::hash::compute_request_key;
use crate::Error;
use crate::http::{Request, ResponseSnapshot, ResponseType};
use bytes::Bytes;
use tokio_rusqlite::{params, rusqlite};

const ENTRY_COLUMNS: &str =
    "e.response_url, e.status, e.status_text, e.response_type, e.content_type, e.headers_json, e.body";

/// Row form of a cache entry, built before entering the database thread.
struct EntryRow {
    request_key: String,
    method: String,
    url: String,
    response_url: String,
    status: i64,
    status_text: String,
    response_type: &'static str,
    content_type: Option<String>,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn new(request: &Request, response: ResponseSnapshot) -> Result<Self, Error> {
        if !request.method.eq_ignore_ascii_case("GET") {
            return Err(Error::Storage(format!("cannot cache {} {}", request.method, request.url)));
        }
        Ok(Self {
            request_key: compute_request_key(&request.method, &request.url),
            method: request.method.to_ascii_uppercase(),
            url: request.url.to_string(),
            headers_json: serde_json::to_string(&response.headers)?,
            response_url: response.url,
            status: i64::from(response.status),
            status_text: response.status_text,
            response_type: response.response_type.as_str(),
            content_type: response.content_type,
            body: response.body.to_vec(),
        })
    }
}

/// Raw columns read back for a snapshot; headers are decoded after the query.
type SnapshotColumns = (String, i64, String, String, Option<String>, String, Vec<u8>);

fn read_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<SnapshotColumns> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?, row.get(6)?))
}

fn into_snapshot(columns: SnapshotColumns) -> Result<ResponseSnapshot, Error> {
    let (url, status, status_text, response_type, content_type, headers_json, body) = columns;
    Ok(ResponseSnapshot {
        url,
        status: u16::try_from(status).map_err(|e| Error::Storage(format!("invalid stored status {status}: {e}")))?,
        status_text,
        response_type: ResponseType::parse(&response_type),
        content_type,
        headers: serde_json::from_str(&headers_json)?,
        body: Bytes::from(body),
    })
}

fn ensure_store(conn: &rusqlite::Connection, name: &str) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO cache_stores (name, created_at) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
        params![name, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn upsert_entry(conn: &rusqlite::Connection, store: &str, row: &EntryRow) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO cache_entries (
            store, request_key, method, url, response_url, status, status_text,
            response_type, content_type, headers_json, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT(store, request_key) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            response_url = excluded.response_url,
            status = excluded.status,
            status_text = excluded.status_text,
            response_type = excluded.response_type,
            content_type = excluded.content_type,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            store,
            &row.request_key,
            &row.method,
            &row.url,
            &row.response_url,
            row.status,
            &row.status_text,
            row.response_type,
            &row.content_type,
            &row.headers_json,
            &row.body,
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

impl OriginDb {
    /// Open the named cache store, creating it if needed.
    pub async fn open_cache(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> { ensure_store(conn, &name) })
            .await
            .map_err(Error::from)
    }

    /// Whether a store with this name exists.
    pub async fn has_cache(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists =
                    conn.query_row("SELECT EXISTS(SELECT 1 FROM cache_stores WHERE name = ?1)", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// All store names, oldest first.
    pub async fn cache_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_stores ORDER BY rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and every entry in it.
    ///
    /// Returns false if no such store existed.
    pub async fn delete_cache(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM cache_stores WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Store a response under the request's key, creating the store if needed.
    pub async fn put_entry(&self, store: &str, request: &Request, response: ResponseSnapshot) -> Result<(), Error> {
        let store = store.to_string();
        let row = EntryRow::new(request, response)?;
        self.conn
            .call(move |conn| -> Result<(), Error> {
                ensure_store(conn, &store)?;
                upsert_entry(conn, &store, &row)
            })
            .await
            .map_err(Error::from)
    }

    /// Store a batch of responses in one transaction.
    ///
    /// Either every entry lands and the store exists, or nothing changes.
    pub async fn put_all(&self, store: &str, entries: Vec<(Request, ResponseSnapshot)>) -> Result<usize, Error> {
        let store = store.to_string();
        let rows = entries
            .into_iter()
            .map(|(request, response)| EntryRow::new(&request, response))
            .collect::<Result<Vec<_>, _>>()?;

        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                ensure_store(&tx, &store)?;
                for row in &rows {
                    upsert_entry(&tx, &store, row)?;
                }
                tx.commit()?;
                Ok(rows.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a request in one store.
    pub async fn match_entry(&self, store: &str, request: &Request) -> Result<Option<ResponseSnapshot>, Error> {
        if !request.method.eq_ignore_ascii_case("GET") {
            return Ok(None);
        }
        let store = store.to_string();
        let key = compute_request_key(&request.method, &request.url);
        let columns = self
            .conn
            .call(move |conn| -> Result<Option<SnapshotColumns>, Error> {
                let sql =
                    format!("SELECT {ENTRY_COLUMNS} FROM cache_entries e WHERE e.store = ?1 AND e.request_key = ?2");
                match conn.query_row(&sql, params![store, key], read_columns) {
                    Ok(c) => Ok(Some(c)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        columns.map(into_snapshot).transpose()
    }

    /// Look up a request across every store, oldest store first.
    pub async fn match_any(&self, request: &Request) -> Result<Option<ResponseSnapshot>, Error> {
        if !request.method.eq_ignore_ascii_case("GET") {
            return Ok(None);
        }
        let key = compute_request_key(&request.method, &request.url);
        let columns = self
            .conn
            .call(move |conn| -> Result<Option<SnapshotColumns>, Error> {
                let sql = format!(
                    "SELECT {ENTRY_COLUMNS} FROM cache_entries e
                     JOIN cache_stores s ON s.name = e.store
                     WHERE e.request_key = ?1
                     ORDER BY s.rowid ASC LIMIT 1"
                );
                match conn.query_row(&sql, params![key], read_columns) {
                    Ok(c) => Ok(Some(c)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        columns.map(into_snapshot).transpose()
    }

    /// Request URLs stored in a store, in insertion order.
    pub async fn cache_keys(&self, store: &str) -> Result<Vec<String>, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM cache_entries WHERE store = ?1 ORDER BY rowid ASC")?;
                let urls = stmt
                    .query_map(params![store], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in a store.
    pub async fn entry_count(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM cache_entries WHERE store = ?1", params![store], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

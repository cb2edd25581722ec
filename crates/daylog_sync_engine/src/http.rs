//! HTTP remote client.
//!
//! Talks to a remote entries service over plain HTTP:
//!
//! | call        | request                 | success             |
//! |-------------|-------------------------|---------------------|
//! | `fetch_all` | `GET /entries`          | `{id: entry, ...}`  |
//! | `fetch`     | `GET /entries/{id}`     | entry, 404 = absent |
//! | `put`       | `POST /entries/{id}`    | any 2xx             |
//! | `delete`    | `DELETE /entries/{id}`  | any 2xx, 404 = ok   |
//!
//! Every request is bounded by [`SyncConfig::timeout`]. Any transport
//! error, timeout or non-success status collapses to [`Unavailable`].

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::remote::{RemoteClient, RemoteResult, RemoteSnapshot, Unavailable};
use daylog_entry::{codec, Entry, EntryId};
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tracing::{debug, warn};

/// HTTP-based remote client.
///
/// Uses a blocking client; it must not be called from inside an async
/// runtime.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    /// Base URL without a trailing slash (e.g. `http://localhost:5000`).
    base_url: String,
    client: Client,
}

impl HttpRemote {
    /// Creates a new HTTP remote from the sync configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::Client(e.to_string()))?;

        Ok(Self {
            base_url: config.server_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/entries", self.base_url)
    }

    fn entry_url(&self, id: &EntryId) -> String {
        format!("{}/entries/{}", self.base_url, id)
    }

    fn body(response: Response) -> RemoteResult<Vec<u8>> {
        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(classify)
    }
}

/// Maps a transport error onto an [`Unavailable`] reason.
fn classify(err: reqwest::Error) -> Unavailable {
    if err.is_timeout() {
        Unavailable::Timeout
    } else if err.is_connect() {
        Unavailable::Connect(err.to_string())
    } else if err.is_decode() || err.is_body() {
        Unavailable::Body(err.to_string())
    } else {
        Unavailable::Request(err.to_string())
    }
}

fn require_success(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Unavailable::Status(status.as_u16()))
    }
}

impl RemoteClient for HttpRemote {
    fn fetch_all(&self) -> RemoteResult<RemoteSnapshot> {
        let response = self
            .client
            .get(self.collection_url())
            .send()
            .map_err(classify)?;
        let bytes = Self::body(require_success(response)?)?;

        let decoded = codec::decode_entry_set_lenient(&bytes)
            .map_err(|e| Unavailable::Body(e.to_string()))?;
        for skipped in &decoded.skipped {
            warn!(id = %skipped.key, reason = %skipped.reason, "skipping malformed remote record");
        }
        debug!(
            count = decoded.entries.len(),
            skipped = decoded.skipped.len(),
            "fetched remote entries"
        );

        Ok(RemoteSnapshot {
            entries: decoded.entries,
            skipped: decoded.skipped,
        })
    }

    fn fetch(&self, id: &EntryId) -> RemoteResult<Option<Entry>> {
        let response = self
            .client
            .get(self.entry_url(id))
            .send()
            .map_err(classify)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let bytes = Self::body(require_success(response)?)?;
        codec::decode_entry(&bytes)
            .map(Some)
            .map_err(|e| Unavailable::Body(e.to_string()))
    }

    fn put(&self, id: &EntryId, entry: &Entry) -> RemoteResult<()> {
        let body = codec::encode_entry(entry).map_err(|e| Unavailable::Body(e.to_string()))?;
        let response = self
            .client
            .post(self.entry_url(id))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(classify)?;
        require_success(response).map(|_| ())
    }

    fn delete(&self, id: &EntryId) -> RemoteResult<()> {
        let response = self
            .client
            .delete(self.entry_url(id))
            .send()
            .map_err(classify)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        require_success(response).map(|_| ())
    }
}

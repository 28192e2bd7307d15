//! Single-file download functionality.

use crate::error::{FetchError, TransportError};
use crate::types::ChunkSize;
use futures_util::StreamExt;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use url::Url;

/// Downloads files over one reusable HTTP session.
///
/// The session is released when the fetcher is dropped, so scoping a
/// fetcher to a run scopes its connections to that run.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    chunk_size: ChunkSize,
}

impl Fetcher {
    pub fn new(client: reqwest::Client, chunk_size: ChunkSize) -> Self {
        Self { client, chunk_size }
    }

    /// The session shared by every request of this fetcher.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Streams `url` into `destination_dir`, overwriting any existing file.
    ///
    /// The file is named after the last path segment of the URL. On error
    /// the file may be left truncated and must not be considered usable.
    ///
    /// # Returns
    ///
    /// The canonical absolute path of the written file.
    pub async fn fetch(&self, url: &Url, destination_dir: &Path) -> Result<PathBuf, FetchError> {
        let file_name = file_name_from_url(url).ok_or_else(|| FetchError::NoFileName {
            url: url.to_string(),
        })?;
        let destination = destination_dir.join(file_name.as_ref());

        tokio::fs::create_dir_all(destination_dir)
            .await
            .map_err(|source| FetchError::Write {
                path: destination_dir.to_path_buf(),
                source,
            })?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TransportError::request(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status,
            }
            .into());
        }
        let content_length = response.content_length();

        let write_err = |source| FetchError::Write {
            path: destination.clone(),
            source,
        };
        let mut file = tokio::fs::File::create(&destination)
            .await
            .map_err(write_err)?;

        let mut written = 0u64;
        match self.chunk_size {
            ChunkSize::Unbounded => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| TransportError::request(url.as_str(), e))?;
                file.write_all(&body).await.map_err(write_err)?;
                written = body.len() as u64;
            }
            ChunkSize::Bounded(limit) => {
                let mut byte_stream = response.bytes_stream();
                while let Some(piece) = byte_stream.next().await {
                    let piece = piece.map_err(|e| TransportError::request(url.as_str(), e))?;
                    for chunk in piece.chunks(limit.get()) {
                        file.write_all(chunk).await.map_err(write_err)?;
                    }
                    written += piece.len() as u64;
                }
            }
        }
        file.flush().await.map_err(write_err)?;

        match content_length {
            Some(expected) if expected != written => warn!(
                "Content-Length for {} announced {} bytes, received {}",
                url, expected, written
            ),
            None => debug!("No Content-Length header for {}", url),
            _ => {}
        }

        tokio::fs::canonicalize(&destination)
            .await
            .map_err(write_err)
    }
}

/// Last path segment of `url` with percent-escapes decoded, ignoring query
/// and fragment.
///
/// A segment that is not valid UTF-8 once decoded is kept encoded. Names
/// that would leave the destination directory (`.`, `..`, or anything
/// containing a path separator) yield `None`.
pub fn file_name_from_url(url: &Url) -> Option<Cow<'_, str>> {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())?;

    let name = percent_decode_str(segment)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(segment));

    if name == "." || name == ".." || name.contains(&['/', '\\'][..]) {
        return None;
    }
    Some(name)
}

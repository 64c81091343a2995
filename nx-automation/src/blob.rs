//! Blob attachments for operation inputs.
//!
//! A blob is an immutable (filename, content type, payload) value. File
//! backed blobs hold only their path; the bytes are streamed into the
//! multipart writer in fixed-size chunks when the request is encoded, and
//! the file handle is closed before the request goes on the wire.

use std::path::{Path, PathBuf};

use tokio::io::AsyncReadExt;

use nx_core::constants::{BLOB_READ_CHUNK_SIZE, DEFAULT_BLOB_CONTENT_TYPE};
use nx_core::error::{NxError, NxResult};

/// Where a blob's payload comes from.
#[derive(Debug, Clone)]
enum BlobSource {
    /// Payload read from a local file at encode time.
    File(PathBuf),
    /// Payload held in memory.
    Memory(Vec<u8>),
}

/// A binary payload attached to an operation request.
#[derive(Debug, Clone)]
pub struct Blob {
    filename: String,
    content_type: String,
    source: BlobSource,
}

impl Blob {
    /// Load a blob from a local file with the default content type.
    ///
    /// The filename is derived from the last path segment. The file is
    /// opened once here so that an unreadable path fails before any
    /// network exchange, then re-opened and streamed at encode time.
    pub fn load(path: impl AsRef<Path>) -> NxResult<Self> {
        Self::load_with_type(path, DEFAULT_BLOB_CONTENT_TYPE)
    }

    /// Load a blob from a local file with an explicit content type.
    pub fn load_with_type(path: impl AsRef<Path>, content_type: &str) -> NxResult<Self> {
        let path = path.as_ref();

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| NxError::BlobLoad {
                path: path.display().to_string(),
                message: "path has no file name".into(),
            })?;

        std::fs::File::open(path).map_err(|e| NxError::BlobLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            filename,
            content_type: content_type.to_string(),
            source: BlobSource::File(path.to_path_buf()),
        })
    }

    /// Build a blob from in-memory bytes.
    pub fn from_bytes(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            source: BlobSource::Memory(bytes),
        }
    }

    /// The filename sent in the part's Content-Disposition header.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The content type sent in the part's Content-Type header.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Append the payload to `out`, streaming file sources chunk-wise.
    pub(crate) async fn write_into(&self, out: &mut Vec<u8>) -> NxResult<()> {
        match &self.source {
            BlobSource::Memory(bytes) => {
                out.extend_from_slice(bytes);
                Ok(())
            }
            BlobSource::File(path) => {
                let mut file =
                    tokio::fs::File::open(path)
                        .await
                        .map_err(|e| NxError::BlobLoad {
                            path: path.display().to_string(),
                            message: e.to_string(),
                        })?;

                let mut chunk = vec![0u8; BLOB_READ_CHUNK_SIZE];
                loop {
                    let n = file.read(&mut chunk).await.map_err(|e| NxError::BlobLoad {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    })?;
                    if n == 0 {
                        break;
                    }
                    out.extend_from_slice(&chunk[..n]);
                }
                Ok(())
            }
        }
    }
}

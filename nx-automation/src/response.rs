//! Operation response decoding.
//!
//! A response payload is either structured JSON or an opaque byte stream
//! (a downloaded file routed through the JSON endpoint). The two cannot
//! be told apart on the wire, so non-JSON handling follows the client's
//! configured [`NonJsonPolicy`].

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use nx_core::config::NonJsonPolicy;
use nx_core::error::{NxError, NxResult};

/// Decoded result of one operation execution.
#[derive(Debug, Clone)]
pub enum OperationResponse {
    /// The payload decoded as JSON.
    Json(Value),
    /// The payload is an opaque byte stream.
    Bytes {
        /// Raw payload bytes.
        bytes: Vec<u8>,
        /// Where the payload was persisted, under the persist policy.
        persisted_to: Option<PathBuf>,
    },
}

impl OperationResponse {
    /// Whether this is the structured JSON variant.
    pub fn is_json(&self) -> bool {
        matches!(self, OperationResponse::Json(_))
    }

    /// Whether this is the opaque bytes variant.
    pub fn is_bytes(&self) -> bool {
        matches!(self, OperationResponse::Bytes { .. })
    }

    /// Borrow the JSON payload, if structured.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            OperationResponse::Json(v) => Some(v),
            OperationResponse::Bytes { .. } => None,
        }
    }

    /// Consume into the JSON payload, if structured.
    pub fn into_json(self) -> Option<Value> {
        match self {
            OperationResponse::Json(v) => Some(v),
            OperationResponse::Bytes { .. } => None,
        }
    }

    /// Consume into the raw bytes, if opaque.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            OperationResponse::Json(_) => None,
            OperationResponse::Bytes { bytes, .. } => Some(bytes),
        }
    }

    /// Coerce into a single document entity, rejecting payloads whose
    /// `entity-type` tag names something else.
    pub fn into_document(self) -> NxResult<nx_models::Document> {
        match self {
            OperationResponse::Json(v) => nx_models::Document::from_value(v),
            OperationResponse::Bytes { .. } => Err(NxError::ResponseTypeMismatch {
                expected: "document".into(),
                message: "response is an opaque byte payload".into(),
            }),
        }
    }

    /// Coerce into a paginated document list, rejecting payloads whose
    /// `entity-type` tag names something else.
    pub fn into_documents(self) -> NxResult<nx_models::Documents> {
        match self {
            OperationResponse::Json(v) => nx_models::Documents::from_value(v),
            OperationResponse::Bytes { .. } => Err(NxError::ResponseTypeMismatch {
                expected: "documents".into(),
                message: "response is an opaque byte payload".into(),
            }),
        }
    }

    /// Coerce the JSON variant into a typed entity.
    ///
    /// A bytes variant, or a JSON payload that does not fit `T`, is a
    /// `ResponseTypeMismatch`.
    pub fn into_entity<T: DeserializeOwned>(self) -> NxResult<T> {
        let expected = std::any::type_name::<T>().to_string();
        match self {
            OperationResponse::Json(v) => {
                serde_json::from_value(v).map_err(|e| NxError::ResponseTypeMismatch {
                    expected,
                    message: e.to_string(),
                })
            }
            OperationResponse::Bytes { .. } => Err(NxError::ResponseTypeMismatch {
                expected,
                message: "response is an opaque byte payload".into(),
            }),
        }
    }
}

/// Decode a raw response payload according to the non-JSON policy.
pub(crate) async fn decode_payload(
    operation_id: &str,
    bytes: Vec<u8>,
    policy: NonJsonPolicy,
    download_dir: &Path,
) -> NxResult<OperationResponse> {
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(json) => Ok(OperationResponse::Json(json)),
        Err(e) => match policy {
            NonJsonPolicy::Error => Err(NxError::Decode {
                operation_id: operation_id.to_string(),
                message: e.to_string(),
            }),
            NonJsonPolicy::ReturnBytes => Ok(OperationResponse::Bytes {
                bytes,
                persisted_to: None,
            }),
            NonJsonPolicy::Persist => {
                let path = download_dir.join(side_channel_name(operation_id));
                tokio::fs::create_dir_all(download_dir).await?;
                tokio::fs::write(&path, &bytes).await?;
                debug!(
                    "persisted non-JSON payload for {} to {}",
                    operation_id,
                    path.display()
                );
                Ok(OperationResponse::Bytes {
                    bytes,
                    persisted_to: Some(path),
                })
            }
        },
    }
}

/// Per-call side-channel file name, scoped by operation id and a fresh
/// token so concurrent calls never collide on a shared name.
fn side_channel_name(operation_id: &str) -> String {
    let safe: String = operation_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '-' })
        .collect();
    format!("{}-{}.bin", safe, Uuid::new_v4().simple())
}

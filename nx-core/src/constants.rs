//! Wire-protocol constants for the automation API.

/// Client name reported in logs.
pub const CLIENT_NAME: &str = "nuxeo-automation-rust";

/// Client version.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Content type of a plain JSON automation request body.
pub const CONTENT_TYPE_REQUEST: &str = "application/json+nxrequest";

/// Accept header value sent with every automation request.
pub const ACCEPT_ENTITY: &str = "application/json+nxentity, */*";

/// Header carrying the document-properties schema filter.
pub const HEADER_DOCUMENT_PROPERTIES: &str = "X-NXDocumentProperties";

/// Header telling the server not to echo blob content back.
pub const HEADER_VOID_OPERATION: &str = "X-NXVoidOperation";

/// Default content type for blob attachments.
pub const DEFAULT_BLOB_CONTENT_TYPE: &str = "application/binary";

/// Document property path where multi-blob uploads land when the caller
/// did not pick one explicitly.
pub const DEFAULT_MULTI_BLOB_XPATH: &str = "files:files";

/// Default request timeout in milliseconds.
pub const DEFAULT_API_TIMEOUT_MS: u64 = 30_000;

/// Timeout multiplier for multipart uploads and large transfers.
pub const EXTENDED_TIMEOUT_MULTIPLIER: u64 = 4;

/// Chunk size for streaming blob files into the multipart writer.
pub const BLOB_READ_CHUNK_SIZE: usize = 64 * 1024;

/// Entity type tags used in server payload envelopes.
pub mod entity_types {
    pub const DOCUMENT: &str = "document";
    pub const DOCUMENTS: &str = "documents";
    pub const EXCEPTION: &str = "exception";
}

/// Top-level request body field names.
pub mod fields {
    pub const INPUT: &str = "input";
    pub const CONTEXT: &str = "context";
    pub const PARAMS: &str = "params";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_constants() {
        assert!(CONTENT_TYPE_REQUEST.starts_with("application/json"));
        assert!(ACCEPT_ENTITY.contains("*/*"));
        assert_eq!(DEFAULT_MULTI_BLOB_XPATH, "files:files");
    }
}

//! Operation descriptors.
//!
//! An [`Operation`] owns the request body for one logical server call and
//! decides at execute time whether the call goes out as plain JSON or as
//! a multipart upload, based on whether blobs are attached.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use nx_core::constants;
use nx_core::error::{NxError, NxResult};

use crate::blob::Blob;
use crate::client::AutomationClient;
use crate::multipart;
use crate::request::RequestBody;
use crate::response::OperationResponse;

/// One logical server call: endpoint, operation id, and request body.
///
/// Not reusable concurrently; one execute in flight at a time. The body
/// is not consumed by a failed execute, so the caller may retry the same
/// operation after a transport error.
pub struct Operation<'a> {
    client: &'a AutomationClient,
    operation_id: Option<String>,
    body: RequestBody,
}

impl<'a> Operation<'a> {
    pub(crate) fn new(client: &'a AutomationClient, operation_id: Option<String>) -> Self {
        Self {
            client,
            operation_id,
            body: RequestBody::new(),
        }
    }

    /// Add an operation parameter (`params.<name>`).
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.set_nested(constants::fields::PARAMS, name, value);
        self
    }

    /// Add a context variable (`context.<name>`).
    pub fn context(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.set_nested(constants::fields::CONTEXT, name, value);
        self
    }

    /// Set a top-level body field to a flat value.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.set(field, value);
        self
    }

    /// Set a sub-key under a top-level body field.
    pub fn set_nested(
        mut self,
        field: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.body.set_nested(field, key, value);
        self
    }

    /// Set a scalar input (document ref, path, ...).
    pub fn input(mut self, value: impl Into<Value>) -> Self {
        self.body.set(constants::fields::INPUT, value);
        self
    }

    /// Attach a blob as input. Repeated calls build up a blob list.
    pub fn input_blob(mut self, blob: Blob) -> Self {
        self.body.attach_blob(blob);
        self
    }

    /// Load a local file and attach it as an input blob with the
    /// default content type.
    pub fn load_blob(self, path: impl AsRef<Path>) -> NxResult<Self> {
        Ok(self.input_blob(Blob::load(path)?))
    }

    /// Load a local file and attach it with an explicit content type.
    pub fn load_blob_with_type(
        self,
        path: impl AsRef<Path>,
        content_type: &str,
    ) -> NxResult<Self> {
        Ok(self.input_blob(Blob::load_with_type(path, content_type)?))
    }

    /// Request document properties for the given schema in the response.
    pub fn schema_filter(mut self, schema: impl Into<String>) -> Self {
        self.body.set_schema_filter(schema);
        self
    }

    /// Tell the server not to return the input content in the response.
    ///
    /// Blob uploads always send `X-NXVoidOperation: true` so the server
    /// never echoes the uploaded bytes back; any token set here only
    /// applies to plain JSON dispatch.
    pub fn void_operation(mut self, token: impl Into<String>) -> Self {
        self.body.set_void_operation(token);
        self
    }

    /// The request body accumulated so far.
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Execute the operation with the descriptor's own operation id.
    pub async fn execute(&self) -> NxResult<OperationResponse> {
        self.dispatch(None).await
    }

    /// Execute with an operation id override.
    pub async fn execute_with_id(&self, operation_id: &str) -> NxResult<OperationResponse> {
        self.dispatch(Some(operation_id)).await
    }

    /// Execute and coerce the structured result into `T`.
    pub async fn execute_into<T: DeserializeOwned>(&self) -> NxResult<T> {
        self.execute().await?.into_entity()
    }

    async fn dispatch(&self, override_id: Option<&str>) -> NxResult<OperationResponse> {
        let operation_id = override_id
            .or(self.operation_id.as_deref())
            .ok_or_else(|| NxError::NoOperationId {
                url: self.client.base_url().to_string(),
            })?;

        if self.body.has_blobs() {
            // Blob upload: the server must not echo the content back.
            let headers = self.wire_headers(Some("true"));
            let encoded = multipart::encode(
                self.body.to_json(),
                self.body.blobs(),
                self.client.boundary_generator(),
            )
            .await?;
            self.client
                .send_multipart(operation_id, &headers, encoded)
                .await
        } else {
            let headers = self.wire_headers(self.body.void_operation());
            self.client
                .send_json(operation_id, &headers, &self.body.to_json())
                .await
        }
    }

    /// Per-request headers derived from the body's directives.
    fn wire_headers(&self, void_token: Option<&str>) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        if let Some(schema) = self.body.schema_filter() {
            headers.push((
                constants::HEADER_DOCUMENT_PROPERTIES.to_string(),
                schema.to_string(),
            ));
        }
        if let Some(token) = void_token {
            headers.push((constants::HEADER_VOID_OPERATION.to_string(), token.to_string()));
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> AutomationClient {
        // Port 9 is discard; nothing in these tests actually connects.
        AutomationClient::builder("http://127.0.0.1:9/automation")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_chain_assembles_body() {
        let client = client();
        let op = client
            .operation("Document.Query")
            .param("query", "SELECT * FROM Document")
            .param("pageSize", 10)
            .context("path", "/default-domain")
            .input("doc:/some/doc");

        assert_eq!(
            op.body().to_json(),
            json!({
                "context": {"path": "/default-domain"},
                "input": "doc:/some/doc",
                "params": {"query": "SELECT * FROM Document", "pageSize": 10}
            })
        );
    }

    #[test]
    fn test_wire_headers_from_directives() {
        let client = client();
        let op = client
            .operation("Document.Fetch")
            .schema_filter("dublincore")
            .void_operation("*");

        let headers = op.wire_headers(op.body().void_operation());
        assert!(headers.contains(&("X-NXDocumentProperties".into(), "dublincore".into())));
        assert!(headers.contains(&("X-NXVoidOperation".into(), "*".into())));
    }

    #[tokio::test]
    async fn test_execute_without_id_is_no_operation_id() {
        let client = client();
        let err = client.operation_unnamed().execute().await.unwrap_err();
        match err {
            NxError::NoOperationId { url } => assert!(url.contains("127.0.0.1")),
            other => panic!("expected NoOperationId, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_execute_with_id_override_resolves() {
        // The override resolves past the missing default id; the call then
        // fails at the transport layer since nothing listens on port 9.
        let client = client();
        let err = client
            .operation_unnamed()
            .execute_with_id("Document.Fetch")
            .await
            .unwrap_err();
        assert!(matches!(err, NxError::Transport { .. }));
    }
}

//! Client engine for a Nuxeo-style document-automation API.
//!
//! Assembles structured operation requests (params, context, input),
//! optionally attaches binary blobs, encodes them as plain JSON or
//! multipart/related MIME, performs the exchange, and decodes the result
//! into a structured payload or an opaque byte stream.
//!
//! ```no_run
//! use nx_automation::AutomationClient;
//!
//! # async fn run() -> nx_core::NxResult<()> {
//! let client = AutomationClient::builder("http://localhost:8080/nuxeo/site/automation")
//!     .basic_auth("Administrator", "Administrator")
//!     .build()?;
//!
//! let doc: nx_models::Document = client
//!     .operation("Document.Fetch")
//!     .param("value", "/default-domain/workspaces")
//!     .schema_filter("dublincore")
//!     .execute_into()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod blob;
pub mod client;
pub mod multipart;
pub mod operation;
pub mod request;
pub mod response;

// Re-export key types
pub use blob::Blob;
pub use client::{AutomationClient, AutomationClientBuilder};
pub use multipart::{BoundaryGenerator, EncodedMultipart, FixedBoundaryGenerator, SystemBoundaryGenerator};
pub use operation::Operation;
pub use request::{BodyValue, RequestBody};
pub use response::OperationResponse;

// Policy knob re-exported for call sites configuring the client.
pub use nx_core::config::NonJsonPolicy;

//! multipart/related MIME encoding.
//!
//! The JSON request part always comes first (`Content-ID: request`),
//! followed by one binary part per blob (`Content-ID: input`) in
//! attachment order, all framed by a per-message boundary token.

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use nx_core::constants::{CONTENT_TYPE_REQUEST, DEFAULT_MULTI_BLOB_XPATH};
use nx_core::error::NxResult;

use crate::blob::Blob;

/// Source of boundary tokens, injectable so tests can encode
/// deterministically.
pub trait BoundaryGenerator: Send + Sync {
    /// Produce a boundary token for one message.
    fn boundary(&self) -> String;
}

/// Default boundary generator: timestamp plus a v4 UUID.
///
/// Unique enough for non-adversarial single-process use; not
/// cryptographically guaranteed to never collide with part content.
#[derive(Debug, Clone, Default)]
pub struct SystemBoundaryGenerator;

impl BoundaryGenerator for SystemBoundaryGenerator {
    fn boundary(&self) -> String {
        format!("====Part={}={}===", Utc::now().timestamp(), Uuid::new_v4().simple())
    }
}

/// Fixed boundary generator for deterministic encoding in tests.
#[derive(Debug, Clone)]
pub struct FixedBoundaryGenerator(pub String);

impl BoundaryGenerator for FixedBoundaryGenerator {
    fn boundary(&self) -> String {
        self.0.clone()
    }
}

/// A fully encoded multipart/related message.
#[derive(Debug, Clone)]
pub struct EncodedMultipart {
    boundary: String,
    bytes: Vec<u8>,
    part_count: usize,
}

impl EncodedMultipart {
    /// The boundary token framing this message.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// The encoded message body.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the message, returning the body.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Number of parts (request part + blob parts).
    pub fn part_count(&self) -> usize {
        self.part_count
    }

    /// The envelope Content-Type header value declaring this message.
    pub fn content_type(&self) -> String {
        format!(
            "multipart/related; boundary=\"{}\"; type=\"{}\"; start=\"request\"",
            self.boundary, CONTENT_TYPE_REQUEST
        )
    }
}

/// Encode a serialized request body and its blobs into one
/// multipart/related message.
///
/// When more than one blob is attached and the body carries no explicit
/// `params.xpath`, the default multi-file property path is injected
/// before serialization. An explicit xpath is never overwritten.
pub async fn encode(
    mut body: Value,
    blobs: &[Blob],
    generator: &dyn BoundaryGenerator,
) -> NxResult<EncodedMultipart> {
    if blobs.len() > 1 {
        inject_default_xpath(&mut body);
    }

    // serde_json never escapes '/', so document paths stay literal.
    let json = serde_json::to_string(&body).map_err(nx_core::NxError::from)?;
    let boundary = generator.boundary();

    let mut out = Vec::with_capacity(json.len() + 512);

    out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    out.extend_from_slice(
        format!(
            "Content-Type: {CONTENT_TYPE_REQUEST}; charset=UTF-8\r\n\
             Content-Transfer-Encoding: 8bit\r\n\
             Content-ID: request\r\n\
             Content-Length: {}\r\n\r\n",
            json.len()
        )
        .as_bytes(),
    );
    out.extend_from_slice(json.as_bytes());
    out.extend_from_slice(b"\r\n");

    for blob in blobs {
        out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        out.extend_from_slice(
            format!(
                "Content-Type: {}\r\n\
                 Content-ID: input\r\n\
                 Content-Transfer-Encoding: binary\r\n\
                 Content-Disposition: attachment; filename=\"{}\"\r\n\r\n",
                blob.content_type(),
                blob.filename()
            )
            .as_bytes(),
        );
        blob.write_into(&mut out).await?;
        out.extend_from_slice(b"\r\n");
    }

    out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Ok(EncodedMultipart {
        boundary,
        bytes: out,
        part_count: 1 + blobs.len(),
    })
}

/// Inject `params.xpath = "files:files"` unless the caller picked one.
fn inject_default_xpath(body: &mut Value) {
    let Some(obj) = body.as_object_mut() else {
        return;
    };
    let params = obj
        .entry("params")
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    if let Some(params) = params.as_object_mut() {
        params
            .entry("xpath")
            .or_insert_with(|| Value::String(DEFAULT_MULTI_BLOB_XPATH.into()));
    }
}

//! Document entity models.
//!
//! Structured automation responses carry an `entity-type` tag; single
//! documents arrive as `document` and query/page-provider results as a
//! `documents` list envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use nx_core::constants::entity_types;
use nx_core::error::{NxError, NxResult};

/// A document entity returned by the automation server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Entity type tag, always "document" on the wire.
    #[serde(rename = "entity-type", default)]
    pub entity_type: String,

    /// Repository the document lives in.
    #[serde(default)]
    pub repository: Option<String>,

    /// Document UID.
    pub uid: String,

    /// Repository path of the document.
    #[serde(default)]
    pub path: Option<String>,

    /// Document type (e.g. "File", "Folder").
    #[serde(rename = "type", default)]
    pub doc_type: Option<String>,

    /// Lifecycle state (e.g. "project", "deleted").
    #[serde(default)]
    pub state: Option<String>,

    /// Document title.
    #[serde(default)]
    pub title: Option<String>,

    /// Last modification timestamp as sent by the server.
    #[serde(rename = "lastModified", default)]
    pub last_modified: Option<String>,

    /// Facets applied to the document.
    #[serde(default)]
    pub facets: Vec<String>,

    /// Schema-qualified properties (e.g. "dc:title").
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,

    /// Opaque server-side change token.
    #[serde(rename = "changeToken", default)]
    pub change_token: Option<String>,
}

impl Document {
    /// Deserialize a document from a server JSON value.
    ///
    /// A present-but-wrong `entity-type` tag is rejected; an absent tag
    /// is tolerated since schema filters may strip the envelope.
    pub fn from_value(value: Value) -> NxResult<Self> {
        check_entity_tag(&value, entity_types::DOCUMENT)?;
        serde_json::from_value(value).map_err(NxError::from)
    }

    /// Look up a schema-qualified property (e.g. "dc:description").
    pub fn property(&self, xpath: &str) -> Option<&Value> {
        self.properties.get(xpath)
    }

    /// Property as a string, if present and textual.
    pub fn property_str(&self, xpath: &str) -> Option<&str> {
        self.property(xpath).and_then(|v| v.as_str())
    }

    /// Last modification date, parsed from the server date string.
    pub fn last_modified_date(&self) -> Option<chrono::NaiveDate> {
        self.last_modified
            .as_deref()
            .and_then(|s| crate::dates::parse_server_date(s).ok())
    }
}

/// Reject a present-but-wrong entity tag; an absent tag is tolerated
/// since schema filters may strip the envelope.
fn check_entity_tag(value: &Value, expected: &str) -> NxResult<()> {
    if let Some(tag) = value.get("entity-type").and_then(Value::as_str) {
        if tag != expected {
            return Err(NxError::ResponseTypeMismatch {
                expected: expected.to_string(),
                message: format!("entity-type tag is \"{tag}\""),
            });
        }
    }
    Ok(())
}

/// Paginated list of documents, the `documents` entity envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Documents {
    /// Entity type tag, always "documents" on the wire.
    #[serde(rename = "entity-type", default)]
    pub entity_type: String,

    /// Whether the result set is paginable.
    #[serde(rename = "isPaginable", default)]
    pub is_paginable: bool,

    /// Documents on this page.
    #[serde(default)]
    pub entries: Vec<Document>,

    /// Total number of results across all pages, when known.
    #[serde(rename = "totalSize", default)]
    pub total_size: Option<i64>,

    /// Zero-based page index.
    #[serde(rename = "pageIndex", default)]
    pub page_index: Option<i64>,

    /// Page size used by the server.
    #[serde(rename = "pageSize", default)]
    pub page_size: Option<i64>,

    /// Total number of pages, when known.
    #[serde(rename = "pageCount", default)]
    pub page_count: Option<i64>,
}

impl Documents {
    /// Deserialize a document list from a server JSON value, checking
    /// the `entity-type` tag when present.
    pub fn from_value(value: Value) -> NxResult<Self> {
        check_entity_tag(&value, entity_types::DOCUMENTS)?;
        serde_json::from_value(value).map_err(NxError::from)
    }

    /// Number of documents on this page.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this page is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the documents on this page.
    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.entries.iter()
    }
}

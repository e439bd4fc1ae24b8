//! Document storage capability
//!
//! Invoices carry a required source document and an optional payment
//! confirmation. The billing core treats both as opaque byte blobs: it
//! stores and returns them through this capability interface and never
//! inspects their contents.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::identifiers::DocumentId;
use crate::ports::PortError;

/// Metadata supplied when storing a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Original filename
    pub filename: String,
    /// MIME type, e.g. "application/pdf"
    pub content_type: String,
}

impl DocumentMetadata {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }
}

/// A reference to a stored document
///
/// The handle carries enough to serve the blob back (filename and MIME
/// type travel with it) without the core ever touching the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHandle {
    /// Storage identifier
    pub id: DocumentId,
    /// Original filename
    pub filename: String,
    /// MIME type
    pub content_type: String,
}

impl DocumentHandle {
    pub fn new(id: DocumentId, metadata: DocumentMetadata) -> Self {
        Self {
            id,
            filename: metadata.filename,
            content_type: metadata.content_type,
        }
    }
}

/// Capability interface for storing and retrieving opaque documents
///
/// Implementations decide where bytes live (filesystem, object store,
/// memory for tests); callers only hold `DocumentHandle`s.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores a document and returns a handle to it
    async fn store(
        &self,
        bytes: Vec<u8>,
        metadata: DocumentMetadata,
    ) -> Result<DocumentHandle, PortError>;

    /// Fetches the bytes for a previously stored document
    ///
    /// Returns `PortError::NotFound` if the handle does not resolve.
    async fn fetch(&self, handle: &DocumentHandle) -> Result<Vec<u8>, PortError>;
}

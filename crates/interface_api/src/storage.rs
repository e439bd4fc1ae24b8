//! Source document storage
//!
//! Every invoice is backed by an uploaded source document (the signed
//! PDF, a scan, etc.). Handlers talk to the `DocumentStore` port from
//! the kernel; this module provides a filesystem adapter for production
//! and an in-memory one for tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use core_kernel::{DocumentHandle, DocumentId, DocumentMetadata, DocumentStore, PortError};

/// Stores documents as flat files named by document id
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, id: &DocumentId) -> PathBuf {
        self.root.join(id.as_uuid().to_string())
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn store(
        &self,
        bytes: Vec<u8>,
        metadata: DocumentMetadata,
    ) -> Result<DocumentHandle, PortError> {
        let id = DocumentId::new_v7();

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| PortError::internal(format!("Failed to create storage dir: {}", e)))?;
        tokio::fs::write(self.path_for(&id), &bytes)
            .await
            .map_err(|e| PortError::internal(format!("Failed to write document: {}", e)))?;

        debug!(document_id = %id, size = bytes.len(), "Document stored");

        Ok(DocumentHandle {
            id,
            filename: metadata.filename,
            content_type: metadata.content_type,
        })
    }

    async fn fetch(&self, handle: &DocumentHandle) -> Result<Vec<u8>, PortError> {
        tokio::fs::read(self.path_for(&handle.id))
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => PortError::not_found("Document", handle.id),
                _ => PortError::internal(format!("Failed to read document: {}", e)),
            })
    }
}

/// In-memory document store for tests
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<HashMap<DocumentId, Vec<u8>>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn store(
        &self,
        bytes: Vec<u8>,
        metadata: DocumentMetadata,
    ) -> Result<DocumentHandle, PortError> {
        let id = DocumentId::new_v7();
        self.documents.write().await.insert(id, bytes);
        Ok(DocumentHandle {
            id,
            filename: metadata.filename,
            content_type: metadata.content_type,
        })
    }

    async fn fetch(&self, handle: &DocumentHandle) -> Result<Vec<u8>, PortError> {
        self.documents
            .read()
            .await
            .get(&handle.id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Document", handle.id))
    }
}

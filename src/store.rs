//! Policy store seam
//!
//! The reconciler talks to the outside world through [`PolicyStore`]: one
//! fetch and one persist of a resource's attached policy document. A missing
//! document is reported as `None`, never as an error, because resources that
//! have never had a policy are a valid starting state.
//!
//! Two backends ship with the crate: [`MemoryPolicyStore`] for tests and
//! embedding, and [`FsPolicyStore`] which keeps one JSON file per resource on
//! local disk. Cloud-API backends implement the same trait out of tree.

use crate::error::StoreError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Fetch/persist access to a resource's attached policy document
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Fetch the current policy document for the resource.
    ///
    /// Returns `Ok(None)` when the resource has no policy attached yet.
    async fn fetch(&self, resource_id: &str) -> Result<Option<String>, StoreError>;

    /// Write the policy document back to the resource
    async fn persist(&self, resource_id: &str, document: &str) -> Result<(), StoreError>;
}

/// In-memory policy store with call counters
///
/// The counters let tests assert not just on the resulting document but on
/// how many fetch/persist calls an invocation actually performed.
#[derive(Default)]
pub struct MemoryPolicyStore {
    documents: RwLock<HashMap<String, String>>,
    fetch_calls: AtomicUsize,
    persist_calls: AtomicUsize,
}

impl MemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document before running a reconciliation
    pub fn insert(&self, resource_id: &str, document: &str) {
        self.documents
            .write()
            .insert(resource_id.to_string(), document.to_string());
    }

    /// Current document for a resource, if any
    pub fn document(&self, resource_id: &str) -> Option<String> {
        self.documents.read().get(resource_id).cloned()
    }

    /// Number of fetch calls performed so far
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of persist calls performed so far
    pub fn persist_calls(&self) -> usize {
        self.persist_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn fetch(&self, resource_id: &str) -> Result<Option<String>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.documents.read().get(resource_id).cloned())
    }

    async fn persist(&self, resource_id: &str, document: &str) -> Result<(), StoreError> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        self.documents
            .write()
            .insert(resource_id.to_string(), document.to_string());
        Ok(())
    }
}

/// Policy store keeping one `<resource-id>.json` file per resource
pub struct FsPolicyStore {
    root: PathBuf,
}

impl FsPolicyStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        FsPolicyStore {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn document_path(&self, resource_id: &str) -> Result<PathBuf, StoreError> {
        validate_resource_id(resource_id)?;
        Ok(self.root.join(format!("{}.json", resource_id)))
    }
}

#[async_trait]
impl PolicyStore for FsPolicyStore {
    async fn fetch(&self, resource_id: &str) -> Result<Option<String>, StoreError> {
        let path = self.document_path(resource_id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(document) => Ok(Some(document)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No policy document at {:?}", path);
                Ok(None)
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn persist(&self, resource_id: &str, document: &str) -> Result<(), StoreError> {
        let path = self.document_path(resource_id)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, document).await?;
        debug!("Policy document written to {:?}", path);
        Ok(())
    }
}

/// Reject identifiers that would escape the store root when used as a filename
fn validate_resource_id(resource_id: &str) -> Result<(), StoreError> {
    if resource_id.is_empty()
        || resource_id.contains('/')
        || resource_id.contains('\\')
        || resource_id.contains("..")
    {
        return Err(StoreError::InvalidResourceId(resource_id.to_string()));
    }
    Ok(())
}

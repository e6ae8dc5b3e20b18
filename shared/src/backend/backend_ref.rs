use std::sync::{Arc, Weak};

use crate::types::BackendId;

use super::{
    backend::Backend,
    category::{BackendCategory, BackendScope},
    error::BackendError,
};

/// Back-reference to a scanned backend.
///
/// The scan provider owns backends; the core only keeps a weak handle so a
/// backend destroyed between scan and debit shows up as
/// [`BackendError::Unavailable`] instead of being kept alive.
#[derive(Clone)]
pub struct BackendRef {
    id: BackendId,
    category: BackendCategory,
    scope: BackendScope,
    handle: Weak<dyn Backend>,
}

impl BackendRef {
    pub fn new(backend: &Arc<dyn Backend>) -> Self {
        Self {
            id: backend.id(),
            category: backend.category(),
            scope: backend.scope(),
            handle: Arc::downgrade(backend),
        }
    }

    pub fn id(&self) -> BackendId {
        self.id
    }

    pub fn category(&self) -> BackendCategory {
        self.category
    }

    pub fn scope(&self) -> BackendScope {
        self.scope
    }

    pub fn upgrade(&self) -> Result<Arc<dyn Backend>, BackendError> {
        self.handle
            .upgrade()
            .ok_or(BackendError::Unavailable { backend: self.id })
    }
}

impl std::fmt::Debug for BackendRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRef")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("scope", &self.scope)
            .finish()
    }
}

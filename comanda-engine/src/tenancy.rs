//! Ambient tenant context
//!
//! Every repository operation is scoped by the current local; the services
//! obtain it from an injected [`LocalContext`] rather than a module global,
//! so tests and multi-local deployments can substitute their own provider.

use uuid::Uuid;

/// Supplies the tenant on whose behalf the current operation runs
pub trait LocalContext: Send + Sync {
    fn current_local_id(&self) -> Uuid;
}

/// Fixed provider for single-local deployments and tests
#[derive(Debug, Clone, Copy)]
pub struct StaticLocalContext {
    local_id: Uuid,
}

impl StaticLocalContext {
    pub fn new(local_id: Uuid) -> Self {
        Self { local_id }
    }
}

impl LocalContext for StaticLocalContext {
    fn current_local_id(&self) -> Uuid {
        self.local_id
    }
}

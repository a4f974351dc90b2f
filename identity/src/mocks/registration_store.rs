//! Mock registration store.

use crate::error::{IdentityError, Result};
use crate::providers::RegistrationStore;
use crate::state::{RegistrationId, RegistrationIntent};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory registration store.
#[derive(Debug, Clone, Default)]
pub struct MockRegistrationStore {
    rows: Arc<Mutex<HashMap<RegistrationId, RegistrationIntent>>>,
}

impl MockRegistrationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an intent directly (test setup only).
    pub fn seed(&self, intent: RegistrationIntent) {
        if let Ok(mut rows) = self.lock() {
            rows.insert(intent.id, intent);
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<RegistrationId, RegistrationIntent>>> {
        self.rows
            .lock()
            .map_err(|_| IdentityError::Internal("registration lock poisoned".to_string()))
    }
}

impl RegistrationStore for MockRegistrationStore {
    async fn insert(&self, intent: &RegistrationIntent) -> Result<()> {
        self.lock()?.insert(intent.id, intent.clone());
        Ok(())
    }

    async fn find(&self, id: RegistrationId) -> Result<Option<RegistrationIntent>> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn update(&self, intent: &RegistrationIntent) -> Result<()> {
        let mut rows = self.lock()?;
        if !rows.contains_key(&intent.id) {
            return Err(IdentityError::RegistrationNotFound(intent.id));
        }
        rows.insert(intent.id, intent.clone());
        Ok(())
    }
}

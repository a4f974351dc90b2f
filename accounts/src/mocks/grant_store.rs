//! Mock opening-bonus grant store.

use crate::error::Result;
use crate::providers::BonusGrantStore;
use crate::state::OpeningBonusGrant;
use banca_core::{Claim, ClaimTable};

/// In-memory grant store backed by the shared claim table.
#[derive(Debug, Clone, Default)]
pub struct MockBonusGrantStore {
    grants: ClaimTable<String, OpeningBonusGrant>,
}

impl MockBonusGrantStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored grants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// `true` when no grant is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

impl BonusGrantStore for MockBonusGrantStore {
    async fn find_by_key(&self, key: &str) -> Result<Option<OpeningBonusGrant>> {
        if key.trim().is_empty() {
            return Ok(None);
        }
        Ok(self.grants.get(&key.to_string()))
    }

    async fn try_insert(
        &self,
        grant: OpeningBonusGrant,
    ) -> Result<Claim<OpeningBonusGrant>> {
        Ok(self.grants.claim(grant.idempotency_key.clone(), grant))
    }
}

//! First-writer-wins key claims.
//!
//! Idempotency records, opening-bonus grants, and inbox events all rely on
//! the same storage primitive: a uniqueness-constrained insert where, among
//! any number of concurrent duplicate attempts, exactly one succeeds and
//! every loser observes the value the winner wrote. Losers must treat the
//! conflict as success-equivalent, never as an error.
//!
//! [`Claim`] names the outcome of such an insert. [`ClaimTable`] is the
//! in-memory realization used by the mock stores; the PostgreSQL stores
//! realize the same contract with `INSERT .. ON CONFLICT DO NOTHING`.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

/// Outcome of a uniqueness-constrained insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim<T> {
    /// This caller performed the first successful insert and owns the
    /// side effect the key guards.
    First,
    /// Another caller won the insert; the existing value is returned so
    /// the loser can short-circuit to the winner's result.
    Existing(T),
}

impl<T> Claim<T> {
    /// `true` when this caller won the insert.
    #[must_use]
    pub const fn is_first(&self) -> bool {
        matches!(self, Self::First)
    }

    /// The pre-existing value, if another caller won.
    #[must_use]
    pub fn into_existing(self) -> Option<T> {
        match self {
            Self::First => None,
            Self::Existing(v) => Some(v),
        }
    }
}

/// In-memory uniqueness-constrained key table.
///
/// The entire claim is one critical section, so concurrent duplicate
/// claims serialize exactly as a unique index would serialize them in the
/// storage engine: one `First`, everyone else `Existing`.
#[derive(Debug)]
pub struct ClaimTable<K, V> {
    entries: Arc<Mutex<HashMap<K, V>>>,
}

impl<K, V> Default for ClaimTable<K, V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, V> Clone for ClaimTable<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, V> ClaimTable<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Insert `value` under `key` if the key is unclaimed.
    pub fn claim(&self, key: K, value: V) -> Claim<V> {
        let mut entries = self.lock();
        match entries.get(&key) {
            Some(existing) => Claim::Existing(existing.clone()),
            None => {
                entries.insert(key, value);
                Claim::First
            }
        }
    }

    /// Read the value under `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).cloned()
    }

    /// Replace the value under an already-claimed `key`.
    ///
    /// Returns `false` (and writes nothing) when the key was never
    /// claimed.
    pub fn update(&self, key: &K, value: V) -> bool {
        let mut entries = self.lock();
        if let Some(slot) = entries.get_mut(key) {
            *slot = value;
            true
        } else {
            false
        }
    }

    /// Insert or replace unconditionally.
    pub fn upsert(&self, key: K, value: V) {
        self.lock().insert(key, value);
    }

    /// Number of claimed keys.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` when no key is claimed.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of all values.
    pub fn values(&self) -> Vec<V> {
        self.lock().values().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<K, V>> {
        // A poisoned lock means a panic elsewhere already aborted the
        // test run; propagating the inner state is the useful behavior.
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn first_claim_wins_and_losers_see_existing() {
        let table: ClaimTable<String, u32> = ClaimTable::new();

        assert!(table.claim("k".to_string(), 1).is_first());
        assert_eq!(
            table.claim("k".to_string(), 2),
            Claim::Existing(1),
            "loser must observe the winner's value, not its own"
        );
        assert_eq!(table.get(&"k".to_string()), Some(1));
    }

    #[test]
    fn concurrent_claims_have_exactly_one_winner() {
        let table: ClaimTable<&'static str, usize> = ClaimTable::new();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let table = table.clone();
                thread::spawn(move || table.claim("bonus", i).is_first())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn update_requires_prior_claim() {
        let table: ClaimTable<String, u32> = ClaimTable::new();

        assert!(!table.update(&"missing".to_string(), 9));
        table.claim("k".to_string(), 1);
        assert!(table.update(&"k".to_string(), 9));
        assert_eq!(table.get(&"k".to_string()), Some(9));
    }
}

//! Nullable store — thread-safe in-memory storage for testing.

use std::collections::HashMap;
use std::sync::Mutex;
use vetme_store::{MetaStore, StakingStore, StoreError};
use vetme_types::AccountId;

/// An in-memory staking store for testing.
pub struct NullStakingStore {
    positions: Mutex<HashMap<AccountId, Vec<u8>>>,
    meta: Mutex<HashMap<String, Vec<u8>>>,
}

impl NullStakingStore {
    pub fn new() -> Self {
        Self {
            positions: Mutex::new(HashMap::new()),
            meta: Mutex::new(HashMap::new()),
        }
    }

    /// Number of persisted positions.
    pub fn position_count(&self) -> usize {
        self.positions.lock().unwrap().len()
    }
}

impl Default for NullStakingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaStore for NullStakingStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.meta
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.meta.lock().unwrap().get(key).cloned())
    }
}

impl StakingStore for NullStakingStore {
    fn get_position(&self, account: &AccountId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.positions.lock().unwrap().get(account).cloned())
    }

    fn put_position(&self, account: &AccountId, position: &[u8]) -> Result<(), StoreError> {
        self.positions
            .lock()
            .unwrap()
            .insert(*account, position.to_vec());
        Ok(())
    }

    fn iter_positions(&self) -> Result<Vec<(AccountId, Vec<u8>)>, StoreError> {
        Ok(self
            .positions
            .lock()
            .unwrap()
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect())
    }
}

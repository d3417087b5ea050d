use crate::{MetaStore, StoreError};
use vetme_types::AccountId;

/// Store trait for persisting staking ledger state to durable storage.
///
/// Uses opaque `Vec<u8>` so the store doesn't depend on the `vetme-staking`
/// crate. The staking engine serializes/deserializes its own types.
pub trait StakingStore: MetaStore {
    fn get_position(&self, account: &AccountId) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_position(&self, account: &AccountId, position: &[u8]) -> Result<(), StoreError>;
    fn iter_positions(&self) -> Result<Vec<(AccountId, Vec<u8>)>, StoreError>;
}

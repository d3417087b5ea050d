//! Metadata storage trait.

use crate::StoreError;

/// Schema version written alongside every persisted staking ledger.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_KEY: &str = "schema_version";

/// Generic key-value store for ledger-wide records (schedule, totals,
/// schema version) that are not keyed by account.
pub trait MetaStore {
    /// Store a metadata value.
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Retrieve a metadata value, `None` if absent.
    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Get the schema version, `None` for an empty store.
    fn get_schema_version(&self) -> Result<Option<u32>, StoreError> {
        match self.get_meta(SCHEMA_KEY)? {
            Some(bytes) => {
                let raw: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
                    StoreError::Serialization(format!(
                        "schema version must be 4 bytes, got {}",
                        bytes.len()
                    ))
                })?;
                Ok(Some(u32::from_be_bytes(raw)))
            }
            None => Ok(None),
        }
    }

    /// Set the schema version.
    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        self.put_meta(SCHEMA_KEY, &version.to_be_bytes())
    }
}

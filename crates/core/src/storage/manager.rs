use std::path::Path;

use crate::errors::CoreError;
use crate::models::holding::Holding;

use super::format;

/// High-level storage operations: holdings collection ⇄ versioned bytes or
/// file on disk.
pub struct StorageManager;

impl StorageManager {
    /// Serialize the holdings collection to file bytes.
    ///
    /// Flow: holdings → bincode → SFOL container bytes
    pub fn save_to_bytes(holdings: &[Holding]) -> Result<Vec<u8>, CoreError> {
        let payload = bincode::serialize(holdings)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize holdings: {e}")))?;
        Ok(format::write_file(format::CURRENT_VERSION, &payload))
    }

    /// Deserialize a holdings collection from file bytes.
    pub fn load_from_bytes(data: &[u8]) -> Result<Vec<Holding>, CoreError> {
        let (_version, payload) = format::read_file(data)?;
        bincode::deserialize(payload)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize holdings: {e}")))
    }

    /// Save the holdings collection to a file on disk.
    pub fn save_to_file(holdings: &[Holding], path: impl AsRef<Path>) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(holdings)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a holdings collection from a file on disk.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Vec<Holding>, CoreError> {
        let bytes = std::fs::read(path)?;
        Self::load_from_bytes(&bytes)
    }
}

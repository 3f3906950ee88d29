//! Chat repository trait.
//!
//! Defines the interface for durable chat persistence.

use super::model::Chat;
use crate::error::Result;

/// An abstract repository for durable chat storage.
///
/// This trait defines the contract for persisting and retrieving chats,
/// decoupling the application's core logic from the specific storage
/// mechanism (e.g., a directory of TOML files, or an in-memory double in
/// tests).
///
/// The store is single-writer, single-process: implementations provide no
/// locking or cross-process coordination. Two processes pointed at the same
/// storage location are last-writer-wins per record, and their in-memory
/// listings may silently diverge.
pub trait ChatRepository: Send + Sync {
    /// Loads every stored chat, sorted by `updated_at` descending (most
    /// recently updated first, stable order on ties).
    ///
    /// A record that fails to parse is skipped and reported; it never
    /// prevents the remaining records from loading.
    fn load_all(&self) -> Result<Vec<Chat>>;

    /// Persists a chat, overwriting any existing record with the same id.
    fn save(&self, chat: &Chat) -> Result<()>;

    /// Removes the durable record for `chat_id`.
    ///
    /// Deleting a record that does not exist is not an error.
    fn delete(&self, chat_id: &str) -> Result<()>;
}

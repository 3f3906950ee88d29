//! Chat domain module.
//!
//! This module contains the chat domain models, the repository interface
//! for durable chat storage, and the manager that owns the in-memory chat
//! listing and the current-chat cursor.
//!
//! # Module Structure
//!
//! - `model`: Core chat domain model (`Chat`) and title derivation
//! - `message`: Chat message types (`MessageRole`, `ChatMessage`)
//! - `repository`: Repository trait for chat persistence
//! - `manager`: Chat lifecycle and session-cursor management (`ChatsManager`)

mod manager;
mod message;
mod model;
mod repository;

// Re-export public API
pub use manager::ChatsManager;
pub use message::{ChatMessage, MessageRole};
pub use model::{derive_title, Chat, DEFAULT_TITLE, TITLE_MAX_CHARS};
pub use repository::ChatRepository;

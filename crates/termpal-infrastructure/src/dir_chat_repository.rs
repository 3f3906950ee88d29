//! Directory-backed ChatRepository implementation.
//!
//! Stores one TOML document per chat under `<base>/chats/`, plus nothing
//! else: the record file is the whole durable state for a chat.

use std::fs;
use std::path::{Path, PathBuf};
use termpal_core::chat::{Chat, ChatRepository};
use termpal_core::error::Result;

/// Returns the record file name for a chat id.
///
/// Kept as a pure mapping, separate from filesystem access, so it can be
/// unit-tested without touching a disk.
pub fn chat_file_name(chat_id: &str) -> String {
    format!("{}.toml", chat_id)
}

/// A repository implementation storing each chat as an individual TOML file.
///
/// Directory structure:
/// ```text
/// base_dir/
/// └── chats/
///     ├── chat-id-1.toml
///     └── chat-id-2.toml
/// ```
///
/// Single-process, single-writer: there is no locking and no versioning.
/// Two processes sharing a base directory are last-writer-wins per file.
pub struct DirChatRepository {
    chats_dir: PathBuf,
}

impl DirChatRepository {
    /// Creates a repository rooted at `base_dir`, ensuring `<base>/chats`
    /// exists.
    ///
    /// A failed directory creation is reported and does not fail
    /// construction: the repository then operates degraded for the session
    /// (loads yield nothing, saves fail and are reported by the caller).
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        let chats_dir = base_dir.as_ref().join("chats");
        if let Err(e) = fs::create_dir_all(&chats_dir) {
            tracing::error!("Failed to create chats directory {:?}: {}", chats_dir, e);
        }
        Self { chats_dir }
    }

    /// Returns the record file path for a given chat ID.
    fn chat_file_path(&self, chat_id: &str) -> PathBuf {
        self.chats_dir.join(chat_file_name(chat_id))
    }

    fn load_chat_from_path(&self, path: &Path) -> Result<Chat> {
        let content = fs::read_to_string(path)?;
        let chat: Chat = toml::from_str(&content)?;
        Ok(chat)
    }
}

impl ChatRepository for DirChatRepository {
    fn load_all(&self) -> Result<Vec<Chat>> {
        // A failed enumeration of the directory itself is reported and
        // yields an empty listing; it is never fatal to the process.
        let entries = match fs::read_dir(&self.chats_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(
                    "Failed to read chats directory {:?}: {}",
                    self.chats_dir,
                    e
                );
                return Ok(Vec::new());
            }
        };

        let mut chats = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                continue;
            }

            match self.load_chat_from_path(&path) {
                Ok(chat) => chats.push(chat),
                Err(e) => {
                    // A single corrupt record never prevents the rest from loading.
                    tracing::warn!("Skipping unreadable chat file {:?}: {}", path, e);
                }
            }
        }

        // Most recently updated first; the sort is stable, so ties keep
        // their enumeration order.
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(chats)
    }

    fn save(&self, chat: &Chat) -> Result<()> {
        let path = self.chat_file_path(&chat.id);
        let content = toml::to_string_pretty(chat)?;

        // Write to a .tmp sibling then rename into place so a reader never
        // observes a half-written record.
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;

        Ok(())
    }

    fn delete(&self, chat_id: &str) -> Result<()> {
        let path = self.chat_file_path(chat_id);

        if path.exists() {
            fs::remove_file(&path)?;
        }

        Ok(())
    }
}

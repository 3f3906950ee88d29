use super::message::{ChatMessage, MessageRole};
use super::model::{self, Chat};
use super::repository::ChatRepository;
use crate::clock::Clock;
use std::sync::Arc;
use uuid::Uuid;

/// Owns the in-memory chat listing and the current-chat cursor.
///
/// `ChatsManager` is responsible for:
/// - Creating new chats
/// - Appending messages and deriving titles
/// - Deleting chats
/// - Tracking which single chat is "current" for the session
/// - Mirroring every in-memory mutation to durable storage
///
/// Construction performs the bulk load from the repository. Every public
/// operation is total: storage failures are reported through the tracing
/// channel and never raised past the operation, so the application keeps
/// running in a degraded state instead of crashing on a full disk or a bad
/// record. After a reported write failure the in-memory and durable state
/// may have diverged; this is a documented limitation, not rolled back.
pub struct ChatsManager {
    /// In-memory chat listing, newest-created-or-updated first.
    chats: Vec<Chat>,
    /// The session cursor: id of the chat considered active, if any.
    current_chat_id: Option<String>,
    /// Persistent storage backend for chat records.
    repository: Arc<dyn ChatRepository>,
    /// Time source for creation and append timestamps.
    clock: Arc<dyn Clock>,
}

impl ChatsManager {
    /// Creates a `ChatsManager` and loads all persisted chats.
    ///
    /// A failed load is reported and leaves the listing empty; construction
    /// itself cannot fail. No chat is auto-selected after the load — binding
    /// the cursor is always an explicit act of the caller.
    pub fn new(repository: Arc<dyn ChatRepository>, clock: Arc<dyn Clock>) -> Self {
        let chats = match repository.load_all() {
            Ok(chats) => chats,
            Err(e) => {
                tracing::error!("Failed to load chats: {}", e);
                Vec::new()
            }
        };

        Self {
            chats,
            current_chat_id: None,
            repository,
            clock,
        }
    }

    /// Creates a new empty chat, makes it current, and persists it.
    ///
    /// The chat is inserted at the head of the listing; the listing is not
    /// re-sorted. Returns a copy of the new chat.
    pub fn create_new_chat(&mut self) -> Chat {
        let now = self.clock.now();
        let chat = Chat::new(Uuid::new_v4().to_string(), now);

        self.chats.insert(0, chat.clone());
        self.current_chat_id = Some(chat.id.clone());
        self.persist(&chat);
        chat
    }

    /// Appends a message to the chat with the given id and persists it.
    ///
    /// Unknown ids are a silent no-op. The very first message appended to a
    /// chat, if authored by the user, derives the chat title from its
    /// content; no later append ever changes the title.
    pub fn add_message(&mut self, chat_id: &str, role: MessageRole, content: &str) {
        let now = self.clock.now();
        let Some(chat) = self.chats.iter_mut().find(|c| c.id == chat_id) else {
            return;
        };

        chat.messages.push(ChatMessage {
            role,
            content: content.to_string(),
            timestamp: now,
        });
        chat.updated_at = now;

        // Only the very first append, and only when user-authored, sets the title.
        if chat.messages.len() == 1 && role == MessageRole::User {
            chat.title = model::derive_title(content);
        }

        let chat = chat.clone();
        self.persist(&chat);
    }

    /// Deletes a chat from both the listing and durable storage.
    ///
    /// Unknown ids are a silent no-op. If the deleted chat was current, the
    /// cursor moves to the chat now at the head of the listing, or becomes
    /// unset when no chats remain.
    pub fn delete_chat(&mut self, chat_id: &str) {
        let Some(index) = self.chats.iter().position(|c| c.id == chat_id) else {
            return;
        };
        self.chats.remove(index);

        if let Err(e) = self.repository.delete(chat_id) {
            tracing::warn!("Failed to delete chat {}: {}", chat_id, e);
        }

        if self.current_chat_id.as_deref() == Some(chat_id) {
            self.current_chat_id = self.chats.first().map(|c| c.id.clone());
        }
    }

    /// Binds the cursor to the chat with the given id.
    ///
    /// If no chat with this id exists in memory, the cursor is unchanged.
    pub fn set_current_chat(&mut self, chat_id: &str) {
        if self.chats.iter().any(|c| c.id == chat_id) {
            self.current_chat_id = Some(chat_id.to_string());
        }
    }

    /// Returns a copy of the current chat, or `None` when the cursor is
    /// unset or references an id no longer present.
    pub fn current_chat(&self) -> Option<Chat> {
        let id = self.current_chat_id.as_deref()?;
        self.chats.iter().find(|c| c.id == id).cloned()
    }

    /// Returns the id of the current chat, if any.
    pub fn current_chat_id(&self) -> Option<&str> {
        self.current_chat_id.as_deref()
    }

    /// Returns an independent snapshot of the chat listing in its current
    /// order. Mutating the returned vector never affects internal state.
    pub fn chats(&self) -> Vec<Chat> {
        self.chats.clone()
    }

    fn persist(&self, chat: &Chat) {
        // In-memory state is not rolled back on a failed write; the durable
        // copy may lag behind until the next successful save.
        if let Err(e) = self.repository.save(chat) {
            tracing::warn!("Failed to save chat {}: {}", chat.id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TermpalError;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Mock ChatRepository for testing
    struct MockChatRepository {
        chats: Mutex<HashMap<String, Chat>>,
        fail_loads: bool,
        fail_writes: bool,
    }

    impl MockChatRepository {
        fn new() -> Self {
            Self {
                chats: Mutex::new(HashMap::new()),
                fail_loads: false,
                fail_writes: false,
            }
        }

        fn failing_loads() -> Self {
            Self {
                fail_loads: true,
                ..Self::new()
            }
        }

        fn failing_writes() -> Self {
            Self {
                fail_writes: true,
                ..Self::new()
            }
        }

        fn stored(&self) -> HashMap<String, Chat> {
            self.chats.lock().unwrap().clone()
        }
    }

    impl ChatRepository for MockChatRepository {
        fn load_all(&self) -> crate::error::Result<Vec<Chat>> {
            if self.fail_loads {
                return Err(TermpalError::io("disk on fire"));
            }
            let chats = self.chats.lock().unwrap();
            let mut all: Vec<Chat> = chats.values().cloned().collect();
            all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            Ok(all)
        }

        fn save(&self, chat: &Chat) -> crate::error::Result<()> {
            if self.fail_writes {
                return Err(TermpalError::io("disk full"));
            }
            let mut chats = self.chats.lock().unwrap();
            chats.insert(chat.id.clone(), chat.clone());
            Ok(())
        }

        fn delete(&self, chat_id: &str) -> crate::error::Result<()> {
            if self.fail_writes {
                return Err(TermpalError::io("disk full"));
            }
            let mut chats = self.chats.lock().unwrap();
            chats.remove(chat_id);
            Ok(())
        }
    }

    // Manually advanced clock so timestamps are deterministic
    struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            }
        }

        fn advance(&self, seconds: i64) {
            let mut now = self.now.lock().unwrap();
            *now += Duration::seconds(seconds);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    fn manager_with(repository: Arc<MockChatRepository>) -> (ChatsManager, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let manager = ChatsManager::new(repository, clock.clone());
        (manager, clock)
    }

    #[test]
    fn create_new_chat_binds_cursor_and_persists() {
        let repository = Arc::new(MockChatRepository::new());
        let (mut manager, _clock) = manager_with(repository.clone());

        let chat = manager.create_new_chat();

        assert_eq!(chat.title, model::DEFAULT_TITLE);
        assert!(chat.messages.is_empty());
        assert_eq!(chat.created_at, chat.updated_at);
        assert_eq!(manager.current_chat_id(), Some(chat.id.as_str()));
        assert!(repository.stored().contains_key(&chat.id));
    }

    #[test]
    fn create_new_chat_inserts_at_head() {
        let repository = Arc::new(MockChatRepository::new());
        let (mut manager, _clock) = manager_with(repository);

        let first = manager.create_new_chat();
        let second = manager.create_new_chat();

        let ids: Vec<String> = manager.chats().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn chat_ids_are_unique() {
        let repository = Arc::new(MockChatRepository::new());
        let (mut manager, _clock) = manager_with(repository);

        let a = manager.create_new_chat();
        let b = manager.create_new_chat();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn first_user_message_derives_title() {
        let repository = Arc::new(MockChatRepository::new());
        let (mut manager, clock) = manager_with(repository.clone());

        let chat = manager.create_new_chat();
        clock.advance(1);
        let content = "Hello world, this is a long test message";
        manager.add_message(&chat.id, MessageRole::User, content);

        let current = manager.current_chat().unwrap();
        assert_eq!(current.title, "Hello world, this is a long te...");
        assert_eq!(current.messages.len(), 1);
        assert!(current.updated_at > current.created_at);
        // Persisted copy carries the derived title too
        assert_eq!(repository.stored()[&chat.id].title, current.title);
    }

    #[test]
    fn title_is_never_revisited_after_first_append() {
        let repository = Arc::new(MockChatRepository::new());
        let (mut manager, clock) = manager_with(repository);

        let chat = manager.create_new_chat();
        manager.add_message(&chat.id, MessageRole::User, "first question");
        clock.advance(1);
        manager.add_message(&chat.id, MessageRole::Assistant, "an answer");
        clock.advance(1);
        manager.add_message(&chat.id, MessageRole::User, "a completely different topic");

        assert_eq!(manager.current_chat().unwrap().title, "first question");
    }

    #[test]
    fn assistant_first_message_leaves_default_title_forever() {
        let repository = Arc::new(MockChatRepository::new());
        let (mut manager, _clock) = manager_with(repository);

        let chat = manager.create_new_chat();
        manager.add_message(&chat.id, MessageRole::Assistant, "greetings");
        manager.add_message(&chat.id, MessageRole::User, "hello there");

        // Only the very first append can derive the title.
        assert_eq!(manager.current_chat().unwrap().title, model::DEFAULT_TITLE);
    }

    #[test]
    fn add_message_preserves_insertion_order() {
        let repository = Arc::new(MockChatRepository::new());
        let (mut manager, clock) = manager_with(repository);

        let chat = manager.create_new_chat();
        for i in 0..5 {
            let role = if i % 2 == 0 {
                MessageRole::User
            } else {
                MessageRole::Assistant
            };
            manager.add_message(&chat.id, role, &format!("message {}", i));
            clock.advance(1);
        }

        let contents: Vec<String> = manager
            .current_chat()
            .unwrap()
            .messages
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(
            contents,
            vec![
                "message 0",
                "message 1",
                "message 2",
                "message 3",
                "message 4"
            ]
        );
    }

    #[test]
    fn add_message_unknown_id_changes_nothing() {
        let repository = Arc::new(MockChatRepository::new());
        let (mut manager, _clock) = manager_with(repository.clone());

        let chat = manager.create_new_chat();
        let before_listing = manager.chats();
        let before_stored = repository.stored();

        manager.add_message("nonexistent", MessageRole::User, "x");

        assert_eq!(manager.chats(), before_listing);
        assert_eq!(repository.stored(), before_stored);
        assert_eq!(manager.current_chat_id(), Some(chat.id.as_str()));
    }

    #[test]
    fn delete_unknown_id_changes_nothing() {
        let repository = Arc::new(MockChatRepository::new());
        let (mut manager, _clock) = manager_with(repository.clone());

        let chat = manager.create_new_chat();
        let before_stored = repository.stored();

        manager.delete_chat("nonexistent");

        assert_eq!(manager.chats().len(), 1);
        assert_eq!(repository.stored(), before_stored);
        assert_eq!(manager.current_chat_id(), Some(chat.id.as_str()));
    }

    #[test]
    fn deleting_current_chat_rebinds_cursor_to_head() {
        let repository = Arc::new(MockChatRepository::new());
        let (mut manager, _clock) = manager_with(repository.clone());

        let other = manager.create_new_chat();
        let current = manager.create_new_chat();
        assert_eq!(manager.current_chat_id(), Some(current.id.as_str()));

        manager.delete_chat(&current.id);

        assert_eq!(manager.current_chat().unwrap().id, other.id);
        assert!(!repository.stored().contains_key(&current.id));
    }

    #[test]
    fn deleting_last_chat_unsets_cursor() {
        let repository = Arc::new(MockChatRepository::new());
        let (mut manager, _clock) = manager_with(repository);

        let chat = manager.create_new_chat();
        manager.delete_chat(&chat.id);

        assert!(manager.current_chat().is_none());
        assert!(manager.chats().is_empty());
    }

    #[test]
    fn deleting_non_current_chat_leaves_cursor_alone() {
        let repository = Arc::new(MockChatRepository::new());
        let (mut manager, _clock) = manager_with(repository);

        let older = manager.create_new_chat();
        let current = manager.create_new_chat();

        manager.delete_chat(&older.id);

        assert_eq!(manager.current_chat_id(), Some(current.id.as_str()));
    }

    #[test]
    fn set_current_chat_unknown_id_is_noop() {
        let repository = Arc::new(MockChatRepository::new());
        let (mut manager, _clock) = manager_with(repository);

        let chat = manager.create_new_chat();
        manager.set_current_chat("nonexistent");

        assert_eq!(manager.current_chat_id(), Some(chat.id.as_str()));
    }

    #[test]
    fn set_current_chat_switches_between_existing_chats() {
        let repository = Arc::new(MockChatRepository::new());
        let (mut manager, _clock) = manager_with(repository);

        let first = manager.create_new_chat();
        let _second = manager.create_new_chat();

        manager.set_current_chat(&first.id);

        assert_eq!(manager.current_chat_id(), Some(first.id.as_str()));
    }

    #[test]
    fn no_chat_is_auto_selected_after_load() {
        let repository = Arc::new(MockChatRepository::new());
        {
            let (mut manager, _clock) = manager_with(repository.clone());
            manager.create_new_chat();
        }

        let (manager, _clock) = manager_with(repository);
        assert_eq!(manager.chats().len(), 1);
        assert!(manager.current_chat().is_none());
    }

    #[test]
    fn listing_snapshot_is_independent() {
        let repository = Arc::new(MockChatRepository::new());
        let (mut manager, _clock) = manager_with(repository);

        manager.create_new_chat();
        let mut snapshot = manager.chats();
        snapshot.clear();

        assert_eq!(manager.chats().len(), 1);
    }

    #[test]
    fn failed_load_yields_empty_listing() {
        let repository = Arc::new(MockChatRepository::failing_loads());
        let (manager, _clock) = manager_with(repository);

        assert!(manager.chats().is_empty());
        assert!(manager.current_chat().is_none());
    }

    #[test]
    fn failed_save_keeps_in_memory_state() {
        let repository = Arc::new(MockChatRepository::failing_writes());
        let (mut manager, _clock) = manager_with(repository.clone());

        let chat = manager.create_new_chat();
        manager.add_message(&chat.id, MessageRole::User, "hello");

        // The operation stays total: in-memory state advanced even though
        // nothing reached durable storage.
        assert_eq!(manager.current_chat().unwrap().messages.len(), 1);
        assert!(repository.stored().is_empty());
    }
}

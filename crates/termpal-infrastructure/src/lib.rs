pub mod config;
pub mod dir_chat_repository;
pub mod paths;

pub use crate::config::Config;
pub use crate::dir_chat_repository::DirChatRepository;
pub use crate::paths::TermpalPaths;

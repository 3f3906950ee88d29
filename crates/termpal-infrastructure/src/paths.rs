//! Unified path management for termpal files.
//!
//! All termpal data lives under a single private base directory in the
//! user's home, so paths are resolved in one place for consistency across
//! platforms.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for termpal.
///
/// # Directory Structure
///
/// ```text
/// ~/.termpal/                  # Base directory
/// ├── config.toml              # Application configuration
/// ├── memory.txt               # Free-form assistant memory
/// ├── chats/                   # One TOML record per chat
/// │   ├── <chat-id-1>.toml
/// │   └── <chat-id-2>.toml
/// ├── workflows/               # Generated workflow scripts
/// └── plugins/                 # User-provided plugins
/// ```
pub struct TermpalPaths;

impl TermpalPaths {
    /// Returns the termpal base directory (`~/.termpal`).
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to the base directory
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine the home directory
    pub fn base_dir() -> Result<PathBuf, PathError> {
        dirs::home_dir()
            .map(|home| home.join(".termpal"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the directory holding one record file per chat.
    pub fn chats_dir() -> Result<PathBuf, PathError> {
        Ok(Self::base_dir()?.join("chats"))
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::base_dir()?.join("config.toml"))
    }

    /// Returns the path to the free-form memory file.
    pub fn memory_file() -> Result<PathBuf, PathError> {
        Ok(Self::base_dir()?.join("memory.txt"))
    }

    /// Returns the directory for generated workflow scripts.
    pub fn workflows_dir() -> Result<PathBuf, PathError> {
        Ok(Self::base_dir()?.join("workflows"))
    }

    /// Returns the directory for user-provided plugins.
    pub fn plugins_dir() -> Result<PathBuf, PathError> {
        Ok(Self::base_dir()?.join("plugins"))
    }
}

pub mod chat;
pub mod clock;
pub mod error;

// Re-export common error type
pub use error::TermpalError;

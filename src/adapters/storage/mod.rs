//! Storage Adapters
//!
//! Implementations of the `SessionStore` port.
//!
//! ## Available Adapters
//!
//! - **FileSessionStore** - JSON file on disk, survives restarts
//! - **InMemorySessionStore** - process memory only (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileSessionStore, InMemorySessionStore};
//!
//! // Production: file-backed store
//! let store = FileSessionStore::open(".lms-admin/session.json").await?;
//!
//! // Testing: in-memory store
//! let store = InMemorySessionStore::new();
//! ```

mod file_session_store;
mod in_memory_session_store;

pub use file_session_store::FileSessionStore;
pub use in_memory_session_store::InMemorySessionStore;

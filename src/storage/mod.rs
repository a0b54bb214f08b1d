// src/storage/mod.rs

//! Persistence for the signed-in session.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml     # Client configuration
//! └── session.json    # Token pair, user, last validation time
//! ```

pub mod local;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::StoredSession;

pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Trait for session storage backends.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Load the persisted session, `None` if there is none.
    async fn load(&self) -> Result<Option<StoredSession>>;

    /// Persist the session, replacing any previous one.
    async fn save(&self, session: &StoredSession) -> Result<()>;

    /// Remove the persisted session. Removing a missing session is not an error.
    async fn clear(&self) -> Result<()>;
}

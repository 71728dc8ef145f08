/// Local persistence of the current user.
///
/// A single record under a fixed location; an absent record means logged out.
/// Access is synchronous and fast, so the session calls it while holding its
/// state lock.
use crate::error::AppResult;
use crate::models::User;

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Store capability injected into the session at construction.
pub trait UserStore: Send + Sync {
    /// Returns the persisted user, or `None` when logged out or unreadable.
    fn load(&self) -> Option<User>;

    fn save(&self, user: &User) -> AppResult<()>;

    /// Removes the record. Clearing an absent record is not an error.
    fn clear(&self) -> AppResult<()>;
}

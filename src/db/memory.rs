use std::sync::Mutex;

use crate::error::AppResult;
use crate::models::User;

use super::UserStore;

/// In-memory store. Used by tests and ephemeral runs; state is lost on exit.
pub struct MemoryStore {
    slot: Mutex<Option<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for MemoryStore {
    fn load(&self) -> Option<User> {
        self.slot.lock().unwrap().clone()
    }

    fn save(&self, user: &User) -> AppResult<()> {
        *self.slot.lock().unwrap() = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        self.slot.lock().unwrap().take();
        Ok(())
    }
}

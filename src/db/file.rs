use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::AppResult;
use crate::models::User;

use super::UserStore;

/// File-backed store holding the serialized user as one JSON record.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl UserStore for JsonFileStore {
    fn load(&self) -> Option<User> {
        let bytes = fs::read(&self.path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    path = %self.path.display(),
                    "Ignoring unreadable user record"
                );
                None
            }
        }
    }

    fn save(&self, user: &User) -> AppResult<()> {
        let bytes = serde_json::to_vec(user)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> JsonFileStore {
        let path = std::env::temp_dir().join(format!("cinematch-{}-{}", std::process::id(), name));
        let _ = fs::remove_file(&path);
        JsonFileStore::new(path)
    }

    #[test]
    fn test_load_absent_is_logged_out() {
        let store = temp_store("absent.json");
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_save_then_load() {
        let store = temp_store("roundtrip.json");
        let user = User {
            name: "Ann".to_string(),
        };

        store.save(&user).unwrap();
        assert_eq!(store.load(), Some(user));

        store.clear().unwrap();
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = temp_store("clear.json");
        let user = User {
            name: "Ann".to_string(),
        };

        store.save(&user).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load(), None);

        // Clearing again must not fail.
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_record_reads_as_logged_out() {
        let store = temp_store("corrupt.json");
        fs::write(&store.path, b"not json").unwrap();

        assert_eq!(store.load(), None);

        store.clear().unwrap();
    }
}

use anyhow::Result;
use tracing::{debug, warn};

use super::storage::{ClientStorage, TOKEN_KEY};

/// Holds the bearer credential for the running page.
///
/// Storage is read once, when the session is loaded. After that the
/// in-memory copy is authoritative until `sign_in`/`sign_out` change both.
pub struct Session {
    storage: Box<dyn ClientStorage>,
    token: Option<String>,
}

impl Session {
    /// Load the credential from storage.
    /// An unreadable store is treated as signed out.
    pub fn load(storage: Box<dyn ClientStorage>) -> Self {
        let token = match storage.get_item(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read stored credential");
                None
            }
        };
        debug!(has_token = token.is_some(), "Session loaded");
        Self { storage, token }
    }

    /// Get the bearer token if signed in
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Store a freshly issued token.
    /// The in-memory credential is updated even if persisting it fails.
    pub fn sign_in(&mut self, token: String) -> Result<()> {
        let persisted = self.storage.set_item(TOKEN_KEY, &token);
        self.token = Some(token).filter(|t| !t.is_empty());
        persisted
    }

    /// Remove the credential from storage and memory.
    /// The in-memory credential is cleared even if storage removal fails.
    pub fn sign_out(&mut self) -> Result<()> {
        let removed = self.storage.remove_item(TOKEN_KEY);
        self.token = None;
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStorage;

    #[test]
    fn test_load_reads_stored_token() {
        let session = Session::load(Box::new(MemoryStorage::with_item(TOKEN_KEY, "jwt")));
        assert_eq!(session.token(), Some("jwt"));
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_load_without_token() {
        let session = Session::load(Box::new(MemoryStorage::new()));
        assert_eq!(session.token(), None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_empty_token_counts_as_absent() {
        let session = Session::load(Box::new(MemoryStorage::with_item(TOKEN_KEY, "")));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_storage_read_once() {
        let storage = MemoryStorage::new();
        let session = Session::load(Box::new(storage.clone()));
        // A token written by someone else after load is not picked up
        storage.set_item(TOKEN_KEY, "late").unwrap();
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_sign_in_and_out() {
        let storage = MemoryStorage::new();
        let mut session = Session::load(Box::new(storage.clone()));

        session.sign_in("fresh".to_string()).unwrap();
        assert_eq!(session.token(), Some("fresh"));
        assert_eq!(storage.get_item(TOKEN_KEY).unwrap().as_deref(), Some("fresh"));

        session.sign_out().unwrap();
        assert_eq!(session.token(), None);
        assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
    }
}

// ============================================================================
// TOKEN STORAGE - Bearer token persistence
// ============================================================================
// The browser build keeps the token in localStorage under `token`; tests and
// non-browser targets use the in-memory store.
// ============================================================================

use std::cell::RefCell;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("localStorage is not available")]
    Unavailable,
    #[error("failed to write to localStorage: {0}")]
    Write(String),
}

/// Where the session token survives reloads
pub trait TokenStore {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RefCell<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RefCell::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        *self.token.borrow_mut() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.token.borrow_mut() = None;
        Ok(())
    }
}

/// Keeps the last written token in memory in front of a persistent store, so
/// the running page keeps its bearer even when persisting fails
pub struct MirroredTokenStore<S> {
    inner: S,
    // `None` until the first save/clear; reads go to `inner` until then
    mirror: RefCell<Option<Option<String>>>,
}

impl<S: TokenStore> MirroredTokenStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            mirror: RefCell::new(None),
        }
    }
}

impl<S: TokenStore> TokenStore for MirroredTokenStore<S> {
    fn load(&self) -> Option<String> {
        match self.mirror.borrow().as_ref() {
            Some(known) => known.clone(),
            None => self.inner.load(),
        }
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        *self.mirror.borrow_mut() = Some(Some(token.to_string()));
        self.inner.save(token)
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.mirror.borrow_mut() = Some(None);
        self.inner.clear()
    }
}

#[cfg(target_arch = "wasm32")]
pub use local::LocalTokenStore;

#[cfg(target_arch = "wasm32")]
mod local {
    use super::{StorageError, TokenStore};
    use web_sys::{window, Storage};

    fn get_local_storage() -> Option<Storage> {
        window()?.local_storage().ok()?
    }

    /// localStorage-backed store; the raw token string is stored as-is
    pub struct LocalTokenStore {
        key: &'static str,
    }

    impl LocalTokenStore {
        pub fn new(key: &'static str) -> Self {
            Self { key }
        }
    }

    impl TokenStore for LocalTokenStore {
        fn load(&self) -> Option<String> {
            let storage = get_local_storage()?;
            storage
                .get_item(self.key)
                .ok()
                .flatten()
                .filter(|token| !token.trim().is_empty())
        }

        fn save(&self, token: &str) -> Result<(), StorageError> {
            let storage = get_local_storage().ok_or(StorageError::Unavailable)?;
            storage
                .set_item(self.key, token)
                .map_err(|e| StorageError::Write(format!("{:?}", e)))
        }

        fn clear(&self) -> Result<(), StorageError> {
            let storage = get_local_storage().ok_or(StorageError::Unavailable)?;
            storage
                .remove_item(self.key)
                .map_err(|e| StorageError::Write(format!("{:?}", e)))
        }
    }
}

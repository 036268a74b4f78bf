//! Credential lookup.
//!
//! The client never keeps a copy of the access token: `AuthInterceptor` asks
//! its `TokenStore` on every request, so a login or logout is visible to the
//! very next call.

use std::sync::RwLock;

use crate::error::TokenStoreError;

/// Read-only source of the current bearer token.
pub trait TokenStore: Send + Sync {
    /// `Ok(None)` means the user is not signed in.
    fn access_token(&self) -> Result<Option<String>, TokenStoreError>;
}

/// A store that never holds a token.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenStore for NoToken {
    fn access_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(None)
    }
}

impl TokenStore for Option<String> {
    fn access_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.clone())
    }
}

/// In-process token store, the session-storage equivalent for native hosts.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    pub fn set(&self, token: impl Into<String>) -> Result<(), TokenStoreError> {
        let mut guard = self
            .token
            .write()
            .map_err(|e| TokenStoreError(e.to_string()))?;
        *guard = Some(token.into());
        Ok(())
    }

    pub fn clear(&self) -> Result<(), TokenStoreError> {
        let mut guard = self
            .token
            .write()
            .map_err(|e| TokenStoreError(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Result<Option<String>, TokenStoreError> {
        self.token
            .read()
            .map(|guard| guard.clone())
            .map_err(|e| TokenStoreError(e.to_string()))
    }
}

//! Shared auth token cell
//!
//! The session store is the single writer; every other component holds
//! a read-only clone. This replaces the scattered global auth-header
//! mutation the UI code used to do.

use std::sync::{Arc, RwLock};

/// Cheaply clonable handle to the current bearer token
#[derive(Debug, Clone, Default)]
pub struct TokenCell {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current token. Writer: session store only.
    pub fn set(&self, token: impl Into<String>) {
        *self.inner.write().expect("token lock poisoned") = Some(token.into());
    }

    /// Drop the current token
    pub fn clear(&self) {
        *self.inner.write().expect("token lock poisoned") = None;
    }

    /// Current token, if any
    pub fn get(&self) -> Option<String> {
        self.inner.read().expect("token lock poisoned").clone()
    }

    pub fn is_set(&self) -> bool {
        self.inner.read().expect("token lock poisoned").is_some()
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Session principal, injected into screens and services.

use std::sync::Arc;
use tokio::sync::watch;

/// Authenticated principal supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Shared handle to the current session.
///
/// Clones observe the same session. The auth service publishes sign-in and
/// sign-out through [`SessionHandle::set`]; screens read [`SessionHandle::current`]
/// at the moment of each action.
#[derive(Clone)]
pub struct SessionHandle {
    tx: Arc<watch::Sender<Option<Identity>>>,
}

impl SessionHandle {
    /// Signed-out session.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Session fixed to an identity (or to signed-out with `None`).
    pub fn fixed(identity: Option<Identity>) -> Self {
        let session = Self::new();
        session.set(identity);
        session
    }

    pub fn current(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Replace the principal and notify watchers.
    pub fn set(&self, identity: Option<Identity>) {
        match &identity {
            Some(id) => tracing::info!(uid = %id.uid, "Session signed in"),
            None => tracing::info!("Session signed out"),
        }
        self.tx.send_replace(identity);
    }

    /// Session-change subscription.
    pub fn watch(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

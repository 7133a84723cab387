// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Debounced keyword search.
//!
//! Input is trimmed and lowercased and must be at least two characters. The
//! result set is every recipe whose `keywords` contains that exact token:
//! "past" does not match a recipe tagged "pasta". A query runs only after the
//! input has been quiet for the debounce delay; a newer keystroke discards any
//! older pending query or in-flight response.

use crate::db::{RecipeQuery, RecipeStore};
use crate::mirror::{MirrorOrder, ScreenState, ScreenView};
use crate::models::recipe::MIN_KEYWORD_LEN;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const SEARCH_FAILURE: &str = "Error searching recipes.";

/// Normalize raw input into a search token, or `None` if too short.
pub fn normalize_query(input: &str) -> Option<String> {
    let token = input.trim().to_lowercase();
    (token.chars().count() >= MIN_KEYWORD_LEN).then_some(token)
}

pub struct SearchScreen<S> {
    store: S,
    debounce: Duration,
    state: Arc<ScreenState>,
    /// Bumped on every keystroke; responses for older values are dropped
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<S: RecipeStore> SearchScreen<S> {
    pub fn new(store: S, debounce: Duration) -> Self {
        Self {
            store,
            debounce,
            state: Arc::new(ScreenState::new(MirrorOrder::NewestFirst)),
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
        }
    }

    pub fn view(&self) -> ScreenView {
        self.state.view()
    }

    pub fn state(&self) -> &Arc<ScreenState> {
        &self.state
    }

    /// Handle a change of the search box.
    ///
    /// Short or empty input clears results at once and issues no query.
    /// Must be called from within a tokio runtime.
    pub fn on_input(&self, input: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let mut pending = self.pending_slot();
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let Some(token) = normalize_query(input) else {
            self.state.reset();
            return;
        };

        self.state.begin_loading();
        let store = self.store.clone();
        let debounce = self.debounce;
        let latest = Arc::clone(&self.generation);
        let state = Arc::downgrade(&self.state);

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if latest.load(Ordering::SeqCst) != generation {
                return;
            }

            tracing::debug!(token = %token, "Keyword search");
            let result = store.query(&RecipeQuery::Keyword(token.clone())).await;

            let Some(state) = state.upgrade() else {
                return;
            };
            // Checked under the state lock: a newer keystroke that already
            // cleared or restarted the search always wins.
            let is_current = || latest.load(Ordering::SeqCst) == generation;
            let applied = match result {
                Ok(items) => state.apply_if(is_current, items),
                Err(e) => {
                    tracing::error!(error = %e, token = %token, "Search failed");
                    state.fail_if(is_current, SEARCH_FAILURE)
                }
            };
            if !applied {
                tracing::debug!(token = %token, "Discarding stale search response");
            }
        }));
    }

    fn pending_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S> Drop for SearchScreen<S> {
    fn drop(&mut self) {
        let slot = self
            .pending
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(pending) = slot.take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  Pasta "), Some("pasta".to_string()));
        assert_eq!(normalize_query("a"), None);
        assert_eq!(normalize_query("   "), None);
        assert_eq!(normalize_query(" é "), None);
        assert_eq!(normalize_query("Chicken Curry"), Some("chicken curry".to_string()));
    }
}

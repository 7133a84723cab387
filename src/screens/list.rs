// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! List screen with a realtime mirror and optimistic deletes.
//!
//! One instance backs every list-bearing screen. Focus opens exactly one
//! subscription; unfocus tears it down. Snapshots replace the mirror
//! wholesale. A failed delete is reconciled by resubscribing.

use crate::db::{RecipeQuery, RecipeStore, SnapshotEvent};
use crate::error::Result;
use crate::gate::{authorize, GateAction};
use crate::mirror::{MirrorOrder, ScreenState, ScreenView};
use crate::services::{DeleteReport, RecipeService};
use crate::session::Identity;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::task::JoinHandle;

pub const LOAD_FAILURE: &str = "Error loading recipes.";
pub const DELETE_FAILURE: &str = "Failed to delete recipe.";

/// What a list screen mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSource {
    /// A fixed query, independent of who is signed in
    Query(RecipeQuery),
    /// Recipes owned by the signed-in user
    OwnRecipes,
    /// The signed-in user's favorite shadows
    Favorites,
}

impl ListSource {
    /// Query for the current identity; `None` when it needs one and there is none.
    pub fn resolve(&self, identity: Option<&Identity>) -> Option<RecipeQuery> {
        match self {
            ListSource::Query(query) => Some(query.clone()),
            ListSource::OwnRecipes => identity.map(|i| RecipeQuery::OwnedBy(i.uid.clone())),
            ListSource::Favorites => identity.map(|i| RecipeQuery::Favorites(i.uid.clone())),
        }
    }

    fn order(&self) -> MirrorOrder {
        match self {
            ListSource::Query(query) if query.is_server_ordered() => MirrorOrder::AsDelivered,
            _ => MirrorOrder::NewestFirst,
        }
    }
}

pub struct ListScreen<S> {
    service: RecipeService<S>,
    source: ListSource,
    state: Arc<ScreenState>,
    pump: Mutex<Option<JoinHandle<()>>>,
    /// Between `focus` and `unfocus`; independent of whether the pump is still running
    focused: AtomicBool,
}

impl<S: RecipeStore> ListScreen<S> {
    pub fn new(service: RecipeService<S>, source: ListSource) -> Self {
        let state = Arc::new(ScreenState::new(source.order()));
        Self {
            service,
            source,
            state,
            pump: Mutex::new(None),
            focused: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> &Arc<ScreenState> {
        &self.state
    }

    pub fn view(&self) -> ScreenView {
        self.state.view()
    }

    pub fn service(&self) -> &RecipeService<S> {
        &self.service
    }

    pub fn is_focused(&self) -> bool {
        self.focused.load(Ordering::Acquire)
    }

    /// Screen became active: (re)open the subscription.
    ///
    /// Any previous subscription is cancelled first so at most one is live.
    /// Must be called from within a tokio runtime.
    pub fn focus(&self) {
        let mut slot = self.pump_slot();
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        self.focused.store(true, Ordering::Release);

        let Some(query) = self.source.resolve(self.service.session().current().as_ref()) else {
            tracing::debug!(source = ?self.source, "No identity; list left empty");
            self.state.reset();
            return;
        };

        self.state.begin_loading();
        let store = self.service.store().clone();
        let state = Arc::downgrade(&self.state);
        *slot = Some(tokio::spawn(pump(store, query, state)));
    }

    /// Screen became inactive: drop the subscription.
    pub fn unfocus(&self) {
        self.focused.store(false, Ordering::Release);
        if let Some(pump) = self.pump_slot().take() {
            pump.abort();
        }
    }

    /// Resubscribe to replace the mirror with ground truth.
    pub fn resync(&self) {
        tracing::debug!(source = ?self.source, "Resynchronizing list");
        self.focus();
    }

    /// Delete a recipe the signed-in user owns.
    ///
    /// The row disappears immediately. If the remote delete fails the error is
    /// surfaced and the list is resubscribed to restore ground truth.
    pub async fn delete_recipe(&self, id: &str, owner_id: &str) -> Result<DeleteReport> {
        let current = self.service.session().current();
        let identity = match authorize(current.as_ref(), GateAction::DeleteRecipe, Some(owner_id)) {
            Ok(identity) => identity,
            Err(e) => {
                self.state.notify(e.user_message());
                return Err(e);
            }
        };

        self.state.remove(id);

        match self.service.delete_cascade(&identity, id).await {
            Ok(report) => Ok(report),
            Err(e) => {
                let err = e.surfaced(DELETE_FAILURE);
                self.state.notify(err.user_message());
                if self.is_focused() {
                    self.resync();
                }
                Err(err)
            }
        }
    }

    fn pump_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pump
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S> Drop for ListScreen<S> {
    fn drop(&mut self) {
        let slot = self
            .pump
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(pump) = slot.take() {
            pump.abort();
        }
    }
}

/// Feed listener events into the screen until the listener ends, fails, or
/// the screen is gone.
async fn pump<S: RecipeStore>(store: S, query: RecipeQuery, state: Weak<ScreenState>) {
    let mut subscription = match store.subscribe(query.clone()).await {
        Ok(subscription) => subscription,
        Err(e) => {
            tracing::error!(error = %e, query = ?query, "Failed to subscribe");
            if let Some(state) = state.upgrade() {
                state.fail(LOAD_FAILURE);
            }
            return;
        }
    };

    while let Some(event) = subscription.next().await {
        let Some(state) = state.upgrade() else {
            break;
        };
        match event {
            SnapshotEvent::Snapshot(items) => {
                tracing::debug!(query = ?query, count = items.len(), "Snapshot");
                state.apply_snapshot(items);
            }
            SnapshotEvent::Error(message) => {
                // No automatic retry; the next focus resubscribes.
                tracing::error!(error = %message, query = ?query, "Listener failed");
                state.fail(LOAD_FAILURE);
                break;
            }
        }
    }
}

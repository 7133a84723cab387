// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! In-process document store.
//!
//! Mirrors the Firestore contract closely enough to run the app offline and
//! to drive screens in tests: every write re-delivers full snapshots to the
//! affected listeners, remote calls are counted per operation, and individual
//! operations can be made to fail.

use crate::db::{RecipeQuery, RecipeStore, SnapshotEvent, Subscription};
use crate::error::{AppError, Result};
use crate::models::recipe::newest_first;
use crate::models::{Recipe, UserProfile};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Remote operations, for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    GetRecipe,
    PutRecipe,
    DeleteRecipe,
    PutUserRecipe,
    DeleteUserRecipe,
    GetFavorite,
    PutFavorite,
    DeleteFavorite,
    GetProfile,
    PutProfile,
    Query,
    Subscribe,
}

struct Listener {
    id: u64,
    query: RecipeQuery,
    tx: mpsc::UnboundedSender<SnapshotEvent>,
}

#[derive(Default)]
struct Inner {
    recipes: DashMap<String, Recipe>,
    /// Keyed by (uid, recipe id)
    user_recipes: DashMap<(String, String), Recipe>,
    /// Keyed by (uid, recipe id)
    favorites: DashMap<(String, String), Recipe>,
    profiles: DashMap<String, UserProfile>,
    calls: DashMap<StoreOp, usize>,
    /// Remaining injected failures per operation
    failures: DashMap<StoreOp, usize>,
    listeners: Mutex<Vec<Listener>>,
    next_listener_id: AtomicU64,
}

/// In-memory document store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `times` calls of `op` fail with a database error.
    pub fn fail_next(&self, op: StoreOp, times: usize) {
        *self.inner.failures.entry(op).or_insert(0) += times;
    }

    /// How many times `op` has been called (including failed calls).
    pub fn calls(&self, op: StoreOp) -> usize {
        self.inner.calls.get(&op).map(|c| *c).unwrap_or(0)
    }

    /// Number of listeners currently registered.
    pub fn active_listeners(&self) -> usize {
        self.listeners().iter().filter(|l| !l.tx.is_closed()).count()
    }

    /// Break every live listener, as a dropped connection would.
    pub fn fail_listeners(&self, message: &str) {
        let mut listeners = self.listeners();
        for listener in listeners.drain(..) {
            let _ = listener.tx.send(SnapshotEvent::Error(message.to_string()));
        }
    }

    /// Write a recipe without counting the call; listeners still see it.
    pub fn seed_recipe(&self, recipe: Recipe) {
        self.inner.recipes.insert(recipe.id.clone(), recipe);
        self.notify_all();
    }

    pub fn seed_profile(&self, uid: &str, profile: UserProfile) {
        self.inner.profiles.insert(uid.to_string(), profile);
    }

    /// Raw favorite shadows for a user, unsorted.
    pub fn favorite_ids(&self, uid: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .inner
            .favorites
            .iter()
            .filter(|entry| entry.key().0 == uid)
            .map(|entry| entry.key().1.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn has_user_recipe(&self, uid: &str, id: &str) -> bool {
        self.inner
            .user_recipes
            .contains_key(&(uid.to_string(), id.to_string()))
    }

    fn listeners(&self) -> std::sync::MutexGuard<'_, Vec<Listener>> {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count the call and consume an injected failure if one is pending.
    fn begin(&self, op: StoreOp) -> Result<()> {
        *self.inner.calls.entry(op).or_insert(0) += 1;

        let mut injected = false;
        if let Some(mut remaining) = self.inner.failures.get_mut(&op) {
            if *remaining > 0 {
                *remaining -= 1;
                injected = true;
            }
        }

        if injected {
            tracing::debug!(op = ?op, "Injected store failure");
            return Err(AppError::Database(format!("{:?} unavailable", op)));
        }
        Ok(())
    }

    fn evaluate(&self, query: &RecipeQuery) -> Vec<Recipe> {
        let mut items: Vec<Recipe> = match query {
            RecipeQuery::Feed => self.inner.recipes.iter().map(|e| e.value().clone()).collect(),
            RecipeQuery::OwnedBy(uid) => self
                .inner
                .recipes
                .iter()
                .filter(|e| e.value().owner_id == *uid)
                .map(|e| e.value().clone())
                .collect(),
            RecipeQuery::Keyword(token) => self
                .inner
                .recipes
                .iter()
                .filter(|e| e.value().keywords.iter().any(|k| k == token))
                .map(|e| e.value().clone())
                .collect(),
            RecipeQuery::Favorites(uid) => self
                .inner
                .favorites
                .iter()
                .filter(|e| e.key().0 == *uid)
                .map(|e| e.value().clone())
                .collect(),
            RecipeQuery::UserRecipes(uid) => self
                .inner
                .user_recipes
                .iter()
                .filter(|e| e.key().0 == *uid)
                .map(|e| e.value().clone())
                .collect(),
        };

        // Only the feed is ordered server-side; the rest comes back in map order.
        if query.is_server_ordered() {
            items.sort_by(newest_first);
        }
        items
    }

    /// Re-deliver snapshots to every live listener, dropping closed ones.
    fn notify_all(&self) {
        let mut listeners = self.listeners();
        listeners.retain(|listener| {
            let snapshot = self.evaluate(&listener.query);
            listener.tx.send(SnapshotEvent::Snapshot(snapshot)).is_ok()
        });
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn get_recipe(&self, id: &str) -> Result<Option<Recipe>> {
        self.begin(StoreOp::GetRecipe)?;
        Ok(self.inner.recipes.get(id).map(|r| r.value().clone()))
    }

    async fn put_recipe(&self, recipe: &Recipe) -> Result<()> {
        self.begin(StoreOp::PutRecipe)?;
        self.inner.recipes.insert(recipe.id.clone(), recipe.clone());
        self.notify_all();
        Ok(())
    }

    async fn delete_recipe(&self, id: &str) -> Result<()> {
        self.begin(StoreOp::DeleteRecipe)?;
        self.inner.recipes.remove(id);
        self.notify_all();
        Ok(())
    }

    async fn put_user_recipe(&self, uid: &str, recipe: &Recipe) -> Result<()> {
        self.begin(StoreOp::PutUserRecipe)?;
        self.inner
            .user_recipes
            .insert((uid.to_string(), recipe.id.clone()), recipe.clone());
        self.notify_all();
        Ok(())
    }

    async fn delete_user_recipe(&self, uid: &str, id: &str) -> Result<()> {
        self.begin(StoreOp::DeleteUserRecipe)?;
        self.inner
            .user_recipes
            .remove(&(uid.to_string(), id.to_string()));
        self.notify_all();
        Ok(())
    }

    async fn get_favorite(&self, uid: &str, id: &str) -> Result<Option<Recipe>> {
        self.begin(StoreOp::GetFavorite)?;
        Ok(self
            .inner
            .favorites
            .get(&(uid.to_string(), id.to_string()))
            .map(|r| r.value().clone()))
    }

    async fn put_favorite(&self, uid: &str, shadow: &Recipe) -> Result<()> {
        self.begin(StoreOp::PutFavorite)?;
        self.inner
            .favorites
            .insert((uid.to_string(), shadow.id.clone()), shadow.clone());
        self.notify_all();
        Ok(())
    }

    async fn delete_favorite(&self, uid: &str, id: &str) -> Result<()> {
        self.begin(StoreOp::DeleteFavorite)?;
        self.inner
            .favorites
            .remove(&(uid.to_string(), id.to_string()));
        self.notify_all();
        Ok(())
    }

    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>> {
        self.begin(StoreOp::GetProfile)?;
        Ok(self.inner.profiles.get(uid).map(|p| p.value().clone()))
    }

    async fn put_profile(&self, uid: &str, profile: &UserProfile) -> Result<()> {
        self.begin(StoreOp::PutProfile)?;
        self.inner
            .profiles
            .insert(uid.to_string(), profile.clone());
        Ok(())
    }

    async fn query(&self, query: &RecipeQuery) -> Result<Vec<Recipe>> {
        self.begin(StoreOp::Query)?;
        Ok(self.evaluate(query))
    }

    async fn subscribe(&self, query: RecipeQuery) -> Result<Subscription> {
        self.begin(StoreOp::Subscribe)?;

        let (tx, rx) = mpsc::unbounded_channel();
        // Initial full snapshot.
        let _ = tx.send(SnapshotEvent::Snapshot(self.evaluate(&query)));

        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(listener = id, query = ?query, "Memory listener registered");
        self.listeners().push(Listener { id, query, tx });

        Ok(Subscription::new(rx, ListenerRegistration {
            store: self.clone(),
            id,
        }))
    }
}

/// Unregisters a listener when its subscription is dropped.
struct ListenerRegistration {
    store: MemoryStore,
    id: u64,
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.store.listeners().retain(|l| l.id != self.id);
    }
}

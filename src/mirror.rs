// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Local mirror of a remote list, owned by one screen.
//!
//! The mirror is the only render source for a screen's list. It is filled by
//! listener snapshots (wholesale replacement) and by optimistic local edits.

use crate::models::recipe::newest_first;
use crate::models::Recipe;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

/// How a mirror orders what it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOrder {
    /// Keep snapshot order (the store already sorted it)
    AsDelivered,
    /// Creation time descending, then id descending
    NewestFirst,
}

/// Ordered in-memory list of recipes.
#[derive(Debug, Clone)]
pub struct LocalMirror {
    items: Vec<Recipe>,
    order: MirrorOrder,
}

impl LocalMirror {
    pub fn new(order: MirrorOrder) -> Self {
        Self {
            items: Vec::new(),
            order,
        }
    }

    /// Replace the whole list with a snapshot.
    pub fn replace(&mut self, snapshot: Vec<Recipe>) {
        self.items = snapshot;
        self.sort();
    }

    /// Insert or overwrite by id.
    pub fn upsert(&mut self, recipe: Recipe) {
        match self.items.iter_mut().find(|r| r.id == recipe.id) {
            Some(existing) => *existing = recipe,
            None => self.items.push(recipe),
        }
        self.sort();
    }

    pub fn remove(&mut self, id: &str) -> Option<Recipe> {
        let index = self.items.iter().position(|r| r.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|r| r.id == id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[Recipe] {
        &self.items
    }

    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|r| r.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn sort(&mut self) {
        if self.order == MirrorOrder::NewestFirst {
            self.items.sort_by(newest_first);
        }
    }
}

/// Everything a list screen renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenView {
    pub items: Vec<Recipe>,
    pub loading: bool,
    /// Set when the subscription failed; cleared by the next focus
    pub error: Option<String>,
    /// Last transient message (toast/dialog text)
    pub notice: Option<String>,
    /// Bumped on every change
    pub revision: u64,
}

struct StateInner {
    mirror: LocalMirror,
    loading: bool,
    error: Option<String>,
    notice: Option<String>,
    revision: u64,
}

/// Screen-owned state with change notifications.
///
/// Every mutation bumps a revision so a renderer (or a test) can wait for the
/// next change instead of polling.
pub struct ScreenState {
    inner: Mutex<StateInner>,
    revisions: watch::Sender<u64>,
}

impl ScreenState {
    pub fn new(order: MirrorOrder) -> Self {
        let (revisions, _rx) = watch::channel(0);
        Self {
            inner: Mutex::new(StateInner {
                mirror: LocalMirror::new(order),
                loading: false,
                error: None,
                notice: None,
                revision: 0,
            }),
            revisions,
        }
    }

    pub fn view(&self) -> ScreenView {
        let inner = self.lock();
        ScreenView {
            items: inner.mirror.items().to_vec(),
            loading: inner.loading,
            error: inner.error.clone(),
            notice: inner.notice.clone(),
            revision: inner.revision,
        }
    }

    pub fn ids(&self) -> Vec<String> {
        self.lock().mirror.ids()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().mirror.contains(id)
    }

    pub fn find(&self, id: &str) -> Option<Recipe> {
        self.lock()
            .mirror
            .items()
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub fn begin_loading(&self) {
        self.update(|inner| {
            inner.loading = true;
            inner.error = None;
        });
    }

    /// Wholesale replacement from a listener or one-shot read.
    pub fn apply_snapshot(&self, snapshot: Vec<Recipe>) {
        self.update(|inner| {
            inner.mirror.replace(snapshot);
            inner.loading = false;
        });
    }

    /// Like [`ScreenState::apply_snapshot`], but only while `current()` holds.
    ///
    /// `current` is evaluated under the state lock, so a concurrent
    /// [`ScreenState::reset`] is ordered either wholly before or wholly after.
    pub fn apply_if(&self, current: impl FnOnce() -> bool, snapshot: Vec<Recipe>) -> bool {
        self.update_if(current, |inner| {
            inner.mirror.replace(snapshot);
            inner.loading = false;
        })
    }

    /// Like [`ScreenState::fail`], but only while `current()` holds.
    pub fn fail_if(&self, current: impl FnOnce() -> bool, message: &str) -> bool {
        self.update_if(current, |inner| {
            inner.loading = false;
            inner.error = Some(message.to_string());
        })
    }

    /// Subscription or read failure: flag it and stop loading.
    pub fn fail(&self, message: &str) {
        self.update(|inner| {
            inner.loading = false;
            inner.error = Some(message.to_string());
        });
    }

    pub fn reset(&self) {
        self.update(|inner| {
            inner.mirror.clear();
            inner.loading = false;
            inner.error = None;
        });
    }

    pub fn upsert(&self, recipe: Recipe) {
        self.update(|inner| inner.mirror.upsert(recipe));
    }

    pub fn remove(&self, id: &str) -> Option<Recipe> {
        let mut removed = None;
        self.update(|inner| removed = inner.mirror.remove(id));
        removed
    }

    /// Remove if present, otherwise insert. Returns whether it is now present.
    pub fn toggle(&self, recipe: Recipe) -> bool {
        let mut present = false;
        self.update(|inner| {
            if inner.mirror.remove(&recipe.id).is_none() {
                inner.mirror.upsert(recipe);
                present = true;
            }
        });
        present
    }

    pub fn notify(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|inner| inner.notice = Some(message));
    }

    /// Wait until the view satisfies `done`, returning that view.
    pub async fn wait_until(&self, done: impl Fn(&ScreenView) -> bool) -> ScreenView {
        let mut rx = self.revisions.subscribe();
        loop {
            let view = self.view();
            if done(&view) {
                return view;
            }
            if rx.changed().await.is_err() {
                return self.view();
            }
        }
    }

    fn update(&self, change: impl FnOnce(&mut StateInner)) {
        let revision = {
            let mut inner = self.lock();
            change(&mut inner);
            inner.revision += 1;
            inner.revision
        };
        self.revisions.send_replace(revision);
    }

    fn update_if(&self, current: impl FnOnce() -> bool, change: impl FnOnce(&mut StateInner)) -> bool {
        let revision = {
            let mut inner = self.lock();
            if !current() {
                return false;
            }
            change(&mut inner);
            inner.revision += 1;
            inner.revision
        };
        self.revisions.send_replace(revision);
        true
    }

    fn lock(&self) -> MutexGuard<'_, StateInner> {
        // A panicked writer leaves a whole list behind, never a torn one.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

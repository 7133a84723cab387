// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Favorites: optimistic toggles with an ordered background writer.
//!
//! A toggle updates the local favorite list synchronously and queues the
//! shadow write. A single writer task applies queued writes in order, so the
//! store converges on the last toggle. Write failures are logged and never
//! rolled back.

use super::list::{ListScreen, ListSource};
use crate::db::RecipeStore;
use crate::error::Result;
use crate::gate::{authorize, GateAction};
use crate::mirror::{ScreenState, ScreenView};
use crate::models::Recipe;
use crate::services::RecipeService;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

enum WriteCommand {
    Put { uid: String, shadow: Recipe },
    Delete { uid: String, id: String },
    Flush(oneshot::Sender<()>),
}

pub struct FavoritesScreen<S> {
    list: ListScreen<S>,
    writes: mpsc::UnboundedSender<WriteCommand>,
}

impl<S: RecipeStore> FavoritesScreen<S> {
    /// Must be called from within a tokio runtime (spawns the writer).
    pub fn new(service: RecipeService<S>) -> Self {
        let (writes, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(service.clone(), rx));
        Self {
            list: ListScreen::new(service, ListSource::Favorites),
            writes,
        }
    }

    pub fn focus(&self) {
        self.list.focus();
    }

    pub fn unfocus(&self) {
        self.list.unfocus();
    }

    pub fn view(&self) -> ScreenView {
        self.list.view()
    }

    pub fn state(&self) -> &Arc<ScreenState> {
        self.list.state()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.list.state().contains(id)
    }

    /// Local favorite ids, in display order.
    pub fn favorite_ids(&self) -> Vec<String> {
        self.list.state().ids()
    }

    /// Flip the favorite state of `item`; returns whether it is now a favorite.
    ///
    /// The local list reflects the new state before this returns. Favoriting
    /// an external recipe also copies it into the shared feed if needed.
    pub fn toggle_favorite(&self, item: &Recipe) -> Result<bool> {
        let current = self.list.service().session().current();
        let identity = match authorize(current.as_ref(), GateAction::ToggleFavorite, None) {
            Ok(identity) => identity,
            Err(e) => {
                self.list.state().notify(e.user_message());
                return Err(e);
            }
        };

        let shadow = item.favorite_shadow();
        let id = shadow.id.clone();
        let now_favorite = self.list.state().toggle(shadow.clone());

        let command = if now_favorite {
            WriteCommand::Put {
                uid: identity.uid,
                shadow,
            }
        } else {
            WriteCommand::Delete {
                uid: identity.uid,
                id: id.clone(),
            }
        };
        if self.writes.send(command).is_err() {
            tracing::warn!(recipe_id = %id, "Favorite writer stopped; change not saved");
        }

        Ok(now_favorite)
    }

    /// Wait until every queued favorite write has been attempted.
    pub async fn flush(&self) {
        let (done, rx) = oneshot::channel();
        if self.writes.send(WriteCommand::Flush(done)).is_ok() {
            let _ = rx.await;
        }
    }
}

/// Apply favorite writes one at a time, in queue order.
async fn run_writer<S: RecipeStore>(
    service: RecipeService<S>,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            WriteCommand::Put { uid, shadow } => {
                if shadow.is_from_api {
                    if let Err(e) = service.materialize_external(&shadow).await {
                        tracing::warn!(error = %e, recipe_id = %shadow.id, "Failed to materialize external recipe");
                    }
                }
                match service.store().put_favorite(&uid, &shadow).await {
                    Ok(()) => tracing::debug!(uid = %uid, recipe_id = %shadow.id, "Favorite saved"),
                    Err(e) => {
                        tracing::warn!(error = %e, uid = %uid, recipe_id = %shadow.id, "Failed to save favorite")
                    }
                }
            }
            WriteCommand::Delete { uid, id } => match service.store().delete_favorite(&uid, &id).await {
                Ok(()) => tracing::debug!(uid = %uid, recipe_id = %id, "Favorite removed"),
                Err(e) => tracing::warn!(error = %e, uid = %uid, recipe_id = %id, "Failed to remove favorite"),
            },
            WriteCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

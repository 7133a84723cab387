// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Recipe mutations that span several documents.
//!
//! Handles:
//! - Creating a recipe and its owner shadow
//! - Owner-only edits
//! - The delete cascade (recipe, owner shadow, owner's favorite shadow)
//! - Materializing an external recipe before it is favorited

use crate::db::RecipeStore;
use crate::error::{AppError, Result};
use crate::gate::{authorize, GateAction};
use crate::models::recipe::{next_recipe_id, API_OWNER_EMAIL, API_OWNER_ID};
use crate::models::{Recipe, RecipeDraft, RecipePatch, Timestamp};
use crate::session::{Identity, SessionHandle};
use futures_util::future::join;

pub const SAVE_SUCCESS: &str = "Recipe saved successfully!";
pub const SAVE_FAILURE: &str = "Error saving recipe. Try again.";
pub const UPDATE_SUCCESS: &str = "Recipe updated!";
pub const UPDATE_FAILURE: &str = "Error updating recipe. Try again.";

/// Outcome of a delete cascade.
///
/// The primary document is always gone when a report exists; shadow
/// removals are best-effort and may leave orphans behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    pub recipe_id: String,
    pub owner_shadow_removed: bool,
    pub favorite_shadow_removed: bool,
}

impl DeleteReport {
    pub fn is_complete(&self) -> bool {
        self.owner_shadow_removed && self.favorite_shadow_removed
    }
}

/// Recipe service, generic over the document store.
#[derive(Clone)]
pub struct RecipeService<S> {
    store: S,
    session: SessionHandle,
}

impl<S: RecipeStore> RecipeService<S> {
    pub fn new(store: S, session: SessionHandle) -> Self {
        Self { store, session }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Create a recipe owned by the current identity.
    pub async fn create_recipe(&self, draft: RecipeDraft) -> Result<Recipe> {
        let identity = authorize(self.session.current().as_ref(), GateAction::SaveRecipe, None)?;
        draft.check()?;

        let recipe = Recipe::from_draft(
            draft,
            next_recipe_id(),
            &identity.uid,
            identity.email.as_deref(),
            Timestamp::now(),
        );

        self.store.put_recipe(&recipe).await.map_err(|e| {
            tracing::error!(error = %e, recipe_id = %recipe.id, "Failed to save recipe");
            e.surfaced(SAVE_FAILURE)
        })?;

        self.write_owner_shadow(&identity, &recipe).await;

        tracing::info!(
            recipe_id = %recipe.id,
            owner = %identity.uid,
            title = %recipe.title,
            "Recipe created"
        );
        Ok(recipe)
    }

    /// Apply an owner's edit to an existing recipe.
    pub async fn update_recipe(&self, id: &str, patch: RecipePatch) -> Result<Recipe> {
        let identity = authorize(self.session.current().as_ref(), GateAction::EditRecipe, None)?;
        patch.check()?;

        let mut recipe = self
            .store
            .get_recipe(id)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        authorize(Some(&identity), GateAction::EditRecipe, Some(&recipe.owner_id))?;

        patch.apply(&mut recipe);
        self.store.put_recipe(&recipe).await.map_err(|e| {
            tracing::error!(error = %e, recipe_id = %id, "Failed to update recipe");
            e.surfaced(UPDATE_FAILURE)
        })?;

        self.write_owner_shadow(&identity, &recipe).await;

        tracing::info!(recipe_id = %id, "Recipe updated");
        Ok(recipe)
    }

    /// Gate on ownership, then run the delete cascade.
    pub async fn delete_recipe(&self, id: &str, owner_id: &str) -> Result<DeleteReport> {
        let identity = authorize(
            self.session.current().as_ref(),
            GateAction::DeleteRecipe,
            Some(owner_id),
        )?;
        self.delete_cascade(&identity, id).await
    }

    /// Delete an already-authorized recipe and its shadows.
    ///
    /// Only the primary delete can fail the operation. The two shadow deletes
    /// run concurrently afterwards and their failures are logged.
    pub(crate) async fn delete_cascade(&self, owner: &Identity, id: &str) -> Result<DeleteReport> {
        self.store.delete_recipe(id).await.map_err(|e| {
            tracing::error!(error = %e, recipe_id = %id, "Failed to delete recipe");
            e
        })?;

        let (shadow, favorite) = join(
            self.store.delete_user_recipe(&owner.uid, id),
            self.store.delete_favorite(&owner.uid, id),
        )
        .await;

        let report = DeleteReport {
            recipe_id: id.to_string(),
            owner_shadow_removed: log_step(shadow, "owner shadow", id),
            favorite_shadow_removed: log_step(favorite, "favorite shadow", id),
        };

        if report.is_complete() {
            tracing::info!(recipe_id = %id, "Recipe deleted");
        } else {
            tracing::warn!(
                recipe_id = %id,
                owner_shadow_removed = report.owner_shadow_removed,
                favorite_shadow_removed = report.favorite_shadow_removed,
                "Recipe deleted with orphaned shadows"
            );
        }
        Ok(report)
    }

    pub async fn get_recipe(&self, id: &str) -> Result<Option<Recipe>> {
        self.store.get_recipe(id).await
    }

    /// Whether the current identity has favorited `id`; false when signed out.
    pub async fn is_favorite(&self, id: &str) -> Result<bool> {
        match self.session.current() {
            Some(identity) => Ok(self.store.get_favorite(&identity.uid, id).await?.is_some()),
            None => Ok(false),
        }
    }

    /// Copy an external recipe into the shared feed if it is not there yet.
    ///
    /// Returns true when a document was written.
    pub async fn materialize_external(&self, recipe: &Recipe) -> Result<bool> {
        if !recipe.is_from_api {
            return Ok(false);
        }
        if self.store.get_recipe(&recipe.id).await?.is_some() {
            return Ok(false);
        }

        let mut stored = recipe.clone();
        stored.added_at = None;
        stored.owner_id = API_OWNER_ID.to_string();
        stored.owner_email = Some(API_OWNER_EMAIL.to_string());
        if stored.created_at.is_none() {
            stored.created_at = Some(Timestamp::now());
        }
        if stored.keywords.is_empty() {
            stored.keywords = crate::models::recipe::build_keywords(&stored);
        }

        self.store.put_recipe(&stored).await?;
        tracing::info!(recipe_id = %stored.id, "External recipe materialized");
        Ok(true)
    }

    async fn write_owner_shadow(&self, owner: &Identity, recipe: &Recipe) {
        if let Err(e) = self.store.put_user_recipe(&owner.uid, recipe).await {
            tracing::warn!(
                error = %e,
                recipe_id = %recipe.id,
                owner = %owner.uid,
                "Failed to write owner shadow"
            );
        }
    }
}

fn log_step(result: Result<()>, step: &str, id: &str) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, recipe_id = %id, step, "Cascade step failed");
            false
        }
    }
}

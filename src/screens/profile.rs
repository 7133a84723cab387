// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Profile: the user's own recipes, favorites and profile fields.

use super::favorites::FavoritesScreen;
use super::list::{ListScreen, ListSource, LOAD_FAILURE};
use crate::db::RecipeStore;
use crate::error::Result;
use crate::gate::{authorize, GateAction};
use crate::models::recipe::newest_first;
use crate::models::{ProfileField, Recipe, UserProfile};
use crate::services::{LocalNotification, NotificationService, RecipeService};
use futures_util::future::join_all;
use std::sync::{Mutex, MutexGuard};

pub const PROFILE_LOAD_FAILURE: &str = "Error loading profile.";
pub const PROFILE_UPDATE_FAILURE: &str = "Failed to update profile.";

pub struct ProfileScreen<S> {
    service: RecipeService<S>,
    notifications: NotificationService,
    recipes: ListScreen<S>,
    favorites: FavoritesScreen<S>,
    profile: Mutex<Option<UserProfile>>,
}

impl<S: RecipeStore> ProfileScreen<S> {
    pub fn new(service: RecipeService<S>, notifications: NotificationService) -> Self {
        Self {
            recipes: ListScreen::new(service.clone(), ListSource::OwnRecipes),
            favorites: FavoritesScreen::new(service.clone()),
            service,
            notifications,
            profile: Mutex::new(None),
        }
    }

    pub fn recipes(&self) -> &ListScreen<S> {
        &self.recipes
    }

    pub fn favorites(&self) -> &FavoritesScreen<S> {
        &self.favorites
    }

    /// Profile as currently shown.
    pub fn profile(&self) -> Option<UserProfile> {
        self.profile_slot().clone()
    }

    /// Subscribe both lists and load the profile document.
    pub async fn focus(&self) -> Result<()> {
        self.recipes.focus();
        self.favorites.focus();

        let Some(identity) = self.service.session().current() else {
            *self.profile_slot() = None;
            return Ok(());
        };

        let loaded = self
            .service
            .store()
            .get_profile(&identity.uid)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, uid = %identity.uid, "Failed to load profile");
                e.surfaced(PROFILE_LOAD_FAILURE)
            })?;
        if loaded.is_none() {
            tracing::warn!(uid = %identity.uid, "No profile document");
        }
        *self.profile_slot() = loaded;
        Ok(())
    }

    pub fn unfocus(&self) {
        self.recipes.unfocus();
        self.favorites.unfocus();
    }

    /// Update one profile field; returns the confirmation to show.
    ///
    /// The new value is shown immediately. The remote document is read,
    /// patched and written back; on failure the field's previous local value
    /// returns.
    pub async fn update_field(&self, field: ProfileField) -> Result<&'static str> {
        let identity = authorize(
            self.service.session().current().as_ref(),
            GateAction::UpdateProfile,
            None,
        )?;
        field.check()?;

        let previous = {
            let mut slot = self.profile_slot();
            let shown = slot.get_or_insert_with(UserProfile::default);
            let previous = shown.clone();
            field.apply(shown);
            previous
        };

        let store = self.service.store();
        let written: Result<UserProfile> = async {
            let mut remote = store.get_profile(&identity.uid).await?.unwrap_or_default();
            field.apply(&mut remote);
            store.put_profile(&identity.uid, &remote).await?;
            Ok(remote)
        }
        .await;

        match written {
            Ok(remote) => {
                tracing::info!(uid = %identity.uid, field = field.name(), "Profile updated");
                let notification = match &field {
                    ProfileField::Notifications(true) => LocalNotification::notifications_enabled(),
                    _ => LocalNotification::profile_updated(field.confirmation()),
                };
                self.notifications.notify(Some(&remote), notification);
                Ok(field.confirmation())
            }
            Err(e) => {
                tracing::error!(error = %e, uid = %identity.uid, field = field.name(), "Failed to update profile");
                // Only this field goes back; other updates that landed
                // meanwhile stay.
                if let Some(shown) = self.profile_slot().as_mut() {
                    field.restore(&previous, shown);
                }
                Err(e.surfaced(PROFILE_UPDATE_FAILURE))
            }
        }
    }

    /// Favorites resolved against the current shared feed documents.
    ///
    /// Shadows whose recipe no longer exists are dropped.
    pub async fn favorite_recipes(&self) -> Result<Vec<Recipe>> {
        let ids = self.favorites.favorite_ids();
        let lookups = join_all(ids.iter().map(|id| self.service.get_recipe(id))).await;

        let mut resolved = Vec::with_capacity(ids.len());
        for (id, lookup) in ids.iter().zip(lookups) {
            match lookup {
                Ok(Some(recipe)) => resolved.push(recipe),
                Ok(None) => tracing::warn!(recipe_id = %id, "Dropping orphaned favorite"),
                Err(e) => {
                    tracing::error!(error = %e, recipe_id = %id, "Failed to resolve favorite");
                    return Err(e.surfaced(LOAD_FAILURE));
                }
            }
        }
        resolved.sort_by(newest_first);
        Ok(resolved)
    }

    fn profile_slot(&self) -> MutexGuard<'_, Option<UserProfile>> {
        self.profile
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Home feed: every recipe, newest first, with favorite hearts.

use super::card::RecipeCard;
use super::favorites::FavoritesScreen;
use super::list::{ListScreen, ListSource};
use crate::db::{RecipeQuery, RecipeStore};
use crate::error::Result;
use crate::mirror::ScreenView;
use crate::models::Recipe;
use crate::services::{DeleteReport, RecipeService};

pub struct FeedScreen<S> {
    feed: ListScreen<S>,
    favorites: FavoritesScreen<S>,
}

impl<S: RecipeStore> FeedScreen<S> {
    pub fn new(service: RecipeService<S>) -> Self {
        Self {
            feed: ListScreen::new(service.clone(), ListSource::Query(RecipeQuery::Feed)),
            favorites: FavoritesScreen::new(service),
        }
    }

    pub fn focus(&self) {
        self.feed.focus();
        self.favorites.focus();
    }

    pub fn unfocus(&self) {
        self.feed.unfocus();
        self.favorites.unfocus();
    }

    pub fn view(&self) -> ScreenView {
        self.feed.view()
    }

    pub fn feed(&self) -> &ListScreen<S> {
        &self.feed
    }

    pub fn favorites(&self) -> &FavoritesScreen<S> {
        &self.favorites
    }

    /// Rows as rendered for the signed-in viewer.
    pub fn cards(&self) -> Vec<RecipeCard> {
        let viewer = self.feed.service().session().current();
        self.feed
            .view()
            .items
            .iter()
            .map(|r| RecipeCard::new(r, viewer.as_ref(), self.favorites.is_favorite(&r.id)))
            .collect()
    }

    pub fn toggle_favorite(&self, item: &Recipe) -> Result<bool> {
        self.favorites.toggle_favorite(item)
    }

    pub async fn delete_recipe(&self, id: &str, owner_id: &str) -> Result<DeleteReport> {
        self.feed.delete_recipe(id, owner_id).await
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Presentational view of a recipe in any list.

use crate::models::Recipe;
use crate::session::Identity;

/// Fields a list row renders, already resolved for the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeCard {
    pub id: String,
    pub title: String,
    pub image_url: Option<String>,
    /// Owner e-mail, or the owner id when no e-mail was stored
    pub author: String,
    /// `YYYY-MM-DD`, absent for undated documents
    pub date_label: Option<String>,
    pub ingredient_preview: String,
    pub is_favorite: bool,
    /// Only the owner sees edit and delete controls
    pub is_own: bool,
    pub is_from_api: bool,
}

impl RecipeCard {
    pub fn new(recipe: &Recipe, viewer: Option<&Identity>, is_favorite: bool) -> Self {
        Self {
            id: recipe.id.clone(),
            title: recipe.title.clone(),
            image_url: recipe.image_url.clone(),
            author: recipe
                .owner_email
                .clone()
                .unwrap_or_else(|| recipe.owner_id.clone()),
            date_label: recipe.sort_time().map(|t| t.label()),
            ingredient_preview: recipe
                .ingredients
                .iter()
                .map(|i| i.display())
                .collect::<Vec<_>>()
                .join(", "),
            is_favorite,
            is_own: viewer.is_some_and(|v| recipe.is_owned_by(&v.uid)),
            is_from_api: recipe.is_from_api,
        }
    }
}

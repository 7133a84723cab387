// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Recipe form: creates a new recipe, or edits one the user owns.

use crate::db::RecipeStore;
use crate::error::Result;
use crate::models::recipe::next_recipe_id;
use crate::models::{Ingredient, Recipe, RecipeDraft, RecipePatch};
use crate::services::recipes::{SAVE_SUCCESS, UPDATE_SUCCESS};
use crate::services::RecipeService;

pub struct RecipeForm<S> {
    service: RecipeService<S>,
    draft: RecipeDraft,
    /// Id of the recipe being edited; `None` for a new recipe
    editing: Option<String>,
}

impl<S: RecipeStore> RecipeForm<S> {
    pub fn new(service: RecipeService<S>) -> Self {
        Self {
            service,
            draft: RecipeDraft::default(),
            editing: None,
        }
    }

    /// Form prefilled from an existing recipe; `submit` saves it as an edit.
    pub fn edit(service: RecipeService<S>, recipe: &Recipe) -> Self {
        Self {
            service,
            draft: RecipeDraft {
                title: recipe.title.clone(),
                ingredients: recipe.ingredients.clone(),
                instructions: recipe.instructions.clone(),
                image_url: recipe.image_url.clone(),
                category: recipe.category.clone(),
                area: recipe.area.clone(),
            },
            editing: Some(recipe.id.clone()),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn draft(&self) -> &RecipeDraft {
        &self.draft
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_instructions(&mut self, instructions: impl Into<String>) {
        self.draft.instructions = instructions.into();
    }

    pub fn set_image_url(&mut self, url: impl Into<String>) {
        self.draft.image_url = Some(url.into());
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.draft.category = Some(category.into());
    }

    pub fn set_area(&mut self, area: impl Into<String>) {
        self.draft.area = Some(area.into());
    }

    /// Add an ingredient line; blank input is ignored.
    pub fn add_ingredient(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.draft.ingredients.push(Ingredient {
            id: Some(next_recipe_id()),
            name: name.to_string(),
            measure: None,
        });
        true
    }

    pub fn remove_ingredient(&mut self, index: usize) -> Option<Ingredient> {
        (index < self.draft.ingredients.len()).then(|| self.draft.ingredients.remove(index))
    }

    /// Save the draft and return the stored recipe with the confirmation to
    /// show. A new-recipe form is cleared on success; an edit form keeps its
    /// values.
    pub async fn submit(&mut self) -> Result<(Recipe, &'static str)> {
        if let Some(id) = &self.editing {
            self.draft.check()?;
            let draft = self.draft.clone();
            let patch = RecipePatch {
                title: Some(draft.title),
                instructions: Some(draft.instructions),
                ingredients: Some(draft.ingredients),
                image_url: draft.image_url,
                category: draft.category,
                area: draft.area,
            };
            let recipe = self.service.update_recipe(id, patch).await?;
            return Ok((recipe, UPDATE_SUCCESS));
        }

        let recipe = self.service.create_recipe(self.draft.clone()).await?;
        self.draft = RecipeDraft::default();
        Ok((recipe, SAVE_SUCCESS))
    }
}

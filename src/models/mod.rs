// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Data models for the application.

pub mod profile;
pub mod recipe;
pub mod timestamp;

pub use profile::{ProfileField, ProfileSettings, UserProfile};
pub use recipe::{Ingredient, Recipe, RecipeDraft, RecipePatch};
pub use timestamp::Timestamp;

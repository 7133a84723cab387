// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Recipe model for storage and display.

use super::timestamp::Timestamp;
use crate::error::{AppError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use validator::{Validate, ValidationError};

/// Owner id written on recipes materialized from the public recipe API.
pub const API_OWNER_ID: &str = "themealdb";
/// Owner e-mail shown for recipes materialized from the public recipe API.
pub const API_OWNER_EMAIL: &str = "TheMealDB";

/// Message shown when a draft is missing required fields.
pub const FILL_ALL_FIELDS: &str = "Please fill out all fields before saving the recipe.";

/// Minimum length of a keyword token (and of a search query).
pub const MIN_KEYWORD_LEN: usize = 2;

/// Recipe document, shared by `AllRecipes`, per-user recipe shadows and
/// favorite shadows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Stable id, also used as the document key (and the favorite shadow key)
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default, rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Identity uid of the author, or [`API_OWNER_ID`]
    #[serde(default, alias = "userId")]
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    /// Set on favorite shadows of API recipes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    /// Lowercase tokens matched exactly by search
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, rename = "isFromAPI")]
    pub is_from_api: bool,
    /// Legacy free-text field written by older edit screens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Recipe {
    /// Build a new recipe from a validated draft.
    pub fn from_draft(
        draft: RecipeDraft,
        id: String,
        owner_id: &str,
        owner_email: Option<&str>,
        created_at: Timestamp,
    ) -> Self {
        let mut recipe = Recipe {
            id,
            title: draft.title.trim().to_string(),
            ingredients: draft.ingredients,
            instructions: draft.instructions.trim().to_string(),
            image_url: non_blank(draft.image_url),
            owner_id: owner_id.to_string(),
            owner_email: owner_email.map(str::to_string),
            created_at: Some(created_at),
            category: non_blank(draft.category),
            area: non_blank(draft.area),
            ..Default::default()
        };
        recipe.keywords = build_keywords(&recipe);
        recipe
    }

    /// Fill the id from the store's document key when the body lacks one.
    pub fn with_document_key(mut self, key: &str) -> Self {
        if self.id.is_empty() {
            self.id = key.to_string();
        }
        self
    }

    /// Denormalized copy stored under a user's favorites.
    pub fn favorite_shadow(&self) -> Recipe {
        let mut shadow = self.clone();
        if shadow.is_from_api && shadow.added_at.is_none() {
            shadow.added_at = Some(Timestamp::now());
        }
        shadow
    }

    pub fn is_owned_by(&self, uid: &str) -> bool {
        !self.owner_id.is_empty() && self.owner_id == uid
    }

    /// Time used for ordering lists: creation, then favoriting time.
    pub fn sort_time(&self) -> Option<Timestamp> {
        self.created_at.or(self.added_at)
    }
}

/// Newest first; ties (and missing timestamps) fall back to id so order is total.
pub fn newest_first(a: &Recipe, b: &Recipe) -> Ordering {
    b.sort_time()
        .cmp(&a.sort_time())
        .then_with(|| b.id.cmp(&a.id))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ─── Ingredients ─────────────────────────────────────────────

/// A recipe ingredient, normalized from the shapes found in stored documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredIngredient")]
pub struct Ingredient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,
}

impl Ingredient {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            measure: None,
        }
    }

    pub fn measured(name: impl Into<String>, measure: impl Into<String>) -> Self {
        let measure = measure.into();
        Self {
            id: None,
            name: name.into(),
            measure: Some(measure).filter(|m| !m.trim().is_empty()),
        }
    }

    /// Text shown in ingredient lists, e.g. `2 cups Flour`.
    pub fn display(&self) -> String {
        match self.measure.as_deref() {
            Some(measure) if !measure.trim().is_empty() => format!("{} {}", measure, self.name),
            _ => self.name.clone(),
        }
    }
}

/// Every ingredient shape the app has written over time.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredIngredient {
    Named {
        #[serde(default)]
        id: Option<String>,
        name: String,
        #[serde(default)]
        measure: Option<String>,
    },
    Measured {
        ingredient: String,
        #[serde(default)]
        measure: Option<String>,
    },
    Line(String),
}

impl From<StoredIngredient> for Ingredient {
    fn from(stored: StoredIngredient) -> Self {
        match stored {
            StoredIngredient::Named { id, name, measure } => Ingredient {
                id,
                name,
                measure: measure.filter(|m| !m.trim().is_empty()),
            },
            StoredIngredient::Measured {
                ingredient,
                measure,
            } => Ingredient::measured(ingredient, measure.unwrap_or_default()),
            StoredIngredient::Line(line) => Ingredient::named(line.trim()),
        }
    }
}

// ─── Keywords ────────────────────────────────────────────────

/// Derive the lowercase search tokens for a recipe.
///
/// Tokens come from the title, ingredient names, category and area, split on
/// anything that is not alphanumeric. Search matches these exactly.
pub fn build_keywords(recipe: &Recipe) -> Vec<String> {
    let sources = std::iter::once(recipe.title.as_str())
        .chain(recipe.ingredients.iter().map(|i| i.name.as_str()))
        .chain(recipe.category.as_deref())
        .chain(recipe.area.as_deref());

    let mut seen = HashSet::new();
    let mut keywords = Vec::new();
    for text in sources {
        for token in text.split(|c: char| !c.is_alphanumeric()) {
            let token = token.to_lowercase();
            if token.chars().count() >= MIN_KEYWORD_LEN && seen.insert(token.clone()) {
                keywords.push(token);
            }
        }
    }
    keywords
}

// ─── Ids ─────────────────────────────────────────────────────

static LAST_RECIPE_ID: AtomicI64 = AtomicI64::new(0);

/// Millisecond-clock recipe id, strictly increasing within the process.
pub fn next_recipe_id() -> String {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_RECIPE_ID
        .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or_else(|last| last);
    now.max(previous + 1).to_string()
}

// ─── Drafts and patches ──────────────────────────────────────

/// Input of the create-recipe form.
#[derive(Debug, Clone, Default, Validate)]
pub struct RecipeDraft {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(length(min = 1))]
    pub ingredients: Vec<Ingredient>,
    #[validate(custom(function = "not_blank"))]
    pub instructions: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub area: Option<String>,
}

impl RecipeDraft {
    /// Validate before any remote call is made.
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|_| AppError::Validation(FILL_ALL_FIELDS.to_string()))
    }
}

/// Fields an owner may change on an existing recipe.
#[derive(Debug, Clone, Default)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub instructions: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub area: Option<String>,
}

impl RecipePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.instructions.is_none()
            && self.ingredients.is_none()
            && self.image_url.is_none()
            && self.category.is_none()
            && self.area.is_none()
    }

    pub fn check(&self) -> Result<()> {
        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
        if self.is_empty()
            || blank(&self.title)
            || blank(&self.instructions)
            || self.ingredients.as_ref().is_some_and(Vec::is_empty)
        {
            return Err(AppError::Validation(FILL_ALL_FIELDS.to_string()));
        }
        Ok(())
    }

    /// Apply to a recipe and recompute its keywords.
    pub fn apply(self, recipe: &mut Recipe) {
        if let Some(title) = self.title {
            recipe.title = title.trim().to_string();
        }
        if let Some(instructions) = self.instructions {
            recipe.instructions = instructions.trim().to_string();
            recipe.description = None;
        }
        if let Some(ingredients) = self.ingredients {
            recipe.ingredients = ingredients;
        }
        if self.image_url.is_some() {
            recipe.image_url = non_blank(self.image_url);
        }
        if self.category.is_some() {
            recipe.category = non_blank(self.category);
        }
        if self.area.is_some() {
            recipe.area = non_blank(self.area);
        }
        recipe.keywords = build_keywords(recipe);
    }
}

pub(crate) fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_shapes_normalize() {
        let json = r#"[
            {"id": "1700000000000", "name": "Tortilla"},
            {"name": "Salsa"},
            {"ingredient": "Chicken", "measure": "200g"},
            {"ingredient": "Salt", "measure": " "},
            "2 cups Flour"
        ]"#;
        let parsed: Vec<Ingredient> = serde_json::from_str(json).unwrap();

        assert_eq!(parsed[0].id.as_deref(), Some("1700000000000"));
        assert_eq!(parsed[0].name, "Tortilla");
        assert_eq!(parsed[1], Ingredient::named("Salsa"));
        assert_eq!(parsed[2].display(), "200g Chicken");
        assert_eq!(parsed[3].measure, None);
        assert_eq!(parsed[4].display(), "2 cups Flour");
    }

    #[test]
    fn test_legacy_owner_field_and_flags() {
        let json = r#"{
            "title": "Old",
            "userId": "uid-1",
            "imageURL": "https://img/x.jpg",
            "isFromAPI": false,
            "createdAt": "2023-05-01T10:00:00Z"
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        let recipe = recipe.with_document_key("doc-7");

        assert_eq!(recipe.id, "doc-7");
        assert_eq!(recipe.owner_id, "uid-1");
        assert_eq!(recipe.image_url.as_deref(), Some("https://img/x.jpg"));
        assert!(recipe.is_owned_by("uid-1"));
    }

    #[test]
    fn test_keywords_are_exact_lowercase_tokens() {
        let recipe = Recipe {
            title: "Creamy Pasta Bake".to_string(),
            ingredients: vec![Ingredient::named("Pasta"), Ingredient::named("Sun-dried tomato")],
            category: Some("Vegetarian".to_string()),
            area: Some("Italian".to_string()),
            ..Default::default()
        };

        assert_eq!(
            build_keywords(&recipe),
            vec!["creamy", "pasta", "bake", "sun", "dried", "tomato", "vegetarian", "italian"]
        );
    }

    #[test]
    fn test_single_letter_tokens_are_dropped() {
        let recipe = Recipe {
            title: "A B Soup".to_string(),
            ..Default::default()
        };
        assert_eq!(build_keywords(&recipe), vec!["soup"]);
    }

    #[test]
    fn test_recipe_ids_are_strictly_increasing() {
        let ids: Vec<i64> = (0..50)
            .map(|_| next_recipe_id().parse().unwrap())
            .collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_newest_first_falls_back_to_id() {
        let ts = Timestamp::from_millis(1_000).unwrap();
        let a = Recipe { id: "a".into(), created_at: Some(ts), ..Default::default() };
        let b = Recipe { id: "b".into(), created_at: Some(ts), ..Default::default() };
        let undated = Recipe { id: "z".into(), ..Default::default() };

        let mut list = vec![undated.clone(), a.clone(), b.clone()];
        list.sort_by(newest_first);
        assert_eq!(list, vec![b, a, undated]);
    }

    #[test]
    fn test_draft_requires_all_fields() {
        let mut draft = RecipeDraft {
            title: "Tacos".into(),
            ingredients: vec![Ingredient::named("Tortilla")],
            instructions: "Fill and fold".into(),
            ..Default::default()
        };
        assert!(draft.check().is_ok());

        draft.instructions = "   ".into();
        let err = draft.check().unwrap_err();
        assert_eq!(err.user_message(), FILL_ALL_FIELDS);

        draft.instructions = "Fill".into();
        draft.ingredients.clear();
        assert!(draft.check().is_err());
    }

    #[test]
    fn test_patch_recomputes_keywords() {
        let mut recipe = Recipe {
            title: "Soup".into(),
            keywords: vec!["soup".into()],
            description: Some("legacy".into()),
            ..Default::default()
        };
        let patch = RecipePatch {
            title: Some("Lentil Stew".into()),
            instructions: Some("Simmer".into()),
            ..Default::default()
        };
        patch.check().unwrap();
        patch.apply(&mut recipe);

        assert_eq!(recipe.keywords, vec!["lentil", "stew"]);
        assert_eq!(recipe.instructions, "Simmer");
        assert_eq!(recipe.description, None);
    }

    #[test]
    fn test_blank_patch_is_rejected() {
        assert!(RecipePatch::default().check().is_err());
        let patch = RecipePatch {
            title: Some(" ".into()),
            ..Default::default()
        };
        assert!(patch.check().is_err());
    }
}

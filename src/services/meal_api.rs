// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Public recipe API client (TheMealDB).
//!
//! Read-only and unauthenticated. Meals come back in a flat schema with up to
//! twenty numbered ingredient/measure pairs, which are mapped into [`Recipe`].

use crate::error::AppError;
use crate::models::recipe::{build_keywords, API_OWNER_EMAIL, API_OWNER_ID};
use crate::models::{Ingredient, Recipe};
use serde::Deserialize;
use std::collections::HashMap;

/// Highest numbered `strIngredientN` field in the schema.
const MAX_INGREDIENTS: usize = 20;

/// Public recipe API client.
#[derive(Clone)]
pub struct MealDbClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct MealsResponse {
    /// `null` when nothing matched
    meals: Option<Vec<MealRecord>>,
}

/// One meal as returned by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRecord {
    pub id_meal: String,
    pub str_meal: Option<String>,
    pub str_category: Option<String>,
    pub str_area: Option<String>,
    pub str_instructions: Option<String>,
    pub str_meal_thumb: Option<String>,
    pub str_youtube: Option<String>,
    pub str_source: Option<String>,
    /// Numbered ingredient and measure fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl MealRecord {
    /// Ingredient/measure pairs in field order, skipping empty slots.
    pub fn ingredients(&self) -> Vec<Ingredient> {
        (1..=MAX_INGREDIENTS)
            .filter_map(|n| {
                let name = present(self.extra.get(&format!("strIngredient{}", n)))?;
                let measure = present(self.extra.get(&format!("strMeasure{}", n)));
                Some(Ingredient::measured(name, measure.unwrap_or_default()))
            })
            .collect()
    }

    /// Map into the app's recipe shape, flagged as API-sourced.
    pub fn into_recipe(self) -> Recipe {
        let ingredients = self.ingredients();
        let mut recipe = Recipe {
            id: self.id_meal,
            title: self.str_meal.unwrap_or_default(),
            ingredients,
            instructions: self.str_instructions.unwrap_or_default(),
            image_url: clean(self.str_meal_thumb),
            owner_id: API_OWNER_ID.to_string(),
            owner_email: Some(API_OWNER_EMAIL.to_string()),
            category: clean(self.str_category),
            area: clean(self.str_area),
            is_from_api: true,
            youtube: clean(self.str_youtube),
            source: clean(self.str_source),
            ..Default::default()
        };
        recipe.keywords = build_keywords(&recipe);
        recipe
    }
}

/// A slot counts only when it holds a non-blank string other than "null".
fn present(value: Option<&serde_json::Value>) -> Option<String> {
    let text = value?.as_str()?.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("null") {
        return None;
    }
    Some(text.to_string())
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl MealDbClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Look up a meal by its API id.
    pub async fn lookup(&self, id: &str) -> Result<Option<Recipe>, AppError> {
        let url = format!("{}/lookup.php", self.base_url);
        let meals = self.get_meals(&url, &[("i", id)]).await?;
        Ok(meals.into_iter().next().map(MealRecord::into_recipe))
    }

    /// Free-text search; an empty query lists the API's default selection.
    pub async fn search(&self, text: &str) -> Result<Vec<Recipe>, AppError> {
        let url = format!("{}/search.php", self.base_url);
        let meals = self.get_meals(&url, &[("s", text.trim())]).await?;
        tracing::debug!(query = %text, count = meals.len(), "Recipe API search");
        Ok(meals.into_iter().map(MealRecord::into_recipe).collect())
    }

    async fn get_meals(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<MealRecord>, AppError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::RecipeApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Recipe API request failed");
            return Err(AppError::RecipeApi(format!("HTTP {}: {}", status, body)));
        }

        let parsed: MealsResponse = response
            .json()
            .await
            .map_err(|e| AppError::RecipeApi(format!("Failed to parse response: {}", e)))?;
        Ok(parsed.meals.unwrap_or_default())
    }
}

/// Parse a raw API body; exposed for fixtures.
pub fn parse_meals(body: &str) -> Result<Vec<Recipe>, AppError> {
    let parsed: MealsResponse = serde_json::from_str(body)
        .map_err(|e| AppError::RecipeApi(format!("Failed to parse response: {}", e)))?;
    Ok(parsed
        .meals
        .unwrap_or_default()
        .into_iter()
        .map(MealRecord::into_recipe)
        .collect())
}

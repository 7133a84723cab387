// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

use recipehub::error::{AppError, GENERIC_FAILURE};

#[test]
fn test_authorization_errors_show_their_message() {
    let err = AppError::Unauthenticated("You must be logged in to save a recipe.".to_string());
    assert!(err.is_authorization());
    assert!(!err.is_remote());
    assert_eq!(err.user_message(), "You must be logged in to save a recipe.");

    let err = AppError::Forbidden("You can only delete your own recipes.".to_string());
    assert!(err.is_authorization());
}

#[test]
fn test_remote_errors_are_generic_unless_surfaced() {
    let err = AppError::Database("deadline exceeded".to_string());
    assert!(err.is_remote());
    assert_eq!(err.user_message(), GENERIC_FAILURE);

    let err = AppError::Database("deadline exceeded".to_string()).surfaced("Failed to delete recipe.");
    assert!(err.is_remote());
    assert_eq!(err.user_message(), "Failed to delete recipe.");
    assert_eq!(err.to_string(), "Failed to delete recipe.");
}

#[test]
fn test_surfaced_keeps_source() {
    use std::error::Error;

    let err = AppError::RecipeApi("HTTP 503".to_string()).surfaced("Error searching recipes.");
    let source = err.source().expect("source kept");
    assert_eq!(source.to_string(), "Recipe API error: HTTP 503");
}

#[test]
fn test_internal_errors_convert_from_anyhow() {
    let err: AppError = anyhow::anyhow!("boom").into();
    assert!(!err.is_remote());
    assert_eq!(err.user_message(), GENERIC_FAILURE);
}

#[test]
fn test_validation_is_neither_remote_nor_authorization() {
    let err = AppError::Validation("Please fill out all fields before saving the recipe.".to_string());
    assert!(!err.is_remote());
    assert!(!err.is_authorization());
}

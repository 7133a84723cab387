// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Identity gate checked before every mutation.
//!
//! A denial is returned before any remote call is issued, so a denied action
//! has no side effects.

use crate::error::{AppError, Result};
use crate::session::Identity;

/// Mutations that require a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    SaveRecipe,
    EditRecipe,
    DeleteRecipe,
    ToggleFavorite,
    UpdateProfile,
}

impl GateAction {
    fn login_message(self) -> &'static str {
        match self {
            GateAction::SaveRecipe => "You must be logged in to save a recipe.",
            GateAction::EditRecipe => "You must be logged in to edit a recipe.",
            GateAction::DeleteRecipe => "You must be logged in to delete a recipe.",
            GateAction::ToggleFavorite => "You must be logged in to use favorites.",
            GateAction::UpdateProfile => "You must be logged in to edit your profile.",
        }
    }

    fn owner_message(self) -> &'static str {
        match self {
            GateAction::EditRecipe => "You can only edit your own recipes.",
            GateAction::DeleteRecipe => "You can only delete your own recipes.",
            _ => "You do not have permission to do that.",
        }
    }
}

/// Check the current identity, and ownership when `owner_id` is given.
///
/// Returns the identity that passed so callers never re-read the session
/// between the check and the write.
pub fn authorize(
    identity: Option<&Identity>,
    action: GateAction,
    owner_id: Option<&str>,
) -> Result<Identity> {
    let Some(identity) = identity else {
        tracing::debug!(action = ?action, "Gate denied: no identity");
        return Err(AppError::Unauthenticated(action.login_message().to_string()));
    };

    if let Some(owner) = owner_id {
        if owner != identity.uid {
            tracing::warn!(
                action = ?action,
                uid = %identity.uid,
                owner = %owner,
                "Gate denied: not the owner"
            );
            return Err(AppError::Forbidden(action.owner_message().to_string()));
        }
    }

    Ok(identity.clone())
}

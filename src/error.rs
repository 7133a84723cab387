// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Application error types with user-facing messages.

/// Shown when a remote failure has no more specific message attached.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Application error type.
///
/// `Unauthenticated`, `Forbidden`, `Validation` and `Operation` carry the exact
/// text a UI should display. Everything else is logged and shown generically.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Recipe API error: {0}")]
    RecipeApi(String),

    #[error("Authentication provider error: {0}")]
    AuthProvider(String),

    #[error("Email relay error: {0}")]
    EmailRelay(String),

    /// A remote failure surfaced to the user with a context-specific message.
    #[error("{message}")]
    Operation {
        message: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Wrap a remote failure with the message the user should see.
    pub fn surfaced(self, message: impl Into<String>) -> Self {
        AppError::Operation {
            message: message.into(),
            source: Box::new(self),
        }
    }

    /// Text a screen should show in its dialog or toast.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg)
            | AppError::Validation(msg) => msg.clone(),
            AppError::Operation { message, .. } => message.clone(),
            AppError::NotFound(_) => "Recipe not found.".to_string(),
            AppError::AuthProvider(msg) => msg.clone(),
            AppError::Database(_)
            | AppError::RecipeApi(_)
            | AppError::EmailRelay(_)
            | AppError::Internal(_) => GENERIC_FAILURE.to_string(),
        }
    }

    /// Authorization failures: no remote call was attempted.
    pub fn is_authorization(&self) -> bool {
        matches!(self, AppError::Unauthenticated(_) | AppError::Forbidden(_))
    }

    /// Failures of the remote store or an external API.
    pub fn is_remote(&self) -> bool {
        match self {
            AppError::Database(_)
            | AppError::RecipeApi(_)
            | AppError::AuthProvider(_)
            | AppError::EmailRelay(_) => true,
            AppError::Operation { source, .. } => source.is_remote(),
            _ => false,
        }
    }
}

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, AppError>;

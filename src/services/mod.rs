// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Services module - remote operations behind the screens.

pub mod auth;
pub mod contact;
pub mod meal_api;
pub mod notifications;
pub mod recipes;

pub use auth::{AuthService, Registration};
pub use contact::ContactService;
pub use meal_api::MealDbClient;
pub use notifications::{LocalNotification, NotificationService, Notifier, TracingNotifier};
pub use recipes::{DeleteReport, RecipeService};

// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Screen controllers, independent of any UI toolkit.
//!
//! Each controller owns its mirror state, wires the identity gate in front of
//! its mutations, and subscribes on focus / unsubscribes on unfocus.

pub mod card;
pub mod favorites;
pub mod feed;
pub mod form;
pub mod list;
pub mod profile;
pub mod search;

pub use card::RecipeCard;
pub use favorites::FavoritesScreen;
pub use feed::FeedScreen;
pub use form::RecipeForm;
pub use list::{ListScreen, ListSource};
pub use profile::ProfileScreen;
pub use search::SearchScreen;

// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! RecipeHUB: share, browse, favorite and search recipes.
//!
//! This crate is the client-side data layer of the app: screen controllers
//! that mirror remote collections in real time, apply user mutations
//! optimistically, and gate every mutation on the current identity.

pub mod config;
pub mod db;
pub mod error;
pub mod gate;
pub mod mirror;
pub mod models;
pub mod screens;
pub mod services;
pub mod session;
pub mod time_utils;

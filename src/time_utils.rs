// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
///
/// Millisecond precision keeps lexicographic order equal to chronological order,
/// which the feed's server-side ordering relies on.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Short `YYYY-MM-DD` label shown on recipe cards.
pub fn date_label(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

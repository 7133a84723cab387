// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Local notifications, gated by the user's stored preference.

use crate::error::Result;
use crate::models::UserProfile;
use std::sync::Arc;

/// A notification shown immediately on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalNotification {
    pub title: String,
    pub body: String,
}

impl LocalNotification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn profile_updated(confirmation: &str) -> Self {
        Self::new("Profile Updated", confirmation)
    }

    pub fn notifications_enabled() -> Self {
        Self::new("Notifications Enabled", "You will receive recipe notifications.")
    }

    pub fn message_sent() -> Self {
        Self::new("Message sent", "Thank you! We received your email.")
    }
}

/// Platform notification facility.
pub trait Notifier: Send + Sync + 'static {
    fn schedule(&self, notification: &LocalNotification) -> Result<()>;
}

/// Writes notifications to the log; used by the headless binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn schedule(&self, notification: &LocalNotification) -> Result<()> {
        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            "Local notification"
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct NotificationService {
    notifier: Arc<dyn Notifier>,
}

impl NotificationService {
    pub fn new(notifier: impl Notifier) -> Self {
        Self {
            notifier: Arc::new(notifier),
        }
    }

    /// Schedule only if the profile opted in. Returns whether it was scheduled.
    ///
    /// Delivery failures are logged and never propagated.
    pub fn notify(&self, profile: Option<&UserProfile>, notification: LocalNotification) -> bool {
        if !profile.is_some_and(UserProfile::notifications_enabled) {
            tracing::debug!(title = %notification.title, "Notifications disabled; skipped");
            return false;
        }

        match self.notifier.schedule(&notification) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, title = %notification.title, "Failed to schedule notification");
                false
            }
        }
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new(TracingNotifier)
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Contact form delivery through the transactional email relay.

use crate::config::EmailRelayConfig;
use crate::error::{AppError, Result};
use crate::models::UserProfile;
use crate::services::notifications::{LocalNotification, NotificationService};
use serde::Serialize;

pub const EMPTY_MESSAGE: &str = "Please enter a message.";
pub const SEND_SUCCESS: &str = "Email sent successfully!";
pub const SEND_FAILURE: &str = "Sending failed. Try again.";

const DEFAULT_RELAY_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";
const ANONYMOUS_SENDER: &str = "Anonymous user";
const NO_REPLY_ADDRESS: &str = "no email";

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    message: &'a str,
    from_name: &'a str,
    reply_to: &'a str,
}

/// Contact form service.
#[derive(Clone)]
pub struct ContactService {
    http: reqwest::Client,
    endpoint: String,
    relay: Option<EmailRelayConfig>,
    notifications: NotificationService,
}

impl ContactService {
    /// `relay` is `None` when the credentials are not configured; sending then fails.
    pub fn new(relay: Option<EmailRelayConfig>, notifications: NotificationService) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: DEFAULT_RELAY_URL.to_string(),
            relay,
            notifications,
        }
    }

    /// Point at a different relay endpoint (tests, self-hosted relays).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Forward a message. Returns the confirmation to show.
    pub async fn send_message(
        &self,
        message: &str,
        sender: Option<&UserProfile>,
    ) -> Result<&'static str> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::Validation(EMPTY_MESSAGE.to_string()));
        }

        let Some(relay) = &self.relay else {
            tracing::error!("Email relay is not configured");
            return Err(AppError::EmailRelay("relay not configured".to_string()).surfaced(SEND_FAILURE));
        };

        let from_name = sender
            .map(|p| p.full_name.as_str())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(ANONYMOUS_SENDER);
        let reply_to = sender
            .map(|p| p.email.as_str())
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(NO_REPLY_ADDRESS);

        let body = RelayRequest {
            service_id: &relay.service_id,
            template_id: &relay.template_id,
            user_id: &relay.public_key,
            template_params: TemplateParams {
                message,
                from_name,
                reply_to,
            },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::EmailRelay(e.to_string()).surfaced(SEND_FAILURE))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %text, "Email relay rejected message");
            return Err(AppError::EmailRelay(format!("HTTP {}: {}", status, text)).surfaced(SEND_FAILURE));
        }

        tracing::info!(from = %from_name, "Contact message sent");
        self.notifications
            .notify(sender, LocalNotification::message_sent());
        Ok(SEND_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_message_is_rejected_before_sending() {
        let service = ContactService::new(None, NotificationService::default());
        let err = service.send_message("   ", None).await.unwrap_err();
        assert_eq!(err.user_message(), EMPTY_MESSAGE);
    }

    #[tokio::test]
    async fn test_unconfigured_relay_fails_cleanly() {
        let service = ContactService::new(None, NotificationService::default());
        let err = service.send_message("Hello", None).await.unwrap_err();
        assert_eq!(err.user_message(), SEND_FAILURE);
        assert!(err.is_remote());
    }

    #[test]
    fn test_request_shape() {
        let body = RelayRequest {
            service_id: "svc",
            template_id: "tpl",
            user_id: "key",
            template_params: TemplateParams {
                message: "Hi",
                from_name: ANONYMOUS_SENDER,
                reply_to: NO_REPLY_ADDRESS,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["user_id"], "key");
        assert_eq!(json["template_params"]["message"], "Hi");
    }
}

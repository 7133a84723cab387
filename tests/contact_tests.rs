// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Contact form delivery against a stub email relay.

use recipehub::config::EmailRelayConfig;
use recipehub::error::Result;
use recipehub::models::{ProfileSettings, UserProfile};
use recipehub::services::contact::{SEND_FAILURE, SEND_SUCCESS};
use recipehub::services::{ContactService, LocalNotification, NotificationService, Notifier};
use std::sync::{Arc, Mutex};

mod common;
use common::StubServer;

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<LocalNotification>>>);

impl Notifier for Recorder {
    fn schedule(&self, notification: &LocalNotification) -> Result<()> {
        self.0.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

fn relay() -> EmailRelayConfig {
    EmailRelayConfig {
        service_id: "svc".into(),
        template_id: "tpl".into(),
        public_key: "pub".into(),
    }
}

fn contact(server: &StubServer, recorder: &Recorder) -> ContactService {
    ContactService::new(Some(relay()), NotificationService::new(recorder.clone()))
        .with_endpoint(format!("{}/api/v1.0/email/send", server.base_url))
}

fn sender(notifications: bool) -> UserProfile {
    UserProfile {
        full_name: "Ana Cook".into(),
        email: "ana@example.com".into(),
        settings: ProfileSettings { notifications },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_message_is_relayed_and_confirmed() {
    let server = StubServer::start(vec![("/email/send", 200, "OK".to_string())]).await;
    let recorder = Recorder::default();
    let service = contact(&server, &recorder);

    let message = service
        .send_message("  Love the soup recipes! ", Some(&sender(true)))
        .await
        .unwrap();
    assert_eq!(message, SEND_SUCCESS);

    let body = server.requests()[0].json();
    assert_eq!(body["service_id"], "svc");
    assert_eq!(body["template_id"], "tpl");
    assert_eq!(body["user_id"], "pub");
    assert_eq!(body["template_params"]["message"], "Love the soup recipes!");
    assert_eq!(body["template_params"]["from_name"], "Ana Cook");
    assert_eq!(body["template_params"]["reply_to"], "ana@example.com");

    let titles: Vec<String> = recorder.0.lock().unwrap().iter().map(|n| n.title.clone()).collect();
    assert_eq!(titles, vec!["Message sent"]);
}

#[tokio::test]
async fn test_no_notification_when_disabled_or_anonymous() {
    let server = StubServer::start(vec![("/email/send", 200, "OK".to_string())]).await;
    let recorder = Recorder::default();
    let service = contact(&server, &recorder);

    service.send_message("Hello", Some(&sender(false))).await.unwrap();
    service.send_message("Hello", None).await.unwrap();
    assert!(recorder.0.lock().unwrap().is_empty());

    let anonymous = server.requests()[1].json();
    assert_eq!(anonymous["template_params"]["from_name"], "Anonymous user");
    assert_eq!(anonymous["template_params"]["reply_to"], "no email");
}

#[tokio::test]
async fn test_relay_rejection_is_surfaced() {
    let server = StubServer::start(vec![("/email/send", 400, "The user ID is invalid".to_string())]).await;
    let recorder = Recorder::default();
    let service = contact(&server, &recorder);

    let err = service.send_message("Hello", Some(&sender(true))).await.unwrap_err();
    assert_eq!(err.user_message(), SEND_FAILURE);
    assert!(recorder.0.lock().unwrap().is_empty());
}

// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! RecipeHUB headless feed watcher
//!
//! Connects to the recipe store, optionally signs in, and logs every revision
//! of the home feed until interrupted.

use recipehub::{
    config::Config,
    db::{FirestoreDb, MemoryStore, RecipeStore},
    screens::FeedScreen,
    services::{AuthService, RecipeService},
    session::SessionHandle,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(
        project = %config.firebase_project_id,
        offline = config.offline,
        "Starting RecipeHUB feed watcher"
    );

    if config.offline {
        run(config, MemoryStore::new()).await
    } else {
        let db = FirestoreDb::new(&config.firebase_project_id).await?;
        run(config, db).await
    }
}

async fn run<S: RecipeStore>(config: Config, store: S) -> Result<(), Box<dyn std::error::Error>> {
    let session = SessionHandle::new();

    if let (Ok(email), Ok(password)) = (
        std::env::var("RECIPEHUB_EMAIL"),
        std::env::var("RECIPEHUB_PASSWORD"),
    ) {
        let auth = AuthService::new(&config.firebase_api_key, store.clone(), session.clone());
        match auth.sign_in(&email, &password).await {
            Ok(identity) => tracing::info!(uid = %identity.uid, "Signed in"),
            Err(e) => tracing::warn!(error = %e, "Sign-in failed; continuing signed out"),
        }
    }

    let feed = FeedScreen::new(RecipeService::new(store, session));
    feed.focus();

    let state = feed.feed().state().clone();
    let watcher = tokio::spawn(async move {
        let mut seen = 0;
        loop {
            let view = state.wait_until(|v| v.revision > seen).await;
            seen = view.revision;
            if let Some(error) = &view.error {
                tracing::warn!(error = %error, "Feed unavailable");
                continue;
            }
            tracing::info!(
                revision = view.revision,
                count = view.items.len(),
                newest = view.items.first().map(|r| r.title.as_str()).unwrap_or(""),
                "Feed updated"
            );
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    watcher.abort();
    feed.unfocus();
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("recipehub=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}

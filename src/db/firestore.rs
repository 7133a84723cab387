// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Recipes (shared `AllRecipes` feed and per-user copies)
//! - Favorites (per-user shadow documents)
//! - Profiles
//! - Standing listeners that re-deliver full snapshots

use crate::db::{collections, RecipeQuery, RecipeStore, SnapshotEvent, Subscription};
use crate::error::AppError;
use crate::models::{Recipe, UserProfile};
use async_trait::async_trait;
use firestore::{
    FirestoreDocument, FirestoreListener, FirestoreListenerTarget, FirestoreMemListenStateStorage,
    FirestoreQueryDirection,
};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

type Listener = FirestoreListener<firestore::FirestoreDb, FirestoreMemListenStateStorage>;

fn db_err(e: impl std::fmt::Display) -> AppError {
    AppError::Database(e.to_string())
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Decode a document, taking the id from its key when the body has none.
    fn recipe_from_doc(doc: &FirestoreDocument) -> Result<Recipe, AppError> {
        let key = doc.name.rsplit('/').next().unwrap_or_default();
        firestore::FirestoreDb::deserialize_doc_to::<Recipe>(doc)
            .map(|recipe| recipe.with_document_key(key))
            .map_err(|e| AppError::Database(format!("Malformed recipe document {}: {}", key, e)))
    }

    /// Decode a list, skipping (and logging) malformed documents.
    fn recipes_from_docs(docs: Vec<FirestoreDocument>) -> Vec<Recipe> {
        docs.iter()
            .filter_map(|doc| match Self::recipe_from_doc(doc) {
                Ok(recipe) => Some(recipe),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed recipe document");
                    None
                }
            })
            .collect()
    }

    async fn get_recipe_in(
        &self,
        uid: Option<&str>,
        collection: &str,
        id: &str,
    ) -> Result<Option<Recipe>, AppError> {
        let builder = self.client.fluent().select().by_id_in(collection);
        let doc = match uid {
            Some(uid) => {
                let parent = self
                    .client
                    .parent_path(collections::USERS, uid)
                    .map_err(db_err)?;
                builder.parent(&parent).one(id).await
            }
            None => builder.one(id).await,
        }
        .map_err(db_err)?;

        doc.as_ref().map(Self::recipe_from_doc).transpose()
    }

    async fn put_user_scoped(
        &self,
        uid: &str,
        collection: &str,
        recipe: &Recipe,
    ) -> Result<(), AppError> {
        let parent = self
            .client
            .parent_path(collections::USERS, uid)
            .map_err(db_err)?;

        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collection)
            .document_id(&recipe.id)
            .parent(&parent)
            .object(recipe)
            .execute()
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_user_scoped(
        &self,
        uid: &str,
        collection: &str,
        id: &str,
    ) -> Result<(), AppError> {
        let parent = self
            .client
            .parent_path(collections::USERS, uid)
            .map_err(db_err)?;

        self.client
            .fluent()
            .delete()
            .from(collection)
            .document_id(id)
            .parent(&parent)
            .execute()
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Register a listen target equivalent to `query` on `listener`.
    fn add_listen_target(&self, query: &RecipeQuery, listener: &mut Listener) -> Result<(), AppError> {
        // Every subscription owns its own listener, so one target id is enough.
        let target = FirestoreListenerTarget::new(1_u32);
        let select = self.client.fluent().select();
        match query {
            RecipeQuery::Feed => select
                .from(collections::ALL_RECIPES)
                .listen()
                .add_target(target, listener),
            RecipeQuery::OwnedBy(uid) => select
                .from(collections::ALL_RECIPES)
                .filter(|q| q.field("ownerId").eq(uid.as_str()))
                .listen()
                .add_target(target, listener),
            RecipeQuery::Keyword(token) => select
                .from(collections::ALL_RECIPES)
                .filter(|q| q.field("keywords").array_contains(token.as_str()))
                .listen()
                .add_target(target, listener),
            RecipeQuery::Favorites(uid) | RecipeQuery::UserRecipes(uid) => {
                let collection = if matches!(query, RecipeQuery::Favorites(_)) {
                    collections::FAVORITES
                } else {
                    collections::USER_RECIPES
                };
                let parent = self
                    .client
                    .parent_path(collections::USERS, uid.as_str())
                    .map_err(db_err)?;
                select
                    .from(collection)
                    .parent(&parent)
                    .listen()
                    .add_target(target, listener)
            }
        }
        .map_err(db_err)
    }
}

#[async_trait]
impl RecipeStore for FirestoreDb {
    // ─── Recipe Operations ───────────────────────────────────────

    async fn get_recipe(&self, id: &str) -> Result<Option<Recipe>, AppError> {
        self.get_recipe_in(None, collections::ALL_RECIPES, id).await
    }

    async fn put_recipe(&self, recipe: &Recipe) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::ALL_RECIPES)
            .document_id(&recipe.id)
            .object(recipe)
            .execute()
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_recipe(&self, id: &str) -> Result<(), AppError> {
        self.client
            .fluent()
            .delete()
            .from(collections::ALL_RECIPES)
            .document_id(id)
            .execute()
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn put_user_recipe(&self, uid: &str, recipe: &Recipe) -> Result<(), AppError> {
        self.put_user_scoped(uid, collections::USER_RECIPES, recipe)
            .await
    }

    async fn delete_user_recipe(&self, uid: &str, id: &str) -> Result<(), AppError> {
        self.delete_user_scoped(uid, collections::USER_RECIPES, id)
            .await
    }

    // ─── Favorite Operations ─────────────────────────────────────

    async fn get_favorite(&self, uid: &str, id: &str) -> Result<Option<Recipe>, AppError> {
        self.get_recipe_in(Some(uid), collections::FAVORITES, id)
            .await
    }

    async fn put_favorite(&self, uid: &str, shadow: &Recipe) -> Result<(), AppError> {
        self.put_user_scoped(uid, collections::FAVORITES, shadow)
            .await
    }

    async fn delete_favorite(&self, uid: &str, id: &str) -> Result<(), AppError> {
        self.delete_user_scoped(uid, collections::FAVORITES, id)
            .await
    }

    // ─── Profile Operations ──────────────────────────────────────

    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj::<UserProfile>()
            .one(uid)
            .await
            .map_err(db_err)
    }

    async fn put_profile(&self, uid: &str, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(uid)
            .object(profile)
            .execute()
            .await
            .map_err(db_err)?;
        Ok(())
    }

    // ─── Queries and Listeners ───────────────────────────────────

    async fn query(&self, query: &RecipeQuery) -> Result<Vec<Recipe>, AppError> {
        let select = self.client.fluent().select();
        let docs = match query {
            RecipeQuery::Feed => {
                select
                    .from(collections::ALL_RECIPES)
                    .order_by([("createdAt", FirestoreQueryDirection::Descending)])
                    .query()
                    .await
            }
            RecipeQuery::OwnedBy(uid) => {
                select
                    .from(collections::ALL_RECIPES)
                    .filter(|q| q.field("ownerId").eq(uid.as_str()))
                    .query()
                    .await
            }
            RecipeQuery::Keyword(token) => {
                select
                    .from(collections::ALL_RECIPES)
                    .filter(|q| q.field("keywords").array_contains(token.as_str()))
                    .query()
                    .await
            }
            RecipeQuery::Favorites(uid) | RecipeQuery::UserRecipes(uid) => {
                let collection = if matches!(query, RecipeQuery::Favorites(_)) {
                    collections::FAVORITES
                } else {
                    collections::USER_RECIPES
                };
                let parent = self
                    .client
                    .parent_path(collections::USERS, uid.as_str())
                    .map_err(db_err)?;
                select.from(collection).parent(&parent).query().await
            }
        }
        .map_err(db_err)?;

        Ok(Self::recipes_from_docs(docs))
    }

    /// Standing subscription.
    ///
    /// The Firestore listener is only used as a change signal: every burst of
    /// listen events triggers one re-query, and the full result is delivered as
    /// a snapshot. This keeps the delivered shape identical to [`Self::query`],
    /// including server-side ordering of the feed.
    async fn subscribe(&self, query: RecipeQuery) -> Result<Subscription, AppError> {
        let mut listener = self
            .client
            .create_listener(FirestoreMemListenStateStorage::new())
            .await
            .map_err(db_err)?;
        self.add_listen_target(&query, &mut listener)?;

        let changed = Arc::new(Notify::new());
        let trigger = changed.clone();
        listener
            .start(move |_event| {
                let trigger = trigger.clone();
                async move {
                    trigger.notify_one();
                    Ok(())
                }
            })
            .await
            .map_err(db_err)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let db = self.clone();
        let refetch = tokio::spawn(async move {
            loop {
                let event = match db.query(&query).await {
                    Ok(items) => SnapshotEvent::Snapshot(items),
                    Err(e) => {
                        tracing::warn!(query = ?query, error = %e, "Listener re-query failed");
                        let _ = tx.send(SnapshotEvent::Error(e.to_string()));
                        break;
                    }
                };
                if tx.send(event).is_err() {
                    break;
                }
                changed.notified().await;
            }
        });

        tracing::debug!("Firestore listener started");

        Ok(Subscription::new(
            rx,
            ListenerGuard {
                listener: Some(listener),
                refetch,
            },
        ))
    }
}

/// Stops the re-query task and shuts the listener down when dropped.
struct ListenerGuard {
    listener: Option<Listener>,
    refetch: JoinHandle<()>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.refetch.abort();
        if let Some(mut listener) = self.listener.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    if let Err(e) = listener.shutdown().await {
                        tracing::warn!(error = %e, "Failed to shut down Firestore listener");
                    }
                });
            }
        }
    }
}

//! Database layer: the remote document store contract and its backends.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::{MemoryStore, StoreOp};

use crate::error::Result;
use crate::models::{Recipe, UserProfile};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Collection names as constants.
pub mod collections {
    /// Shared feed, keyed by recipe id
    pub const ALL_RECIPES: &str = "AllRecipes";
    /// Profiles, keyed by identity uid
    pub const USERS: &str = "users";
    /// `users/{uid}/recipes`: the author's own copy of each recipe
    pub const USER_RECIPES: &str = "recipes";
    /// `users/{uid}/favorites`: favorite shadows keyed by recipe id
    pub const FAVORITES: &str = "favorites";
}

/// A collection query a screen can read once or subscribe to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeQuery {
    /// `AllRecipes` ordered by `createdAt` descending (server-side)
    Feed,
    /// `AllRecipes` where `ownerId == uid`
    OwnedBy(String),
    /// `users/{uid}/favorites`
    Favorites(String),
    /// `users/{uid}/recipes`
    UserRecipes(String),
    /// `AllRecipes` where `keywords` array-contains the token
    Keyword(String),
}

impl RecipeQuery {
    /// Whether the store already orders results; other queries are sorted locally.
    pub fn is_server_ordered(&self) -> bool {
        matches!(self, RecipeQuery::Feed)
    }
}

/// One delivery from a standing subscription.
#[derive(Debug, Clone)]
pub enum SnapshotEvent {
    /// Full result set; replaces whatever the screen holds
    Snapshot(Vec<Recipe>),
    /// The listener failed and will deliver nothing more
    Error(String),
}

/// A standing listener. Dropping it unregisters the listener.
pub struct Subscription {
    events: mpsc::UnboundedReceiver<SnapshotEvent>,
    _guard: Box<dyn Send>,
}

impl Subscription {
    pub fn new(
        events: mpsc::UnboundedReceiver<SnapshotEvent>,
        guard: impl Send + 'static,
    ) -> Self {
        Self {
            events,
            _guard: Box::new(guard),
        }
    }

    /// Next event, or `None` once the listener is gone.
    pub async fn next(&mut self) -> Option<SnapshotEvent> {
        self.events.recv().await
    }
}

/// The remote document store as consumed by screens and services.
///
/// Writes create or overwrite by explicit key; no schema is enforced.
/// Subscriptions deliver an initial snapshot and then a new full snapshot after
/// every change, including the subscriber's own writes.
#[async_trait]
pub trait RecipeStore: Clone + Send + Sync + 'static {
    async fn get_recipe(&self, id: &str) -> Result<Option<Recipe>>;
    async fn put_recipe(&self, recipe: &Recipe) -> Result<()>;
    async fn delete_recipe(&self, id: &str) -> Result<()>;

    async fn put_user_recipe(&self, uid: &str, recipe: &Recipe) -> Result<()>;
    async fn delete_user_recipe(&self, uid: &str, id: &str) -> Result<()>;

    async fn get_favorite(&self, uid: &str, id: &str) -> Result<Option<Recipe>>;
    async fn put_favorite(&self, uid: &str, shadow: &Recipe) -> Result<()>;
    async fn delete_favorite(&self, uid: &str, id: &str) -> Result<()>;

    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>>;
    async fn put_profile(&self, uid: &str, profile: &UserProfile) -> Result<()>;

    /// One-shot read of a query.
    async fn query(&self, query: &RecipeQuery) -> Result<Vec<Recipe>>;

    /// Standing subscription to a query.
    async fn subscribe(&self, query: RecipeQuery) -> Result<Subscription>;
}

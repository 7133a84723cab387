//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development.

use std::env;
use std::time::Duration;

const DEFAULT_MEALDB_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Firebase/GCP project hosting the document store
    pub firebase_project_id: String,
    /// Web API key for the identity provider REST endpoints
    pub firebase_api_key: String,
    /// Base URL of the public recipe API
    pub mealdb_base_url: String,
    /// Delay after the last keystroke before a search query is issued
    pub search_debounce: Duration,
    /// Contact form relay; disabled when not fully configured
    pub email_relay: Option<EmailRelayConfig>,
    /// Run against the in-process store instead of Firestore
    pub offline: bool,
}

/// Credentials for the transactional email relay.
#[derive(Debug, Clone)]
pub struct EmailRelayConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            firebase_project_id: "test-project".to_string(),
            firebase_api_key: "test_api_key".to_string(),
            mealdb_base_url: DEFAULT_MEALDB_BASE_URL.to_string(),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            email_relay: None,
            offline: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let search_debounce_ms = match env::var("SEARCH_DEBOUNCE_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("SEARCH_DEBOUNCE_MS", raw))?,
            Err(_) => DEFAULT_SEARCH_DEBOUNCE_MS,
        };

        Ok(Self {
            firebase_project_id: env::var("FIREBASE_PROJECT_ID")
                .unwrap_or_else(|_| "local-dev".to_string()),
            firebase_api_key: env::var("FIREBASE_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("FIREBASE_API_KEY"))?,
            mealdb_base_url: env::var("MEALDB_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_MEALDB_BASE_URL.to_string()),
            search_debounce: Duration::from_millis(search_debounce_ms),
            email_relay: email_relay_from_env(),
            offline: env::var("RECIPEHUB_OFFLINE")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }
}

/// The relay is only enabled when all three values are present.
fn email_relay_from_env() -> Option<EmailRelayConfig> {
    let service_id = env::var("EMAILJS_SERVICE_ID").ok()?;
    let template_id = env::var("EMAILJS_TEMPLATE_ID").ok()?;
    let public_key = env::var("EMAILJS_PUBLIC_KEY").ok()?;

    Some(EmailRelayConfig {
        service_id: service_id.trim().to_string(),
        template_id: template_id.trim().to_string(),
        public_key: public_key.trim().to_string(),
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

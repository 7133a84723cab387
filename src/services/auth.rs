// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Identity provider client (Identity Toolkit REST API).
//!
//! Handles:
//! - E-mail/password registration, including the profile document
//! - Sign-in, sign-out and password-reset e-mails
//! - Federated sign-in with an IdP token
//! - Publishing the session principal through [`SessionHandle`]

use crate::db::RecipeStore;
use crate::error::{AppError, Result, GENERIC_FAILURE};
use crate::models::recipe::not_blank;
use crate::models::{Timestamp, UserProfile};
use crate::session::{Identity, SessionHandle};
use serde::{Deserialize, Serialize};
use validator::Validate;

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

pub const FILL_ALL_FIELDS: &str = "Please fill out all fields.";
pub const INVALID_EMAIL: &str = "Please enter a valid email address.";
pub const WEAK_PASSWORD: &str = "Password should be at least 6 characters.";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match.";
pub const EMAIL_EXISTS: &str = "Email already exists";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password.";
pub const RESET_SENT: &str = "Password reset email sent.";

/// Registration form input.
#[derive(Debug, Clone, Default, Validate)]
pub struct Registration {
    #[validate(custom(function = "not_blank"))]
    pub full_name: String,
    #[validate(custom(function = "not_blank"), email)]
    pub email: String,
    #[validate(custom(function = "not_blank"), length(min = 6))]
    pub password: String,
    #[validate(custom(function = "not_blank"), must_match(other = "password"))]
    pub confirm_password: String,
    /// Photo URL or `data:` URI chosen at registration
    pub photo: Option<String>,
}

impl Registration {
    /// Validate, mapping the first failing rule to its message.
    pub fn check(&self) -> Result<()> {
        let Err(errors) = self.validate() else {
            return Ok(());
        };
        let fields = errors.field_errors();

        let any_blank = fields
            .values()
            .any(|errs| errs.iter().any(|e| e.code == "blank"));
        let message = if any_blank {
            FILL_ALL_FIELDS
        } else if fields.contains_key("email") {
            INVALID_EMAIL
        } else if fields.contains_key("password") {
            WEAK_PASSWORD
        } else {
            PASSWORD_MISMATCH
        };
        Err(AppError::Validation(message.to_string()))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_secure_token: bool,
    return_idp_credential: bool,
}

/// Token exchange response shared by the sign-up/sign-in endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

impl AccountResponse {
    fn identity(&self) -> Identity {
        Identity {
            uid: self.local_id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone().filter(|n| !n.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Map a provider error code (e.g. `EMAIL_EXISTS`) to the message shown.
pub fn provider_message(code: &str) -> &'static str {
    // Codes may carry a detail suffix: "WEAK_PASSWORD : Password should be..."
    let code = code.split([' ', ':']).next().unwrap_or_default();
    match code {
        "EMAIL_EXISTS" => EMAIL_EXISTS,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => INVALID_CREDENTIALS,
        "INVALID_EMAIL" => INVALID_EMAIL,
        "WEAK_PASSWORD" => WEAK_PASSWORD,
        "USER_DISABLED" => "This account has been disabled.",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts. Try again later.",
        _ => GENERIC_FAILURE,
    }
}

/// Identity provider client.
#[derive(Clone)]
pub struct AuthService<S> {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    store: S,
    session: SessionHandle,
}

impl<S: RecipeStore> AuthService<S> {
    pub fn new(api_key: impl Into<String>, store: S, session: SessionHandle) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            store,
            session,
        }
    }

    /// Point at the auth emulator or a test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Create an account and its profile document, then sign out so the user
    /// logs in explicitly.
    pub async fn sign_up(&self, form: &Registration) -> Result<Identity> {
        form.check()?;

        let email = form.email.trim();
        let account: AccountResponse = self
            .post(
                "accounts:signUp",
                &PasswordRequest {
                    email,
                    password: &form.password,
                    return_secure_token: true,
                },
            )
            .await?;
        let identity = account.identity();

        let profile = UserProfile {
            full_name: form.full_name.trim().to_string(),
            email: email.to_string(),
            photo: form.photo.clone().filter(|p| !p.trim().is_empty()),
            created_at: Some(Timestamp::now()),
            ..Default::default()
        };
        let stored = self.store.put_profile(&identity.uid, &profile).await;

        self.sign_out();

        stored.map_err(|e| {
            tracing::error!(error = %e, uid = %identity.uid, "Failed to create profile");
            e.surfaced(GENERIC_FAILURE)
        })?;

        tracing::info!(uid = %identity.uid, "Account registered");
        Ok(identity)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation(FILL_ALL_FIELDS.to_string()));
        }

        let account: AccountResponse = self
            .post(
                "accounts:signInWithPassword",
                &PasswordRequest {
                    email: email.trim(),
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        let identity = account.identity();
        self.session.set(Some(identity.clone()));
        Ok(identity)
    }

    pub fn sign_out(&self) {
        self.session.set(None);
    }

    /// Ask the provider to e-mail a password reset link.
    pub async fn send_password_reset(&self, email: &str) -> Result<&'static str> {
        if email.trim().is_empty() {
            return Err(AppError::Validation(INVALID_EMAIL.to_string()));
        }

        let _: serde_json::Value = self
            .post(
                "accounts:sendOobCode",
                &OobCodeRequest {
                    request_type: "PASSWORD_RESET",
                    email: email.trim(),
                },
            )
            .await?;

        tracing::info!("Password reset requested");
        Ok(RESET_SENT)
    }

    /// Sign in with a federated provider token, creating the profile on first use.
    ///
    /// `provider_id` is the provider's domain, e.g. `google.com`.
    pub async fn sign_in_with_idp(&self, provider_id: &str, id_token: &str) -> Result<Identity> {
        let post_body = format!(
            "id_token={}&providerId={}",
            urlencoding::encode(id_token),
            urlencoding::encode(provider_id)
        );
        let account: AccountResponse = self
            .post(
                "accounts:signInWithIdp",
                &IdpRequest {
                    post_body,
                    request_uri: "http://localhost",
                    return_secure_token: true,
                    return_idp_credential: true,
                },
            )
            .await?;
        let identity = account.identity();

        if self.store.get_profile(&identity.uid).await?.is_none() {
            let profile = UserProfile {
                full_name: identity.display_name.clone().unwrap_or_default(),
                email: identity.email.clone().unwrap_or_default(),
                provider: Some(provider_name(provider_id).to_string()),
                created_at: Some(Timestamp::now()),
                ..Default::default()
            };
            self.store.put_profile(&identity.uid, &profile).await?;
            tracing::info!(uid = %identity.uid, provider = %provider_id, "Federated profile created");
        }

        self.session.set(Some(identity.clone()));
        Ok(identity)
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, endpoint, "Identity provider unreachable");
                AppError::AuthProvider(GENERIC_FAILURE.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let code = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|env| env.error.message)
                .unwrap_or_default();
            tracing::warn!(status = %status, code = %code, endpoint, "Identity provider rejected request");
            return Err(AppError::AuthProvider(provider_message(&code).to_string()));
        }

        response.json().await.map_err(|e| {
            tracing::warn!(error = %e, endpoint, "Unexpected identity provider response");
            AppError::AuthProvider(GENERIC_FAILURE.to_string())
        })
    }
}

/// `google.com` -> `google`
fn provider_name(provider_id: &str) -> &str {
    provider_id.split('.').next().unwrap_or(provider_id)
}

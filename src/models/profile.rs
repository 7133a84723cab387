//! User profile model for storage and display.

use super::timestamp::Timestamp;
use crate::error::{AppError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Avatar shown when the user has no photo of either kind.
pub const DEFAULT_AVATAR_URL: &str = "https://cdn-icons-png.flaticon.com/512/149/149071.png";

/// Profile document stored at `users/{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    /// Photo URL (or a data URI written at registration)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Inline base64 JPEG; mutually exclusive with `photo`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_base64: Option<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub settings: ProfileSettings,
    /// Federated provider id (e.g. "google") when not an e-mail account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSettings {
    #[serde(default)]
    pub notifications: bool,
}

impl UserProfile {
    /// Image source for the avatar: inline data first, then URL, then default.
    pub fn avatar_uri(&self) -> String {
        if let Some(data) = self.photo_base64.as_deref() {
            return format!("data:image/jpeg;base64,{}", data);
        }
        self.photo
            .clone()
            .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string())
    }

    pub fn notifications_enabled(&self) -> bool {
        self.settings.notifications
    }
}

/// A single-field profile edit.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileField {
    FullName(String),
    Bio(String),
    PhotoUrl(String),
    /// Raw base64 or a `data:` URI; stored without the prefix
    PhotoBase64(String),
    Notifications(bool),
}

impl ProfileField {
    /// Field name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ProfileField::FullName(_) => "fullName",
            ProfileField::Bio(_) => "bio",
            ProfileField::PhotoUrl(_) => "photo",
            ProfileField::PhotoBase64(_) => "photoBase64",
            ProfileField::Notifications(_) => "settings.notifications",
        }
    }

    /// Reject blank values and undecodable images before any remote call.
    pub fn check(&self) -> Result<()> {
        match self {
            ProfileField::FullName(v) | ProfileField::Bio(v) | ProfileField::PhotoUrl(v) => {
                if v.trim().is_empty() {
                    return Err(AppError::Validation("Please enter a value.".to_string()));
                }
            }
            ProfileField::PhotoBase64(v) => {
                let payload = strip_data_uri(v);
                if payload.is_empty() || STANDARD.decode(payload).is_err() {
                    return Err(AppError::Validation("Invalid image data.".to_string()));
                }
            }
            ProfileField::Notifications(_) => {}
        }
        Ok(())
    }

    /// Write the value into a profile.
    pub fn apply(&self, profile: &mut UserProfile) {
        match self {
            ProfileField::FullName(v) => profile.full_name = v.trim().to_string(),
            ProfileField::Bio(v) => profile.bio = v.trim().to_string(),
            ProfileField::PhotoUrl(v) => {
                profile.photo = Some(v.trim().to_string());
                profile.photo_base64 = None;
            }
            ProfileField::PhotoBase64(v) => {
                profile.photo_base64 = Some(strip_data_uri(v).to_string());
                profile.photo = None;
            }
            ProfileField::Notifications(enabled) => profile.settings.notifications = *enabled,
        }
    }

    /// Copy this field's stored value(s) from `from` into `into`, leaving
    /// every other field of `into` alone.
    pub fn restore(&self, from: &UserProfile, into: &mut UserProfile) {
        match self {
            ProfileField::FullName(_) => into.full_name = from.full_name.clone(),
            ProfileField::Bio(_) => into.bio = from.bio.clone(),
            ProfileField::PhotoUrl(_) | ProfileField::PhotoBase64(_) => {
                into.photo = from.photo.clone();
                into.photo_base64 = from.photo_base64.clone();
            }
            ProfileField::Notifications(_) => into.settings.notifications = from.settings.notifications,
        }
    }

    /// Confirmation toast after a successful update.
    pub fn confirmation(&self) -> &'static str {
        match self {
            ProfileField::FullName(_) => "Name updated!",
            ProfileField::Bio(_) => "Bio updated!",
            ProfileField::PhotoUrl(_) | ProfileField::PhotoBase64(_) => "Profile picture updated!",
            ProfileField::Notifications(true) => "Notifications enabled.",
            ProfileField::Notifications(false) => "Notifications disabled.",
        }
    }
}

fn strip_data_uri(value: &str) -> &str {
    let value = value.trim();
    match value.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(""),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_representations_are_exclusive() {
        let mut profile = UserProfile {
            photo: Some("https://example.com/me.jpg".into()),
            ..Default::default()
        };

        ProfileField::PhotoBase64("data:image/jpeg;base64,aGVsbG8=".into()).apply(&mut profile);
        assert_eq!(profile.photo, None);
        assert_eq!(profile.photo_base64.as_deref(), Some("aGVsbG8="));
        assert_eq!(profile.avatar_uri(), "data:image/jpeg;base64,aGVsbG8=");

        ProfileField::PhotoUrl("https://example.com/new.jpg".into()).apply(&mut profile);
        assert_eq!(profile.photo_base64, None);
        assert_eq!(profile.avatar_uri(), "https://example.com/new.jpg");
    }

    #[test]
    fn test_restore_touches_only_its_field() {
        let before = UserProfile {
            full_name: "Ana".into(),
            photo: Some("https://example.com/me.jpg".into()),
            ..Default::default()
        };
        let mut now = UserProfile {
            full_name: "Ana".into(),
            bio: "Cook".into(),
            photo_base64: Some("aGVsbG8=".into()),
            ..Default::default()
        };

        ProfileField::PhotoBase64("aGVsbG8=".into()).restore(&before, &mut now);
        assert_eq!(now.photo, before.photo);
        assert_eq!(now.photo_base64, None);
        assert_eq!(now.bio, "Cook");
    }

    #[test]
    fn test_default_avatar() {
        assert_eq!(UserProfile::default().avatar_uri(), DEFAULT_AVATAR_URL);
    }

    #[test]
    fn test_field_checks() {
        assert!(ProfileField::FullName("  ".into()).check().is_err());
        assert!(ProfileField::Bio("Cook".into()).check().is_ok());
        assert!(ProfileField::PhotoBase64("not base64!!".into()).check().is_err());
        assert!(ProfileField::PhotoBase64("aGVsbG8=".into()).check().is_ok());
        assert!(ProfileField::Notifications(false).check().is_ok());
    }

    #[test]
    fn test_settings_round_trip_from_stored_shape() {
        let json = r#"{"fullName": "Ana", "email": "ana@example.com",
                       "settings": {"notifications": true}}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert!(profile.notifications_enabled());
        assert_eq!(profile.bio, "");
    }
}

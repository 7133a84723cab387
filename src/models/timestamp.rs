// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Polymorphic document timestamps.
//!
//! Stored documents carry `createdAt` either as an ISO-8601 string or as a
//! store-native timestamp. Both are normalized into [`Timestamp`] on read and
//! always written back as an RFC3339 UTC string.

use crate::time_utils::{date_label, format_utc_rfc3339};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A normalized UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// `YYYY-MM-DD` label for cards.
    pub fn label(&self) -> String {
        date_label(self.0)
    }

    /// Parse the string forms observed in stored documents.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self(date.with_timezone(&Utc)));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Self(Utc.from_utc_datetime(&naive)))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_utc_rfc3339(self.0))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_utc_rfc3339(self.0))
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TimestampVisitor)
    }
}

struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an ISO-8601 string, epoch milliseconds, or a {seconds, nanoseconds} map")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Timestamp::parse(v).ok_or_else(|| E::custom(format!("invalid timestamp: {v}")))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Timestamp::from_millis(v).ok_or_else(|| E::custom(format!("timestamp out of range: {v}")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let millis = i64::try_from(v).map_err(|_| E::custom("timestamp out of range"))?;
        self.visit_i64(millis)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        self.visit_i64(v as i64)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Self::Value, D::Error> {
        Timestamp::deserialize(deserializer)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut seconds: Option<i64> = None;
        let mut nanos: i64 = 0;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "seconds" | "_seconds" => seconds = Some(map.next_value()?),
                "nanoseconds" | "_nanoseconds" | "nanos" => nanos = map.next_value()?,
                _ => {
                    let _: de::IgnoredAny = map.next_value()?;
                }
            }
        }

        let seconds = seconds.ok_or_else(|| de::Error::missing_field("seconds"))?;
        let nanos = u32::try_from(nanos).map_err(|_| de::Error::custom("invalid nanoseconds"))?;
        Utc.timestamp_opt(seconds, nanos)
            .single()
            .map(Timestamp)
            .ok_or_else(|| de::Error::custom("timestamp out of range"))
    }
}

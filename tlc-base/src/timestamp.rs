/*
Copyright 2022 Daniel Brotsky. All rights reserved.

All of the copyrighted work in this repository is licensed under the
GNU Affero General Public License, reproduced in the LICENSE-AGPL file.

Attribution:

Some source files in this repository are derived from files in two Adobe Open
Source projects: the Adobe License Decoder repository found at this URL:
    https://github.com/adobe/adobe-license-decoder.rs
and the FRL Online Proxy repository found at this URL:
    https://github.com/adobe/frl-online-proxy

The files in those original works are copyright 2022 Adobe and the use of those
materials in this work is permitted by the MIT license under which they were
released.  That license is reproduced here in the LICENSE-MIT file.
*/
use chrono::{DateTime, Local, LocalResult, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// License timestamps are kept as milliseconds since the Unix Epoch,
/// which is how `java.util.Date` values travel in license documents.
/// The string form is an ISO-8601 datestamp; parsing accepts that,
/// a bare integer count of milliseconds, or a handful of other
/// common date formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub millis: i64,
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // beyond chrono's range only the millisecond count is meaningful
        match self.as_utc_datetime() {
            Some(_) => serializer.serialize_str(&self.to_string()),
            None => serializer.serialize_i64(self.millis),
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // JSON license terms may give either epoch millis or a datestamp
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Millis(i64),
            Text(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Millis(millis) => Ok(Self::from_millis(millis)),
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.as_utc_datetime() {
            Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3f%z").fmt(f),
            None => self.millis.fmt(f),
        }
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    /// Anything finer than a millisecond is truncated.
    fn from(dt: DateTime<Tz>) -> Self {
        Self { millis: dt.timestamp_millis() }
    }
}

impl Timestamp {
    /// `None` when the value is beyond what chrono can represent.
    pub fn as_local_datetime(&self) -> Option<DateTime<Local>> {
        match Local.timestamp_millis_opt(self.millis) {
            LocalResult::Single(dt) => Some(dt),
            _ => None,
        }
    }

    /// `None` when the value is beyond what chrono can represent.
    pub fn as_utc_datetime(&self) -> Option<DateTime<Utc>> {
        match Utc.timestamp_millis_opt(self.millis) {
            LocalResult::Single(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn from_millis(epoch_millis: i64) -> Self {
        Self { millis: epoch_millis }
    }

    pub fn now() -> Self {
        Self { millis: Utc::now().timestamp_millis() }
    }

    pub fn to_millis(&self) -> i64 {
        self.millis
    }

    /// A timestamp the given number of days later (or earlier, if negative).
    pub fn plus_days(&self, days: i64) -> Self {
        Self { millis: self.millis.saturating_add(days.saturating_mul(MILLIS_PER_DAY)) }
    }

    /// When you want it as a local calendar date.
    pub fn to_local_date(&self) -> String {
        match self.as_local_datetime() {
            Some(dt) => dt.format("%Y-%m-%d").to_string(),
            None => self.millis.to_string(),
        }
    }

    /// When you want it as an ISO-8601 date
    pub fn format_iso_8601(&self, timezone: bool) -> String {
        match self.as_utc_datetime() {
            Some(ts) if timezone => ts.format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string(),
            Some(ts) => ts.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            None => self.millis.to_string(),
        }
    }
}

impl std::str::FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(val) = s.parse::<i64>() {
            // we always work in milliseconds
            Ok(Self { millis: val })
        } else if let Ok(dt) = s.parse::<DateTime<Utc>>() {
            Ok(dt.into())
        } else if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.3f%z") {
            Ok(dt.into())
        } else if let Some(midnight) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            Ok(Utc.from_utc_datetime(&midnight).into())
        } else if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            Ok(dt.into())
        } else {
            match DateTime::parse_from_rfc3339(s) {
                Ok(dt) => Ok(dt.into()),
                Err(err) => Err(err),
            }
        }
    }
}

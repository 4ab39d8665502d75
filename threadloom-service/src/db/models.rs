//! Database model structs.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::Serialize;

use crate::auth::Role;

/// The singleton settings record.
///
/// `general` and `account` are stored as JSON documents; parsing them into
/// typed settings happens in the settings layer, not here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    pub id: String,
    pub general: serde_json::Value,
    pub account: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SettingsRecord {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        let general_str: String = row.get(1)?;
        let account_str: String = row.get(2)?;
        let created_at_str: String = row.get(3)?;
        let updated_at_str: String = row.get(4)?;

        Ok(Self {
            id: row.get(0)?,
            general: serde_json::from_str(&general_str)
                .unwrap_or(serde_json::Value::Object(Default::default())),
            account: serde_json::from_str(&account_str)
                .unwrap_or(serde_json::Value::Object(Default::default())),
            created_at: parse_timestamp(&created_at_str),
            updated_at: parse_timestamp(&updated_at_str),
        })
    }
}

/// A session row written by the external auth authority.
///
/// The service never sees raw tokens; callers present a bearer token and the
/// lookup happens against its sha256 digest.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub token_digest: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        let role_str: String = row.get(4)?;
        let expires_at_str: String = row.get(5)?;
        let created_at_str: String = row.get(6)?;

        Ok(Self {
            token_digest: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            role: role_str.parse().unwrap_or(Role::User),
            expires_at: parse_timestamp(&expires_at_str),
            created_at: parse_timestamp(&created_at_str),
        })
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

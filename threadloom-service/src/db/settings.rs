//! Settings record storage operations.
//!
//! All writes run inside a transaction so the read-merge-write sequence for a
//! sub-document update is a single atomic unit. The singleton UNIQUE column
//! plus `ON CONFLICT DO NOTHING` makes first-creation races safe: the loser
//! of the race simply re-reads the winner's row.

use chrono::Utc;
use rusqlite::{Transaction, params};
use uuid::Uuid;

use super::{Database, models::SettingsRecord};
use crate::error::{DatabaseError, ServiceError, ServiceResult};
use crate::settings::{SettingsDomain, merge_general};

const SELECT_SETTINGS: &str =
    "SELECT id, general, account, created_at, updated_at FROM settings LIMIT 1";

impl Database {
    /// Fetch the settings record without creating it
    pub fn fetch_settings(&self) -> ServiceResult<Option<SettingsRecord>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(SELECT_SETTINGS).map_err(DatabaseError::Query)?;
        let mut rows = stmt
            .query_map([], SettingsRecord::from_row)
            .map_err(DatabaseError::Query)?;

        match rows.next() {
            Some(row) => Ok(Some(row.map_err(DatabaseError::Query)?)),
            None => Ok(None),
        }
    }

    /// Return the settings record, inserting an empty shell if none exists
    pub fn get_or_create_settings(&self) -> ServiceResult<SettingsRecord> {
        let mut conn = self.conn.lock().unwrap();

        let tx = conn.transaction().map_err(DatabaseError::Query)?;
        let record = get_or_create_in_tx(&tx)?;
        tx.commit().map_err(DatabaseError::Query)?;

        Ok(record)
    }

    /// Replace one sub-document inside `general`, preserving siblings.
    ///
    /// The read, merge, and write all happen inside one transaction.
    pub fn merge_settings_domain(
        &self,
        domain: SettingsDomain,
        new_value: serde_json::Value,
    ) -> ServiceResult<SettingsRecord> {
        let mut conn = self.conn.lock().unwrap();

        let tx = conn.transaction().map_err(DatabaseError::Query)?;
        let existing = get_or_create_in_tx(&tx)?;
        let general = merge_general(&existing.general, domain, new_value);
        let record = write_general_in_tx(&tx, &existing, general)?;
        tx.commit().map_err(DatabaseError::Query)?;

        Ok(record)
    }

    /// Replace the whole `general` document
    pub fn replace_settings_general(
        &self,
        general: serde_json::Value,
    ) -> ServiceResult<SettingsRecord> {
        let mut conn = self.conn.lock().unwrap();

        let tx = conn.transaction().map_err(DatabaseError::Query)?;
        let existing = get_or_create_in_tx(&tx)?;
        let record = write_general_in_tx(&tx, &existing, general)?;
        tx.commit().map_err(DatabaseError::Query)?;

        Ok(record)
    }

    /// Replace the `account` document wholesale
    pub fn replace_settings_account(
        &self,
        account: serde_json::Value,
    ) -> ServiceResult<SettingsRecord> {
        let mut conn = self.conn.lock().unwrap();

        let tx = conn.transaction().map_err(DatabaseError::Query)?;
        let mut existing = get_or_create_in_tx(&tx)?;
        let account_str =
            serde_json::to_string(&account).map_err(DatabaseError::Serialization)?;
        let updated_at = Utc::now();

        tx.execute(
            "UPDATE settings SET account = ?1, updated_at = ?2 WHERE id = ?3",
            params![account_str, updated_at.to_rfc3339(), existing.id],
        )
        .map_err(DatabaseError::Query)?;
        tx.commit().map_err(DatabaseError::Query)?;

        existing.account = account;
        existing.updated_at = updated_at;
        Ok(existing)
    }
}

fn select_in_tx(tx: &Transaction<'_>) -> ServiceResult<Option<SettingsRecord>> {
    let mut stmt = tx.prepare(SELECT_SETTINGS).map_err(DatabaseError::Query)?;
    let mut rows = stmt
        .query_map([], SettingsRecord::from_row)
        .map_err(DatabaseError::Query)?;

    match rows.next() {
        Some(row) => Ok(Some(row.map_err(DatabaseError::Query)?)),
        None => Ok(None),
    }
}

fn get_or_create_in_tx(tx: &Transaction<'_>) -> ServiceResult<SettingsRecord> {
    if let Some(record) = select_in_tx(tx)? {
        return Ok(record);
    }

    let now = Utc::now().to_rfc3339();
    tx.execute(
        "INSERT INTO settings (id, singleton, general, account, created_at, updated_at) \
         VALUES (?1, 1, '{}', '{}', ?2, ?2) \
         ON CONFLICT(singleton) DO NOTHING",
        params![Uuid::new_v4().to_string(), now],
    )
    .map_err(DatabaseError::Query)?;

    select_in_tx(tx)?.ok_or_else(|| ServiceError::Internal {
        message: "settings record missing after upsert".to_string(),
    })
}

fn write_general_in_tx(
    tx: &Transaction<'_>,
    existing: &SettingsRecord,
    general: serde_json::Value,
) -> ServiceResult<SettingsRecord> {
    let general_str = serde_json::to_string(&general).map_err(DatabaseError::Serialization)?;
    let updated_at = Utc::now();

    tx.execute(
        "UPDATE settings SET general = ?1, updated_at = ?2 WHERE id = ?3",
        params![general_str, updated_at.to_rfc3339(), existing.id],
    )
    .map_err(DatabaseError::Query)?;

    Ok(SettingsRecord {
        id: existing.id.clone(),
        general,
        account: existing.account.clone(),
        created_at: existing.created_at,
        updated_at,
    })
}

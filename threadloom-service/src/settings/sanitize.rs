//! Reconciliation of the stored model list against the catalog.
//!
//! Catalog entries get retired over time, so the stored `enabledModels` list
//! can reference models that no longer exist. Cleanup partitions the stored
//! list, persists the surviving entries, and reports what was removed.

use serde::Serialize;
use serde_json::Value;

use crate::error::ServiceResult;
use crate::settings::catalog::{FALLBACK_AI_MODEL, is_known_ai_model};
use crate::settings::schema::SettingsDomain;
use crate::settings::store::SettingsStore;

/// Partition of a stored model list into catalog members and strays
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizeOutcome {
    pub kept: Vec<String>,
    pub removed: Vec<String>,
}

/// Split raw stored entries into known model keys and everything else.
///
/// Non-string entries count as strays and are reported in their JSON form.
pub fn sanitize_models(raw: &[Value]) -> SanitizeOutcome {
    let mut kept = Vec::new();
    let mut removed = Vec::new();

    for entry in raw {
        match entry.as_str() {
            Some(key) if is_known_ai_model(key) => kept.push(key.to_string()),
            Some(key) => removed.push(key.to_string()),
            None => removed.push(entry.to_string()),
        }
    }

    SanitizeOutcome { kept, removed }
}

/// Result of a cleanup run, shaped for the admin UI.
///
/// `cleanedModels` is always present; `newModels` only when a rewrite
/// actually happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub message: String,
    pub cleaned_models: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_models: Option<Vec<String>>,
}

impl CleanupReport {
    fn message_only(message: &str) -> Self {
        Self {
            message: message.to_string(),
            cleaned_models: Vec::new(),
            new_models: None,
        }
    }
}

/// Remove retired models from the stored list.
///
/// Operates on the raw stored document so that keys outside the schema
/// survive the rewrite. An empty or absent list is left untouched, as is a
/// list that already matches the catalog.
pub fn cleanup_invalid_models(store: &SettingsStore) -> ServiceResult<CleanupReport> {
    let record = match store.record()? {
        Some(record) => record,
        None => return Ok(CleanupReport::message_only("No AI models to clean up")),
    };

    let mut raw_ai = record
        .general
        .get(SettingsDomain::Ai.key())
        .cloned()
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

    let outcome = match raw_ai.get("enabledModels").and_then(Value::as_array) {
        Some(list) if !list.is_empty() => sanitize_models(list),
        _ => return Ok(CleanupReport::message_only("No AI models to clean up")),
    };

    if outcome.removed.is_empty() {
        return Ok(CleanupReport::message_only("All AI models are valid"));
    }

    let new_models = if outcome.kept.is_empty() {
        vec![FALLBACK_AI_MODEL.to_string()]
    } else {
        outcome.kept
    };

    if let Value::Object(map) = &mut raw_ai {
        map.insert(
            "enabledModels".to_string(),
            serde_json::to_value(&new_models).unwrap_or_default(),
        );
    }
    store.update_domain(SettingsDomain::Ai, &raw_ai)?;

    Ok(CleanupReport {
        message: format!("Cleaned up {} invalid AI models", outcome.removed.len()),
        cleaned_models: outcome.removed,
        new_models: Some(new_models),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use serde_json::json;
    use std::sync::Arc;

    fn test_store() -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db = Database::open(&dir.path().join("test.db")).expect("open db");
        (dir, SettingsStore::new(Arc::new(db)))
    }

    #[test]
    fn test_sanitize_partitions_by_catalog() {
        let raw = vec![
            json!("gpt-4o-mini"),
            json!("retired-model"),
            json!("claude-3-5-sonnet"),
            json!(42),
        ];
        let outcome = sanitize_models(&raw);
        assert_eq!(outcome.kept, vec!["gpt-4o-mini", "claude-3-5-sonnet"]);
        assert_eq!(outcome.removed, vec!["retired-model", "42"]);
    }

    #[test]
    fn test_cleanup_without_record_reports_nothing_to_do() {
        let (_dir, store) = test_store();

        let report = cleanup_invalid_models(&store).expect("cleanup");
        assert_eq!(report.message, "No AI models to clean up");
        assert!(report.cleaned_models.is_empty());
        assert!(report.new_models.is_none());
        // Cleanup must not create the record as a side effect
        assert!(store.record().expect("record").is_none());
    }

    #[test]
    fn test_cleanup_with_empty_list_reports_nothing_to_do() {
        let (_dir, store) = test_store();
        store
            .update_domain(SettingsDomain::Ai, &json!({ "enabledModels": [] }))
            .expect("seed");

        let report = cleanup_invalid_models(&store).expect("cleanup");
        assert_eq!(report.message, "No AI models to clean up");
    }

    #[test]
    fn test_cleanup_with_valid_list_does_not_write() {
        let (_dir, store) = test_store();
        store
            .update_domain(
                SettingsDomain::Ai,
                &json!({ "apiKey": "sk-1", "enabledModels": ["gpt-4o", "gemini-2.0-flash"] }),
            )
            .expect("seed");
        let before = store.record().expect("record").expect("present").general;

        let report = cleanup_invalid_models(&store).expect("cleanup");
        assert_eq!(report.message, "All AI models are valid");
        assert!(report.cleaned_models.is_empty());

        let after = store.record().expect("record").expect("present").general;
        assert_eq!(before, after);
    }

    #[test]
    fn test_cleanup_removes_strays_and_preserves_raw_keys() {
        let (_dir, store) = test_store();
        store
            .update_domain(
                SettingsDomain::Ai,
                &json!({
                    "apiKey": "sk-1",
                    "enabledModels": ["gpt-4o", "retired-a", "retired-b"],
                    "customFlag": true,
                }),
            )
            .expect("seed");

        let report = cleanup_invalid_models(&store).expect("cleanup");
        assert_eq!(report.message, "Cleaned up 2 invalid AI models");
        assert_eq!(
            report.cleaned_models,
            vec!["retired-a".to_string(), "retired-b".to_string()]
        );
        assert_eq!(report.new_models, Some(vec!["gpt-4o".to_string()]));

        let record = store.record().expect("record").expect("present");
        assert_eq!(record.general["ai"]["enabledModels"], json!(["gpt-4o"]));
        assert_eq!(record.general["ai"]["apiKey"], "sk-1");
        assert_eq!(record.general["ai"]["customFlag"], true);
    }

    #[test]
    fn test_cleanup_falls_back_when_nothing_survives() {
        let (_dir, store) = test_store();
        store
            .update_domain(SettingsDomain::Ai, &json!({ "enabledModels": ["gone-1", "gone-2"] }))
            .expect("seed");

        let report = cleanup_invalid_models(&store).expect("cleanup");
        assert_eq!(report.new_models, Some(vec![FALLBACK_AI_MODEL.to_string()]));
        assert_eq!(
            store.ai().expect("ai").enabled_models,
            vec![FALLBACK_AI_MODEL.to_string()]
        );
    }
}

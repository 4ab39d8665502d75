//! Partial-merge for the `general` document.
//!
//! A write to one sub-document must never discard siblings already stored
//! alongside it, and `performanceAlerts` travels with every mutation. The
//! merge is a pure function over JSON values so it can be tested without a
//! database.

use serde_json::{Map, Value};

use super::schema::{PerformanceAlerts, SettingsDomain};

/// Replace one sub-document inside `general`, preserving every other key.
///
/// `performanceAlerts` is carried forward from the existing document (or
/// filled with its defaults when absent) unless it is itself the mutation
/// target. A non-object `existing` is treated as an empty document.
pub fn merge_general(existing: &Value, domain: SettingsDomain, new_value: Value) -> Value {
    let mut general: Map<String, Value> = match existing {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    general.insert(domain.key().to_string(), new_value);

    if domain != SettingsDomain::PerformanceAlerts {
        let alerts_key = SettingsDomain::PerformanceAlerts.key();
        if general.get(alerts_key).is_none_or(Value::is_null) {
            let defaults = serde_json::to_value(PerformanceAlerts::default())
                .unwrap_or_else(|_| Value::Object(Map::new()));
            general.insert(alerts_key.to_string(), defaults);
        }
    }

    Value::Object(general)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_preserves_siblings() {
        let existing = json!({
            "ai": { "apiKey": "sk-old", "enabledModels": ["gpt-4o"] },
            "webhook": { "secret": "whsec_1" },
            "performanceAlerts": { "successRateThreshold": 90.0, "growthThreshold": -5.0, "errorRateThreshold": 2.0, "enabled": false },
        });

        let merged = merge_general(
            &existing,
            SettingsDomain::Site,
            json!({ "name": "Loom", "description": "d", "url": "https://loom.test" }),
        );

        assert_eq!(merged["site"]["name"], "Loom");
        assert_eq!(merged["ai"]["apiKey"], "sk-old");
        assert_eq!(merged["webhook"]["secret"], "whsec_1");
    }

    #[test]
    fn test_merge_replaces_target_wholesale() {
        let existing = json!({
            "mail": { "apiKey": "re_old", "fromEmail": "old@loom.test" },
        });

        let merged = merge_general(
            &existing,
            SettingsDomain::Mail,
            json!({ "apiKey": "re_new" }),
        );

        // The target is replaced, not deep-merged
        assert_eq!(merged["mail"], json!({ "apiKey": "re_new" }));
    }

    #[test]
    fn test_alerts_carried_forward_unchanged() {
        let alerts = json!({
            "successRateThreshold": 70.0,
            "growthThreshold": -20.0,
            "errorRateThreshold": 9.0,
            "enabled": false,
        });
        let existing = json!({ "performanceAlerts": alerts });

        let merged = merge_general(&existing, SettingsDomain::Storage, json!({ "apiKey": "ut_1" }));

        assert_eq!(merged["performanceAlerts"], alerts);
    }

    #[test]
    fn test_alerts_defaulted_when_absent() {
        let merged = merge_general(&json!({}), SettingsDomain::Download, json!({ "enabled": true }));

        assert_eq!(merged["performanceAlerts"]["successRateThreshold"], json!(85.0));
        assert_eq!(merged["performanceAlerts"]["growthThreshold"], json!(-10.0));
        assert_eq!(merged["performanceAlerts"]["errorRateThreshold"], json!(5.0));
        assert_eq!(merged["performanceAlerts"]["enabled"], json!(true));
    }

    #[test]
    fn test_alerts_replaceable_as_explicit_target() {
        let existing = json!({
            "performanceAlerts": { "successRateThreshold": 85.0, "growthThreshold": -10.0, "errorRateThreshold": 5.0, "enabled": true },
        });

        let merged = merge_general(
            &existing,
            SettingsDomain::PerformanceAlerts,
            json!({ "successRateThreshold": 50.0, "growthThreshold": -1.0, "errorRateThreshold": 1.0, "enabled": false }),
        );

        assert_eq!(merged["performanceAlerts"]["successRateThreshold"], json!(50.0));
        assert_eq!(merged["performanceAlerts"]["enabled"], json!(false));
    }

    #[test]
    fn test_non_object_existing_treated_as_empty() {
        let merged = merge_general(&Value::Null, SettingsDomain::Webhook, json!({ "secret": "s" }));
        assert_eq!(merged["webhook"]["secret"], "s");
        assert!(merged["performanceAlerts"].is_object());
    }
}

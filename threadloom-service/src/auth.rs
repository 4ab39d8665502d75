//! Session resolution and access control.
//!
//! Sessions are issued by the auth frontend, which writes digest-keyed rows
//! into the `sessions` table. This service only ever resolves tokens against
//! those rows; it never mints them. The one exception is the static-config
//! bootstrap token, which maps straight to an admin session so a fresh
//! deployment can be configured before the auth frontend is wired up.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use strum::{Display, EnumString, IntoStaticStr};

use crate::db::{Database, SessionRecord};
use crate::error::{ServiceError, ServiceResult};
use crate::settings::SettingsStore;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

/// Resolved caller identity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        Self {
            user_id: record.user_id,
            name: record.name,
            email: record.email,
            role: record.role,
        }
    }
}

/// Access requirement of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Public,
    Authenticated,
    Admin,
    /// Admin role plus a configured payment provider
    AdminPayment,
}

impl AccessLevel {
    /// Role portion of the check. Pure: no storage access.
    pub fn permits(&self, session: Option<&Session>) -> ServiceResult<()> {
        match self {
            AccessLevel::Public => Ok(()),
            AccessLevel::Authenticated => match session {
                Some(_) => Ok(()),
                None => Err(ServiceError::Unauthorized),
            },
            AccessLevel::Admin | AccessLevel::AdminPayment => match session {
                None => Err(ServiceError::Unauthorized),
                Some(session) if session.role != Role::Admin => Err(ServiceError::Forbidden {
                    message: "Admin access required".to_string(),
                }),
                Some(_) => Ok(()),
            },
        }
    }
}

/// Check a caller against an access level.
///
/// Role rejections happen before the store is touched; only the payment
/// capability of `AdminPayment` reads settings, and only after the role
/// check has passed.
pub fn authorize(
    level: AccessLevel,
    session: Option<&Session>,
    store: &SettingsStore,
) -> ServiceResult<()> {
    level.permits(session)?;

    if level == AccessLevel::AdminPayment {
        let payment = store.payment()?;
        if payment.provider.is_none() || payment.api_key.is_empty() {
            return Err(ServiceError::Forbidden {
                message: "Payment provider is not configured".to_string(),
            });
        }
    }

    Ok(())
}

/// Hex digest under which a bearer token is stored
pub fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Port for turning a bearer token into a session
pub trait SessionProvider: Send + Sync {
    fn resolve(&self, token: &str) -> ServiceResult<Option<Session>>;
}

/// Session provider backed by the shared SQLite database
pub struct DbSessionProvider {
    db: Arc<Database>,
    admin_token: Option<String>,
}

impl DbSessionProvider {
    pub fn new(db: Arc<Database>, admin_token: Option<String>) -> Self {
        Self { db, admin_token }
    }
}

impl SessionProvider for DbSessionProvider {
    fn resolve(&self, token: &str) -> ServiceResult<Option<Session>> {
        if let Some(bootstrap) = &self.admin_token {
            if !bootstrap.is_empty() && token == bootstrap {
                return Ok(Some(Session {
                    user_id: "bootstrap".to_string(),
                    name: "Bootstrap Admin".to_string(),
                    email: "admin@localhost".to_string(),
                    role: Role::Admin,
                }));
            }
        }

        let session = self.db.find_session(&token_digest(token))?.map(Session::from);
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn test_db() -> (tempfile::TempDir, Arc<Database>) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db = Database::open(&dir.path().join("test.db")).expect("open db");
        (dir, Arc::new(db))
    }

    fn session(role: Role) -> Session {
        Session {
            user_id: "user-1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn test_public_permits_anonymous() {
        assert!(AccessLevel::Public.permits(None).is_ok());
    }

    #[test]
    fn test_authenticated_rejects_anonymous() {
        match AccessLevel::Authenticated.permits(None) {
            Err(ServiceError::Unauthorized) => {}
            other => panic!("expected unauthorized, got {other:?}"),
        }
        assert!(AccessLevel::Authenticated.permits(Some(&session(Role::User))).is_ok());
    }

    #[test]
    fn test_admin_rejects_plain_user() {
        match AccessLevel::Admin.permits(Some(&session(Role::User))) {
            Err(ServiceError::Forbidden { .. }) => {}
            other => panic!("expected forbidden, got {other:?}"),
        }
        assert!(AccessLevel::Admin.permits(Some(&session(Role::Admin))).is_ok());
    }

    #[test]
    fn test_role_rejection_never_touches_store() {
        let (_dir, db) = test_db();
        let store = SettingsStore::new(db);

        let result = authorize(AccessLevel::Admin, Some(&session(Role::User)), &store);
        assert!(matches!(result, Err(ServiceError::Forbidden { .. })));

        // No settings record may have been created on the rejection path
        assert!(store.record().expect("record").is_none());
    }

    #[test]
    fn test_admin_payment_requires_configured_provider() {
        let (_dir, db) = test_db();
        let store = SettingsStore::new(db);

        let result = authorize(AccessLevel::AdminPayment, Some(&session(Role::Admin)), &store);
        match result {
            Err(ServiceError::Forbidden { message }) => {
                assert_eq!(message, "Payment provider is not configured");
            }
            other => panic!("expected forbidden, got {other:?}"),
        }

        let mut payment = crate::settings::PaymentSettings::default();
        payment.provider = Some(crate::settings::PaymentProvider::Stripe);
        payment.api_key = "sk_live".to_string();
        store
            .update_domain(crate::settings::SettingsDomain::Payment, &payment)
            .expect("configure payment");

        assert!(authorize(AccessLevel::AdminPayment, Some(&session(Role::Admin)), &store).is_ok());
    }

    #[test]
    fn test_admin_payment_rejects_empty_api_key() {
        let (_dir, db) = test_db();
        let store = SettingsStore::new(db);

        let mut payment = crate::settings::PaymentSettings::default();
        payment.provider = Some(crate::settings::PaymentProvider::Polar);
        store
            .update_domain(crate::settings::SettingsDomain::Payment, &payment)
            .expect("configure payment");

        let result = authorize(AccessLevel::AdminPayment, Some(&session(Role::Admin)), &store);
        assert!(matches!(result, Err(ServiceError::Forbidden { .. })));
    }

    #[test]
    fn test_db_provider_resolves_stored_session() {
        let (_dir, db) = test_db();
        db.insert_session(
            &token_digest("raw-token"),
            "user-9",
            "Bea",
            "bea@example.com",
            Role::Admin,
            Utc::now() + Duration::hours(1),
        )
        .expect("insert");

        let provider = DbSessionProvider::new(db, None);
        let session = provider
            .resolve("raw-token")
            .expect("resolve")
            .expect("present");
        assert_eq!(session.user_id, "user-9");
        assert_eq!(session.role, Role::Admin);

        assert!(provider.resolve("other-token").expect("resolve").is_none());
    }

    #[test]
    fn test_bootstrap_token_short_circuits() {
        let (_dir, db) = test_db();
        let provider = DbSessionProvider::new(db, Some("letmein".to_string()));

        let session = provider.resolve("letmein").expect("resolve").expect("present");
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.user_id, "bootstrap");
    }

    #[test]
    fn test_empty_bootstrap_token_is_ignored() {
        let (_dir, db) = test_db();
        let provider = DbSessionProvider::new(db, Some(String::new()));
        assert!(provider.resolve("").expect("resolve").is_none());
    }

    #[test]
    fn test_role_round_trips_through_strings() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!("user".parse::<Role>().ok(), Some(Role::User));
        assert!("owner".parse::<Role>().is_err());
    }
}

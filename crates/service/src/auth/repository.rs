use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(&self, email: &str, name: &str) -> Result<AuthUser, AuthError>;
    /// Idempotent: an already verified user keeps the original stamp.
    async fn mark_email_verified(&self, id: Uuid) -> Result<AuthUser, AuthError>;
    /// A changed email clears the verification stamp.
    async fn update_profile(&self, id: Uuid, name: &str, email: &str) -> Result<AuthUser, AuthError>;
    /// Returns false when no user had `id`. Credentials go with the user.
    async fn delete_user(&self, id: Uuid) -> Result<bool, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;
    use models::user::{normalize_email, validate_email, validate_name};

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<Uuid, AuthUser>>,
        creds: Mutex<HashMap<Uuid, Credentials>>, // key: user_id
    }

    impl MockAuthRepository {
        fn email_taken(users: &HashMap<Uuid, AuthUser>, email: &str, except: Option<Uuid>) -> bool {
            users.values().any(|u| u.email == email && Some(u.id) != except)
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let email = normalize_email(email);
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.email == email).cloned())
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(&id).cloned())
        }

        async fn create_user(&self, email: &str, name: &str) -> Result<AuthUser, AuthError> {
            validate_email(email)?;
            validate_name(name)?;
            let email = normalize_email(email);
            let mut users = self.users.lock().unwrap();
            if Self::email_taken(&users, &email, None) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser { id: Uuid::new_v4(), email, name: name.trim().to_string(), email_verified_at: None };
            users.insert(user.id, user.clone());
            Ok(user)
        }

        async fn mark_email_verified(&self, id: Uuid) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            let user = users.get_mut(&id).ok_or(AuthError::NotFound)?;
            if user.email_verified_at.is_none() {
                user.email_verified_at = Some(Utc::now());
            }
            Ok(user.clone())
        }

        async fn update_profile(&self, id: Uuid, name: &str, email: &str) -> Result<AuthUser, AuthError> {
            validate_name(name)?;
            validate_email(email)?;
            let email = normalize_email(email);
            let mut users = self.users.lock().unwrap();
            if Self::email_taken(&users, &email, Some(id)) {
                return Err(AuthError::Conflict);
            }
            let user = users.get_mut(&id).ok_or(AuthError::NotFound)?;
            user.name = name.trim().to_string();
            if user.email != email {
                user.email = email;
                user.email_verified_at = None;
            }
            Ok(user.clone())
        }

        async fn delete_user(&self, id: Uuid) -> Result<bool, AuthError> {
            let removed = self.users.lock().unwrap().remove(&id).is_some();
            self.creds.lock().unwrap().remove(&id);
            Ok(removed)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }

        async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
            let mut creds = self.creds.lock().unwrap();
            let c = Credentials { user_id, password_hash, password_algorithm };
            creds.insert(user_id, c.clone());
            Ok(c)
        }
    }
}

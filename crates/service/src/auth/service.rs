use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use chrono::Duration;
use rand::rngs::OsRng;
use tracing::{info, debug, warn, instrument};
use uuid::Uuid;

use super::domain::{RegisterInput, LoginInput, AuthUser, AuthSession, ProfileUpdate, PasswordUpdate};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::tokens::{self, TokenPurpose};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub password_algorithm: String,
    pub session_ttl: Duration,
    pub verification_ttl: Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            password_algorithm: "argon2".into(),
            session_ttl: Duration::hours(12),
            verification_ttl: Duration::hours(60),
        }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository + ?Sized> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new (unverified) user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::new("secret"));
    /// let input = RegisterInput { email: "user@example.com".into(), name: "Test".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// assert!(!user.is_verified());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        check_password(&input.password)?;
        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let hash = hash_password(&input.password)?;
        let user = self.repo.create_user(&input.email, &input.name).await?;
        if let Err(e) = self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await {
            // a user without credentials could never log in or re-register
            warn!(user_id = %user.id, error = %e, "credentials write failed, removing user");
            if let Err(cleanup) = self.repo.delete_user(user.id).await {
                warn!(user_id = %user.id, error = %cleanup, "rollback of user row failed");
            }
            return Err(e);
        }
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and issue a session token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig::new("secret"));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        self.check_current_password(user.id, &input.password).await?;
        let token = self.issue_session_token(&user)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    pub fn issue_session_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        tokens::issue(&self.cfg.jwt_secret, user, TokenPurpose::Session, self.cfg.session_ttl)
    }

    pub fn issue_verification_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        tokens::issue(&self.cfg.jwt_secret, user, TokenPurpose::VerifyEmail, self.cfg.verification_ttl)
    }

    /// Load the user behind a session token. Tokens for deleted users are `Unauthorized`.
    pub async fn resolve_session(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = tokens::verify(&self.cfg.jwt_secret, token, TokenPurpose::Session)?;
        self.repo
            .find_user_by_id(claims.user_id()?)
            .await?
            .ok_or(AuthError::Unauthorized)
    }

    /// Consume a verification link. The link is bound to the email it was sent to.
    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = tokens::verify(&self.cfg.jwt_secret, token, TokenPurpose::VerifyEmail).map_err(|e| {
            warn!(error = %e, "verification link rejected");
            AuthError::InvalidVerificationLink
        })?;
        let user = self.repo
            .find_user_by_id(claims.user_id()?)
            .await?
            .ok_or(AuthError::InvalidVerificationLink)?;
        if user.email != claims.email {
            debug!(user_id = %user.id, "verification link issued for a previous email");
            return Err(AuthError::InvalidVerificationLink);
        }
        let user = self.repo.mark_email_verified(user.id).await?;
        info!(user_id = %user.id, "email_verified");
        Ok(user)
    }

    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<AuthUser, AuthError> {
        if let Some(other) = self.repo.find_user_by_email(&update.email).await? {
            if other.id != user_id {
                return Err(AuthError::Conflict);
            }
        }
        let user = self.repo.update_profile(user_id, &update.name, &update.email).await?;
        info!(user_id = %user.id, verified = user.is_verified(), "profile_updated");
        Ok(user)
    }

    #[instrument(skip(self, update))]
    pub async fn update_password(&self, user_id: Uuid, update: PasswordUpdate) -> Result<(), AuthError> {
        check_password(&update.password)?;
        self.check_current_password(user_id, &update.current_password).await?;
        let hash = hash_password(&update.password)?;
        self.repo.upsert_password(user_id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %user_id, "password_updated");
        Ok(())
    }

    /// Delete the account after confirming the password.
    #[instrument(skip(self, password))]
    pub async fn delete_account(&self, user_id: Uuid, password: &str) -> Result<(), AuthError> {
        self.check_current_password(user_id, password).await?;
        if !self.repo.delete_user(user_id).await? {
            return Err(AuthError::NotFound);
        }
        info!(user_id = %user_id, "account_deleted");
        Ok(())
    }

    async fn check_current_password(&self, user_id: Uuid, password: &str) -> Result<(), AuthError> {
        let cred = self.repo
            .get_credentials(user_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }
        Ok(())
    }
}

fn check_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::auth::domain::Credentials;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> AuthService<MockAuthRepository> {
        AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig::new("test-secret"))
    }

    fn reg(email: &str) -> RegisterInput {
        RegisterInput { email: email.into(), name: "Ann".into(), password: "password1".into() }
    }

    #[tokio::test]
    async fn register_rejects_short_password_and_duplicates() {
        let svc = svc();
        let short = RegisterInput { password: "short".into(), ..reg("a@x.io") };
        assert!(matches!(svc.register(short).await, Err(AuthError::Validation(_))));
        svc.register(reg("a@x.io")).await.unwrap();
        assert!(matches!(svc.register(reg("A@X.io")).await, Err(AuthError::Conflict)));
    }

    /// Delegates to the mock but fails the next credentials write once.
    #[derive(Default)]
    struct FlakyCredentials {
        inner: MockAuthRepository,
        fail_next: AtomicBool,
    }

    #[async_trait::async_trait]
    impl AuthRepository for FlakyCredentials {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> { self.inner.find_user_by_email(email).await }
        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> { self.inner.find_user_by_id(id).await }
        async fn create_user(&self, email: &str, name: &str) -> Result<AuthUser, AuthError> { self.inner.create_user(email, name).await }
        async fn mark_email_verified(&self, id: Uuid) -> Result<AuthUser, AuthError> { self.inner.mark_email_verified(id).await }
        async fn update_profile(&self, id: Uuid, name: &str, email: &str) -> Result<AuthUser, AuthError> { self.inner.update_profile(id, name, email).await }
        async fn delete_user(&self, id: Uuid) -> Result<bool, AuthError> { self.inner.delete_user(id).await }
        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> { self.inner.get_credentials(user_id).await }
        async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(AuthError::Repository("transient".into()));
            }
            self.inner.upsert_password(user_id, password_hash, password_algorithm).await
        }
    }

    #[tokio::test]
    async fn failed_credentials_write_does_not_lock_out_email() {
        let repo = Arc::new(FlakyCredentials { fail_next: AtomicBool::new(true), ..Default::default() });
        let svc = AuthService::new(repo.clone(), AuthConfig::new("test-secret"));

        assert!(matches!(svc.register(reg("a@x.io")).await, Err(AuthError::Repository(_))));
        assert!(repo.find_user_by_email("a@x.io").await.unwrap().is_none());

        let user = svc.register(reg("a@x.io")).await.unwrap();
        let session = svc.login(LoginInput { email: "a@x.io".into(), password: "password1".into() }).await.unwrap();
        assert_eq!(session.user.id, user.id);
    }

    #[tokio::test]
    async fn login_and_resolve_session() {
        let svc = svc();
        let user = svc.register(reg("a@x.io")).await.unwrap();
        let bad = LoginInput { email: "a@x.io".into(), password: "nope-nope".into() };
        assert!(matches!(svc.login(bad).await, Err(AuthError::Unauthorized)));
        let unknown = LoginInput { email: "b@x.io".into(), password: "password1".into() };
        assert!(matches!(svc.login(unknown).await, Err(AuthError::Unauthorized)));

        let session = svc.login(LoginInput { email: "a@x.io".into(), password: "password1".into() }).await.unwrap();
        let resolved = svc.resolve_session(&session.token).await.unwrap();
        assert_eq!(resolved.id, user.id);
        assert!(svc.resolve_session("garbage").await.is_err());
    }

    #[tokio::test]
    async fn verification_link_marks_user_verified() {
        let svc = svc();
        let user = svc.register(reg("a@x.io")).await.unwrap();
        let token = svc.issue_verification_token(&user).unwrap();
        // a session token is not a verification link
        let session = svc.issue_session_token(&user).unwrap();
        assert!(matches!(svc.verify_email(&session).await, Err(AuthError::InvalidVerificationLink)));

        let verified = svc.verify_email(&token).await.unwrap();
        assert!(verified.is_verified());
        // idempotent
        assert!(svc.verify_email(&token).await.unwrap().is_verified());
    }

    #[tokio::test]
    async fn email_change_clears_verification_and_old_links() {
        let svc = svc();
        let user = svc.register(reg("a@x.io")).await.unwrap();
        let old_link = svc.issue_verification_token(&user).unwrap();
        svc.verify_email(&old_link).await.unwrap();

        let same = svc.update_profile(user.id, ProfileUpdate { name: "Ann B".into(), email: "a@x.io".into() }).await.unwrap();
        assert!(same.is_verified());
        let moved = svc.update_profile(user.id, ProfileUpdate { name: "Ann B".into(), email: "new@x.io".into() }).await.unwrap();
        assert!(!moved.is_verified());
        assert!(matches!(svc.verify_email(&old_link).await, Err(AuthError::InvalidVerificationLink)));

        svc.register(reg("taken@x.io")).await.unwrap();
        let clash = ProfileUpdate { name: "Ann".into(), email: "taken@x.io".into() };
        assert!(matches!(svc.update_profile(user.id, clash).await, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn password_change_and_account_deletion() {
        let svc = svc();
        let user = svc.register(reg("a@x.io")).await.unwrap();
        let wrong = PasswordUpdate { current_password: "wrong-pass".into(), password: "password2".into() };
        assert!(matches!(svc.update_password(user.id, wrong).await, Err(AuthError::Unauthorized)));
        let ok = PasswordUpdate { current_password: "password1".into(), password: "password2".into() };
        svc.update_password(user.id, ok).await.unwrap();
        assert!(svc.login(LoginInput { email: "a@x.io".into(), password: "password2".into() }).await.is_ok());

        assert!(matches!(svc.delete_account(user.id, "password1").await, Err(AuthError::Unauthorized)));
        svc.delete_account(user.id, "password2").await.unwrap();
        assert!(matches!(svc.login(LoginInput { email: "a@x.io".into(), password: "password2".into() }).await, Err(AuthError::Unauthorized)));
    }
}

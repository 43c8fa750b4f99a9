use crate::config::SecurityConfig;
use crate::db::{AccountCreate, DbAccount, DbActorHandle};
use crate::error::StrokedeskError;
use crate::service::password::{hash_password, verify_password};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use strokedesk_schema::validation::{LoginForm, RegistrationForm};
use strokedesk_schema::{ErrorCode, ValidationErrors};
use tracing::debug;

/// Registration and login on top of the account store.
#[derive(Clone)]
pub struct Accounts {
    store: DbActorHandle,
    hash_iterations: u32,
    login_limiter: Arc<DefaultKeyedRateLimiter<String>>,
    /// Verified against when the username is unknown, so both branches pay
    /// for one PBKDF2 run.
    dummy_hash: Arc<str>,
}

impl Accounts {
    pub fn new(store: DbActorHandle, security: &SecurityConfig) -> Self {
        let per_minute =
            NonZeroU32::new(security.login_attempts_per_minute).unwrap_or(NonZeroU32::MIN);
        let dummy_hash = hash_password(
            "strokedesk-no-such-account",
            security.password_hash_iterations,
        );
        Self {
            store,
            hash_iterations: security.password_hash_iterations,
            login_limiter: Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute))),
            dummy_hash: dummy_hash.into(),
        }
    }

    pub fn store(&self) -> &DbActorHandle {
        &self.store
    }

    /// Validate, check uniqueness, hash and insert. Returns the new account id.
    pub async fn register(&self, form: &RegistrationForm) -> Result<i64, StrokedeskError> {
        let valid = form.validate()?;

        let mut errors = ValidationErrors::new();
        if self.store.find_by_username(&valid.username).await?.is_some() {
            errors.push(
                "username",
                ErrorCode::Taken,
                "Username already exists. Please choose a different one.",
            );
        }
        if self.store.find_by_email(&valid.email).await?.is_some() {
            errors.push(
                "email",
                ErrorCode::Taken,
                "Email already registered. Please use a different email.",
            );
        }
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let iterations = self.hash_iterations;
        let password = valid.password;
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password(&password, iterations))
                .await
                .map_err(|e| StrokedeskError::UnexpectedError(format!("hash task failed: {e}")))?;

        let create = AccountCreate {
            username: valid.username,
            email: valid.email,
            password_hash,
        };

        match self.store.create(create).await {
            Ok(id) => Ok(id),
            // Lost a race with a concurrent registration.
            Err(StrokedeskError::DatabaseError(sqlx::Error::Database(db)))
                if db.is_unique_violation() =>
            {
                let mut errors = ValidationErrors::new();
                errors.push(
                    "username",
                    ErrorCode::Taken,
                    "Username or email already registered.",
                );
                Err(errors.into())
            }
            Err(e) => Err(e),
        }
    }

    /// Authenticate one login attempt from `client_ip`.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the caller.
    pub async fn login(
        &self,
        client_ip: &str,
        form: &LoginForm,
    ) -> Result<DbAccount, StrokedeskError> {
        let limited = self.login_limiter.check_key(&client_ip.to_string()).is_err();
        // Drop buckets that have fully refilled so the key map stays bounded.
        self.login_limiter.retain_recent();
        if limited {
            return Err(StrokedeskError::RateLimited);
        }

        let valid = form.validate()?;

        let account = self.store.find_by_username(&valid.username).await?;
        let encoded = match &account {
            Some(account) => account.password_hash.clone(),
            None => self.dummy_hash.to_string(),
        };

        let password = valid.password;
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &encoded))
            .await
            .map_err(|e| StrokedeskError::UnexpectedError(format!("verify task failed: {e}")))?;

        let Some(account) = account else {
            debug!(username = %valid.username, "login for unknown username");
            return Err(StrokedeskError::InvalidCredentials);
        };
        if !verified {
            return Err(StrokedeskError::InvalidCredentials);
        }
        if !account.is_active {
            return Err(StrokedeskError::AccountInactive);
        }

        self.store.touch_last_login(account.id).await?;
        Ok(account)
    }
}

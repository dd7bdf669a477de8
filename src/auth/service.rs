//! Registration, login and token re-issue.
//!
//! The service owns no mutable state. It receives its credential store, hasher
//! and token codec at construction and is shared across workers behind `Arc`.

use std::sync::Arc;
use validator::Validate;

use crate::auth::extractors::AuthenticatedUser;
use crate::auth::password::PasswordHasher;
use crate::auth::token::TokenCodec;
use crate::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::AppError;
use crate::models::{normalize_email, NewUser, User, UserResponse};
use crate::store::UserStore;

pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    codec: Arc<TokenCodec>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, codec: Arc<TokenCodec>) -> Self {
        Self {
            users,
            hasher,
            codec,
        }
    }

    pub fn codec(&self) -> Arc<TokenCodec> {
        Arc::clone(&self.codec)
    }

    /// Creates an identity and issues its first token.
    ///
    /// The token is issued only after the insert succeeded. A unique violation
    /// from the store (a concurrent registration that passed the pre-check)
    /// is reported as `EmailTaken`, same as the pre-check itself.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AppError> {
        let request = RegisterRequest {
            email: normalize_email(&request.email),
            password: request.password,
        };
        request.validate()?;

        if self.users.exists_by_email(&request.email).await? {
            log::info!("registration rejected: email already registered");
            return Err(AppError::EmailTaken);
        }

        let password_hash = self.hasher.hash(&request.password).await?;
        let user = self
            .users
            .insert(NewUser {
                email: request.email,
                password_hash,
            })
            .await?;

        log::info!("registered user {}", user.id);
        self.respond(&user)
    }

    /// Exchanges credentials for a token.
    ///
    /// Unknown email and wrong password both return `InvalidCredentials`, and
    /// both perform one bcrypt verification.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        let request = LoginRequest {
            email: normalize_email(&request.email),
            password: request.password,
        };
        request.validate()?;

        let user = match self.users.find_by_email(&request.email).await? {
            Some(user) => user,
            None => {
                self.hasher.verify_dummy(&request.password).await?;
                return Err(AppError::InvalidCredentials);
            }
        };

        if !self.hasher.verify(&request.password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        log::debug!("user {} logged in", user.id);
        self.respond(&user)
    }

    /// The caller's current stored profile.
    pub async fn profile(&self, caller: &AuthenticatedUser) -> Result<UserResponse, AppError> {
        self.users
            .find_by_id(caller.id)
            .await?
            .map(|user| UserResponse::from(&user))
            .ok_or(AppError::NotFound("User"))
    }

    /// Issues a fresh token for an already authenticated caller, from the
    /// identity carried by their current token.
    pub fn refresh(&self, caller: &AuthenticatedUser) -> Result<String, AppError> {
        self.codec.issue(caller.id, &caller.email)
    }

    fn respond(&self, user: &User) -> Result<AuthResponse, AppError> {
        let token = self.codec.issue(user.id, &user.email)?;
        Ok(AuthResponse {
            user: UserResponse::from(user),
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::store::{MemoryStore, StoreError};
    use async_trait::async_trait;

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(&JwtConfig {
            secret: "service-secret".into(),
            expiry_secs: 3600,
            issuer: "todo-api".into(),
        }))
    }

    fn service(store: Arc<dyn UserStore>) -> AuthService {
        AuthService::new(store, PasswordHasher::new(4).unwrap(), codec())
    }

    fn register_request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[actix_rt::test]
    async fn test_register_issues_token_for_new_identity() {
        let store = MemoryStore::new();
        let auth = service(Arc::new(store.clone()));

        let response = auth
            .register(register_request("alice@example.com", "password123"))
            .await
            .unwrap();

        let claims = auth.codec().verify(&response.token).unwrap();
        assert_eq!(claims.user_id, response.user.id);
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(store.user_count(), 1);

        let stored = store.find_by_id(response.user.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "password123");
    }

    #[actix_rt::test]
    async fn test_register_normalizes_and_rejects_duplicates() {
        let store = MemoryStore::new();
        let auth = service(Arc::new(store.clone()));

        let first = auth
            .register(register_request("  Alice@Example.com ", "password123"))
            .await
            .unwrap();
        assert_eq!(first.user.email, "alice@example.com");

        let second = auth
            .register(register_request("ALICE@example.com", "different-pass"))
            .await;
        assert!(matches!(second, Err(AppError::EmailTaken)));
        assert_eq!(store.user_count(), 1);
    }

    #[actix_rt::test]
    async fn test_register_validation() {
        let store = MemoryStore::new();
        let auth = service(Arc::new(store.clone()));
        let long_password = "x".repeat(101);

        for (email, password) in [
            ("not-an-email", "password123"),
            ("alice@example.com", "short"),
            ("alice@example.com", long_password.as_str()),
        ] {
            let result = auth.register(register_request(email, password)).await;
            assert!(
                matches!(result, Err(AppError::ValidationFailed(_))),
                "{} / {} should fail validation",
                email,
                password.len()
            );
        }
        assert_eq!(store.user_count(), 0);
    }

    #[actix_rt::test]
    async fn test_login_failures_are_indistinguishable() {
        let auth = service(Arc::new(MemoryStore::new()));
        auth.register(register_request("alice@example.com", "password123"))
            .await
            .unwrap();

        let wrong_password = auth
            .login(login_request("alice@example.com", "wrong-password"))
            .await
            .unwrap_err();
        let unknown_email = auth
            .login(login_request("nobody@example.com", "password123"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_email, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[actix_rt::test]
    async fn test_login_issues_distinct_token_for_same_subject() {
        let auth = service(Arc::new(MemoryStore::new()));
        let registered = auth
            .register(register_request("alice@example.com", "password123"))
            .await
            .unwrap();

        // Timestamps have one-second resolution.
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        let logged_in = auth
            .login(login_request("Alice@Example.com", "password123"))
            .await
            .unwrap();

        assert_ne!(logged_in.token, registered.token);
        assert_eq!(logged_in.user, registered.user);
        let claims = auth.codec().verify(&logged_in.token).unwrap();
        assert_eq!(claims.user_id, registered.user.id);
    }

    #[actix_rt::test]
    async fn test_profile_and_refresh() {
        let auth = service(Arc::new(MemoryStore::new()));
        let registered = auth
            .register(register_request("alice@example.com", "password123"))
            .await
            .unwrap();
        let caller = AuthenticatedUser {
            id: registered.user.id,
            email: registered.user.email.clone(),
        };

        assert_eq!(auth.profile(&caller).await.unwrap(), registered.user);

        let refreshed = auth.refresh(&caller).unwrap();
        assert_eq!(auth.codec().verify(&refreshed).unwrap().user_id, caller.id);

        let ghost = AuthenticatedUser {
            id: 999,
            email: "ghost@example.com".into(),
        };
        assert!(matches!(
            auth.profile(&ghost).await,
            Err(AppError::NotFound("User"))
        ));
    }

    /// A store whose pre-check always says "free" but whose unique index fires,
    /// as happens when two registrations race.
    struct RacingStore;

    #[async_trait]
    impl UserStore for RacingStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
            Ok(None)
        }

        async fn find_by_id(&self, _id: i64) -> Result<Option<User>, StoreError> {
            Ok(None)
        }

        async fn exists_by_email(&self, _email: &str) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn insert(&self, _user: NewUser) -> Result<User, StoreError> {
            Err(StoreError::UniqueViolation("email"))
        }
    }

    #[actix_rt::test]
    async fn test_late_unique_violation_is_email_taken() {
        let auth = service(Arc::new(RacingStore));
        let result = auth
            .register(register_request("alice@example.com", "password123"))
            .await;
        assert!(matches!(result, Err(AppError::EmailTaken)));
    }

    struct BrokenStore;

    #[async_trait]
    impl UserStore for BrokenStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
            Err(StoreError::Database("connection reset".into()))
        }

        async fn find_by_id(&self, _id: i64) -> Result<Option<User>, StoreError> {
            Err(StoreError::Database("connection reset".into()))
        }

        async fn exists_by_email(&self, _email: &str) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn insert(&self, _user: NewUser) -> Result<User, StoreError> {
            Err(StoreError::Database("disk full".into()))
        }
    }

    #[actix_rt::test]
    async fn test_store_failures_are_internal_and_issue_no_token() {
        let auth = service(Arc::new(BrokenStore));

        let register = auth
            .register(register_request("alice@example.com", "password123"))
            .await;
        assert!(matches!(register, Err(AppError::Internal(_))));

        let login = auth
            .login(login_request("alice@example.com", "password123"))
            .await;
        assert!(matches!(login, Err(AppError::Internal(_))));
    }
}

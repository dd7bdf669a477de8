use crate::error::AppError;

/// Known plaintext hashed at construction; verified against when a login names an
/// unknown email, so that path costs one bcrypt verification like a real one.
const DUMMY_PASSWORD: &str = "taskforge-timing-equalizer";

/// Bcrypt password hasher with a fixed cost factor.
///
/// Both operations are CPU-bound and run on the blocking thread pool.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AppError> {
        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, cost)?;
        Ok(Self { cost, dummy_hash })
    }

    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))?
            .map_err(AppError::from)
    }

    /// A mismatch is `Ok(false)`; only a malformed stored hash is an error.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("verification task failed: {}", e)))?
            .map_err(AppError::from)
    }

    /// Burns one verification against the dummy hash. Always returns `false`.
    pub async fn verify_dummy(&self, password: &str) -> Result<bool, AppError> {
        let dummy_hash = self.dummy_hash.clone();
        self.verify(password, &dummy_hash).await.map(|_| false)
    }
}

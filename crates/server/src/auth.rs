use std::path::PathBuf;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::info;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use stockfolio_core::errors::CoreError;

/// Token lifetime in hours.
const TOKEN_TTL_HOURS: i64 = 24;

/// A registered account. The password exists only as an Argon2id hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

/// Issues and verifies identities for the HTTP boundary: account
/// registration, password login, and bearer-token verification.
///
/// Accounts are kept in memory and written through to a JSON file on
/// registration (when a path is configured). Emails are the login key,
/// stored lowercased.
pub struct AuthService {
    users: RwLock<Vec<UserAccount>>,
    path: Option<PathBuf>,
    secret: String,
}

impl AuthService {
    /// In-memory account store with no durable file (tests).
    pub fn in_memory(secret: impl Into<String>) -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            path: None,
            secret: secret.into(),
        }
    }

    /// Account store backed by `path`; loads the existing file when present.
    pub fn open(path: impl Into<PathBuf>, secret: impl Into<String>) -> Result<Self, CoreError> {
        let path = path.into();
        let users: Vec<UserAccount> = if path.exists() {
            let bytes = std::fs::read(&path)?;
            serde_json::from_slice(&bytes)?
        } else {
            Vec::new()
        };
        info!(
            "account store opened at {} ({} accounts)",
            path.display(),
            users.len()
        );
        Ok(Self {
            users: RwLock::new(users),
            path: Some(path),
            secret: secret.into(),
        })
    }

    /// Register a new account.
    ///
    /// Rules: username and email non-empty after trimming, email must look
    /// like an address and be unused, password at least 8 characters.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserAccount, CoreError> {
        let username = username.trim();
        let email = email.trim().to_lowercase();

        if username.is_empty() {
            return Err(CoreError::Validation("Username must not be empty".into()));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(CoreError::Validation(format!(
                "Invalid email address: {email:?}"
            )));
        }
        if password.len() < 8 {
            return Err(CoreError::Validation(
                "Password must be at least 8 characters".into(),
            ));
        }

        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == email) {
            return Err(CoreError::Validation(format!(
                "Email already registered: {email}"
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CoreError::Validation(format!("Unusable password: {e}")))?
            .to_string();

        let account = UserAccount {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email,
            password_hash,
            created_at: Utc::now(),
        };

        users.push(account.clone());
        if let Err(e) = self.persist(&users) {
            users.pop();
            return Err(e);
        }

        info!("registered account {} ({})", account.id, account.username);
        Ok(account)
    }

    /// Verify credentials and issue a bearer token.
    ///
    /// A wrong email and a wrong password are indistinguishable to the
    /// caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, CoreError> {
        let email = email.trim().to_lowercase();
        let users = self.users.read().await;

        let user = users
            .iter()
            .find(|u| u.email == email)
            .ok_or_else(|| CoreError::Unauthorized("Invalid email or password".into()))?;

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|_| CoreError::Unauthorized("Invalid email or password".into()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| CoreError::Unauthorized("Invalid email or password".into()))?;

        self.issue_token(user.id)
    }

    /// Create a signed token carrying `user_id` as its subject.
    pub fn issue_token(&self, user_id: Uuid) -> Result<String, CoreError> {
        let exp = (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| CoreError::Serialization(format!("Failed to sign token: {e}")))
    }

    /// Verify a bearer token and return the caller's user id.
    pub fn verify_token(&self, token: &str) -> Result<Uuid, CoreError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| CoreError::Unauthorized("Invalid or expired token".into()))?;

        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| CoreError::Unauthorized("Malformed token subject".into()))
    }

    fn persist(&self, users: &[UserAccount]) -> Result<(), CoreError> {
        if let Some(path) = &self.path {
            let bytes = serde_json::to_vec_pretty(users)?;
            std::fs::write(path, bytes)?;
        }
        Ok(())
    }
}

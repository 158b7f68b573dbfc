use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Server-side record of an issued refresh token. Only the SHA-256 digest
/// of the encoded JWT is stored.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RefreshToken {
    pub token_hash: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn issue(token: &str, user_id: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            token_hash: hash_token(token),
            user_id: user_id.to_string(),
            expires_at,
            issued_at: Utc::now(),
            revoked_at: None,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at > Utc::now()
    }
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

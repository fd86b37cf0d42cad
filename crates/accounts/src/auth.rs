//! Credential seams: password hashing and token signing.
//!
//! The service does not pick algorithms. Callers plug in a [`PasswordHasher`]
//! (bcrypt, argon2, ...) and a [`TokenSigner`] (HS256 JWT, PASETO, ...).

use chrono::{DateTime, Utc};
use std::sync::OnceLock;
use thiserror::Error;

/// Failure inside a hasher or signer.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token expired at {0}")]
    Expired(DateTime<Utc>),

    #[error("hashing failed: {0}")]
    Hash(String),
}

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, CredentialError>;

    /// Whether `password` matches `hashed`.
    fn verify(&self, password: &str, hashed: &str) -> bool;
}

pub trait TokenSigner: Send + Sync {
    fn sign(&self, claims: &Claims) -> Result<String, CredentialError>;

    /// Check the signature and decode the claims. Expiry is checked by the
    /// service as well, so implementations may skip it.
    fn verify(&self, token: &str) -> Result<Claims, CredentialError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Refresh,
    Access,
}

impl TokenKind {
    /// Wire tag carried inside signed tokens.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Refresh => "1",
            TokenKind::Access => "2",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "1" => Some(TokenKind::Refresh),
            "2" => Some(TokenKind::Access),
            _ => None,
        }
    }

    pub fn is_refresh(self) -> bool {
        self == TokenKind::Refresh
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i64,
    pub kind: TokenKind,
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Split `<row id>|<signed>` into its parts.
///
/// Returns `None` when the header does not have that shape.
pub fn parse_bearer(header: &str) -> Option<(i64, &str)> {
    static BEARER_RE: OnceLock<regex::Regex> = OnceLock::new();
    let pattern = BEARER_RE
        .get_or_init(|| regex::Regex::new(r"^\d+\|.*$").expect("invalid built-in bearer regex"));
    if !pattern.is_match(header) {
        return None;
    }
    let (id, signed) = header.split_once('|')?;
    Some((id.parse().ok()?, signed))
}

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The signed-in operator as reported by the session backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
}

/// Credential issued by the session backend on sign-in.
#[derive(Clone, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub identity: Identity,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at)
            .field("identity", &self.identity)
            .finish()
    }
}

/// Session-change notifications pushed by the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn { session_id: Uuid, identity: Identity },
    /// Every session of this user was revoked.
    SignedOut { user_id: String },
    Expired { session_id: Uuid },
}

/// Access token claims as issued by the session backend.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub session_id: Uuid,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Deserialize, Validate, Zeroize, ZeroizeOnDrop)]
pub struct SignInRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,

    #[serde(default)]
    pub redirect: Option<String>,
}

impl fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("redirect", &self.redirect)
            .finish()
    }
}

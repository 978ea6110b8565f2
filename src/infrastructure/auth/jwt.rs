use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::{
    entities::identity::{Claims, Identity},
    errors::AuthError,
};

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Signs and verifies session access tokens with the project's JWT secret.
#[derive(Clone)]
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        let secret = Zeroizing::new(secret.to_string());
        JwtService {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn create_access_token(
        &self,
        identity: &Identity,
        session_id: Uuid,
        ttl: Duration,
    ) -> Result<(String, DateTime<Utc>), AuthError> {
        let now = Utc::now();
        let expires_at = now + ttl;

        let claims = Claims {
            sub: identity.user_id.clone(),
            email: identity.email.clone(),
            session_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding)
            .map_err(|_| AuthError::TokenCreation)?;
        Ok((token, expires_at))
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(AuthError::from)
    }
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp as i64, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.sub.clone(),
            email: self.email.clone(),
        }
    }
}

impl fmt::Debug for JwtService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding", &"[REDACTED]")
            .field("decoding", &"[REDACTED]")
            .finish()
    }
}

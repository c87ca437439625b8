use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::user::{Role, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    pub name: String,
    pub role: Role,
}

impl Claims {
    pub fn user_id(&self) -> Result<i32> {
        self.sub
            .parse()
            .map_err(|_| Error::Unauthorized("Sesi tidak valid, silakan login kembali".into()))
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            exp: (now + self.ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
            name: user.name.clone(),
            role: user.role,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> User {
        User {
            id: 7,
            name: "Sari".into(),
            email: "sari@test.id".into(),
            password_hash: String::new(),
            role: Role::Admin,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_carries_role_and_subject() {
        let keys = TokenKeys::new("secret", 1);
        let claims = keys.verify(&keys.issue(&admin()).unwrap()).unwrap();
        assert_eq!(claims.user_id().unwrap(), 7);
        assert!(claims.is_admin());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = TokenKeys::new("secret", 1).issue(&admin()).unwrap();
        let err = TokenKeys::new("other", 1).verify(&token).unwrap_err();
        assert!(matches!(err, Error::Token(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = TokenKeys::new("secret", -2);
        let token = keys.issue(&admin()).unwrap();
        assert!(keys.verify(&token).is_err());
    }
}

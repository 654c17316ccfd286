use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::models::user::Identity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User id
    pub email: String,
    pub jti: Uuid,
    pub exp: usize, // Expiration timestamp
}

impl Claims {
    pub fn identity(&self) -> Option<Identity> {
        let user_id = Uuid::parse_str(&self.sub).ok()?;
        Some(Identity {
            user_id,
            email: self.email.clone(),
        })
    }
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, lifetime_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::hours(lifetime_hours),
        }
    }

    pub fn generate_token(&self, identity: &Identity) -> Result<(String, Claims), jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: identity.user_id.to_string(),
            email: identity.email.clone(),
            jti: Uuid::new_v4(),
            exp: (OffsetDateTime::now_utc() + self.lifetime).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok((token, claims))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &Validation::new(jsonwebtoken::Algorithm::HS256))
            .map(|data| data.claims)
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            email: "u1@example.com".to_string(),
        }
    }

    #[test]
    fn token_round_trips_identity() {
        let keys = JwtKeys::new("secret", 1);
        let who = identity();
        let (token, issued) = keys.generate_token(&who).unwrap();

        let claims = keys.validate_token(&token).unwrap();
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.identity(), Some(who));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let (token, _) = JwtKeys::new("one", 1).generate_token(&identity()).unwrap();
        assert!(JwtKeys::new("two", 1).validate_token(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let (token, _) = JwtKeys::new("secret", -2).generate_token(&identity()).unwrap();
        assert!(JwtKeys::new("secret", 1).validate_token(&token).is_err());
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
    }
}

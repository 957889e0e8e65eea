//! JWT access token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use booble_core::config::AuthConfig;
use booble_core::error::AppError;

use super::claims::{Claims, TokenType};
use super::revocation::RevocationList;

/// Validates access tokens and consults the revocation list.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
    revocations: RevocationList,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig, revocations: RevocationList) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            revocations,
        }
    }

    /// Decodes and validates an access token string.
    ///
    /// Checks signature, expiration, token type, and revocation.
    pub async fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_token(token)?;

        if claims.token_type != TokenType::Access {
            return Err(AppError::authentication(
                "Invalid token type: expected access token",
            ));
        }

        if self.revocations.is_revoked(claims.sub, claims.iat).await {
            return Err(AppError::authentication("Token has been revoked"));
        }

        Ok(claims)
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::authentication("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::authentication("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    _ => AppError::authentication(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::encoder::JwtEncoder;
    use chrono::Utc;
    use uuid::Uuid;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            ..AuthConfig::default()
        }
    }

    fn decoder(cfg: &AuthConfig) -> (JwtDecoder, RevocationList) {
        let revocations = RevocationList::new(chrono::Duration::minutes(60));
        (JwtDecoder::new(cfg, revocations.clone()), revocations)
    }

    #[tokio::test]
    async fn test_roundtrip() {
        let cfg = config("an-adequately-long-secret-for-hs256-tests");
        let encoder = JwtEncoder::new(&cfg);
        let (decoder, _) = decoder(&cfg);
        let user_id = Uuid::new_v4();

        let (token, exp) = encoder
            .generate_access_token(user_id, "ada@example.com")
            .expect("encode");
        let claims = decoder.decode_access_token(&token).await.expect("decode");

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.expires_at().timestamp(), exp.timestamp());
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let encoder = JwtEncoder::new(&config("first-secret-first-secret-first-secret"));
        let (decoder, _) = decoder(&config("second-secret-second-secret-second-sec"));
        let (token, _) = encoder
            .generate_access_token(Uuid::new_v4(), "a@b.io")
            .expect("encode");

        let err = decoder.decode_access_token(&token).await.unwrap_err();
        assert_eq!(err.kind, booble_core::error::ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_garbage_rejected() {
        let (decoder, _) = decoder(&config("an-adequately-long-secret-for-hs256-tests"));
        assert!(decoder.decode_access_token("not.a.jwt").await.is_err());
    }

    #[tokio::test]
    async fn test_revoked_token_rejected() {
        let cfg = config("an-adequately-long-secret-for-hs256-tests");
        let encoder = JwtEncoder::new(&cfg);
        let (decoder, revocations) = decoder(&cfg);
        let user_id = Uuid::new_v4();
        let (token, _) = encoder
            .generate_access_token(user_id, "ada@example.com")
            .expect("encode");

        revocations
            .revoke_user(user_id, Utc::now() + chrono::Duration::seconds(2))
            .await;
        let err = decoder.decode_access_token(&token).await.unwrap_err();
        assert_eq!(err.message, "Token has been revoked");
    }
}

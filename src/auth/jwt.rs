/// JWT issuance and validation
///
/// Both access and refresh tokens are HS256-signed JWTs; they differ only
/// in expiry and the `kind` claim.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::{Claims, TokenKind};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// A freshly minted token together with its expiry timestamp.
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mint a signed token of the given kind for a user.
///
/// # Errors
/// Returns error if signing fails
pub fn issue_token(
    user_id: i64,
    kind: TokenKind,
    config: &JwtSettings,
) -> Result<IssuedToken, AppError> {
    let expiry_seconds = match kind {
        TokenKind::Access => config.access_token_expiry,
        TokenKind::Refresh => config.refresh_token_expiry,
    };
    let claims = Claims::new(user_id, kind, expiry_seconds, config.issuer.clone());

    let expires_at = Utc
        .timestamp_opt(claims.exp, 0)
        .single()
        .ok_or_else(|| AppError::Internal("Token expiry out of range".to_string()))?;

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    Ok(IssuedToken { token, expires_at })
}

/// Validate a token's signature, expiry, and issuer, and require it to be
/// of the expected kind.
///
/// # Errors
/// Returns error if the token is invalid, expired, tampered with, or of
/// the wrong kind
pub fn validate_token(
    token: &str,
    expected_kind: TokenKind,
    config: &JwtSettings,
) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!("JWT validation error: {}", e);
        AppError::Auth(AuthError::TokenInvalid)
    })?;

    if claims.kind != expected_kind {
        tracing::warn!(user_id = %claims.sub, "Token presented with wrong kind");
        return Err(AppError::Auth(AuthError::TokenInvalid));
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        }
    }

    #[test]
    fn issue_and_validate_access_token() {
        let config = get_test_config();

        let issued = issue_token(42, TokenKind::Access, &config).expect("Failed to issue token");
        let claims = validate_token(&issued.token, TokenKind::Access, &config)
            .expect("Failed to validate token");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.iss, "test");
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn refresh_token_outlives_access_token() {
        let config = get_test_config();

        let access = issue_token(1, TokenKind::Access, &config).expect("Failed to issue token");
        let refresh = issue_token(1, TokenKind::Refresh, &config).expect("Failed to issue token");

        assert!(refresh.expires_at > access.expires_at);
    }

    #[test]
    fn access_token_rejected_as_refresh() {
        let config = get_test_config();

        let issued = issue_token(42, TokenKind::Access, &config).expect("Failed to issue token");
        let result = validate_token(&issued.token, TokenKind::Refresh, &config);

        assert!(result.is_err());
    }

    #[test]
    fn invalid_token() {
        let config = get_test_config();
        let result = validate_token("invalid.token.here", TokenKind::Access, &config);

        assert!(result.is_err());
    }

    #[test]
    fn tampered_token() {
        let config = get_test_config();

        let issued = issue_token(42, TokenKind::Access, &config).expect("Failed to issue token");
        let tampered = format!("{}X", issued.token);
        let result = validate_token(&tampered, TokenKind::Access, &config);

        assert!(result.is_err());
    }

    #[test]
    fn wrong_issuer() {
        let mut config = get_test_config();

        let issued = issue_token(42, TokenKind::Access, &config).expect("Failed to issue token");

        config.issuer = "wrong-issuer".to_string();
        let result = validate_token(&issued.token, TokenKind::Access, &config);

        assert!(result.is_err());
    }

    #[test]
    fn two_tokens_for_same_user_differ() {
        let config = get_test_config();

        let first = issue_token(1, TokenKind::Refresh, &config).expect("Failed to issue token");
        let second = issue_token(1, TokenKind::Refresh, &config).expect("Failed to issue token");

        assert_ne!(first.token, second.token);
    }
}

use crate::models::auth::AuthError;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtClaims {
    /// SimpleJWT puts the account id here.
    #[serde(default, deserialize_with = "id_as_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "id_as_string")]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl JwtClaims {
    pub fn subject(&self) -> Option<&str> {
        self.user_id.as_deref().or(self.sub.as_deref())
    }

    pub fn is_expired_at(&self, now_unix: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now_unix)
    }
}

/// Ids arrive as numbers from Django and as strings from other issuers.
fn id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Decode JWT claims without validating the signature.
///
/// The token is only used to tell the issuing API who we are; the API
/// verifies it on every request.
pub fn decode_jwt_claims(token: &str) -> Result<JwtClaims, AuthError> {
    let parts: Vec<&str> = token.split('.').collect();

    if parts.len() != 3 {
        return Err(AuthError::Malformed("expected three segments".to_string()));
    }

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| AuthError::Malformed(format!("payload is not base64url: {}", e)))?;

    serde_json::from_slice(&payload)
        .map_err(|e| AuthError::Malformed(format!("payload is not JSON claims: {}", e)))
}

#[cfg(test)]
pub(crate) fn encode_test_token(payload: &serde_json::Value) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.signature", header, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_simplejwt_claims() {
        let token = encode_test_token(&serde_json::json!({
            "token_type": "access",
            "exp": 9999999999i64,
            "jti": "abc123",
            "user_id": 42
        }));

        let claims = decode_jwt_claims(&token).unwrap();
        assert_eq!(claims.subject(), Some("42"));
        assert_eq!(claims.token_type.as_deref(), Some("access"));
        assert!(!claims.is_expired_at(1_700_000_000));
    }

    #[test]
    fn test_falls_back_to_sub() {
        let token = encode_test_token(&serde_json::json!({"sub": "user_123", "exp": 10}));
        let claims = decode_jwt_claims(&token).unwrap();
        assert_eq!(claims.subject(), Some("user_123"));
        assert!(claims.is_expired_at(10));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            decode_jwt_claims("not-a-token"),
            Err(AuthError::Malformed(_))
        ));
        assert!(matches!(
            decode_jwt_claims("a.!!!.c"),
            Err(AuthError::Malformed(_))
        ));
    }
}

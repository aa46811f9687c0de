//! Authentication and authorization: JWT validation and the
//! `resource:action` permission model.
//!
//! Token issuance lives in the identity service; this worker only
//! validates. Internal callers (other services, the CLI) may instead
//! present the shared service key as `svc:<key>`, which grants the
//! wildcard permission set.

use anyhow::{anyhow, Result};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{WorkerError, WorkerResult};
use crate::types::Request;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (employee user ID)
    pub sub: String,
    pub email: String,
    /// Role label, informational only; authorization is permission-based
    pub role: String,
    /// Permission strings in `resource:action` form; `*` and
    /// `resource:*` wildcards are honored
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Issued at (unix timestamp)
    pub iat: usize,
    /// Expiration (unix timestamp)
    pub exp: usize,
}

/// Authenticated caller identity
#[derive(Debug, Clone)]
pub struct AuthInfo {
    pub user_id: Uuid,
    pub role: String,
    pub permissions: Vec<String>,
}

impl AuthInfo {
    pub fn has_permission(&self, required: &str) -> bool {
        if self.permissions.iter().any(|p| p == "*" || p == required) {
            return true;
        }
        match required.split_once(':') {
            Some((resource, _)) => {
                let wildcard = format!("{resource}:*");
                self.permissions.iter().any(|p| *p == wildcard)
            }
            None => false,
        }
    }
}

/// Secrets the worker validates callers against.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Shared key for internal service-to-service calls
    pub service_api_key: Option<String>,
}

pub fn validate_token(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Extract the caller identity from a request.
///
/// Priority:
/// 1. `svc:<key>` matching the configured service key -> wildcard access
/// 2. JWT token -> claims-derived identity
/// 3. Otherwise UNAUTHORIZED
pub fn extract_auth<T>(request: &Request<T>, config: &AuthConfig) -> Result<AuthInfo> {
    let token = request
        .token
        .as_deref()
        .ok_or_else(|| anyhow!("no authentication provided"))?;

    if let Some(key) = token.strip_prefix("svc:") {
        let expected = config
            .service_api_key
            .as_deref()
            .ok_or_else(|| anyhow!("service key authentication is not configured"))?;
        if key != expected {
            return Err(anyhow!("invalid service key"));
        }
        return Ok(AuthInfo {
            user_id: Uuid::nil(),
            role: "service".to_string(),
            permissions: vec!["*".to_string()],
        });
    }

    let claims = validate_token(token, &config.jwt_secret)?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|e| anyhow!("invalid user id in token: {e}"))?;

    Ok(AuthInfo {
        user_id,
        role: claims.role,
        permissions: claims.permissions,
    })
}

/// Authenticate and check one required permission, mapping failures onto
/// the error taxonomy.
pub fn authorize<T>(
    request: &Request<T>,
    required: &str,
    config: &AuthConfig,
) -> WorkerResult<AuthInfo> {
    let auth = extract_auth(request, config)
        .map_err(|e| WorkerError::Unauthorized(e.to_string()))?;

    if !auth.has_permission(required) {
        return Err(WorkerError::Forbidden(format!(
            "missing permission '{required}'"
        )));
    }

    Ok(auth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EmptyPayload;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const TEST_SECRET: &str = "test-secret-key-for-jwt-at-least-32-bytes-long";

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            service_api_key: Some("internal-key".to_string()),
        }
    }

    fn issue(permissions: &[&str]) -> String {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "ops@orbis.example".to_string(),
            role: "dispatcher".to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            iat: now,
            exp: now + 3600,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_yields_identity() {
        let request = Request::with_token(issue(&["zones:read"]), EmptyPayload {});
        let auth = extract_auth(&request, &config()).unwrap();
        assert_eq!(auth.role, "dispatcher");
        assert!(auth.has_permission("zones:read"));
        assert!(!auth.has_permission("zones:write"));
    }

    #[test]
    fn test_resource_wildcard_permission() {
        let request = Request::with_token(issue(&["leaves:*"]), EmptyPayload {});
        let auth = extract_auth(&request, &config()).unwrap();
        assert!(auth.has_permission("leaves:approve"));
        assert!(!auth.has_permission("zones:read"));
    }

    #[test]
    fn test_global_wildcard_permission() {
        let request = Request::with_token(issue(&["*"]), EmptyPayload {});
        let auth = extract_auth(&request, &config()).unwrap();
        assert!(auth.has_permission("anything:at-all"));
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let request = Request::<EmptyPayload> {
            id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            token: None,
            payload: EmptyPayload {},
        };
        assert!(extract_auth(&request, &config()).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let request = Request::with_token(issue(&["*"]), EmptyPayload {});
        let bad = AuthConfig {
            jwt_secret: "a-completely-different-secret-of-32-bytes!".to_string(),
            service_api_key: None,
        };
        assert!(extract_auth(&request, &bad).is_err());
    }

    #[test]
    fn test_service_key_grants_wildcard() {
        let request = Request::with_token("svc:internal-key".to_string(), EmptyPayload {});
        let auth = extract_auth(&request, &config()).unwrap();
        assert_eq!(auth.role, "service");
        assert!(auth.has_permission("jobs:trigger"));
    }

    #[test]
    fn test_bad_service_key_is_rejected() {
        let request = Request::with_token("svc:guess".to_string(), EmptyPayload {});
        assert!(extract_auth(&request, &config()).is_err());
    }

    #[test]
    fn test_authorize_maps_to_error_taxonomy() {
        let request = Request::with_token(issue(&["zones:read"]), EmptyPayload {});
        let err = authorize(&request, "zones:write", &config()).unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");

        let unauthed = Request::<EmptyPayload> {
            id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            token: None,
            payload: EmptyPayload {},
        };
        let err = authorize(&unauthed, "zones:read", &config()).unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
    }
}

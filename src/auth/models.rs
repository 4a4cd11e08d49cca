//! Authentication Models
//! Mission: Define user, token and session data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account. Immutable once registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_digest: String, // bcrypt hash - never serialize
    pub customer: String,
}

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub username: String,
    pub customer: String,
    pub iat: i64, // issued-at timestamp
    pub exp: i64, // expiration timestamp
    pub jti: String,
}

/// Identity attached to a request by the auth gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub customer: String,
}

/// Fields extracted from a `User-Agent` header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAgentInfo {
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device: Option<String>,
}

/// Metadata stored for each live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device: Option<String>,
    pub iat: DateTime<Utc>,
}

impl SessionInfo {
    pub fn new(agent: UserAgentInfo, issued_at: DateTime<Utc>) -> Self {
        Self {
            browser: agent.browser,
            os: agent.os,
            device: agent.device,
            iat: issued_at,
        }
    }
}

/// Registration request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub customer: Option<String>,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Login and renewal response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub username: String,
    pub customer: String,
    pub token: String,
}

/// User response (sanitized)
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub customer: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            customer: user.customer.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_digest_never_serialized() {
        let user = User {
            username: "bob".to_string(),
            password_digest: "$2b$04$secret".to_string(),
            customer: "t1".to_string(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "bob");
        assert_eq!(json["customer"], "t1");
        assert!(json.get("password_digest").is_none());
    }

    #[test]
    fn test_session_info_serializes_missing_fields_as_null() {
        let info = SessionInfo::new(
            UserAgentInfo {
                browser: Some("Firefox".to_string()),
                ..Default::default()
            },
            Utc::now(),
        );

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["browser"], "Firefox");
        assert!(json["os"].is_null());
        assert!(json["device"].is_null());
        assert!(json["iat"].is_string());
    }
}

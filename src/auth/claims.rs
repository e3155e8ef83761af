/// JWT Claims structure
///
/// Payload of an admin access token plus the identity a verified token
/// hands to route handlers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Roles a token can carry. Only administrators exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (admin email)
    pub sub: String,
    /// Role name, kept as a string so unknown roles still decode
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    pub fn new(
        subject: &str,
        role: Role,
        issued_at: DateTime<Utc>,
        expiry_seconds: i64,
        issuer: &str,
    ) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: subject.to_string(),
            role: role.as_str().to_string(),
            iat,
            exp: iat + expiry_seconds,
            iss: issuer.to_string(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }
}

/// Caller identity attached to a request by the JWT middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub role: Role,
}

/// Admin row as stored by the persistence layer
#[derive(Debug, Clone, Deserialize)]
pub struct AdminRecord {
    pub admin_id: i64,
    pub email: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_creation() {
        let now = Utc::now();
        let claims = Claims::new("admin@test.com", Role::Admin, now, 3600, "test");

        assert_eq!(claims.sub, "admin@test.com");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.iss, "test");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.is_expired_at(now));
    }

    #[test]
    fn test_claims_expire_after_ttl() {
        let issued = Utc::now();
        let claims = Claims::new("admin@test.com", Role::Admin, issued, 60, "test");

        assert!(!claims.is_expired_at(issued + Duration::seconds(60)));
        assert!(claims.is_expired_at(issued + Duration::seconds(61)));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("customer".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
    }
}

/// Admin registration and login
///
/// Orchestrates the credential hasher, the token issuer and the data-access
/// collaborator. Admins are stored by email; a successful login yields an
/// access token whose subject is that email.

use std::sync::Arc;

use serde::Serialize;

use crate::auth::claims::{AdminRecord, Role};
use crate::auth::jwt::TokenIssuer;
use crate::auth::password::{CredentialHasher, MAX_PASSWORD_BYTES};
use crate::database::{from_row, scalar_id, QueryExecutor};
use crate::error::{AppError, AuthError, ValidationError};

const INSERT_ADMIN: &str = "SELECT add_admin($1, $2)";
const SELECT_ADMIN_BY_EMAIL: &str =
    "SELECT admin_id, email, password_hash FROM admins WHERE email = $1";

pub const TOKEN_TYPE: &str = "bearer";

/// Access token handed out on login
#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AdminAuthService {
    executor: Arc<dyn QueryExecutor>,
    hasher: CredentialHasher,
    tokens: TokenIssuer,
}

impl AdminAuthService {
    pub fn new(executor: Arc<dyn QueryExecutor>, hasher: CredentialHasher, tokens: TokenIssuer) -> Self {
        Self {
            executor,
            hasher,
            tokens,
        }
    }

    /// Create an admin and return its id.
    ///
    /// # Errors
    /// - `Validation` when email or password is blank, or the password is
    ///   longer than bcrypt can hash
    /// - `Database` when the store fails or returns no id
    pub async fn register(&self, email: &str, password: &str) -> Result<i64, AppError> {
        let email = require_non_blank("email", email)?;
        require_non_blank("password", password)?;
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(ValidationError::InvalidInput(format!(
                "password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            ))
            .into());
        }

        let password_hash = self.hasher.hash(password)?;

        let rows = self
            .executor
            .execute_query(INSERT_ADMIN, &[email.into(), password_hash.into()])
            .await?;
        let admin_id = scalar_id(&rows)?;

        tracing::info!(admin_id = admin_id, email = %email, "Admin registered");
        Ok(admin_id)
    }

    /// Check credentials and issue an access token.
    ///
    /// # Errors
    /// - `NotFound` when no admin has this email
    /// - `Auth(InvalidCredentials)` when the password does not match
    /// - `Database` when the store fails
    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken, AppError> {
        let email = require_non_blank("email", email)?;
        require_non_blank("password", password)?;

        let rows = self
            .executor
            .execute_query(SELECT_ADMIN_BY_EMAIL, &[email.into()])
            .await?;
        let admin: AdminRecord = match rows.first() {
            Some(row) => from_row(row)?,
            None => return Err(AppError::NotFound("Admin".to_string())),
        };

        if !self.hasher.verify(password, &admin.password_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = self.tokens.issue(&admin.email, Role::Admin)?;

        tracing::info!(admin_id = admin.admin_id, email = %admin.email, "Admin logged in");
        Ok(AccessToken {
            access_token,
            token_type: TOKEN_TYPE,
            expires_in: self.tokens.ttl_seconds(),
        })
    }
}

fn require_non_blank<'a>(field: &str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::JwtSettings;
    use crate::database::{QueryParam, Row};
    use crate::error::DatabaseError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Returns canned rows, or fails, and records every call
    struct StubExecutor {
        rows: Vec<Row>,
        fail: bool,
        calls: Mutex<Vec<(String, Vec<QueryParam>)>>,
    }

    impl StubExecutor {
        fn returning(rows: Vec<Value>) -> Arc<Self> {
            let rows = rows
                .into_iter()
                .map(|v| match v {
                    Value::Object(map) => map,
                    _ => panic!("row must be an object"),
                })
                .collect();
            Arc::new(Self {
                rows,
                fail: false,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                rows: Vec::new(),
                fail: true,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, Vec<QueryParam>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryExecutor for StubExecutor {
        async fn execute_query(
            &self,
            query: &str,
            params: &[QueryParam],
        ) -> Result<Vec<Row>, DatabaseError> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), params.to_vec()));
            if self.fail {
                return Err(DatabaseError::QueryExecution("Database error".to_string()));
            }
            Ok(self.rows.clone())
        }
    }

    fn tokens() -> TokenIssuer {
        TokenIssuer::new(&JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
            issuer: "test".to_string(),
        })
    }

    fn service(executor: Arc<StubExecutor>) -> AdminAuthService {
        AdminAuthService::new(executor, CredentialHasher::new(4), tokens())
    }

    #[tokio::test]
    async fn register_returns_new_admin_id() {
        let executor = StubExecutor::returning(vec![json!({"add_admin": 1})]);

        let admin_id = service(executor.clone())
            .register("admin@test.com", "password123")
            .await
            .unwrap();

        assert_eq!(admin_id, 1);
        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1[0], QueryParam::from("admin@test.com"));
        // The stored value is a hash, never the plaintext
        match &calls[0].1[1] {
            QueryParam::Text(Some(hash)) => {
                assert_ne!(hash, "password123");
                assert!(CredentialHasher::new(4).verify("password123", hash));
            }
            other => panic!("unexpected param {:?}", other),
        }
    }

    #[tokio::test]
    async fn register_rejects_blank_fields_without_touching_the_store() {
        let executor = StubExecutor::returning(vec![json!({"add_admin": 1})]);
        let service = service(executor.clone());

        for (email, password) in [("", "password123"), ("   ", "password123"), ("admin@test.com", "")] {
            let result = service.register(email, password).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn register_rejects_password_longer_than_bcrypt_input() {
        let executor = StubExecutor::returning(vec![json!({"add_admin": 1})]);
        let long_password = "a".repeat(MAX_PASSWORD_BYTES + 1);

        let result = service(executor.clone())
            .register("admin@test.com", &long_password)
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn register_store_failure_is_a_database_error() {
        let result = service(StubExecutor::failing())
            .register("admin@test.com", "password123")
            .await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn login_issues_bearer_token_for_admin() {
        let hash = CredentialHasher::new(4).hash("password123").unwrap();
        let executor = StubExecutor::returning(vec![json!({
            "admin_id": 1,
            "email": "admin@test.com",
            "password_hash": hash
        })]);

        let token = service(executor).login("admin@test.com", "password123").await.unwrap();

        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, 3600);
        let claims = tokens().verify(&token.access_token).unwrap();
        assert_eq!(claims.sub, "admin@test.com");
        assert_eq!(claims.role, "admin");
    }

    #[tokio::test]
    async fn login_unknown_email_is_not_found() {
        let result = service(StubExecutor::returning(vec![]))
            .login("nonexistent@test.com", "password123")
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn login_wrong_password_is_invalid_credentials() {
        let hash = CredentialHasher::new(4).hash("correctpassword").unwrap();
        let executor = StubExecutor::returning(vec![json!({
            "admin_id": 1,
            "email": "admin@test.com",
            "password_hash": hash
        })]);

        let result = service(executor).login("admin@test.com", "wrongpassword").await;

        assert!(matches!(result, Err(AppError::Auth(AuthError::InvalidCredentials))));
    }

    #[tokio::test]
    async fn login_store_failure_is_a_database_error() {
        let result = service(StubExecutor::failing())
            .login("admin@test.com", "password123")
            .await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }
}

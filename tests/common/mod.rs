#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use catalog_api::auth::{Role, TokenIssuer};
use catalog_api::configuration::{JwtSettings, PasswordSettings};
use catalog_api::database::{QueryExecutor, QueryParam, Row};
use catalog_api::error::DatabaseError;
use catalog_api::startup::run;

/// Stands in for the database: answers every query with the same canned
/// rows (or a failure) and records what it was asked.
pub struct StubExecutor {
    rows: Vec<Row>,
    fail: bool,
    calls: Mutex<Vec<(String, Vec<QueryParam>)>>,
}

impl StubExecutor {
    pub fn returning(rows: Vec<Value>) -> Arc<Self> {
        let rows = rows
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => map,
                other => panic!("row must be an object, got {}", other),
            })
            .collect();
        Arc::new(Self {
            rows,
            fail: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::returning(Vec::new())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            rows: Vec::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, Vec<QueryParam>)> {
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

pub struct TestApp {
    pub address: String,
    pub db: Arc<StubExecutor>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: "test-secret-key-at-least-32-characters-long".to_string(),
        access_token_expiry: 3600,
        issuer: "test".to_string(),
    }
}

/// A valid admin token for the settings the test server runs with
pub fn admin_token() -> String {
    TokenIssuer::new(&jwt_settings())
        .issue("admin@test.com", Role::Admin)
        .expect("Failed to issue token")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub async fn spawn_app(db: Arc<StubExecutor>) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let server = run(
        listener,
        db.clone(),
        jwt_settings(),
        PasswordSettings { hash_cost: 4 },
    )
    .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        db,
        client: reqwest::Client::new(),
    }
}

//! Common test utilities for integration tests.
//!
//! The router runs over in-memory stores, a recording notifier and scripted
//! OTP codes, so no database or mail provider is needed.

// Allow dead code in this module - not every integration test uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use domain::models::{Account, NewAccount, Role};
use domain::services::{
    AccountStore, InMemoryAccountStore, InMemoryDemandStore, InMemoryResourceStore,
    MockOtpNotifier, SequenceCodes,
};
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::Value;
use skillhive_api::app::{create_app, AppState, Stores};
use skillhive_api::config::{
    AuthConfig, Config, DatabaseConfig, EmailConfig, LoggingConfig, SecurityConfig, ServerConfig,
};
use tower::ServiceExt;

pub const DOMAIN: &str = "skillhive.test";
pub const SUPER_ADMIN: &str = "root@skillhive.test";

/// Test configuration: one allowed domain, no OTP throttling.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            max_upload_bytes: 1024 * 1024,
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_secs: 1,
            idle_timeout_secs: 1,
        },
        logging: LoggingConfig {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
            otp_requests_per_hour: 0,
        },
        auth: AuthConfig {
            allowed_email_domains: vec![DOMAIN.to_string()],
            super_admin_email: SUPER_ADMIN.to_string(),
            super_admin_name: "Root".to_string(),
            otp_ttl_secs: 600,
            otp_max_attempts: 5,
            dev_mode: false,
            session_secret: "integration-test-secret-with-32-bytes-plus".to_string(),
            session_expiry_secs: 3600,
        },
        email: EmailConfig::default(),
    }
}

/// A running app plus handles on its in-memory backends.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub accounts: Arc<InMemoryAccountStore>,
    pub resources: Arc<InMemoryResourceStore>,
    pub notifier: Arc<MockOtpNotifier>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        Self::build(config, &[])
    }

    /// OTPs are issued from `codes` in order.
    pub fn with_codes(codes: &[&str]) -> Self {
        Self::build(test_config(), codes)
    }

    fn build(config: Config, codes: &[&str]) -> Self {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let resources = Arc::new(InMemoryResourceStore::new());
        let notifier = Arc::new(MockOtpNotifier::new());

        let stores = Stores {
            accounts: accounts.clone(),
            demands: Arc::new(InMemoryDemandStore::new()),
            resources: resources.clone(),
        };

        let mut state = AppState::new(config, None, stores, notifier.clone()).unwrap();
        let scripted: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
        state.otp_gate = state
            .otp_gate
            .clone()
            .with_codes(Arc::new(SequenceCodes::new(scripted)));

        Self {
            router: create_app(state.clone()),
            state,
            accounts,
            resources,
            notifier,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Inserts an approved, active account.
    pub async fn seed_account(&self, local_part: &str, role: Role) -> Account {
        let name: String = Name().fake();
        self.accounts
            .create(NewAccount::admin_created(
                &format!("{}@{}", local_part, DOMAIN),
                &name,
                role,
            ))
            .await
            .unwrap()
    }

    /// Logs in through the OTP flow and returns the session token.
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .send(json_request(
                Method::POST,
                "/api/v1/auth/otp/request",
                serde_json::json!({ "email": email }),
                None,
            ))
            .await;
        assert_eq!(response.status(), 200, "OTP request failed for {}", email);

        let code = self.notifier.last_code_for(email).unwrap();
        let response = self
            .send(json_request(
                Method::POST,
                "/api/v1/auth/otp/verify",
                serde_json::json!({ "email": email, "code": code }),
                None,
            ))
            .await;
        assert_eq!(response.status(), 200, "OTP verify failed for {}", email);

        let body = parse_response_body(response).await;
        body["token"].as_str().unwrap().to_string()
    }

    /// Seeds an account with `role` and logs it in.
    pub async fn session(&self, local_part: &str, role: Role) -> (Account, String) {
        let account = self.seed_account(local_part, role).await;
        let token = self.login(&account.email).await;
        (account, token)
    }
}

/// Helper to create a JSON request, optionally with a Bearer token.
pub fn json_request(method: Method, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn get_request_with_auth(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn bytes_request_with_auth(uri: &str, token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        )
        .body(Body::from(body))
        .unwrap()
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

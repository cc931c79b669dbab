// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use civicflow_client::error::{ClientError, Result};
use civicflow_client::models::{DraftIssue, Issue, IssueStatus};
use civicflow_client::services::{Backend, RegisterRequest};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// Offline stand-in for the CivicFlow REST backend.
///
/// Holds raw JSON issue records (so tests can feed malformed ones),
/// enforces the server-side transition rule on `update_status`, and can
/// be switched into failure modes per call family.
#[derive(Default)]
pub struct MockBackend {
    pub issues: Mutex<Vec<serde_json::Value>>,
    pub accounts: Mutex<Vec<serde_json::Value>>,
    /// Token handed out on login; `None` rejects the credentials.
    pub login_token: Mutex<Option<String>>,
    /// When set, every authenticated call answers like a 401.
    pub unauthorized: AtomicBool,
    /// When set, submissions fail with a network error.
    pub fail_submit: AtomicBool,
    pub submitted: Mutex<Vec<DraftIssue>>,
    pub registered: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<u64>>,
    next_id: AtomicU64,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(100),
            ..Self::default()
        }
    }

    pub fn with_issues(issues: Vec<serde_json::Value>) -> Self {
        let backend = Self::new();
        *backend.issues.lock().unwrap() = issues;
        backend
    }

    pub fn grant_login(&self, token: &str) {
        *self.login_token.lock().unwrap() = Some(token.to_string());
    }

    fn check_session(&self) -> Result<()> {
        if self.unauthorized.load(Ordering::SeqCst) {
            Err(ClientError::AuthExpired)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn login(&self, _email: &str, _password: &str) -> Result<String> {
        match self.login_token.lock().unwrap().clone() {
            Some(token) => Ok(token),
            None => Err(ClientError::AuthRejected("Invalid credentials".to_string())),
        }
    }

    async fn register(&self, request: &RegisterRequest) -> Result<()> {
        self.registered.lock().unwrap().push(request.email.clone());
        Ok(())
    }

    async fn fetch_issues(&self) -> Result<Vec<serde_json::Value>> {
        self.check_session()?;
        Ok(self.issues.lock().unwrap().clone())
    }

    async fn fetch_my_issues(&self) -> Result<Vec<serde_json::Value>> {
        self.check_session()?;
        Ok(self.issues.lock().unwrap().clone())
    }

    async fn submit_issue(&self, draft: &DraftIssue) -> Result<Issue> {
        self.check_session()?;
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(ClientError::Network("connection reset".to_string()));
        }

        self.submitted.lock().unwrap().push(draft.clone());

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = raw_issue(id, &draft.title, "OPEN");
        self.issues.lock().unwrap().push(created.clone());
        Ok(serde_json::from_value(created).unwrap())
    }

    async fn update_status(&self, issue_id: u64, status: IssueStatus) -> Result<Issue> {
        self.check_session()?;

        let mut issues = self.issues.lock().unwrap();
        let record = issues
            .iter_mut()
            .find(|r| r["id"].as_u64() == Some(issue_id))
            .ok_or_else(|| {
                ClientError::TransitionRejected(format!("unknown issue {}", issue_id))
            })?;

        // Same rule the real backend applies: forward only
        let current: IssueStatus = serde_json::from_value(record["status"].clone())
            .map_err(|e| ClientError::MalformedRecord(e.to_string()))?;
        if !current.can_advance_to(status) {
            return Err(ClientError::TransitionRejected(format!(
                "issue {} is {}",
                issue_id,
                current.as_str()
            )));
        }

        record["status"] = serde_json::Value::String(status.as_str().to_string());
        serde_json::from_value(record.clone()).map_err(|e| ClientError::MalformedRecord(e.to_string()))
    }

    async fn list_accounts(&self) -> Result<Vec<serde_json::Value>> {
        self.check_session()?;
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn delete_account(&self, account_id: u64) -> Result<()> {
        self.check_session()?;
        self.deleted.lock().unwrap().push(account_id);
        Ok(())
    }
}

/// Well-formed raw issue record as the backend would serialize it.
#[allow(dead_code)]
pub fn raw_issue(id: u64, title: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "description": format!("{} reported near the market", title),
        "latitude": 22.3072,
        "longitude": 73.1812,
        "status": status,
        "imageUrl": null,
        "reporter": { "email": "citizen@example.com" }
    })
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

/// Create a signed session JWT the way the backend would. The client
/// never checks the signature, but the token must still be structurally
/// valid JWS.
#[allow(dead_code)]
pub fn make_token(email: &str, role: Option<&str>, exp: Option<i64>) -> String {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    let claims = TestClaims {
        sub: email.to_string(),
        role: role.map(|r| r.to_string()),
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"server-side-secret"),
    )
    .expect("Failed to create test JWT")
}

/// Expiry timestamp `secs` seconds in the future (negative = past).
#[allow(dead_code)]
pub fn exp_in(secs: i64) -> i64 {
    chrono::Utc::now().timestamp() + secs
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Forced-logout decorator around the backend collaborator.
//!
//! The original client did this with a global response interceptor; here
//! it is an explicit wrapper so the "any 401 clears the session" contract
//! is visible at the seam instead of living in hook state. Every outbound
//! call the app makes goes through this guard.

use crate::error::{ClientError, Result};
use crate::models::{DraftIssue, Issue, IssueStatus};
use crate::services::{Backend, RegisterRequest};
use crate::session::Session;
use async_trait::async_trait;
use std::sync::Arc;

/// Backend decorator that clears the session whenever the inner call
/// reports an expired or refused credential, before the error reaches the
/// presentation layer (which then redirects to the sign-in view).
pub struct SessionGuard {
    inner: Arc<dyn Backend>,
    session: Arc<Session>,
}

impl SessionGuard {
    pub fn new(inner: Arc<dyn Backend>, session: Arc<Session>) -> Self {
        Self { inner, session }
    }

    fn intercept<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(ClientError::AuthExpired) = &result {
            tracing::info!("Backend rejected credential, clearing session");
            if let Err(e) = self.session.logout() {
                tracing::warn!(error = %e, "Failed to clear persisted session state");
            }
        }
        result
    }
}

#[async_trait]
impl Backend for SessionGuard {
    async fn login(&self, email: &str, password: &str) -> Result<String> {
        // Login failures are AuthRejected, never AuthExpired; no clearing
        self.inner.login(email, password).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<()> {
        self.inner.register(request).await
    }

    async fn fetch_issues(&self) -> Result<Vec<serde_json::Value>> {
        let result = self.inner.fetch_issues().await;
        self.intercept(result)
    }

    async fn fetch_my_issues(&self) -> Result<Vec<serde_json::Value>> {
        let result = self.inner.fetch_my_issues().await;
        self.intercept(result)
    }

    async fn submit_issue(&self, draft: &DraftIssue) -> Result<Issue> {
        let result = self.inner.submit_issue(draft).await;
        self.intercept(result)
    }

    async fn update_status(&self, issue_id: u64, status: IssueStatus) -> Result<Issue> {
        let result = self.inner.update_status(issue_id, status).await;
        self.intercept(result)
    }

    async fn list_accounts(&self) -> Result<Vec<serde_json::Value>> {
        let result = self.inner.list_accounts().await;
        self.intercept(result)
    }

    async fn delete_account(&self, account_id: u64) -> Result<()> {
        let result = self.inner.delete_account(account_id).await;
        self.intercept(result)
    }
}

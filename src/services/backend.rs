// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CivicFlow REST backend collaborator.
//!
//! The [`Backend`] trait is the seam between the client core and the
//! network; [`HttpBackend`] is the real implementation over reqwest.
//! Status mapping is the cross-cutting contract: any 401 on an
//! authenticated endpoint becomes [`ClientError::AuthExpired`], a refused
//! status update becomes [`ClientError::TransitionRejected`], and
//! transport failures become [`ClientError::Network`].

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::models::{DraftIssue, Issue, IssueStatus};
use crate::policy::Role;
use crate::session::Session;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Outbound collaborator contract, one method per REST endpoint.
///
/// List endpoints return raw JSON records: per-record parsing (and
/// malformed-record exclusion) is the consumer's job, so one bad record
/// never poisons the whole snapshot.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /auth/login` - returns the session token.
    async fn login(&self, email: &str, password: &str) -> Result<String>;

    /// `POST /auth/register`.
    async fn register(&self, request: &RegisterRequest) -> Result<()>;

    /// `GET /issues` - the full issue snapshot, raw.
    async fn fetch_issues(&self) -> Result<Vec<serde_json::Value>>;

    /// `GET /issues/my` - the caller's own reports, raw.
    async fn fetch_my_issues(&self) -> Result<Vec<serde_json::Value>>;

    /// `POST /issues` (multipart) - returns the created record.
    async fn submit_issue(&self, draft: &DraftIssue) -> Result<Issue>;

    /// `PUT /issues/{id}/status?status=S` - returns the updated record.
    async fn update_status(&self, issue_id: u64, status: IssueStatus) -> Result<Issue>;

    /// `GET /admin/users`, raw.
    async fn list_accounts(&self) -> Result<Vec<serde_json::Value>>;

    /// `DELETE /admin/users/{id}`.
    async fn delete_account(&self, account_id: u64) -> Result<()>;
}

/// Registration payload. OFFICIAL and ADMIN self-registration requires an
/// admin token, carried camelCase on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,
}

/// Login response body.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// HTTP implementation of the backend contract.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    /// The session token is read fresh for every request, mirroring the
    /// original client's request interceptor.
    session: Arc<Session>,
}

impl HttpBackend {
    /// Build a client with the configured per-request timeout.
    pub fn new(config: &Config, session: Arc<Session>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::Internal(anyhow::anyhow!("HTTP client build: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Attach the bearer token when a session credential is present.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check an authenticated response and parse the JSON body.
    async fn check_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let response = self.check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::MalformedRecord(format!("response body: {}", e)))
    }

    /// Check an authenticated response, mapping 401 to `AuthExpired` and
    /// any other failure status to `Network`.
    async fn check_response(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status.as_u16() == 401 {
            return Err(ClientError::AuthExpired);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Network(format!("HTTP {}: {}", status, body)))
    }

    /// Map a failed response on the auth endpoints, where 4xx means the
    /// credentials or registration were rejected, not that a session
    /// expired.
    async fn auth_failure(&self, response: reqwest::Response) -> ClientError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_client_error() {
            let message = if body.trim().is_empty() {
                "invalid credentials".to_string()
            } else {
                body
            };
            ClientError::AuthRejected(message)
        } else {
            ClientError::Network(format!("HTTP {}: {}", status, body))
        }
    }

    fn transport(e: reqwest::Error) -> ClientError {
        ClientError::Network(e.to_string())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn login(&self, email: &str, password: &str) -> Result<String> {
        let body = serde_json::json!({ "email": email, "password": password });

        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport)?;

        if !response.status().is_success() {
            return Err(self.auth_failure(response).await);
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| ClientError::MalformedRecord(format!("login response: {}", e)))?;
        Ok(login.token)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<()> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(request)
            .send()
            .await
            .map_err(Self::transport)?;

        if !response.status().is_success() {
            return Err(self.auth_failure(response).await);
        }
        Ok(())
    }

    async fn fetch_issues(&self) -> Result<Vec<serde_json::Value>> {
        let response = self
            .authorize(self.http.get(self.url("/issues")))
            .send()
            .await
            .map_err(Self::transport)?;
        self.check_json(response).await
    }

    async fn fetch_my_issues(&self) -> Result<Vec<serde_json::Value>> {
        let response = self
            .authorize(self.http.get(self.url("/issues/my")))
            .send()
            .await
            .map_err(Self::transport)?;
        self.check_json(response).await
    }

    async fn submit_issue(&self, draft: &DraftIssue) -> Result<Issue> {
        let mut form = reqwest::multipart::Form::new()
            .text("title", draft.title.clone())
            .text("description", draft.description.clone())
            .text("latitude", draft.location.latitude.to_string())
            .text("longitude", draft.location.longitude.to_string());

        if let Some(image) = &draft.image {
            let part = reqwest::multipart::Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)
                .map_err(|e| ClientError::InvalidDraft(format!("image type: {}", e)))?;
            form = form.part("image", part);
        }

        let response = self
            .authorize(self.http.post(self.url("/issues")))
            .multipart(form)
            .send()
            .await
            .map_err(Self::transport)?;
        self.check_json(response).await
    }

    async fn update_status(&self, issue_id: u64, status: IssueStatus) -> Result<Issue> {
        let response = self
            .authorize(
                self.http
                    .put(self.url(&format!("/issues/{}/status", issue_id))),
            )
            .query(&[("status", status.as_str())])
            .send()
            .await
            .map_err(Self::transport)?;

        let code = response.status();
        if code.as_u16() == 401 {
            return Err(ClientError::AuthExpired);
        }
        // The backend refusing the transition (terminal state, role check,
        // unknown issue) is distinct from a transport failure
        if code.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                format!("issue {} cannot move to {}", issue_id, status.as_str())
            } else {
                body
            };
            return Err(ClientError::TransitionRejected(message));
        }

        self.check_json(response).await
    }

    async fn list_accounts(&self) -> Result<Vec<serde_json::Value>> {
        let response = self
            .authorize(self.http.get(self.url("/admin/users")))
            .send()
            .await
            .map_err(Self::transport)?;
        self.check_json(response).await
    }

    async fn delete_account(&self, account_id: u64) -> Result<()> {
        let response = self
            .authorize(
                self.http
                    .delete(self.url(&format!("/admin/users/{}", account_id))),
            )
            .send()
            .await
            .map_err(Self::transport)?;
        self.check_response(response).await?;
        Ok(())
    }
}

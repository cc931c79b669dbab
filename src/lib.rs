// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! CivicFlow client core: report civic problems on a map, track their
//! status lifecycle, and manage accounts.
//!
//! This crate is the session/authorization model and the issue/map state
//! machines of the client. Rendering and routing are the embedding
//! application's job: it consumes read models ([`session::Session`],
//! [`services::IssueRegistry`], [`report::ReportFlow`]) and dispatches
//! intents through [`App`].

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod report;
pub mod services;
pub mod session;
pub mod storage;

use config::Config;
use error::{ClientError, Result};
use middleware::SessionGuard;
use models::{Account, ImageAttachment, Issue, IssueStatus, Location, UserProfile};
use policy::{Action, Role};
use report::{FlowState, ReportFlow};
use services::registry::parse_records;
use services::{Backend, HttpBackend, IssueRegistry, RegisterRequest};
use session::Session;
use std::sync::Arc;
use storage::{JsonFileStore, KeyValueStore};

/// Aggregate client state: session, backend collaborator, issue registry
/// and report flow, wired the way the original pages wired them (minus
/// rendering).
///
/// All backend traffic flows through [`SessionGuard`], so any 401 clears
/// the session before the error surfaces.
pub struct App {
    pub config: Config,
    session: Arc<Session>,
    backend: Arc<dyn Backend>,
    registry: IssueRegistry,
    flow: ReportFlow,
}

impl App {
    /// Build the app over the file-backed session store and the HTTP
    /// backend, restoring any prior session.
    pub fn new(config: Config) -> Result<Self> {
        let store = JsonFileStore::open(&config.state_path)?;
        Self::with_store(config, Box::new(store))
    }

    /// Build the app over an injected persistence collaborator.
    pub fn with_store(config: Config, store: Box<dyn KeyValueStore>) -> Result<Self> {
        let session = Arc::new(Session::new(store));
        session.restore()?;

        let http: Arc<dyn Backend> = Arc::new(HttpBackend::new(&config, session.clone())?);
        let backend: Arc<dyn Backend> = Arc::new(SessionGuard::new(http, session.clone()));

        Ok(Self {
            registry: IssueRegistry::new(backend.clone()),
            flow: ReportFlow::new(),
            config,
            session,
            backend,
        })
    }

    /// Assemble from pre-built parts. Used by tests to substitute the
    /// backend collaborator; the caller is responsible for wrapping it in
    /// [`SessionGuard`] if the forced-logout contract should apply.
    pub fn from_parts(config: Config, session: Arc<Session>, backend: Arc<dyn Backend>) -> Self {
        Self {
            registry: IssueRegistry::new(backend.clone()),
            flow: ReportFlow::new(),
            config,
            session,
            backend,
        }
    }

    // ─── Read models ─────────────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn registry(&self) -> &IssueRegistry {
        &self.registry
    }

    pub fn flow(&self) -> &FlowState {
        self.flow.state()
    }

    // ─── Authentication ──────────────────────────────────────────────────────

    /// Sign in: exchange credentials for a token, derive the profile from
    /// the token's claims (role defaulting to CITIZEN), persist both.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let token = self.backend.login(email, password).await?;
        let claims = session::decode_claims(&token)?;
        let profile = claims.to_profile();

        self.session.login(&token, profile.clone())?;
        Ok(profile)
    }

    /// Create an account. OFFICIAL and ADMIN registration requires the
    /// admin token, enforced here before the call ever leaves the client.
    pub async fn register(&self, request: RegisterRequest) -> Result<()> {
        let elevated = matches!(request.role, Role::Official | Role::Admin);
        let missing_token = request
            .admin_token
            .as_deref()
            .map_or(true, |t| t.trim().is_empty());

        if elevated && missing_token {
            return Err(ClientError::AuthRejected(
                "an admin token is required for official and admin accounts".to_string(),
            ));
        }

        self.backend.register(&request).await
    }

    /// Sign out, clearing all persisted session state.
    pub fn logout(&self) -> Result<()> {
        self.session.logout()
    }

    // ─── Issues ──────────────────────────────────────────────────────────────

    /// Replace the registry with the backend's current snapshot.
    pub async fn refresh_issues(&mut self) -> Result<()> {
        self.require(Action::ViewIssues)?;
        self.registry.load().await
    }

    /// The caller's own reports (profile view).
    pub async fn my_issues(&self) -> Result<Vec<Issue>> {
        self.require(Action::ViewIssues)?;
        let raw = self.backend.fetch_my_issues().await?;
        Ok(parse_records(raw, "issue"))
    }

    /// Transition an issue forward, authorized against the current role.
    pub async fn update_issue_status(&mut self, issue_id: u64, status: IssueStatus) -> Result<()> {
        let role = self.current_role()?;
        self.registry.update_status(role, issue_id, status).await
    }

    // ─── Report workflow ─────────────────────────────────────────────────────

    /// "Report a problem": arm the map so the next click picks the
    /// location. Refused when the role may not submit issues.
    pub fn start_report(&mut self) -> Result<()> {
        self.require(Action::SubmitIssue)?;
        self.flow.start();
        Ok(())
    }

    /// A map click event. Returns true when it was consumed as a
    /// coordinate pick.
    pub fn map_click(&mut self, location: Location) -> bool {
        self.flow.map_click(location)
    }

    /// Cancel the report workflow (not possible mid-submission).
    pub fn cancel_report(&mut self) -> bool {
        self.flow.cancel()
    }

    /// Return to composing after a failed submission.
    pub fn resume_report(&mut self) -> bool {
        self.flow.resume()
    }

    pub fn set_report_title(&mut self, title: &str) -> bool {
        self.flow.set_title(title)
    }

    pub fn set_report_description(&mut self, description: &str) -> bool {
        self.flow.set_description(description)
    }

    pub fn attach_report_image(&mut self, image: ImageAttachment) -> bool {
        self.flow.attach_image(image)
    }

    pub fn clear_report_image(&mut self) -> bool {
        self.flow.clear_image()
    }

    pub fn can_submit_report(&self) -> bool {
        self.flow.can_submit()
    }

    /// Submit the composed draft.
    ///
    /// On success the flow returns to Idle and the registry is refreshed
    /// so the new marker appears. On failure the flow parks in Failed
    /// with the draft intact - the one place a failed call must not
    /// discard user input.
    pub async fn submit_report(&mut self) -> Result<Issue> {
        self.require(Action::SubmitIssue)?;
        let draft = self.flow.begin_submit()?;

        match self.backend.submit_issue(&draft).await {
            Ok(issue) => {
                self.flow.complete_submit();
                if let Err(e) = self.registry.load().await {
                    tracing::warn!(error = %e, "Submitted report but failed to refresh issues");
                }
                Ok(issue)
            }
            Err(e) => {
                self.flow.fail_submit(&e.to_string());
                Err(e)
            }
        }
    }

    // ─── Admin ───────────────────────────────────────────────────────────────

    /// The admin user list. Malformed account records are excluded the
    /// same way malformed issues are.
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.require(Action::ViewAccounts)?;
        let raw = self.backend.list_accounts().await?;
        Ok(parse_records(raw, "account"))
    }

    /// Delete an account. Admin accounts are refused here, mirroring the
    /// backend's own guard.
    pub async fn delete_account(&self, account: &Account) -> Result<()> {
        self.require(Action::DeleteAccount(account.role))?;
        self.backend.delete_account(account.id).await
    }

    // ─── Authorization plumbing ──────────────────────────────────────────────

    fn current_role(&self) -> Result<Role> {
        self.session
            .role()
            .ok_or_else(|| ClientError::Forbidden("not signed in".to_string()))
    }

    /// The authoritative policy check behind every mutating intent.
    fn require(&self, action: Action) -> Result<()> {
        let role = self.current_role()?;
        if policy::allows(role, action) {
            Ok(())
        } else {
            Err(ClientError::Forbidden(format!(
                "role {} may not perform this action",
                role.as_str()
            )))
        }
    }
}

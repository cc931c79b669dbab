// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory issue registry with full-refresh loads and policy-checked
//! status transitions.

use crate::error::{ClientError, Result};
use crate::models::{Issue, IssueStatus};
use crate::policy::{self, Role};
use crate::services::Backend;
use std::sync::Arc;

/// Marker counts for the dashboard stats bar. OPEN and IN_PROGRESS are
/// "pending"; RESOLVED is not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
}

impl StatusCounts {
    pub fn pending(&self) -> usize {
        self.open + self.in_progress
    }
}

/// Holds the fetched set of issues and derives filtered views.
///
/// Loads have replace-all semantics: no incremental merge, last response
/// wins across concurrent loads. Records the backend sends in an
/// unexpected shape are logged and excluded rather than coerced.
pub struct IssueRegistry {
    backend: Arc<dyn Backend>,
    issues: Vec<Issue>,
}

impl IssueRegistry {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            issues: Vec::new(),
        }
    }

    /// Replace the entire in-memory set with the backend's current
    /// snapshot. Malformed records are dropped with a warning; the
    /// well-formed remainder still becomes the new snapshot.
    pub async fn load(&mut self) -> Result<()> {
        let raw = self.backend.fetch_issues().await?;
        self.issues = parse_issues(raw);
        Ok(())
    }

    /// Current snapshot.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Issues currently in the given status. Pure view; never mutates the
    /// backing set.
    pub fn by_status(&self, status: IssueStatus) -> Vec<&Issue> {
        self.issues.iter().filter(|i| i.status == status).collect()
    }

    /// Look up a single issue by id.
    pub fn get(&self, issue_id: u64) -> Option<&Issue> {
        self.issues.iter().find(|i| i.id == issue_id)
    }

    /// Marker counts per status.
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for issue in &self.issues {
            match issue.status {
                IssueStatus::Open => counts.open += 1,
                IssueStatus::InProgress => counts.in_progress += 1,
                IssueStatus::Resolved => counts.resolved += 1,
            }
        }
        counts
    }

    /// Transition an issue forward.
    ///
    /// Checks, in order: the role is allowed to perform this specific
    /// transition; the issue exists locally; the transition is forward
    /// from the issue's current status. Only then is the mutation sent.
    /// On success the single record is patched from the backend's
    /// response (reconciled by the next [`IssueRegistry::load`]); on any
    /// failure the registry is left unchanged.
    pub async fn update_status(
        &mut self,
        role: Role,
        issue_id: u64,
        new_status: IssueStatus,
    ) -> Result<()> {
        let action = policy::action_for_transition(new_status).ok_or_else(|| {
            ClientError::TransitionRejected(format!(
                "no transition back to {}",
                new_status.as_str()
            ))
        })?;

        if !policy::allows(role, action) {
            return Err(ClientError::TransitionRejected(format!(
                "role {} may not move issues to {}",
                role.as_str(),
                new_status.as_str()
            )));
        }

        let current = self
            .get(issue_id)
            .ok_or_else(|| ClientError::TransitionRejected(format!("unknown issue {}", issue_id)))?
            .status;

        if !current.can_advance_to(new_status) {
            return Err(ClientError::TransitionRejected(format!(
                "issue {} is {} and cannot move to {}",
                issue_id,
                current.as_str(),
                new_status.as_str()
            )));
        }

        let updated = self.backend.update_status(issue_id, new_status).await?;

        if let Some(issue) = self.issues.iter_mut().find(|i| i.id == issue_id) {
            *issue = updated;
        }
        Ok(())
    }
}

/// Parse raw backend records, excluding anything outside the expected
/// shape (for issues that includes unrecognized status values). Exclusion
/// is logged, never silent, and never fatal to the rest of the snapshot.
pub(crate) fn parse_records<T: serde::de::DeserializeOwned>(
    raw: Vec<serde_json::Value>,
    kind: &str,
) -> Vec<T> {
    raw.into_iter()
        .filter_map(|record| match serde_json::from_value::<T>(record.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(error = %e, record = %record, "Excluding malformed {} record", kind);
                None
            }
        })
        .collect()
}

fn parse_issues(raw: Vec<serde_json::Value>) -> Vec<Issue> {
    parse_records(raw, "issue")
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authorization policy: a pure role-to-action permission table.
//!
//! Decisions here are independent of any rendering concern. The
//! presentation layer may hide controls it predicts will be rejected, but
//! this table is what the client actually enforces before dispatching a
//! mutating intent. The backend re-validates on its side of the trust
//! boundary; this core only guarantees it never offers a disallowed
//! action through its own APIs.

use crate::models::IssueStatus;
use serde::{Deserialize, Serialize};

/// Account role. Capabilities are enumerated per role in [`allows`];
/// nothing is inherited between roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Citizen,
    Official,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Citizen => "CITIZEN",
            Role::Official => "OFFICIAL",
            Role::Admin => "ADMIN",
        }
    }
}

/// Action a client may attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Submit a new issue report
    SubmitIssue,
    /// View the full issue map
    ViewIssues,
    /// Transition an issue to IN_PROGRESS
    StartProgress,
    /// Transition an issue to RESOLVED
    ResolveIssue,
    /// View the admin user list
    ViewAccounts,
    /// Delete the account with the given role
    DeleteAccount(Role),
}

/// The permission table. Every grant is listed explicitly; anything not
/// listed is denied.
pub fn allows(role: Role, action: Action) -> bool {
    match (role, action) {
        (_, Action::SubmitIssue) => true,
        (_, Action::ViewIssues) => true,

        (Role::Official | Role::Admin, Action::StartProgress) => true,
        (Role::Official | Role::Admin, Action::ResolveIssue) => true,

        (Role::Admin, Action::ViewAccounts) => true,
        // Admin accounts are protected from deletion, even by admins
        (Role::Admin, Action::DeleteAccount(target)) => target != Role::Admin,

        _ => false,
    }
}

/// The action required to move an issue into `next`, if `next` is ever a
/// legal target. Backward targets have no associated action; callers must
/// still check [`IssueStatus::can_advance_to`] for the specific record.
pub fn action_for_transition(next: IssueStatus) -> Option<Action> {
    match next {
        IssueStatus::Open => None,
        IssueStatus::InProgress => Some(Action::StartProgress),
        IssueStatus::Resolved => Some(Action::ResolveIssue),
    }
}

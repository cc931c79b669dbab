// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the client.

pub mod account;
pub mod issue;
pub mod user;

pub use account::Account;
pub use issue::{DraftIssue, ImageAttachment, Issue, IssueStatus, Location, Reporter};
pub use user::{Claims, UserProfile};

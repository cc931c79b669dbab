// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Issue models: fetched records, statuses, and the transient draft.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Lifecycle status of a reported issue.
///
/// Transitions are forward only: `Open -> InProgress -> Resolved`, with
/// `Open -> Resolved` also a valid forward path (officials may resolve
/// without starting work first). `Resolved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    Open,
    InProgress,
    Resolved,
}

impl IssueStatus {
    /// Whether this status accepts no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, IssueStatus::Resolved)
    }

    /// Whether `next` is a valid forward transition from this status.
    pub fn can_advance_to(self, next: IssueStatus) -> bool {
        matches!(
            (self, next),
            (IssueStatus::Open, IssueStatus::InProgress)
                | (IssueStatus::Open, IssueStatus::Resolved)
                | (IssueStatus::InProgress, IssueStatus::Resolved)
        )
    }

    /// Wire representation used in the status-update query string.
    pub fn as_str(self) -> &'static str {
        match self {
            IssueStatus::Open => "OPEN",
            IssueStatus::InProgress => "IN_PROGRESS",
            IssueStatus::Resolved => "RESOLVED",
        }
    }
}

/// Map coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Location {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// Issue record fetched from the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Backend-assigned identifier
    pub id: u64,
    pub title: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: IssueStatus,
    /// Uploaded photo, if any
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    /// Submitting user; set at creation, never changed afterwards
    #[serde(default)]
    pub reporter: Option<Reporter>,
}

impl Issue {
    pub fn location(&self) -> Location {
        Location {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Reporter email for display, if the backend included one.
    pub fn reporter_email(&self) -> Option<&str> {
        self.reporter.as_ref().map(|r| r.email.as_str())
    }
}

/// Reporter reference embedded in an issue record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reporter {
    pub email: String,
}

/// Photo attached to a draft, sent as a multipart file part.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Unsaved report being composed in the map workflow. Exists only inside
/// the report flow; not persisted until submission succeeds.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct DraftIssue {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    #[validate(nested)]
    pub location: Location,
    pub image: Option<ImageAttachment>,
}

impl DraftIssue {
    /// Empty draft anchored at a picked coordinate.
    pub fn at(location: Location) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            location,
            image: None,
        }
    }

    /// Client-side submission precondition: non-empty title and
    /// description, coordinate in range. Whitespace-only text counts as
    /// empty.
    pub fn is_submittable(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.description.trim().is_empty()
            && self.validate().is_ok()
    }
}

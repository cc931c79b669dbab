// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Map interaction state machine for composing a new issue report.
//!
//! `Idle -> Selecting -> Composing -> Submitting -> (Idle | Failed)`.
//! User-driven and single-threaded: at most one draft exists at a time,
//! and every transition is triggered by a discrete user or
//! network-completion event. The async submission itself is driven by the
//! caller (see [`crate::App::submit_report`]); this machine only accounts
//! for the states.

use crate::error::{ClientError, Result};
use crate::models::{DraftIssue, ImageAttachment, Location};

/// State of the report workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    /// No pending report; map clicks are ordinary navigation.
    Idle,
    /// The next map click is interpreted as a coordinate pick.
    Selecting,
    /// A coordinate was picked; the user is filling in the draft.
    Composing(DraftIssue),
    /// The draft is in flight. No cancellation: the call is awaited to
    /// completion or failure.
    Submitting(DraftIssue),
    /// Submission failed. The draft is retained unchanged so the user can
    /// retry without re-entering anything.
    Failed { draft: DraftIssue, reason: String },
}

/// The pick-location -> compose-report -> submit workflow.
#[derive(Debug)]
pub struct ReportFlow {
    state: FlowState,
}

impl Default for ReportFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFlow {
    pub fn new() -> Self {
        Self {
            state: FlowState::Idle,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Explicit "report a problem" intent. Consumed only from Idle.
    pub fn start(&mut self) -> bool {
        match self.state {
            FlowState::Idle => {
                self.state = FlowState::Selecting;
                true
            }
            _ => false,
        }
    }

    /// A map click. Consumed only while Selecting, where it becomes the
    /// draft's coordinate; in any other state it is ignored (ordinary map
    /// navigation).
    pub fn map_click(&mut self, location: Location) -> bool {
        match self.state {
            FlowState::Selecting => {
                self.state = FlowState::Composing(DraftIssue::at(location));
                true
            }
            _ => false,
        }
    }

    /// Cancel the workflow, discarding any draft. Permitted from
    /// Selecting, Composing and Failed; not permitted mid-Submitting.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            FlowState::Selecting | FlowState::Composing(_) | FlowState::Failed { .. } => {
                self.state = FlowState::Idle;
                true
            }
            FlowState::Idle | FlowState::Submitting(_) => false,
        }
    }

    /// Return to Composing after a failed submission, keeping the draft.
    pub fn resume(&mut self) -> bool {
        match std::mem::replace(&mut self.state, FlowState::Idle) {
            FlowState::Failed { draft, .. } => {
                self.state = FlowState::Composing(draft);
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// The draft under composition, if any.
    pub fn draft(&self) -> Option<&DraftIssue> {
        match &self.state {
            FlowState::Composing(draft)
            | FlowState::Submitting(draft)
            | FlowState::Failed { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Edit the draft while Composing. Ignored in any other state.
    pub fn edit(&mut self, edit: impl FnOnce(&mut DraftIssue)) -> bool {
        match &mut self.state {
            FlowState::Composing(draft) => {
                edit(draft);
                true
            }
            _ => false,
        }
    }

    pub fn set_title(&mut self, title: &str) -> bool {
        self.edit(|d| d.title = title.to_string())
    }

    pub fn set_description(&mut self, description: &str) -> bool {
        self.edit(|d| d.description = description.to_string())
    }

    pub fn attach_image(&mut self, image: ImageAttachment) -> bool {
        self.edit(|d| d.image = Some(image))
    }

    pub fn clear_image(&mut self) -> bool {
        self.edit(|d| d.image = None)
    }

    /// Submission is offered only for a complete draft.
    pub fn can_submit(&self) -> bool {
        matches!(&self.state, FlowState::Composing(draft) if draft.is_submittable())
    }

    /// Move Composing -> Submitting and hand the draft to the caller for
    /// the network call. Rejects incomplete drafts and any other state.
    pub fn begin_submit(&mut self) -> Result<DraftIssue> {
        match std::mem::replace(&mut self.state, FlowState::Idle) {
            FlowState::Composing(draft) if draft.is_submittable() => {
                self.state = FlowState::Submitting(draft.clone());
                Ok(draft)
            }
            FlowState::Composing(draft) => {
                self.state = FlowState::Composing(draft);
                Err(ClientError::InvalidDraft(
                    "title and description are required".to_string(),
                ))
            }
            other => {
                self.state = other;
                Err(ClientError::InvalidDraft("no draft to submit".to_string()))
            }
        }
    }

    /// Acknowledge a successful submission: Submitting -> Idle. The caller
    /// refreshes the registry afterwards.
    pub fn complete_submit(&mut self) {
        if matches!(self.state, FlowState::Submitting(_)) {
            self.state = FlowState::Idle;
        }
    }

    /// Record a failed submission: Submitting -> Failed, draft retained.
    pub fn fail_submit(&mut self, reason: &str) {
        if let FlowState::Submitting(draft) = std::mem::replace(&mut self.state, FlowState::Idle) {
            self.state = FlowState::Failed {
                draft,
                reason: reason.to_string(),
            };
        }
    }
}

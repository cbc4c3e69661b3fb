//! Application aggregate root and its lifecycle state machine.

use super::{
    ApplicationId, ParseApplicationStatusError, TaskId, TransitionError, ValidationError,
    task::non_empty,
};
use crate::identity::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Application lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Awaiting a decision from the task creator.
    Pending,
    /// Accepted; the applicant is the task assignee.
    Accepted,
    /// Rejected by the task creator.
    Rejected,
    /// Withdrawn by the applicant, or voided by assignment cancellation.
    Cancelled,
}

impl ApplicationStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` while the application still binds its (task,
    /// applicant) pair: pending or accepted.
    ///
    /// At most one open application may exist per pair.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }

    /// Returns `true` when the state machine permits `self` to `to`.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Accepted | Self::Rejected | Self::Cancelled)
                | (Self::Accepted, Self::Cancelled)
        )
    }
}

impl TryFrom<&str> for ApplicationStatus {
    type Error = ParseApplicationStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseApplicationStatusError(value.to_owned())),
        }
    }
}

/// Contact details the applicant shares with the task creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantContact {
    email: String,
    phone: Option<String>,
}

impl ApplicantContact {
    /// Creates validated contact details.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyApplicantEmail`] when the email is
    /// empty after trimming.
    pub fn new(
        email: impl Into<String>,
        phone: Option<String>,
    ) -> Result<Self, ValidationError> {
        let email = non_empty(email, ValidationError::EmptyApplicantEmail)?;
        let phone = phone
            .map(|raw| raw.trim().to_owned())
            .filter(|trimmed| !trimmed.is_empty());
        Ok(Self { email, phone })
    }

    /// Returns the contact email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the contact phone number, if shared.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

/// Input for submitting a new application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplicationSpec {
    /// Task being applied to.
    pub task_id: TaskId,
    /// Applying user.
    pub applicant_id: UserId,
    /// Denormalized display name of the applying user.
    pub applicant_name: String,
    /// Contact details shared with the creator.
    pub contact: ApplicantContact,
    /// Why the applicant should get the task.
    pub proposal: String,
}

/// Application aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    id: ApplicationId,
    task_id: TaskId,
    applicant_id: UserId,
    applicant_name: String,
    contact: ApplicantContact,
    proposal: String,
    status: ApplicationStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted application aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedApplicationData {
    /// Persisted application identifier.
    pub id: ApplicationId,
    /// Persisted task reference.
    pub task_id: TaskId,
    /// Persisted applicant identifier.
    pub applicant_id: UserId,
    /// Persisted applicant display name.
    pub applicant_name: String,
    /// Persisted contact details.
    pub contact: ApplicantContact,
    /// Persisted proposal text.
    pub proposal: String,
    /// Persisted lifecycle status.
    pub status: ApplicationStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Submits a new application in [`ApplicationStatus::Pending`] status.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the proposal or applicant name is
    /// empty after trimming.
    pub fn submit(spec: NewApplicationSpec, clock: &impl Clock) -> Result<Self, ValidationError> {
        let timestamp = clock.utc();
        let applicant_name = non_empty(spec.applicant_name, ValidationError::EmptyApplicantName)?;
        let proposal = non_empty(spec.proposal, ValidationError::EmptyProposal)?;

        Ok(Self {
            id: ApplicationId::new(),
            task_id: spec.task_id,
            applicant_id: spec.applicant_id,
            applicant_name,
            contact: spec.contact,
            proposal,
            status: ApplicationStatus::Pending,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs an application from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedApplicationData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            applicant_id: data.applicant_id,
            applicant_name: data.applicant_name,
            contact: data.contact,
            proposal: data.proposal,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the application identifier.
    #[must_use]
    pub const fn id(&self) -> ApplicationId {
        self.id
    }

    /// Returns the task being applied to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the applicant identifier.
    #[must_use]
    pub const fn applicant_id(&self) -> UserId {
        self.applicant_id
    }

    /// Returns the applicant display name.
    #[must_use]
    pub fn applicant_name(&self) -> &str {
        &self.applicant_name
    }

    /// Returns the shared contact details.
    #[must_use]
    pub const fn contact(&self) -> &ApplicantContact {
        &self.contact
    }

    /// Returns the proposal text.
    #[must_use]
    pub fn proposal(&self) -> &str {
        &self.proposal
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ApplicationStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Accepts a pending application.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidApplicationTransition`] unless the
    /// application is currently pending.
    pub fn accept(&mut self, clock: &impl Clock) -> Result<(), TransitionError> {
        self.transition_to(ApplicationStatus::Accepted, clock)
    }

    /// Rejects a pending application.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidApplicationTransition`] unless the
    /// application is currently pending.
    pub fn reject(&mut self, clock: &impl Clock) -> Result<(), TransitionError> {
        self.transition_to(ApplicationStatus::Rejected, clock)
    }

    /// Withdraws a pending application at the applicant's request.
    ///
    /// An accepted application cannot be retracted; cancelling the task
    /// assignment is the creator-side equivalent.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidApplicationTransition`] unless the
    /// application is currently pending.
    pub fn retract(&mut self, clock: &impl Clock) -> Result<(), TransitionError> {
        if self.status != ApplicationStatus::Pending {
            return Err(TransitionError::InvalidApplicationTransition {
                application_id: self.id,
                from: self.status,
                to: ApplicationStatus::Cancelled,
            });
        }
        self.transition_to(ApplicationStatus::Cancelled, clock)
    }

    /// Voids an accepted application as part of assignment cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidApplicationTransition`] unless the
    /// application is currently accepted.
    pub fn void_acceptance(&mut self, clock: &impl Clock) -> Result<(), TransitionError> {
        if self.status != ApplicationStatus::Accepted {
            return Err(TransitionError::InvalidApplicationTransition {
                application_id: self.id,
                from: self.status,
                to: ApplicationStatus::Cancelled,
            });
        }
        self.transition_to(ApplicationStatus::Cancelled, clock)
    }

    fn transition_to(
        &mut self,
        to: ApplicationStatus,
        clock: &impl Clock,
    ) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(to) {
            return Err(TransitionError::InvalidApplicationTransition {
                application_id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = clock.utc();
        Ok(())
    }
}

//! Diesel row models for task and application persistence.

use super::schema::{task_applications, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Short task title.
    pub title: String,
    /// Full task description.
    pub description: String,
    /// Where the work takes place.
    pub location: String,
    /// Offered reward in whole currency units.
    pub reward: i64,
    /// Advisory completion deadline.
    pub deadline: DateTime<Utc>,
    /// Task kind.
    pub task_type: String,
    /// Lifecycle status.
    pub status: String,
    /// Posting user.
    pub creator_id: uuid::Uuid,
    /// Denormalized creator display name.
    pub creator_name: String,
    /// Current assignee, when assigned.
    pub assigned_to: Option<uuid::Uuid>,
    /// Assignment timestamp, when assigned.
    pub assigned_at: Option<DateTime<Utc>>,
    /// Completion timestamp, when completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert/update model for task records.
///
/// `treat_none_as_null` lets a conditional update clear the assignee
/// columns when an assignment is cancelled.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskWriteRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Short task title.
    pub title: String,
    /// Full task description.
    pub description: String,
    /// Where the work takes place.
    pub location: String,
    /// Offered reward in whole currency units.
    pub reward: i64,
    /// Advisory completion deadline.
    pub deadline: DateTime<Utc>,
    /// Task kind.
    pub task_type: String,
    /// Lifecycle status.
    pub status: String,
    /// Posting user.
    pub creator_id: uuid::Uuid,
    /// Denormalized creator display name.
    pub creator_name: String,
    /// Current assignee, when assigned.
    pub assigned_to: Option<uuid::Uuid>,
    /// Assignment timestamp, when assigned.
    pub assigned_at: Option<DateTime<Utc>>,
    /// Completion timestamp, when completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for application records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = task_applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ApplicationRow {
    /// Application identifier.
    pub id: uuid::Uuid,
    /// Task being applied to.
    pub task_id: uuid::Uuid,
    /// Applying user.
    pub applicant_id: uuid::Uuid,
    /// Denormalized applicant display name.
    pub applicant_name: String,
    /// Contact email shared with the creator.
    pub applicant_email: String,
    /// Optional contact phone number.
    pub applicant_phone: Option<String>,
    /// Proposal text.
    pub proposal: String,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert/update model for application records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = task_applications)]
#[diesel(treat_none_as_null = true)]
pub struct ApplicationWriteRow {
    /// Application identifier.
    pub id: uuid::Uuid,
    /// Task being applied to.
    pub task_id: uuid::Uuid,
    /// Applying user.
    pub applicant_id: uuid::Uuid,
    /// Denormalized applicant display name.
    pub applicant_name: String,
    /// Contact email shared with the creator.
    pub applicant_email: String,
    /// Optional contact phone number.
    pub applicant_phone: Option<String>,
    /// Proposal text.
    pub proposal: String,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

//! Diesel schema for task and application persistence.
//!
//! The backing migration gives `task_applications.task_id` an
//! `ON DELETE CASCADE` foreign key and a partial unique index
//! `idx_task_applications_open_unique` on (`task_id`, `applicant_id`)
//! where status is `pending` or `accepted`.

diesel::table! {
    /// Posted marketplace tasks.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Short task title.
        #[max_length = 255]
        title -> Varchar,
        /// Full task description.
        description -> Text,
        /// Where the work takes place.
        #[max_length = 255]
        location -> Varchar,
        /// Offered reward in whole currency units.
        reward -> Int8,
        /// Advisory completion deadline.
        deadline -> Timestamptz,
        /// Task kind.
        #[max_length = 20]
        task_type -> Varchar,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Posting user.
        creator_id -> Uuid,
        /// Denormalized creator display name.
        #[max_length = 255]
        creator_name -> Varchar,
        /// Current assignee, when assigned.
        assigned_to -> Nullable<Uuid>,
        /// Assignment timestamp, when assigned.
        assigned_at -> Nullable<Timestamptz>,
        /// Completion timestamp, when completed.
        completed_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Applications competing for tasks.
    task_applications (id) {
        /// Application identifier.
        id -> Uuid,
        /// Task being applied to.
        task_id -> Uuid,
        /// Applying user.
        applicant_id -> Uuid,
        /// Denormalized applicant display name.
        #[max_length = 255]
        applicant_name -> Varchar,
        /// Contact email shared with the creator.
        #[max_length = 255]
        applicant_email -> Varchar,
        /// Optional contact phone number.
        #[max_length = 50]
        applicant_phone -> Nullable<Varchar>,
        /// Proposal text.
        proposal -> Text,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(task_applications -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_applications);

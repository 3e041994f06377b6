//! Status lifecycle engine.
//!
//! Transitions are permissive: any status in the complaint kind's vocabulary
//! may be applied at any time, including moving backwards or leaving
//! `Resolved`. Entering [`Status::AssignedToVolunteer`] also records a
//! volunteer assignment for the acting user, every time it is applied.
//!
//! The status update and the assignment insert share one transaction, so a
//! complaint is never left marked as assigned without a matching claim.

use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use tracing::info;

use crate::assignment::{insert_assignment, VolunteerAssignment};
use crate::complaint::{ComplaintKind, Status};
use crate::error::{Error, Result};
use crate::identity::Session;
use crate::storage::{self, Storage};

/// Outcome of a status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Kind of the updated complaint.
    pub kind: ComplaintKind,
    /// Id of the updated complaint.
    pub complaint_id: i64,
    /// Status before the update.
    pub previous: Status,
    /// Status after the update.
    pub status: Status,
    /// The claim recorded by this transition, if any.
    pub assignment: Option<VolunteerAssignment>,
}

/// Applies status transitions.
#[derive(Debug, Clone, Copy)]
pub struct Lifecycle<'a> {
    storage: &'a Storage,
}

impl<'a> Lifecycle<'a> {
    /// Borrow the engine from storage.
    #[must_use]
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Move a complaint to `new_status` on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidStatus`] if `new_status` is not in the kind's vocabulary.
    /// - [`Error::UnknownComplaint`] if the complaint does not exist.
    /// - A database error if either write fails; neither write is kept then.
    pub fn transition(
        &self,
        kind: ComplaintKind,
        complaint_id: i64,
        new_status: Status,
        actor: &Session,
    ) -> Result<Transition> {
        if !kind.allows(new_status) {
            return Err(Error::InvalidStatus {
                kind,
                status: new_status.label().to_string(),
            });
        }

        let transition = self.storage.with_transaction(|conn| {
            let table = kind.as_str();
            let current: Option<String> = conn
                .query_row(
                    &format!("SELECT status FROM {table} WHERE id = ?1"),
                    [complaint_id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(current) = current else {
                return Err(Error::UnknownComplaint {
                    kind,
                    id: complaint_id,
                });
            };
            let previous = Status::from_label(&current).ok_or_else(|| {
                Error::internal(format!("{kind} {complaint_id} has unknown status '{current}'"))
            })?;

            conn.execute(
                &format!("UPDATE {table} SET status = ?1 WHERE id = ?2"),
                params![new_status.label(), complaint_id],
            )?;

            let assignment = if new_status == Status::AssignedToVolunteer {
                Some(insert_assignment(
                    conn,
                    kind,
                    complaint_id,
                    &actor.volunteer(),
                    storage::now(),
                )?)
            } else {
                None
            };

            Ok(Transition {
                kind,
                complaint_id,
                previous,
                status: new_status,
                assignment,
            })
        })?;

        info!(
            kind = %kind,
            complaint_id,
            from = %transition.previous,
            to = %transition.status,
            actor = %actor.email,
            "Complaint status updated"
        );
        Ok(transition)
    }

    /// Parse `label` against the kind's vocabulary, then transition.
    ///
    /// # Errors
    ///
    /// See [`Lifecycle::transition`].
    pub fn transition_to_label(
        &self,
        kind: ComplaintKind,
        complaint_id: i64,
        label: &str,
        actor: &Session,
    ) -> Result<Transition> {
        let status = kind.parse_status(label)?;
        self.transition(kind, complaint_id, status, actor)
    }
}

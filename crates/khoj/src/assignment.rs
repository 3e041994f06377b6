//! Volunteer assignment tracker.
//!
//! An assignment records which volunteer claimed a complaint and copies their
//! contact details at claim time. Nothing stops a complaint from being claimed
//! more than once; [`Tracker::find_assignment`] reports the latest claim and
//! [`Tracker::list_assignments`] all of them.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info};

use crate::complaint::{Complaint, ComplaintKind, Status};
use crate::error::Result;
use crate::identity::Volunteer;
use crate::registry;
use crate::storage::{self, Storage};

/// A volunteer's claim on a complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolunteerAssignment {
    /// Storage id.
    pub id: i64,
    /// Kind of the claimed complaint.
    pub complaint_kind: ComplaintKind,
    /// Id of the claimed complaint.
    pub complaint_id: i64,
    /// The volunteer as they were at claim time.
    pub volunteer: Volunteer,
    /// When the claim was made.
    pub assigned_at: DateTime<Utc>,
}

const ASSIGNMENT_COLUMNS: &str = "id, complaint_kind, complaint_id, volunteer_id, \
     volunteer_name, volunteer_phone, volunteer_email, assigned_at";

/// Insert an assignment through `conn`, which may be a transaction.
pub(crate) fn insert_assignment(
    conn: &Connection,
    kind: ComplaintKind,
    complaint_id: i64,
    volunteer: &Volunteer,
    assigned_at: DateTime<Utc>,
) -> Result<VolunteerAssignment> {
    conn.execute(
        r"
        INSERT INTO volunteer_assignments
            (complaint_kind, complaint_id, volunteer_id, volunteer_name,
             volunteer_phone, volunteer_email, assigned_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ",
        params![
            kind.as_str(),
            complaint_id,
            volunteer.user_id,
            volunteer.name,
            volunteer.phone,
            volunteer.email,
            storage::format_timestamp(assigned_at),
        ],
    )?;

    let id = conn.last_insert_rowid();
    info!(
        kind = %kind,
        complaint_id,
        volunteer = %volunteer.email,
        assignment_id = id,
        "Recorded volunteer assignment"
    );

    Ok(VolunteerAssignment {
        id,
        complaint_kind: kind,
        complaint_id,
        volunteer: volunteer.clone(),
        assigned_at,
    })
}

/// Records and queries volunteer claims.
#[derive(Debug, Clone, Copy)]
pub struct Tracker<'a> {
    storage: &'a Storage,
}

impl<'a> Tracker<'a> {
    /// Borrow the tracker from storage.
    #[must_use]
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Append a claim. No uniqueness check is made.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn record_assignment(
        &self,
        kind: ComplaintKind,
        complaint_id: i64,
        volunteer: &Volunteer,
    ) -> Result<VolunteerAssignment> {
        insert_assignment(self.storage.conn(), kind, complaint_id, volunteer, storage::now())
    }

    /// The most recent claim on a complaint.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_assignment(
        &self,
        kind: ComplaintKind,
        complaint_id: i64,
    ) -> Result<Option<VolunteerAssignment>> {
        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM volunteer_assignments \
             WHERE complaint_kind = ?1 AND complaint_id = ?2 \
             ORDER BY assigned_at DESC, id DESC LIMIT 1"
        );
        let assignment = self
            .storage
            .conn()
            .query_row(&sql, params![kind.as_str(), complaint_id], Self::row_to_assignment)
            .optional()?;
        Ok(assignment)
    }

    /// Every claim on a complaint, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_assignments(
        &self,
        kind: ComplaintKind,
        complaint_id: i64,
    ) -> Result<Vec<VolunteerAssignment>> {
        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM volunteer_assignments \
             WHERE complaint_kind = ?1 AND complaint_id = ?2 \
             ORDER BY assigned_at DESC, id DESC"
        );
        let mut stmt = self.storage.conn().prepare(&sql)?;
        let assignments = stmt
            .query_map(params![kind.as_str(), complaint_id], Self::row_to_assignment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(assignments)
    }

    /// Complaints a volunteer should see: every unclaimed one (`Pending` or
    /// `Received`) plus every one this volunteer has claimed, whatever its
    /// status. Ordered by position in the status vocabulary, then newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_claimable(
        &self,
        kind: ComplaintKind,
        volunteer_email: &str,
    ) -> Result<Vec<Complaint>> {
        let sql = format!(
            r"
            SELECT {} FROM {} c
            WHERE c.status IN (?1, ?2)
               OR EXISTS (
                   SELECT 1 FROM volunteer_assignments va
                   WHERE va.complaint_kind = ?3
                     AND va.complaint_id = c.id
                     AND va.volunteer_email = ?4
               )
            ",
            registry::columns(kind),
            kind.as_str()
        );

        let mut stmt = self.storage.conn().prepare(&sql)?;
        let mut complaints = stmt
            .query_map(
                params![
                    Status::Pending.label(),
                    Status::Received.label(),
                    kind.as_str(),
                    volunteer_email,
                ],
                |row| registry::row_to_complaint(kind, row),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        complaints.sort_by_key(|c| {
            (
                kind.ordinal(c.status).unwrap_or(usize::MAX),
                Reverse(c.created_at),
                Reverse(c.id),
            )
        });

        debug!(kind = %kind, volunteer = volunteer_email, count = complaints.len(), "Listed claimable complaints");
        Ok(complaints)
    }

    fn row_to_assignment(row: &rusqlite::Row) -> rusqlite::Result<VolunteerAssignment> {
        let kind_str: String = row.get(1)?;
        let complaint_kind = ComplaintKind::from_name(&kind_str).ok_or_else(|| {
            storage::conversion_error(1, format!("unknown complaint kind '{kind_str}'"))
        })?;
        Ok(VolunteerAssignment {
            id: row.get(0)?,
            complaint_kind,
            complaint_id: row.get(2)?,
            volunteer: Volunteer {
                user_id: row.get(3)?,
                name: row.get(4)?,
                phone: row.get(5)?,
                email: row.get(6)?,
            },
            assigned_at: storage::timestamp_column(row, 7)?,
        })
    }
}

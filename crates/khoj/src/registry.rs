//! Complaint registry: filing and reading complaints.
//!
//! Each kind lives in its own table. The column layout starts with the
//! columns every kind shares, followed by the kind-specific ones, so a single
//! row mapper serves every query that selects [`columns`].

use regex::Regex;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info};

use crate::assignment::{Tracker, VolunteerAssignment};
use crate::complaint::{
    AssistanceType, Complaint, ComplaintDetails, ComplaintKind, LostFoundDetails, MedicalDetails,
    SafetyDetails, Status,
};
use crate::error::{Error, Result};
use crate::identity::Session;
use crate::storage::{self, Storage};

/// Column list for `kind`, qualified with the table alias `c`.
pub(crate) fn columns(kind: ComplaintKind) -> &'static str {
    match kind {
        ComplaintKind::LostFound => {
            "c.id, c.owner_id, c.reporter_name, c.status, c.created_at, \
             c.train_number, c.compartment_number, c.seat_number, c.item_description, c.phone_number"
        }
        ComplaintKind::MedicalAssistance => {
            "c.id, c.owner_id, c.reporter_name, c.status, c.created_at, \
             c.symptoms, c.station_left, c.arriving_station, c.assistance_type"
        }
        ComplaintKind::WomensSafety => {
            "c.id, c.owner_id, c.reporter_name, c.status, c.created_at, \
             c.boarding_station, c.destination_station, c.time_of_boarding, c.phone_number, \
             c.travel_date, c.looking_for_companion"
        }
    }
}

/// Map a row selected with [`columns`] to a complaint.
pub(crate) fn row_to_complaint(kind: ComplaintKind, row: &rusqlite::Row) -> rusqlite::Result<Complaint> {
    let status_str: String = row.get(3)?;
    let status = Status::from_label(&status_str)
        .filter(|status| kind.allows(*status))
        .ok_or_else(|| {
            storage::conversion_error(3, format!("'{status_str}' is not a {kind} status"))
        })?;

    let details = match kind {
        ComplaintKind::LostFound => ComplaintDetails::LostFound(LostFoundDetails {
            train_number: row.get(5)?,
            compartment_number: row.get(6)?,
            seat_number: row.get(7)?,
            item_description: row.get(8)?,
            phone_number: row.get(9)?,
        }),
        ComplaintKind::MedicalAssistance => {
            let assistance: String = row.get(8)?;
            ComplaintDetails::MedicalAssistance(MedicalDetails {
                symptoms: row.get(5)?,
                station_left: row.get(6)?,
                arriving_station: row.get(7)?,
                assistance_type: AssistanceType::from_label(&assistance).ok_or_else(|| {
                    storage::conversion_error(8, format!("unknown assistance type '{assistance}'"))
                })?,
            })
        }
        ComplaintKind::WomensSafety => ComplaintDetails::WomensSafety(SafetyDetails {
            boarding_station: row.get(5)?,
            destination_station: row.get(6)?,
            time_of_boarding: storage::time_column(row, 7)?,
            phone_number: row.get(8)?,
            travel_date: storage::date_column(row, 9)?,
            looking_for_companion: row.get(10)?,
        }),
    };

    Ok(Complaint {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        reporter_name: row.get(2)?,
        details,
        status,
        created_at: storage::timestamp_column(row, 4)?,
    })
}

/// A rider's complaint together with whoever claimed it last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedComplaint {
    /// The complaint.
    pub complaint: Complaint,
    /// Most recent volunteer claim, if any.
    pub assignment: Option<VolunteerAssignment>,
}

/// Files and reads complaints.
#[derive(Debug, Clone)]
pub struct Registry<'a> {
    storage: &'a Storage,
    phone_pattern: Option<Regex>,
}

impl<'a> Registry<'a> {
    /// Borrow the registry from storage, without phone format checks.
    #[must_use]
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            phone_pattern: None,
        }
    }

    /// Require contact numbers to match `pattern`.
    #[must_use]
    pub fn with_phone_pattern(mut self, pattern: Regex) -> Self {
        self.phone_pattern = Some(pattern);
        self
    }

    /// File a new complaint on behalf of `reporter`.
    ///
    /// The complaint starts out [`Status::Pending`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a required field is blank, in which
    /// case nothing is written, or a database error if the insert fails.
    pub fn create(&self, reporter: &Session, details: ComplaintDetails) -> Result<Complaint> {
        if reporter.name.trim().is_empty() {
            return Err(Error::empty_field("reporter_name"));
        }
        details.validate(self.phone_pattern.as_ref())?;

        let kind = details.kind();
        let created_at = storage::now();
        let created = storage::format_timestamp(created_at);
        let status = Status::Pending.label();
        let conn = self.storage.conn();

        match &details {
            ComplaintDetails::LostFound(d) => conn.execute(
                r"
                INSERT INTO lost_found
                    (owner_id, reporter_name, train_number, compartment_number, seat_number,
                     item_description, phone_number, status, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ",
                params![
                    reporter.user_id,
                    reporter.name,
                    d.train_number,
                    d.compartment_number,
                    d.seat_number,
                    d.item_description,
                    d.phone_number,
                    status,
                    created,
                ],
            )?,
            ComplaintDetails::MedicalAssistance(d) => conn.execute(
                r"
                INSERT INTO medical_assistance
                    (owner_id, reporter_name, symptoms, station_left, arriving_station,
                     assistance_type, status, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ",
                params![
                    reporter.user_id,
                    reporter.name,
                    d.symptoms,
                    d.station_left,
                    d.arriving_station,
                    d.assistance_type.label(),
                    status,
                    created,
                ],
            )?,
            ComplaintDetails::WomensSafety(d) => conn.execute(
                r"
                INSERT INTO womens_safety
                    (owner_id, reporter_name, boarding_station, destination_station,
                     time_of_boarding, phone_number, travel_date, looking_for_companion,
                     status, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ",
                params![
                    reporter.user_id,
                    reporter.name,
                    d.boarding_station,
                    d.destination_station,
                    storage::format_time(d.time_of_boarding),
                    d.phone_number,
                    storage::format_date(d.travel_date),
                    d.looking_for_companion,
                    status,
                    created,
                ],
            )?,
        };

        let id = conn.last_insert_rowid();
        info!(kind = %kind, id, owner_id = reporter.user_id, "Filed complaint");

        Ok(Complaint {
            id,
            owner_id: reporter.user_id,
            reporter_name: reporter.name.clone(),
            details,
            status: Status::Pending,
            created_at,
        })
    }

    /// Read a complaint, if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find(&self, kind: ComplaintKind, id: i64) -> Result<Option<Complaint>> {
        let sql = format!(
            "SELECT {} FROM {} c WHERE c.id = ?1",
            columns(kind),
            kind.as_str()
        );
        let complaint = self
            .storage
            .conn()
            .query_row(&sql, [id], |row| row_to_complaint(kind, row))
            .optional()?;
        Ok(complaint)
    }

    /// Read a complaint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownComplaint`] if there is no such complaint.
    pub fn get(&self, kind: ComplaintKind, id: i64) -> Result<Complaint> {
        self.find(kind, id)?
            .ok_or(Error::UnknownComplaint { kind, id })
    }

    /// Every complaint filed by `owner`, grouped by kind and newest first
    /// within each kind, with its latest volunteer claim.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_by_reporter(&self, owner: &Session) -> Result<Vec<TrackedComplaint>> {
        let tracker = Tracker::new(self.storage);
        let mut tracked = Vec::new();

        for kind in ComplaintKind::ALL {
            let sql = format!(
                "SELECT {} FROM {} c WHERE c.owner_id = ?1 ORDER BY c.created_at DESC, c.id DESC",
                columns(kind),
                kind.as_str()
            );
            let mut stmt = self.storage.conn().prepare(&sql)?;
            let complaints = stmt
                .query_map([owner.user_id], |row| row_to_complaint(kind, row))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            for complaint in complaints {
                let assignment = tracker.find_assignment(kind, complaint.id)?;
                tracked.push(TrackedComplaint {
                    complaint,
                    assignment,
                });
            }
        }

        debug!(owner_id = owner.user_id, count = tracked.len(), "Listed reporter complaints");
        Ok(tracked)
    }
}

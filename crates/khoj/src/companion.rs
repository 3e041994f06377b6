//! Travel companion matcher.
//!
//! A women's safety request that is looking for a companion can be found by
//! other riders on the same route and date. Any of them may propose to travel
//! along; the poster accepts or rejects each proposal once.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::complaint::{Complaint, ComplaintKind, Status};
use crate::error::{Error, Result};
use crate::identity::Session;
use crate::registry;
use crate::storage::{self, Storage};

/// State of a companion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanionStatus {
    /// Waiting for the poster's answer.
    Pending,
    /// The poster agreed to travel together.
    Accepted,
    /// The poster declined.
    Rejected,
}

impl CompanionStatus {
    /// Stored label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }

    /// Parse a stored label.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Pending" => Some(Self::Pending),
            "Accepted" => Some(Self::Accepted),
            "Rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Whether the request can no longer be answered.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for CompanionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The poster's answer to a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Travel together.
    Accept,
    /// Decline.
    Reject,
}

impl Decision {
    fn status(self) -> CompanionStatus {
        match self {
            Self::Accept => CompanionStatus::Accepted,
            Self::Reject => CompanionStatus::Rejected,
        }
    }
}

/// A proposal to travel with the poster of a safety request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanionRequest {
    /// Storage id.
    pub id: i64,
    /// The women's safety request this proposal answers.
    pub request_id: i64,
    /// Profile id of the proposer.
    pub proposer_id: i64,
    /// Proposer's name.
    pub companion_name: String,
    /// Contact number; replaced by the poster's number on acceptance.
    pub companion_phone: String,
    /// Current state.
    pub status: CompanionStatus,
    /// When the proposal was made.
    pub created_at: DateTime<Utc>,
}

/// A companion request joined with the safety request it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanionListingEntry {
    /// The proposal.
    pub request: CompanionRequest,
    /// Profile id of the poster.
    pub poster_id: i64,
    /// Poster's name.
    pub poster_name: String,
    /// Poster's contact number.
    pub poster_phone: String,
    /// Boarding station of the trip.
    pub boarding_station: String,
    /// Destination station of the trip.
    pub destination_station: String,
    /// Day of travel.
    pub travel_date: NaiveDate,
    /// Boarding time.
    pub time_of_boarding: NaiveTime,
}

/// Companion requests involving one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompanionListing {
    /// Proposals the user made.
    pub sent: Vec<CompanionListingEntry>,
    /// Proposals made against the user's own posts.
    pub received: Vec<CompanionListingEntry>,
}

const REQUEST_COLUMNS: &str =
    "id, request_id, proposer_id, companion_name, companion_phone, status, created_at";

/// Matches riders on the same route.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    storage: &'a Storage,
}

impl<'a> Matcher<'a> {
    /// Borrow the matcher from storage.
    #[must_use]
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Open safety requests looking for a companion on exactly this route and
    /// date, newest first. Station names must match exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_candidates(
        &self,
        boarding_station: &str,
        destination_station: &str,
        travel_date: NaiveDate,
    ) -> Result<Vec<Complaint>> {
        let kind = ComplaintKind::WomensSafety;
        let sql = format!(
            r"
            SELECT {} FROM womens_safety c
            WHERE c.boarding_station = ?1
              AND c.destination_station = ?2
              AND c.travel_date = ?3
              AND c.looking_for_companion = 1
              AND c.status != ?4
            ORDER BY c.created_at DESC, c.id DESC
            ",
            registry::columns(kind)
        );

        let mut stmt = self.storage.conn().prepare(&sql)?;
        let candidates = stmt
            .query_map(
                params![
                    boarding_station,
                    destination_station,
                    storage::format_date(travel_date),
                    Status::Resolved.label(),
                ],
                |row| registry::row_to_complaint(kind, row),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(
            boarding = boarding_station,
            destination = destination_station,
            date = %travel_date,
            count = candidates.len(),
            "Found companion candidates"
        );
        Ok(candidates)
    }

    /// Like [`Matcher::find_candidates`], without the searching rider's own
    /// posts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_candidates_for(
        &self,
        rider: &Session,
        boarding_station: &str,
        destination_station: &str,
        travel_date: NaiveDate,
    ) -> Result<Vec<Complaint>> {
        let mut candidates =
            self.find_candidates(boarding_station, destination_station, travel_date)?;
        candidates.retain(|c| c.owner_id != rider.user_id);
        Ok(candidates)
    }

    /// Propose that `proposer` travel with the poster of `request_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownComplaint`] if there is no such safety request.
    pub fn propose(&self, request_id: i64, proposer: &Session) -> Result<CompanionRequest> {
        let conn = self.storage.conn();
        let exists = conn
            .query_row(
                "SELECT 1 FROM womens_safety WHERE id = ?1",
                [request_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Err(Error::UnknownComplaint {
                kind: ComplaintKind::WomensSafety,
                id: request_id,
            });
        }

        let created_at = storage::now();
        conn.execute(
            r"
            INSERT INTO travel_companions
                (request_id, proposer_id, companion_name, companion_phone, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                request_id,
                proposer.user_id,
                proposer.name,
                proposer.phone,
                CompanionStatus::Pending.as_str(),
                storage::format_timestamp(created_at),
            ],
        )?;

        let id = conn.last_insert_rowid();
        info!(id, request_id, proposer = %proposer.email, "Proposed travel companionship");

        Ok(CompanionRequest {
            id,
            request_id,
            proposer_id: proposer.user_id,
            companion_name: proposer.name.clone(),
            companion_phone: proposer.phone.clone(),
            status: CompanionStatus::Pending,
            created_at,
        })
    }

    /// Read a companion request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCompanionRequest`] if there is no such request.
    pub fn get(&self, id: i64) -> Result<CompanionRequest> {
        self.storage
            .conn()
            .query_row(
                &format!("SELECT {REQUEST_COLUMNS} FROM travel_companions WHERE id = ?1"),
                [id],
                |row| row_to_request(row, 0),
            )
            .optional()?
            .ok_or(Error::UnknownCompanionRequest { id })
    }

    /// Answer a pending proposal.
    ///
    /// Accepting stores `responding_phone` as the companion contact so the
    /// proposer can reach the poster; rejecting only changes the status.
    /// Caller identity is not checked here.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownCompanionRequest`] if there is no such request.
    /// - [`Error::CompanionRequestClosed`] if it was already answered.
    pub fn respond(
        &self,
        id: i64,
        decision: Decision,
        responding_phone: &str,
    ) -> Result<CompanionRequest> {
        let mut request = self.get(id)?;
        if request.status.is_terminal() {
            return Err(Error::CompanionRequestClosed {
                id,
                status: request.status.to_string(),
            });
        }

        let status = decision.status();
        let conn = self.storage.conn();
        match decision {
            Decision::Accept => {
                conn.execute(
                    "UPDATE travel_companions SET status = ?1, companion_phone = ?2 WHERE id = ?3",
                    params![status.as_str(), responding_phone, id],
                )?;
                request.companion_phone = responding_phone.to_string();
            }
            Decision::Reject => {
                conn.execute(
                    "UPDATE travel_companions SET status = ?1 WHERE id = ?2",
                    params![status.as_str(), id],
                )?;
            }
        }
        request.status = status;

        info!(id, request_id = request.request_id, status = %status, "Answered companion request");
        Ok(request)
    }

    /// Every companion request where `user` is the proposer or the poster,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_for_user(&self, user: &Session) -> Result<CompanionListing> {
        let sql = r"
            SELECT tc.id, tc.request_id, tc.proposer_id, tc.companion_name, tc.companion_phone,
                   tc.status, tc.created_at,
                   ws.owner_id, ws.reporter_name, ws.phone_number,
                   ws.boarding_station, ws.destination_station, ws.travel_date, ws.time_of_boarding
            FROM travel_companions tc
            JOIN womens_safety ws ON ws.id = tc.request_id
            WHERE tc.proposer_id = ?1 OR ws.owner_id = ?1
            ORDER BY tc.created_at DESC, tc.id DESC
        ";

        let mut stmt = self.storage.conn().prepare(sql)?;
        let entries = stmt
            .query_map([user.user_id], |row| {
                Ok(CompanionListingEntry {
                    request: row_to_request(row, 0)?,
                    poster_id: row.get(7)?,
                    poster_name: row.get(8)?,
                    poster_phone: row.get(9)?,
                    boarding_station: row.get(10)?,
                    destination_station: row.get(11)?,
                    travel_date: storage::date_column(row, 12)?,
                    time_of_boarding: storage::time_column(row, 13)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut listing = CompanionListing::default();
        for entry in entries {
            // Proposing to one's own post lands in both lists.
            if entry.request.proposer_id == user.user_id {
                listing.sent.push(entry.clone());
            }
            if entry.poster_id == user.user_id {
                listing.received.push(entry);
            }
        }

        debug!(
            user_id = user.user_id,
            sent = listing.sent.len(),
            received = listing.received.len(),
            "Listed companion requests"
        );
        Ok(listing)
    }
}

fn row_to_request(row: &rusqlite::Row, offset: usize) -> rusqlite::Result<CompanionRequest> {
    let status_idx = offset + 5;
    let status_str: String = row.get(status_idx)?;
    let status = CompanionStatus::from_name(&status_str).ok_or_else(|| {
        storage::conversion_error(status_idx, format!("unknown companion status '{status_str}'"))
    })?;
    Ok(CompanionRequest {
        id: row.get(offset)?,
        request_id: row.get(offset + 1)?,
        proposer_id: row.get(offset + 2)?,
        companion_name: row.get(offset + 3)?,
        companion_phone: row.get(offset + 4)?,
        status,
        created_at: storage::timestamp_column(row, offset + 6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complaint::tests::safety_details;
    use crate::identity::tests::register;
    use crate::identity::Role;
    use crate::lifecycle::Lifecycle;
    use crate::registry::Registry;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn may_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_find_candidates_matches_route_exactly() {
        let storage = create_test_storage();
        let asha = register(&storage, "Asha", "7777777777", Role::User);
        let registry = Registry::new(&storage);
        let matcher = Matcher::new(&storage);

        let post = registry
            .create(&asha, safety_details("Delhi", "Agra", may_first(), true))
            .unwrap();
        registry
            .create(&asha, safety_details("Delhi", "Agra", may_first(), false))
            .unwrap();
        registry
            .create(&asha, safety_details("Delhi", "Jaipur", may_first(), true))
            .unwrap();
        registry
            .create(
                &asha,
                safety_details("Delhi", "Agra", may_first().succ_opt().unwrap(), true),
            )
            .unwrap();

        let found = matcher
            .find_candidates("Delhi", "Agra", may_first())
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, post.id);

        assert!(matcher
            .find_candidates("delhi", "Agra", may_first())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_find_candidates_skips_resolved() {
        let storage = create_test_storage();
        let asha = register(&storage, "Asha", "7777777777", Role::User);
        let ravi = register(&storage, "Ravi", "8888888888", Role::Volunteer);
        let post = Registry::new(&storage)
            .create(&asha, safety_details("Delhi", "Agra", may_first(), true))
            .unwrap();

        Lifecycle::new(&storage)
            .transition(ComplaintKind::WomensSafety, post.id, Status::Resolved, &ravi)
            .unwrap();

        assert!(Matcher::new(&storage)
            .find_candidates("Delhi", "Agra", may_first())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_two_riders_find_each_other() {
        let storage = create_test_storage();
        let asha = register(&storage, "Asha", "7777777777", Role::User);
        let bina = register(&storage, "Bina", "6666666666", Role::User);
        let registry = Registry::new(&storage);
        let matcher = Matcher::new(&storage);

        let asha_post = registry
            .create(&asha, safety_details("Delhi", "Agra", may_first(), true))
            .unwrap();
        let bina_post = registry
            .create(&bina, safety_details("Delhi", "Agra", may_first(), true))
            .unwrap();

        let all: Vec<i64> = matcher
            .find_candidates("Delhi", "Agra", may_first())
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(all, vec![bina_post.id, asha_post.id]);

        let for_asha = matcher
            .find_candidates_for(&asha, "Delhi", "Agra", may_first())
            .unwrap();
        assert_eq!(for_asha.len(), 1);
        assert_eq!(for_asha[0].id, bina_post.id);
        assert_eq!(for_asha[0].reporter_name, "Bina");

        let for_bina = matcher
            .find_candidates_for(&bina, "Delhi", "Agra", may_first())
            .unwrap();
        assert_eq!(for_bina.len(), 1);
        assert_eq!(for_bina[0].id, asha_post.id);
        assert_eq!(for_bina[0].reporter_name, "Asha");
    }

    #[test]
    fn test_propose_accept_flow() {
        let storage = create_test_storage();
        let asha = register(&storage, "Asha", "7777777777", Role::User);
        let bina = register(&storage, "Bina", "6666666666", Role::User);
        let matcher = Matcher::new(&storage);

        let post = Registry::new(&storage)
            .create(&asha, safety_details("Delhi", "Agra", may_first(), true))
            .unwrap();

        let candidates = matcher
            .find_candidates("Delhi", "Agra", may_first())
            .unwrap();
        assert_eq!(candidates[0].reporter_name, "Asha");

        let proposal = matcher.propose(post.id, &bina).unwrap();
        assert_eq!(proposal.status, CompanionStatus::Pending);
        assert_eq!(proposal.companion_name, "Bina");
        assert_eq!(proposal.companion_phone, "6666666666");

        let accepted = matcher
            .respond(proposal.id, Decision::Accept, &asha.phone)
            .unwrap();
        assert_eq!(accepted.status, CompanionStatus::Accepted);
        assert_eq!(accepted.companion_phone, "7777777777");

        let stored = matcher.get(proposal.id).unwrap();
        assert_eq!(stored, accepted);
    }

    #[test]
    fn test_reject_keeps_phone() {
        let storage = create_test_storage();
        let asha = register(&storage, "Asha", "7777777777", Role::User);
        let bina = register(&storage, "Bina", "6666666666", Role::User);
        let matcher = Matcher::new(&storage);
        let post = Registry::new(&storage)
            .create(&asha, safety_details("Delhi", "Agra", may_first(), true))
            .unwrap();

        let proposal = matcher.propose(post.id, &bina).unwrap();
        let rejected = matcher
            .respond(proposal.id, Decision::Reject, &asha.phone)
            .unwrap();
        assert_eq!(rejected.status, CompanionStatus::Rejected);
        assert_eq!(matcher.get(proposal.id).unwrap().companion_phone, "6666666666");
    }

    #[test]
    fn test_respond_twice_is_refused() {
        let storage = create_test_storage();
        let asha = register(&storage, "Asha", "7777777777", Role::User);
        let bina = register(&storage, "Bina", "6666666666", Role::User);
        let matcher = Matcher::new(&storage);
        let post = Registry::new(&storage)
            .create(&asha, safety_details("Delhi", "Agra", may_first(), true))
            .unwrap();
        let proposal = matcher.propose(post.id, &bina).unwrap();

        matcher
            .respond(proposal.id, Decision::Reject, &asha.phone)
            .unwrap();
        let err = matcher
            .respond(proposal.id, Decision::Accept, &asha.phone)
            .unwrap_err();
        assert!(matches!(err, Error::CompanionRequestClosed { .. }));
        assert_eq!(
            matcher.get(proposal.id).unwrap().status,
            CompanionStatus::Rejected
        );
    }

    #[test]
    fn test_unknown_ids() {
        let storage = create_test_storage();
        let bina = register(&storage, "Bina", "6666666666", Role::User);
        let matcher = Matcher::new(&storage);

        assert!(matches!(
            matcher.propose(99, &bina).unwrap_err(),
            Error::UnknownComplaint {
                kind: ComplaintKind::WomensSafety,
                id: 99
            }
        ));
        assert!(matches!(
            matcher.respond(5, Decision::Accept, "1").unwrap_err(),
            Error::UnknownCompanionRequest { id: 5 }
        ));
    }

    #[test]
    fn test_list_for_user_partitions_sent_and_received() {
        let storage = create_test_storage();
        let asha = register(&storage, "Asha", "7777777777", Role::User);
        let bina = register(&storage, "Bina", "6666666666", Role::User);
        let chitra = register(&storage, "Chitra", "5555555555", Role::User);
        let matcher = Matcher::new(&storage);
        let post = Registry::new(&storage)
            .create(&asha, safety_details("Delhi", "Agra", may_first(), true))
            .unwrap();

        let first = matcher.propose(post.id, &bina).unwrap();
        let second = matcher.propose(post.id, &chitra).unwrap();

        let poster = matcher.list_for_user(&asha).unwrap();
        assert!(poster.sent.is_empty());
        let ids: Vec<i64> = poster.received.iter().map(|e| e.request.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(poster.received[0].boarding_station, "Delhi");
        assert_eq!(poster.received[0].poster_phone, "7777777777");

        let proposer = matcher.list_for_user(&bina).unwrap();
        assert!(proposer.received.is_empty());
        assert_eq!(proposer.sent.len(), 1);
        assert_eq!(proposer.sent[0].poster_name, "Asha");
        assert_eq!(proposer.sent[0].travel_date, may_first());
    }

    #[test]
    fn test_self_proposal_is_listed_both_ways() {
        let storage = create_test_storage();
        let asha = register(&storage, "Asha", "7777777777", Role::User);
        let matcher = Matcher::new(&storage);
        let post = Registry::new(&storage)
            .create(&asha, safety_details("Delhi", "Agra", may_first(), true))
            .unwrap();

        matcher.propose(post.id, &asha).unwrap();
        let listing = matcher.list_for_user(&asha).unwrap();
        assert_eq!(listing.sent.len(), 1);
        assert_eq!(listing.received.len(), 1);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(
            CompanionStatus::from_name("Accepted"),
            Some(CompanionStatus::Accepted)
        );
        assert_eq!(CompanionStatus::from_name("accepted"), None);
        assert!(!CompanionStatus::Pending.is_terminal());
        assert!(CompanionStatus::Rejected.is_terminal());
    }
}

//! Complaint types shared by every component.
//!
//! A complaint is one of three kinds, each with its own descriptive fields and
//! its own ordered status vocabulary. All vocabularies start at
//! [`Status::Pending`] and end at [`Status::Resolved`].

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The three kinds of complaint a rider can file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintKind {
    /// An item left behind on a train.
    LostFound,
    /// A rider needing medical help en route.
    MedicalAssistance,
    /// A women's safety / travel companion request.
    WomensSafety,
}

impl ComplaintKind {
    /// Every kind, in display order.
    pub const ALL: [Self; 3] = [Self::LostFound, Self::MedicalAssistance, Self::WomensSafety];

    /// Stable machine name, also the name of the backing table.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LostFound => "lost_found",
            Self::MedicalAssistance => "medical_assistance",
            Self::WomensSafety => "womens_safety",
        }
    }

    /// Parse a machine name produced by [`ComplaintKind::as_str`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Human-readable title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::LostFound => "Lost & Found",
            Self::MedicalAssistance => "Medical Assistance",
            Self::WomensSafety => "Women's Safety",
        }
    }

    /// The ordered status vocabulary for this kind.
    #[must_use]
    pub fn vocabulary(self) -> &'static [Status] {
        match self {
            Self::LostFound => &[
                Status::Pending,
                Status::Received,
                Status::AssignedToVolunteer,
                Status::Searching,
                Status::Found,
                Status::OutForDelivery,
                Status::Resolved,
            ],
            Self::MedicalAssistance => &[
                Status::Pending,
                Status::Received,
                Status::AssignedToVolunteer,
                Status::InProgress,
                Status::OutForAssistance,
                Status::Resolved,
            ],
            Self::WomensSafety => &[
                Status::Pending,
                Status::Received,
                Status::AssignedToVolunteer,
                Status::InProgress,
                Status::AssistanceDispatched,
                Status::Resolved,
            ],
        }
    }

    /// Check whether `status` belongs to this kind's vocabulary.
    #[must_use]
    pub fn allows(self, status: Status) -> bool {
        self.vocabulary().contains(&status)
    }

    /// Position of `status` within this kind's vocabulary.
    #[must_use]
    pub fn ordinal(self, status: Status) -> Option<usize> {
        self.vocabulary().iter().position(|s| *s == status)
    }

    /// Parse a status label and check it against this kind's vocabulary.
    ///
    /// Labels match case-insensitively, and `-`/`_` may stand in for spaces,
    /// so `assigned-to-volunteer` is accepted as well.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStatus`] if the label is unknown or not part of
    /// this kind's vocabulary.
    pub fn parse_status(self, label: &str) -> Result<Status> {
        Status::from_label(label)
            .filter(|status| self.allows(*status))
            .ok_or_else(|| Error::InvalidStatus {
                kind: self,
                status: label.to_string(),
            })
    }
}

impl std::fmt::Display for ComplaintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complaint status. Which values are legal depends on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Filed, not yet looked at.
    #[serde(rename = "Pending")]
    Pending,
    /// Acknowledged by a volunteer.
    #[serde(rename = "Received")]
    Received,
    /// Claimed by a volunteer.
    #[serde(rename = "Assigned to Volunteer")]
    AssignedToVolunteer,
    /// Lost item is being searched for.
    #[serde(rename = "Searching")]
    Searching,
    /// Lost item was found.
    #[serde(rename = "Found")]
    Found,
    /// Found item is on its way back.
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    /// Help is being arranged.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Medical help is on its way.
    #[serde(rename = "Out for Assistance")]
    OutForAssistance,
    /// Safety assistance is on its way.
    #[serde(rename = "Assistance Dispatched")]
    AssistanceDispatched,
    /// Closed.
    #[serde(rename = "Resolved")]
    Resolved,
}

impl Status {
    const ALL: [Self; 10] = [
        Self::Pending,
        Self::Received,
        Self::AssignedToVolunteer,
        Self::Searching,
        Self::Found,
        Self::OutForDelivery,
        Self::InProgress,
        Self::OutForAssistance,
        Self::AssistanceDispatched,
        Self::Resolved,
    ];

    /// The label stored in the database and shown to users.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Received => "Received",
            Self::AssignedToVolunteer => "Assigned to Volunteer",
            Self::Searching => "Searching",
            Self::Found => "Found",
            Self::OutForDelivery => "Out for Delivery",
            Self::InProgress => "In Progress",
            Self::OutForAssistance => "Out for Assistance",
            Self::AssistanceDispatched => "Assistance Dispatched",
            Self::Resolved => "Resolved",
        }
    }

    /// Parse a label, leniently.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = normalize_label(label);
        Self::ALL
            .into_iter()
            .find(|status| normalize_label(status.label()) == wanted)
    }

    /// Whether the complaint is still waiting to be claimed.
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Received)
    }

    /// Whether this is the terminal status.
    #[must_use]
    pub fn is_resolved(self) -> bool {
        self == Self::Resolved
    }
}

fn normalize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect::<String>()
        .to_lowercase()
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of help requested with a medical complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssistanceType {
    /// An ambulance waiting at the arriving station.
    #[serde(rename = "Ambulance Assistance")]
    Ambulance,
    /// A volunteer meeting the rider.
    #[serde(rename = "Volunteer Assistance")]
    Volunteer,
}

impl AssistanceType {
    /// Stored label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ambulance => "Ambulance Assistance",
            Self::Volunteer => "Volunteer Assistance",
        }
    }

    /// Parse a stored label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Ambulance Assistance" => Some(Self::Ambulance),
            "Volunteer Assistance" => Some(Self::Volunteer),
            _ => None,
        }
    }
}

impl std::fmt::Display for AssistanceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Fields of a lost & found report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LostFoundDetails {
    /// Train number or name.
    pub train_number: String,
    /// Compartment (coach) number.
    pub compartment_number: String,
    /// Seat number.
    pub seat_number: String,
    /// What was lost.
    pub item_description: String,
    /// Contact number for the rider.
    pub phone_number: String,
}

/// Fields of a medical assistance request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalDetails {
    /// Symptoms as described by the rider.
    pub symptoms: String,
    /// Last station the train left.
    pub station_left: String,
    /// Next station where help can meet the train.
    pub arriving_station: String,
    /// Requested kind of help.
    pub assistance_type: AssistanceType,
}

/// Fields of a women's safety travel request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyDetails {
    /// Station where the rider boards.
    pub boarding_station: String,
    /// Station where the rider leaves the train.
    pub destination_station: String,
    /// Boarding time, minute precision.
    pub time_of_boarding: NaiveTime,
    /// Contact number for the rider.
    pub phone_number: String,
    /// Day of travel.
    pub travel_date: NaiveDate,
    /// Whether the rider wants to be matched with a travel companion.
    pub looking_for_companion: bool,
}

/// Kind-specific descriptive fields. Immutable once filed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComplaintDetails {
    /// See [`LostFoundDetails`].
    LostFound(LostFoundDetails),
    /// See [`MedicalDetails`].
    MedicalAssistance(MedicalDetails),
    /// See [`SafetyDetails`].
    WomensSafety(SafetyDetails),
}

impl ComplaintDetails {
    /// The kind these details belong to.
    #[must_use]
    pub fn kind(&self) -> ComplaintKind {
        match self {
            Self::LostFound(_) => ComplaintKind::LostFound,
            Self::MedicalAssistance(_) => ComplaintKind::MedicalAssistance,
            Self::WomensSafety(_) => ComplaintKind::WomensSafety,
        }
    }

    /// Required free-text fields, by name.
    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::LostFound(d) => vec![
                ("train_number", d.train_number.as_str()),
                ("compartment_number", d.compartment_number.as_str()),
                ("seat_number", d.seat_number.as_str()),
                ("item_description", d.item_description.as_str()),
                ("phone_number", d.phone_number.as_str()),
            ],
            Self::MedicalAssistance(d) => vec![
                ("symptoms", d.symptoms.as_str()),
                ("station_left", d.station_left.as_str()),
                ("arriving_station", d.arriving_station.as_str()),
            ],
            Self::WomensSafety(d) => vec![
                ("boarding_station", d.boarding_station.as_str()),
                ("destination_station", d.destination_station.as_str()),
                ("phone_number", d.phone_number.as_str()),
            ],
        }
    }

    /// The rider's contact number, for kinds that carry one.
    #[must_use]
    pub fn contact_phone(&self) -> Option<&str> {
        match self {
            Self::LostFound(d) => Some(&d.phone_number),
            Self::WomensSafety(d) => Some(&d.phone_number),
            Self::MedicalAssistance(_) => None,
        }
    }

    /// Check that every required field is filled in and, when a pattern is
    /// given, that the contact number matches it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(&self, phone_pattern: Option<&Regex>) -> Result<()> {
        for (field, value) in self.required_fields() {
            if value.trim().is_empty() {
                return Err(Error::empty_field(field));
            }
        }
        if let (Some(pattern), Some(phone)) = (phone_pattern, self.contact_phone()) {
            if !pattern.is_match(phone.trim()) {
                return Err(Error::validation(
                    "phone_number",
                    format!("'{phone}' is not a valid phone number"),
                ));
            }
        }
        Ok(())
    }
}

/// A filed complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    /// Id assigned by storage, unique per kind.
    pub id: i64,
    /// Id of the reporting user's profile.
    pub owner_id: i64,
    /// Reporter's name at filing time.
    pub reporter_name: String,
    /// Kind-specific fields.
    pub details: ComplaintDetails,
    /// Current lifecycle status.
    pub status: Status,
    /// When the complaint was filed.
    pub created_at: DateTime<Utc>,
}

impl Complaint {
    /// The complaint's kind.
    #[must_use]
    pub fn kind(&self) -> ComplaintKind {
        self.details.kind()
    }

    /// The women's safety fields, if this is a safety request.
    #[must_use]
    pub fn safety(&self) -> Option<&SafetyDetails> {
        match &self.details {
            ComplaintDetails::WomensSafety(d) => Some(d),
            _ => None,
        }
    }

    /// One-line summary used in listings.
    #[must_use]
    pub fn summary(&self) -> String {
        match &self.details {
            ComplaintDetails::LostFound(d) => format!(
                "{} (train {}, coach {}, seat {})",
                d.item_description, d.train_number, d.compartment_number, d.seat_number
            ),
            ComplaintDetails::MedicalAssistance(d) => format!(
                "{} between {} and {} ({})",
                d.symptoms, d.station_left, d.arriving_station, d.assistance_type
            ),
            ComplaintDetails::WomensSafety(d) => format!(
                "{} to {} on {} at {}{}",
                d.boarding_station,
                d.destination_station,
                d.travel_date,
                d.time_of_boarding.format("%H:%M"),
                if d.looking_for_companion {
                    ", looking for a companion"
                } else {
                    ""
                }
            ),
        }
    }
}

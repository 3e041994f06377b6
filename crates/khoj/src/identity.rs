//! User directory and per-invocation sessions.
//!
//! Authentication is out of scope: a profile is looked up by email and the
//! resulting [`Session`] is trusted by every core operation it is passed to.

use chrono::{DateTime, Utc};
use regex::Regex;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::storage::{self, Storage};

/// What a user may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// A rider filing complaints.
    User,
    /// A volunteer claiming and updating complaints.
    Volunteer,
}

impl Role {
    /// Stored label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Volunteer => "VOLUNTEER",
        }
    }

    /// Parse a stored label.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "USER" => Some(Self::User),
            "VOLUNTEER" => Some(Self::Volunteer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A profile to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    /// Full name.
    pub name: String,
    /// Email address, unique across profiles.
    pub email: String,
    /// Contact number.
    pub phone: String,
    /// Role in the system.
    pub role: Role,
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Storage id.
    pub id: i64,
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Contact number.
    pub phone: String,
    /// Role in the system.
    pub role: Role,
    /// When the profile was registered.
    pub created_at: DateTime<Utc>,
}

/// Identity of the acting user, passed explicitly into each operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Profile id.
    pub user_id: i64,
    /// Display name.
    pub name: String,
    /// Contact number.
    pub phone: String,
    /// Email address.
    pub email: String,
    /// Role.
    pub role: Role,
}

impl Session {
    /// Fail unless the session has `role`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RoleRequired`] on mismatch.
    pub fn require_role(&self, role: Role) -> Result<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(Error::RoleRequired {
                required: role,
                actual: self.role,
            })
        }
    }

    /// Snapshot of this user as a claiming volunteer.
    #[must_use]
    pub fn volunteer(&self) -> Volunteer {
        Volunteer {
            user_id: self.user_id,
            name: self.name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
        }
    }
}

impl From<Profile> for Session {
    fn from(profile: Profile) -> Self {
        Self {
            user_id: profile.id,
            name: profile.name,
            phone: profile.phone,
            email: profile.email,
            role: profile.role,
        }
    }
}

/// Identity of a volunteer, copied into an assignment at claim time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
    /// Profile id of the volunteer.
    pub user_id: i64,
    /// Name at claim time.
    pub name: String,
    /// Phone at claim time.
    pub phone: String,
    /// Email at claim time.
    pub email: String,
}

/// The user directory.
#[derive(Debug, Clone)]
pub struct Directory<'a> {
    storage: &'a Storage,
    phone_pattern: Option<Regex>,
}

impl<'a> Directory<'a> {
    /// Borrow the directory from storage, without phone format checks.
    #[must_use]
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            phone_pattern: None,
        }
    }

    /// Require registered phone numbers to match `pattern`.
    #[must_use]
    pub fn with_phone_pattern(mut self, pattern: Regex) -> Self {
        self.phone_pattern = Some(pattern);
        self
    }

    /// Register a new profile.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for blank fields or a phone number that
    /// does not match the configured pattern, and the deliberately vague
    /// [`Error::Registration`] when the email is already taken.
    pub fn register(&self, profile: &NewProfile) -> Result<Profile> {
        for (field, value) in [
            ("name", &profile.name),
            ("email", &profile.email),
            ("phone", &profile.phone),
        ] {
            if value.trim().is_empty() {
                return Err(Error::empty_field(field));
            }
        }
        if let Some(pattern) = &self.phone_pattern {
            if !pattern.is_match(profile.phone.trim()) {
                return Err(Error::validation(
                    "phone",
                    format!("'{}' is not a valid phone number", profile.phone),
                ));
            }
        }

        let created_at = storage::now();
        let inserted = self.storage.conn().execute(
            r"
            INSERT INTO users (name, email, phone, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                profile.name.trim(),
                profile.email.trim(),
                profile.phone.trim(),
                profile.role.as_str(),
                storage::format_timestamp(created_at),
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                warn!(email = %profile.email, "Registration rejected by constraint");
                return Err(Error::Registration);
            }
            Err(e) => return Err(e.into()),
        }

        let id = self.storage.conn().last_insert_rowid();
        info!(user_id = id, role = %profile.role, "Registered profile");
        Ok(Profile {
            id,
            name: profile.name.trim().to_string(),
            email: profile.email.trim().to_string(),
            phone: profile.phone.trim().to_string(),
            role: profile.role,
            created_at,
        })
    }

    /// Look up a profile by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_by_email(&self, email: &str) -> Result<Option<Profile>> {
        let profile = self
            .storage
            .conn()
            .query_row(
                "SELECT id, name, email, phone, role, created_at FROM users WHERE email = ?1",
                [email.trim()],
                Self::row_to_profile,
            )
            .optional()?;
        Ok(profile)
    }

    /// Look up a profile by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: i64) -> Result<Option<Profile>> {
        let profile = self
            .storage
            .conn()
            .query_row(
                "SELECT id, name, email, phone, role, created_at FROM users WHERE id = ?1",
                [id],
                Self::row_to_profile,
            )
            .optional()?;
        Ok(profile)
    }

    /// Open a session for the user registered under `email`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownUser`] if no profile has that email.
    pub fn session_for(&self, email: &str) -> Result<Session> {
        self.find_by_email(email)?
            .map(Session::from)
            .ok_or_else(|| Error::UnknownUser {
                email: email.to_string(),
            })
    }

    fn row_to_profile(row: &rusqlite::Row) -> rusqlite::Result<Profile> {
        let role_str: String = row.get(4)?;
        let role = Role::from_name(&role_str)
            .ok_or_else(|| storage::conversion_error(4, format!("unknown role '{role_str}'")))?;
        Ok(Profile {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            role,
            created_at: storage::timestamp_column(row, 5)?,
        })
    }
}

//! `SQLite` schema definitions for khoj.
//!
//! One table per complaint kind, named after [`crate::ComplaintKind::as_str`],
//! plus the user directory, volunteer assignments and companion requests.

/// User profiles. Email is the login identity and must be unique.
pub const CREATE_USERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    phone TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('USER', 'VOLUNTEER')),
    created_at TEXT NOT NULL
)
";

/// Lost & found reports.
pub const CREATE_LOST_FOUND_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS lost_found (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id INTEGER NOT NULL REFERENCES users(id),
    reporter_name TEXT NOT NULL,
    train_number TEXT NOT NULL,
    compartment_number TEXT NOT NULL,
    seat_number TEXT NOT NULL,
    item_description TEXT NOT NULL,
    phone_number TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'Pending' CHECK (status IN (
        'Pending', 'Received', 'Assigned to Volunteer', 'Searching',
        'Found', 'Out for Delivery', 'Resolved'
    )),
    created_at TEXT NOT NULL
)
";

/// Medical assistance requests.
pub const CREATE_MEDICAL_ASSISTANCE_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS medical_assistance (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id INTEGER NOT NULL REFERENCES users(id),
    reporter_name TEXT NOT NULL,
    symptoms TEXT NOT NULL,
    station_left TEXT NOT NULL,
    arriving_station TEXT NOT NULL,
    assistance_type TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'Pending' CHECK (status IN (
        'Pending', 'Received', 'Assigned to Volunteer', 'In Progress',
        'Out for Assistance', 'Resolved'
    )),
    created_at TEXT NOT NULL
)
";

/// Women's safety travel requests.
pub const CREATE_WOMENS_SAFETY_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS womens_safety (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id INTEGER NOT NULL REFERENCES users(id),
    reporter_name TEXT NOT NULL,
    boarding_station TEXT NOT NULL,
    destination_station TEXT NOT NULL,
    time_of_boarding TEXT NOT NULL,
    phone_number TEXT NOT NULL,
    travel_date TEXT NOT NULL,
    looking_for_companion INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'Pending' CHECK (status IN (
        'Pending', 'Received', 'Assigned to Volunteer', 'In Progress',
        'Assistance Dispatched', 'Resolved'
    )),
    created_at TEXT NOT NULL
)
";

/// Companion offers made against a women's safety request.
pub const CREATE_TRAVEL_COMPANIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS travel_companions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    request_id INTEGER NOT NULL REFERENCES womens_safety(id),
    proposer_id INTEGER NOT NULL REFERENCES users(id),
    companion_name TEXT NOT NULL,
    companion_phone TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'Pending' CHECK (status IN ('Pending', 'Accepted', 'Rejected')),
    created_at TEXT NOT NULL
)
";

/// Volunteer claims. Not unique per complaint.
pub const CREATE_VOLUNTEER_ASSIGNMENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS volunteer_assignments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    complaint_kind TEXT NOT NULL,
    complaint_id INTEGER NOT NULL,
    volunteer_id INTEGER NOT NULL REFERENCES users(id),
    volunteer_name TEXT NOT NULL,
    volunteer_phone TEXT NOT NULL,
    volunteer_email TEXT NOT NULL,
    assigned_at TEXT NOT NULL
)
";

/// Route lookup for companion matching.
pub const CREATE_ROUTE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_womens_safety_route
    ON womens_safety(boarding_station, destination_station, travel_date)
";

/// Assignment lookup by complaint.
pub const CREATE_ASSIGNMENT_COMPLAINT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_assignments_complaint
    ON volunteer_assignments(complaint_kind, complaint_id)
";

/// Assignment lookup by volunteer.
pub const CREATE_ASSIGNMENT_VOLUNTEER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_assignments_volunteer
    ON volunteer_assignments(volunteer_email)
";

/// Companion requests by originating safety request.
pub const CREATE_COMPANION_REQUEST_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_travel_companions_request
    ON travel_companions(request_id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_USERS_TABLE,
    CREATE_LOST_FOUND_TABLE,
    CREATE_MEDICAL_ASSISTANCE_TABLE,
    CREATE_WOMENS_SAFETY_TABLE,
    CREATE_TRAVEL_COMPANIONS_TABLE,
    CREATE_VOLUNTEER_ASSIGNMENTS_TABLE,
    CREATE_ROUTE_INDEX,
    CREATE_ASSIGNMENT_COMPLAINT_INDEX,
    CREATE_ASSIGNMENT_VOLUNTEER_INDEX,
    CREATE_COMPANION_REQUEST_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complaint::ComplaintKind;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.trim().is_empty());
        }
    }

    #[test]
    fn test_status_checks_match_vocabularies() {
        let tables = [
            (ComplaintKind::LostFound, CREATE_LOST_FOUND_TABLE),
            (ComplaintKind::MedicalAssistance, CREATE_MEDICAL_ASSISTANCE_TABLE),
            (ComplaintKind::WomensSafety, CREATE_WOMENS_SAFETY_TABLE),
        ];
        for (kind, sql) in tables {
            assert!(sql.contains(&format!("EXISTS {} (", kind.as_str())));
            for status in kind.vocabulary() {
                assert!(
                    sql.contains(&format!("'{}'", status.label())),
                    "{kind} table is missing {status}"
                );
            }
        }
    }

    #[test]
    fn test_assignments_have_no_uniqueness_constraint() {
        assert!(!CREATE_VOLUNTEER_ASSIGNMENTS_TABLE.contains("UNIQUE"));
    }

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }
}

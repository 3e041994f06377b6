//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Subcommand, ValueEnum};

use crate::complaint::{AssistanceType, ComplaintKind};
use crate::identity::Role;

/// Profile commands.
#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Register a new profile
    Register {
        /// Full name
        #[arg(long)]
        name: String,

        /// Email address, used as the login identity
        #[arg(long)]
        email: String,

        /// Contact number
        #[arg(long)]
        phone: String,

        /// Role of the new profile
        #[arg(long, value_enum, default_value = "user")]
        role: RoleArg,
    },

    /// Show the current user's profile
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Complaint filing commands.
#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Report an item lost on a train
    LostFound {
        /// Train number or name
        #[arg(long)]
        train: String,

        /// Compartment (coach) number
        #[arg(long)]
        compartment: String,

        /// Seat number
        #[arg(long)]
        seat: String,

        /// Description of the lost item
        #[arg(long)]
        item: String,

        /// Contact number (defaults to the profile's number)
        #[arg(long)]
        phone: Option<String>,
    },

    /// Request medical assistance on board
    Medical {
        /// Symptoms
        #[arg(long)]
        symptoms: String,

        /// Last station the train left
        #[arg(long)]
        station_left: String,

        /// Next station the train arrives at
        #[arg(long)]
        arriving_station: String,

        /// Kind of help needed
        #[arg(long, value_enum, default_value = "ambulance")]
        assistance: AssistanceArg,
    },

    /// Register a trip for women's safety assistance
    Safety(SafetyReport),
}

/// Women's safety report arguments.
#[derive(Debug, Args)]
pub struct SafetyReport {
    /// Boarding station
    #[arg(long)]
    pub boarding: String,

    /// Destination station
    #[arg(long)]
    pub destination: String,

    /// Boarding time (HH:MM)
    #[arg(long, value_parser = parse_time)]
    pub time: NaiveTime,

    /// Travel date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub date: NaiveDate,

    /// Contact number (defaults to the profile's number)
    #[arg(long)]
    pub phone: Option<String>,

    /// Look for a travel companion and list matching trips
    #[arg(long)]
    pub companion: bool,
}

/// Track command arguments.
#[derive(Debug, Args)]
pub struct TrackCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Volunteer commands. All of them require the VOLUNTEER role.
#[derive(Debug, Subcommand)]
pub enum VolunteerCommand {
    /// List open complaints and the ones you have claimed
    List {
        /// Complaint kind
        #[arg(value_enum)]
        kind: KindArg,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Update a complaint's status ("Assigned to Volunteer" claims it)
    Update {
        /// Complaint kind
        #[arg(value_enum)]
        kind: KindArg,

        /// Complaint id
        id: i64,

        /// New status, e.g. "Assigned to Volunteer" or in-progress
        status: String,
    },
}

/// Travel companion commands.
#[derive(Debug, Subcommand)]
pub enum CompanionCommand {
    /// Find riders looking for a companion on a route
    Find {
        /// Boarding station
        #[arg(long)]
        boarding: String,

        /// Destination station
        #[arg(long)]
        destination: String,

        /// Travel date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Offer to travel with the poster of a safety request
    Propose {
        /// Id of the women's safety request
        request_id: i64,
    },

    /// List companion requests you sent and received
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Accept a companion request made against your trip
    Accept {
        /// Companion request id
        id: i64,
    },

    /// Reject a companion request made against your trip
    Reject {
        /// Companion request id
        id: i64,
    },
}

/// Analytics commands.
#[derive(Debug, Subcommand)]
pub enum AnalyticsCommand {
    /// Show aggregate figures per complaint kind
    Insights {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Forecast daily complaint volume
    Forecast {
        /// Number of days to forecast (overrides configuration)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        days: Option<u32>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Complaint kind argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Lost & found reports
    LostFound,
    /// Medical assistance requests
    Medical,
    /// Women's safety requests
    Safety,
}

impl From<KindArg> for ComplaintKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::LostFound => Self::LostFound,
            KindArg::Medical => Self::MedicalAssistance,
            KindArg::Safety => Self::WomensSafety,
        }
    }
}

/// Role argument for registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    /// A rider
    User,
    /// A volunteer
    Volunteer,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::User => Self::User,
            RoleArg::Volunteer => Self::Volunteer,
        }
    }
}

/// Assistance type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AssistanceArg {
    /// Ambulance at the arriving station
    Ambulance,
    /// A volunteer at the arriving station
    Volunteer,
}

impl From<AssistanceArg> for AssistanceType {
    fn from(arg: AssistanceArg) -> Self {
        match arg {
            AssistanceArg::Ambulance => Self::Ambulance,
            AssistanceArg::Volunteer => Self::Volunteer,
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|e| format!("expected HH:MM: {e}"))
}

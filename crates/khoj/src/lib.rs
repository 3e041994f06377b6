//! `khoj` - Railway passenger assistance coordination
//!
//! Riders file lost & found reports, medical assistance requests and women's
//! safety travel requests. Volunteers claim them and move them through a
//! per-kind status lifecycle, and riders on the same route can be matched as
//! travel companions.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod analytics;
pub mod assignment;
pub mod cli;
pub mod companion;
pub mod complaint;
pub mod config;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod logging;
pub mod registry;
pub mod storage;

pub use analytics::{Analytics, Forecast, Insights};
pub use assignment::{Tracker, VolunteerAssignment};
pub use companion::{CompanionListing, CompanionRequest, CompanionStatus, Decision, Matcher};
pub use complaint::{AssistanceType, Complaint, ComplaintDetails, ComplaintKind, Status};
pub use config::Config;
pub use error::{Error, Result};
pub use identity::{Directory, NewProfile, Profile, Role, Session};
pub use lifecycle::{Lifecycle, Transition};
pub use logging::init_logging;
pub use registry::{Registry, TrackedComplaint};
pub use storage::{Storage, StorageStats};

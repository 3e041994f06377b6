//! Command-line interface for khoj.
//!
//! This module provides the CLI structure for the `khoj` binary. The acting
//! user is named with `--user` (or `KHOJ_USER`) and looked up by email.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AnalyticsCommand, AssistanceArg, CompanionCommand, ConfigCommand, KindArg, ProfileCommand,
    ReportCommand, RoleArg, SafetyReport, StatusCommand, TrackCommand, VolunteerCommand,
};

/// khoj - Railway passenger assistance
///
/// Report lost items, request medical help or register a trip for safety
/// assistance; volunteers claim and resolve the requests.
#[derive(Debug, Parser)]
#[command(name = "khoj")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Email of the acting user
    #[arg(short, long, global = true, env = "KHOJ_USER", value_name = "EMAIL")]
    pub user: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register or show a profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// File a complaint
    #[command(subcommand)]
    Report(ReportCommand),

    /// Track your complaints and companion requests
    Track(TrackCommand),

    /// Claim and update complaints as a volunteer
    #[command(subcommand)]
    Volunteer(VolunteerCommand),

    /// Find and answer travel companions
    #[command(subcommand)]
    Companion(CompanionCommand),

    /// Insights and forecasts
    #[command(subcommand)]
    Analytics(AnalyticsCommand),

    /// Show database status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "khoj");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["khoj", "-q", "status"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["khoj", "status"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["khoj", "-v", "status"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["khoj", "-vv", "status"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["khoj", "-c", "/custom/config.toml", "status"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_user_after_subcommand() {
        let cli = parse(&["khoj", "track", "--user", "asha@example.com", "--json"]);
        assert_eq!(cli.user.as_deref(), Some("asha@example.com"));
        assert!(matches!(cli.command, Command::Track(TrackCommand { json: true })));
    }

    #[test]
    fn test_parse_profile_register() {
        let cli = parse(&[
            "khoj", "profile", "register", "--name", "Ravi", "--email", "ravi@example.com",
            "--phone", "8888888888", "--role", "volunteer",
        ]);
        assert!(matches!(
            cli.command,
            Command::Profile(ProfileCommand::Register {
                role: RoleArg::Volunteer,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_report_lost_found() {
        let cli = parse(&[
            "khoj", "report", "lost-found", "--train", "12345", "--compartment", "B2", "--seat",
            "34", "--item", "black backpack",
        ]);
        match cli.command {
            Command::Report(ReportCommand::LostFound { item, phone, .. }) => {
                assert_eq!(item, "black backpack");
                assert!(phone.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_report_safety() {
        let cli = parse(&[
            "khoj", "report", "safety", "--boarding", "Delhi", "--destination", "Agra", "--time",
            "21:30", "--date", "2024-05-01", "--companion",
        ]);
        match cli.command {
            Command::Report(ReportCommand::Safety(report)) => {
                assert!(report.companion);
                assert_eq!(report.time.format("%H:%M").to_string(), "21:30");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_report_safety_rejects_bad_date() {
        let result = Cli::try_parse_from([
            "khoj", "report", "safety", "--boarding", "Delhi", "--destination", "Agra", "--time",
            "21:30", "--date", "tomorrow",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_volunteer_update() {
        let cli = parse(&[
            "khoj",
            "volunteer",
            "update",
            "lost-found",
            "7",
            "Assigned to Volunteer",
        ]);
        match cli.command {
            Command::Volunteer(VolunteerCommand::Update { kind, id, status }) => {
                assert_eq!(kind, KindArg::LostFound);
                assert_eq!(id, 7);
                assert_eq!(status, "Assigned to Volunteer");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_companion_accept() {
        let cli = parse(&["khoj", "companion", "accept", "3"]);
        assert!(matches!(
            cli.command,
            Command::Companion(CompanionCommand::Accept { id: 3 })
        ));
    }

    #[test]
    fn test_parse_forecast_days() {
        let cli = parse(&["khoj", "analytics", "forecast", "--days", "3"]);
        assert!(matches!(
            cli.command,
            Command::Analytics(AnalyticsCommand::Forecast { days: Some(3), .. })
        ));
        assert!(Cli::try_parse_from(["khoj", "analytics", "forecast", "--days", "0"]).is_err());
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = parse(&["khoj", "config", "validate", "--file", "/tmp/khoj.toml"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }
}

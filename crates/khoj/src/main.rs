//! `khoj` - CLI for railway passenger assistance
//!
//! This binary opens the configured database once per invocation, resolves
//! the acting user from `--user`, runs one command and exits.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;

use khoj::analytics::{RankedCount, WeekdayHourGrid};
use khoj::cli::{
    AnalyticsCommand, Cli, Command, CompanionCommand, ConfigCommand, ProfileCommand,
    ReportCommand, SafetyReport, VolunteerCommand,
};
use khoj::companion::CompanionListingEntry;
use khoj::complaint::{LostFoundDetails, MedicalDetails, SafetyDetails};
use khoj::{
    init_logging, Analytics, Complaint, ComplaintDetails, ComplaintKind, Config, Decision,
    Directory, Error, Lifecycle, Matcher, NewProfile, Registry, Role, Session, Storage, Tracker,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // Config commands must work even when the config file is broken.
    if let Command::Config(cmd) = cli.command {
        return handle_config(cli.config, cmd);
    }

    let config = Config::load_from(cli.config.clone())?;
    let storage = Storage::open(config.database_path())?;
    let user = cli.user.as_deref();

    match cli.command {
        Command::Profile(cmd) => handle_profile(&config, &storage, user, cmd),
        Command::Report(cmd) => handle_report(&config, &storage, &session(&storage, user)?, cmd),
        Command::Track(cmd) => handle_track(&storage, &session(&storage, user)?, cmd.json),
        Command::Volunteer(cmd) => handle_volunteer(&storage, &session(&storage, user)?, cmd),
        Command::Companion(cmd) => handle_companion(&storage, &session(&storage, user)?, cmd),
        Command::Analytics(cmd) => handle_analytics(&config, &storage, cmd),
        Command::Status(cmd) => handle_status(&config, &storage, cmd.json),
        Command::Config(_) => Ok(()),
    }
}

fn session(storage: &Storage, user: Option<&str>) -> Result<Session> {
    let Some(email) = user else {
        bail!("no acting user: pass --user EMAIL or set KHOJ_USER");
    };
    Ok(Directory::new(storage).session_for(email)?)
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_profile(
    config: &Config,
    storage: &Storage,
    user: Option<&str>,
    cmd: ProfileCommand,
) -> Result<()> {
    let directory = match config.phone_regex()? {
        Some(pattern) => Directory::new(storage).with_phone_pattern(pattern),
        None => Directory::new(storage),
    };
    match cmd {
        ProfileCommand::Register {
            name,
            email,
            phone,
            role,
        } => {
            let profile = directory.register(&NewProfile {
                name,
                email,
                phone,
                role: role.into(),
            })?;
            println!(
                "Registered {} <{}> as {} (id {})",
                profile.name, profile.email, profile.role, profile.id
            );
        }
        ProfileCommand::Show { json } => {
            let email = session(storage, user)?.email;
            let profile = directory
                .find_by_email(&email)?
                .ok_or(Error::UnknownUser { email })?;
            if json {
                print_json(&profile)?;
            } else {
                println!("Name:        {}", profile.name);
                println!("Email:       {}", profile.email);
                println!("Phone:       {}", profile.phone);
                println!("Role:        {}", profile.role);
                println!("Registered:  {}", profile.created_at.format("%Y-%m-%d %H:%M"));
            }
        }
    }
    Ok(())
}

fn registry<'a>(config: &Config, storage: &'a Storage) -> Result<Registry<'a>> {
    let registry = Registry::new(storage);
    Ok(match config.phone_regex()? {
        Some(pattern) => registry.with_phone_pattern(pattern),
        None => registry,
    })
}

fn handle_report(
    config: &Config,
    storage: &Storage,
    me: &Session,
    cmd: ReportCommand,
) -> Result<()> {
    let details = match cmd {
        ReportCommand::LostFound {
            train,
            compartment,
            seat,
            item,
            phone,
        } => ComplaintDetails::LostFound(LostFoundDetails {
            train_number: train,
            compartment_number: compartment,
            seat_number: seat,
            item_description: item,
            phone_number: phone.unwrap_or_else(|| me.phone.clone()),
        }),
        ReportCommand::Medical {
            symptoms,
            station_left,
            arriving_station,
            assistance,
        } => ComplaintDetails::MedicalAssistance(MedicalDetails {
            symptoms,
            station_left,
            arriving_station,
            assistance_type: assistance.into(),
        }),
        ReportCommand::Safety(SafetyReport {
            boarding,
            destination,
            time,
            date,
            phone,
            companion,
        }) => ComplaintDetails::WomensSafety(SafetyDetails {
            boarding_station: boarding,
            destination_station: destination,
            time_of_boarding: time,
            phone_number: phone.unwrap_or_else(|| me.phone.clone()),
            travel_date: date,
            looking_for_companion: companion,
        }),
    };

    let complaint = registry(config, storage)?.create(me, details)?;
    println!(
        "Filed {} complaint #{} ({})",
        complaint.kind().title(),
        complaint.id,
        complaint.status
    );

    if let Some(safety) = complaint.safety().filter(|s| s.looking_for_companion) {
        let candidates = Matcher::new(storage).find_candidates_for(
            me,
            &safety.boarding_station,
            &safety.destination_station,
            safety.travel_date,
        )?;
        println!();
        if candidates.is_empty() {
            println!("No other riders on this route yet.");
        } else {
            println!("Riders on the same route:");
            print_candidates(&candidates);
            println!("Use `khoj companion propose <id>` to offer to travel together.");
        }
    }
    Ok(())
}

fn handle_track(storage: &Storage, me: &Session, json: bool) -> Result<()> {
    let complaints = Registry::new(storage).list_by_reporter(me)?;
    let companions = Matcher::new(storage).list_for_user(me)?;

    if json {
        return print_json(&serde_json::json!({
            "complaints": complaints,
            "companions": companions,
        }));
    }

    if complaints.is_empty() {
        println!("You have not filed any complaints.");
    }
    for kind in ComplaintKind::ALL {
        let mut of_kind = complaints
            .iter()
            .filter(|t| t.complaint.kind() == kind)
            .peekable();
        if of_kind.peek().is_none() {
            continue;
        }
        println!("{}", kind.title());
        for tracked in of_kind {
            let c = &tracked.complaint;
            println!(
                "  #{:<4} {:<22} {}  {}",
                c.id,
                c.status.label(),
                c.created_at.format("%Y-%m-%d %H:%M"),
                c.summary()
            );
            if let Some(a) = &tracked.assignment {
                println!(
                    "         volunteer: {} ({}, {})",
                    a.volunteer.name, a.volunteer.phone, a.volunteer.email
                );
            }
        }
        println!();
    }

    print_companion_entries("Companion requests sent", &companions.sent, true);
    print_companion_entries("Companion requests received", &companions.received, false);
    Ok(())
}

fn handle_volunteer(storage: &Storage, me: &Session, cmd: VolunteerCommand) -> Result<()> {
    me.require_role(Role::Volunteer)?;

    match cmd {
        VolunteerCommand::List { kind, json } => {
            let kind = ComplaintKind::from(kind);
            let complaints = Tracker::new(storage).list_claimable(kind, &me.email)?;
            if json {
                return print_json(&complaints);
            }
            if complaints.is_empty() {
                println!("No {} complaints need attention.", kind.title());
                return Ok(());
            }
            println!("{} complaints", kind.title());
            for c in &complaints {
                println!(
                    "  #{:<4} {:<22} {}  {}",
                    c.id,
                    c.status.label(),
                    c.reporter_name,
                    c.summary()
                );
                if let Some(phone) = c.details.contact_phone() {
                    println!("         contact: {phone}");
                }
            }
        }
        VolunteerCommand::Update { kind, id, status } => {
            let kind = ComplaintKind::from(kind);
            let current = Registry::new(storage).get(kind, id)?;
            if current.status.is_resolved() {
                bail!("{} #{id} is already resolved", kind.title());
            }

            let transition = Lifecycle::new(storage).transition_to_label(kind, id, &status, me)?;
            println!(
                "{} #{}: {} -> {}",
                kind.title(),
                id,
                transition.previous,
                transition.status
            );
            if let Some(assignment) = &transition.assignment {
                println!(
                    "Assigned to {} ({})",
                    assignment.volunteer.name, assignment.volunteer.phone
                );
            }
        }
    }
    Ok(())
}

fn handle_companion(storage: &Storage, me: &Session, cmd: CompanionCommand) -> Result<()> {
    let matcher = Matcher::new(storage);

    match cmd {
        CompanionCommand::Find {
            boarding,
            destination,
            date,
            json,
        } => {
            let candidates = matcher.find_candidates_for(me, &boarding, &destination, date)?;
            if json {
                return print_json(&candidates);
            }
            if candidates.is_empty() {
                println!("No riders are looking for a companion on this route.");
            } else {
                print_candidates(&candidates);
            }
        }
        CompanionCommand::Propose { request_id } => {
            let request = matcher.propose(request_id, me)?;
            println!(
                "Companion request #{} sent for trip #{}",
                request.id, request.request_id
            );
        }
        CompanionCommand::List { json } => {
            let listing = matcher.list_for_user(me)?;
            if json {
                return print_json(&listing);
            }
            print_companion_entries("Sent", &listing.sent, true);
            print_companion_entries("Received", &listing.received, false);
        }
        CompanionCommand::Accept { id } => respond(storage, me, id, Decision::Accept)?,
        CompanionCommand::Reject { id } => respond(storage, me, id, Decision::Reject)?,
    }
    Ok(())
}

/// Only the poster of the originating trip may answer a proposal.
fn respond(storage: &Storage, me: &Session, id: i64, decision: Decision) -> Result<()> {
    let matcher = Matcher::new(storage);
    let request = matcher.get(id)?;
    let trip = Registry::new(storage).get(ComplaintKind::WomensSafety, request.request_id)?;
    if trip.owner_id != me.user_id {
        return Err(Error::not_permitted(format!(
            "companion request #{id} was not made against your trip"
        ))
        .into());
    }

    let answered = matcher.respond(id, decision, &me.phone)?;
    println!(
        "Companion request #{} from {} is now {}",
        answered.id, answered.companion_name, answered.status
    );
    Ok(())
}

fn print_candidates(candidates: &[Complaint]) {
    for c in candidates {
        if let Some(s) = c.safety() {
            println!(
                "  #{:<4} {:<20} {} to {} on {} at {}",
                c.id,
                c.reporter_name,
                s.boarding_station,
                s.destination_station,
                s.travel_date,
                s.time_of_boarding.format("%H:%M")
            );
        }
    }
}

fn print_companion_entries(title: &str, entries: &[CompanionListingEntry], sent: bool) {
    if entries.is_empty() {
        return;
    }
    println!("{title}");
    for entry in entries {
        let r = &entry.request;
        let who = if sent {
            format!("to {} ({})", entry.poster_name, entry.poster_phone)
        } else {
            format!("from {} ({})", r.companion_name, r.companion_phone)
        };
        println!(
            "  #{:<4} {:<9} {} to {} on {} at {}, {}",
            r.id,
            r.status.as_str(),
            entry.boarding_station,
            entry.destination_station,
            entry.travel_date,
            entry.time_of_boarding.format("%H:%M"),
            who
        );
    }
    println!();
}

fn handle_analytics(config: &Config, storage: &Storage, cmd: AnalyticsCommand) -> Result<()> {
    match cmd {
        AnalyticsCommand::Insights { json } => {
            let insights = Analytics::new(storage, config.analytics).insights()?;
            if json {
                return print_json(&insights);
            }

            let rate = |r: Option<f64>| r.map_or_else(|| "n/a".to_string(), |r| format!("{r:.1}%"));
            let hour = |h: Option<u32>| h.map_or_else(|| "n/a".to_string(), |h| format!("{h:02}:00"));

            let lf = &insights.lost_found;
            println!("Lost & Found");
            println!("  Total cases:      {}", lf.total_cases);
            println!("  Resolution rate:  {}", rate(lf.resolution_rate));
            println!("  Peak hour:        {}", hour(lf.peak_hour));
            print_ranking("Common items", &lf.common_items);
            print_weekday_hours(&lf.weekday_hours);
            println!();

            let med = &insights.medical;
            println!("Medical Assistance");
            println!("  Total cases:      {}", med.total_cases);
            println!("  Emergency rate:   {}", rate(med.emergency_rate));
            print_ranking("Common symptoms", &med.common_symptoms);
            print_ranking("High-risk stations", &med.high_risk_stations);
            println!();

            let safety = &insights.safety;
            println!("Women's Safety");
            println!("  Total requests:   {}", safety.total_requests);
            println!("  Peak hour:        {}", hour(safety.risky_hour));
            print_ranking("Common routes", &safety.common_routes);
            print_ranking("Stations", &safety.station_counts);
        }
        AnalyticsCommand::Forecast { days, json } => {
            let mut settings = config.analytics;
            if let Some(days) = days {
                settings.forecast_days = days;
            }
            let forecast = Analytics::new(storage, settings).forecast(Utc::now().date_naive())?;
            if json {
                return print_json(&forecast);
            }

            println!(
                "Based on {:.1} cases/day and a {:.0}% resolution rate:",
                forecast.average_cases,
                forecast.resolution_rate * 100.0
            );
            println!("  {:<12} {:>6} {:>12}", "Date", "Cases", "Resolutions");
            for day in &forecast.days {
                println!(
                    "  {:<12} {:>6} {:>12}",
                    day.date.to_string(),
                    day.predicted_cases,
                    day.predicted_resolutions
                );
            }
        }
    }
    Ok(())
}

fn print_ranking(title: &str, ranking: &[RankedCount]) {
    if ranking.is_empty() {
        return;
    }
    println!("  {title}:");
    for entry in ranking {
        println!("    {:>4}  {}", entry.count, entry.label);
    }
}

fn print_weekday_hours(grid: &WeekdayHourGrid) {
    const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

    if grid.iter().flatten().all(|&n| n == 0) {
        return;
    }
    println!("  By weekday and hour (UTC):");
    for (day, hours) in WEEKDAYS.iter().zip(grid) {
        let busy: Vec<String> = hours
            .iter()
            .enumerate()
            .filter(|&(_, &n)| n > 0)
            .map(|(h, n)| format!("{h:02}h:{n}"))
            .collect();
        if !busy.is_empty() {
            println!("    {day}  {}", busy.join(" "));
        }
    }
}

fn handle_status(config: &Config, storage: &Storage, json: bool) -> Result<()> {
    let stats = storage.stats()?;

    if json {
        let complaints: serde_json::Map<String, serde_json::Value> = stats
            .complaints
            .iter()
            .map(|(kind, n)| (kind.as_str().to_string(), (*n).into()))
            .collect();
        return print_json(&serde_json::json!({
            "database_path": config.database_path(),
            "users": stats.users,
            "complaints": complaints,
            "volunteer_assignments": stats.volunteer_assignments,
            "companion_requests": stats.companion_requests,
            "newest_complaint": stats.newest_complaint,
            "db_size_bytes": stats.db_size_bytes,
        }));
    }

    println!("khoj status");
    println!("-----------");
    println!("Database:      {}", config.database_path().display());
    println!("Size:          {} bytes", stats.db_size_bytes);
    println!("Users:         {}", stats.users);
    for (kind, count) in &stats.complaints {
        println!("{:<15}{}", format!("{}:", kind.title()), count);
    }
    println!("Assignments:   {}", stats.volunteer_assignments);
    println!("Companions:    {}", stats.companion_requests);
    if let Some(newest) = stats.newest_complaint {
        println!("Newest:        {}", newest.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}

fn handle_config(path: Option<std::path::PathBuf>, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(path)?;
            if json {
                print_json(&config)?;
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:        {}", config.database_path().display());
                println!();
                println!("[Validation]");
                let pattern = &config.validation.phone_pattern;
                println!(
                    "  Phone pattern:        {}",
                    if pattern.trim().is_empty() {
                        "(disabled)"
                    } else {
                        pattern
                    }
                );
                println!();
                println!("[Analytics]");
                println!("  Forecast days:        {}", config.analytics.forecast_days);
                println!(
                    "  Rolling window days:  {}",
                    config.analytics.rolling_window_days
                );
                println!("  Top N:                {}", config.analytics.top_n);
            }
        }
        ConfigCommand::Path => {
            println!(
                "{}",
                path.unwrap_or_else(Config::default_config_path).display()
            );
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path.clone()))
                .with_context(|| format!("configuration error in {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

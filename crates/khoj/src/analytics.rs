//! Aggregate insights and a naive resource forecast.
//!
//! Everything here is read-only. Hours are taken from the UTC creation
//! timestamp. Rankings count exact strings, so "Backpack" and "backpack" are
//! different items.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate, Timelike};
use serde::Serialize;
use tracing::debug;

use crate::complaint::{AssistanceType, Status};
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::storage::{self, Storage};

/// How often a value occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCount {
    /// The value.
    pub label: String,
    /// Number of occurrences.
    pub count: usize,
}

/// Lost & found figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LostFoundInsights {
    /// Number of reports.
    pub total_cases: usize,
    /// Percentage of reports that are `Resolved`; `None` without reports.
    pub resolution_rate: Option<f64>,
    /// Hour of day with the most reports.
    pub peak_hour: Option<u32>,
    /// Most frequently reported items.
    pub common_items: Vec<RankedCount>,
    /// Reports by weekday (rows, Monday first) and hour of day (columns).
    pub weekday_hours: WeekdayHourGrid,
}

/// Counts bucketed by weekday and hour of day, both UTC.
pub type WeekdayHourGrid = [[usize; 24]; 7];

/// Medical assistance figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicalInsights {
    /// Number of requests.
    pub total_cases: usize,
    /// Percentage of requests asking for an ambulance; `None` without requests.
    pub emergency_rate: Option<f64>,
    /// Most frequently reported symptoms.
    pub common_symptoms: Vec<RankedCount>,
    /// Stations most often left just before a request.
    pub high_risk_stations: Vec<RankedCount>,
}

/// Women's safety figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyInsights {
    /// Number of requests.
    pub total_requests: usize,
    /// Hour of day with the most requests.
    pub risky_hour: Option<u32>,
    /// Most requested routes, labelled `"<boarding> to <destination>"`.
    pub common_routes: Vec<RankedCount>,
    /// Every station named in a request, boarding and destination counted
    /// together.
    pub station_counts: Vec<RankedCount>,
}

/// Figures across all complaint kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    /// Lost & found.
    pub lost_found: LostFoundInsights,
    /// Medical assistance.
    pub medical: MedicalInsights,
    /// Women's safety.
    pub safety: SafetyInsights,
}

/// Complaints filed on one day, across all kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyVolume {
    /// Day of filing.
    pub date: NaiveDate,
    /// Complaints filed that day.
    pub total_cases: i64,
    /// Of those, how many are now `Resolved`.
    pub resolved_cases: i64,
}

/// Prediction for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastDay {
    /// The day predicted.
    pub date: NaiveDate,
    /// Expected new complaints.
    pub predicted_cases: i64,
    /// Expected resolutions among them.
    pub predicted_resolutions: i64,
}

/// Resource forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    /// Average daily complaints the prediction is based on.
    pub average_cases: f64,
    /// Average share of a day's complaints that got resolved.
    pub resolution_rate: f64,
    /// One entry per forecast day, starting today.
    pub days: Vec<ForecastDay>,
}

/// Computes insights and forecasts from storage.
#[derive(Debug, Clone, Copy)]
pub struct Analytics<'a> {
    storage: &'a Storage,
    config: AnalyticsConfig,
}

impl<'a> Analytics<'a> {
    /// Borrow the analytics engine from storage.
    #[must_use]
    pub fn new(storage: &'a Storage, config: AnalyticsConfig) -> Self {
        Self { storage, config }
    }

    /// Compute insights for every complaint kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insights(&self) -> Result<Insights> {
        let top_n = self.config.top_n;
        let conn = self.storage.conn();

        let mut stmt = conn.prepare("SELECT created_at, status, item_description FROM lost_found")?;
        let lost_found = stmt
            .query_map([], |row| {
                Ok((
                    storage::timestamp_column(row, 0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT assistance_type, symptoms, station_left FROM medical_assistance",
        )?;
        let medical = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT created_at, boarding_station, destination_station FROM womens_safety",
        )?;
        let safety = stmt
            .query_map([], |row| {
                Ok((
                    storage::timestamp_column(row, 0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let resolved = Status::Resolved.label();
        let ambulance = AssistanceType::Ambulance.label();

        let insights = Insights {
            lost_found: LostFoundInsights {
                total_cases: lost_found.len(),
                resolution_rate: percentage(
                    lost_found.iter().filter(|(_, s, _)| s == resolved).count(),
                    lost_found.len(),
                ),
                peak_hour: most_common_hour(lost_found.iter().map(|(at, _, _)| at.hour())),
                common_items: rank(lost_found.iter().map(|(_, _, item)| item.clone()), top_n),
                weekday_hours: weekday_hour_grid(lost_found.iter().map(|(at, _, _)| {
                    (at.weekday().num_days_from_monday(), at.hour())
                })),
            },
            medical: MedicalInsights {
                total_cases: medical.len(),
                emergency_rate: percentage(
                    medical.iter().filter(|(kind, _, _)| kind == ambulance).count(),
                    medical.len(),
                ),
                common_symptoms: rank(medical.iter().map(|(_, s, _)| s.clone()), top_n),
                high_risk_stations: rank(medical.iter().map(|(_, _, st)| st.clone()), 3),
            },
            safety: SafetyInsights {
                total_requests: safety.len(),
                risky_hour: most_common_hour(safety.iter().map(|(at, _, _)| at.hour())),
                common_routes: rank(
                    safety.iter().map(|(_, from, to)| format!("{from} to {to}")),
                    top_n,
                ),
                station_counts: rank(
                    safety
                        .iter()
                        .flat_map(|(_, from, to)| [from.clone(), to.clone()]),
                    usize::MAX,
                ),
            },
        };

        debug!(
            lost_found = insights.lost_found.total_cases,
            medical = insights.medical.total_cases,
            safety = insights.safety.total_requests,
            "Computed insights"
        );
        Ok(insights)
    }

    /// Complaint counts per filing day, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn daily_volumes(&self) -> Result<Vec<DailyVolume>> {
        let mut stmt = self.storage.conn().prepare(
            r"
            SELECT substr(created_at, 1, 10) AS day,
                   COUNT(*),
                   SUM(CASE WHEN status = ?1 THEN 1 ELSE 0 END)
            FROM (
                SELECT created_at, status FROM lost_found
                UNION ALL SELECT created_at, status FROM medical_assistance
                UNION ALL SELECT created_at, status FROM womens_safety
            )
            GROUP BY day
            ORDER BY day
            ",
        )?;
        let volumes = stmt
            .query_map([Status::Resolved.label()], |row| {
                Ok(DailyVolume {
                    date: storage::date_column(row, 0)?,
                    total_cases: row.get(1)?,
                    resolved_cases: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(volumes)
    }

    /// Predict daily complaints and resolutions for the configured number of
    /// days, starting with `today`.
    ///
    /// The daily average is the mean of the last `rolling_window_days` days
    /// that had complaints, or of all of them when there are fewer. The
    /// resolution rate is the mean of each day's resolved share.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn forecast(&self, today: NaiveDate) -> Result<Forecast> {
        let volumes = self.daily_volumes()?;
        let (average_cases, resolution_rate) =
            forecast_basis(&volumes, self.config.rolling_window_days);

        let predicted_cases = round_count(average_cases);
        let predicted_resolutions = round_count(average_cases * resolution_rate);

        let days = (0..self.config.forecast_days)
            .filter_map(|offset| today.checked_add_days(Days::new(u64::from(offset))))
            .map(|date| ForecastDay {
                date,
                predicted_cases,
                predicted_resolutions,
            })
            .collect();

        debug!(
            history_days = volumes.len(),
            average_cases, resolution_rate, "Computed forecast"
        );
        Ok(Forecast {
            average_cases,
            resolution_rate,
            days,
        })
    }
}

/// Average daily cases and resolution rate from the daily history.
#[allow(clippy::cast_precision_loss)]
fn forecast_basis(volumes: &[DailyVolume], window: u32) -> (f64, f64) {
    if volumes.is_empty() {
        return (0.0, 0.0);
    }

    let window = usize::try_from(window).unwrap_or(usize::MAX);
    let recent = if window > 0 && volumes.len() >= window {
        &volumes[volumes.len() - window..]
    } else {
        volumes
    };
    let average_cases =
        recent.iter().map(|v| v.total_cases as f64).sum::<f64>() / recent.len() as f64;

    let resolution_rate = volumes
        .iter()
        .map(|v| v.resolved_cases as f64 / v.total_cases as f64)
        .sum::<f64>()
        / volumes.len() as f64;

    (average_cases, resolution_rate)
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| part as f64 * 100.0 / total as f64)
}

/// Round half to even, saturating at the `i64` range.
#[allow(clippy::cast_possible_truncation)]
fn round_count(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// The most frequent hour; the earliest one wins ties.
fn most_common_hour(hours: impl Iterator<Item = u32>) -> Option<u32> {
    let mut counts = [0usize; 24];
    let mut any = false;
    for hour in hours {
        if let Some(slot) = usize::try_from(hour).ok().and_then(|h| counts.get_mut(h)) {
            *slot += 1;
            any = true;
        }
    }
    if !any {
        return None;
    }
    let best = counts.iter().copied().max().unwrap_or(0);
    counts
        .iter()
        .position(|&n| n == best)
        .and_then(|h| u32::try_from(h).ok())
}

/// Bucket `(weekday from Monday, hour)` pairs; out-of-range pairs are dropped.
fn weekday_hour_grid(slots: impl Iterator<Item = (u32, u32)>) -> WeekdayHourGrid {
    let mut grid = [[0usize; 24]; 7];
    for (day, hour) in slots {
        let cell = usize::try_from(day)
            .ok()
            .zip(usize::try_from(hour).ok())
            .and_then(|(d, h)| grid.get_mut(d)?.get_mut(h));
        if let Some(cell) = cell {
            *cell += 1;
        }
    }
    grid
}

/// The `limit` most frequent values, most frequent first, ties alphabetical.
fn rank(values: impl Iterator<Item = String>, limit: usize) -> Vec<RankedCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut ranked: Vec<RankedCount> = counts
        .into_iter()
        .map(|(label, count)| RankedCount { label, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complaint::tests::{lost_found_details, medical_details, safety_details};
    use crate::complaint::{ComplaintDetails, ComplaintKind};
    use crate::identity::tests::register;
    use crate::identity::{Role, Session};
    use crate::registry::Registry;
    use rusqlite::params;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn config() -> AnalyticsConfig {
        AnalyticsConfig::default()
    }

    fn file_at(
        storage: &Storage,
        reporter: &Session,
        details: ComplaintDetails,
        created_at: &str,
        status: Status,
    ) {
        let kind = details.kind();
        let complaint = Registry::new(storage).create(reporter, details).unwrap();
        storage
            .conn()
            .execute(
                &format!(
                    "UPDATE {} SET created_at = ?1, status = ?2 WHERE id = ?3",
                    kind.as_str()
                ),
                params![created_at, status.label(), complaint.id],
            )
            .unwrap();
    }

    fn volume(day: u32, total: i64, resolved: i64) -> DailyVolume {
        DailyVolume {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            total_cases: total,
            resolved_cases: resolved,
        }
    }

    #[test]
    fn test_insights_empty() {
        let storage = create_test_storage();
        let insights = Analytics::new(&storage, config()).insights().unwrap();

        assert_eq!(insights.lost_found.total_cases, 0);
        assert_eq!(insights.lost_found.resolution_rate, None);
        assert_eq!(insights.lost_found.peak_hour, None);
        assert!(insights.lost_found.common_items.is_empty());
        assert!(insights.lost_found.weekday_hours.iter().flatten().all(|&n| n == 0));
        assert!(insights.safety.station_counts.is_empty());
        assert_eq!(insights.medical.emergency_rate, None);
        assert_eq!(insights.safety.risky_hour, None);
    }

    #[test]
    fn test_lost_found_insights() {
        let storage = create_test_storage();
        let asha = register(&storage, "Asha", "9999999999", Role::User);

        file_at(&storage, &asha, lost_found_details(), "2024-05-01T09:15:00.000000Z", Status::Resolved);
        file_at(&storage, &asha, lost_found_details(), "2024-05-01T09:45:00.000000Z", Status::Pending);
        file_at(&storage, &asha, lost_found_details(), "2024-05-02T18:00:00.000000Z", Status::Searching);
        let mut umbrella = lost_found_details();
        if let ComplaintDetails::LostFound(d) = &mut umbrella {
            d.item_description = "umbrella".to_string();
        }
        file_at(&storage, &asha, umbrella, "2024-05-02T18:30:00.000000Z", Status::Resolved);

        let lf = Analytics::new(&storage, config()).insights().unwrap().lost_found;
        assert_eq!(lf.total_cases, 4);
        assert_eq!(lf.resolution_rate, Some(50.0));
        // 09 and 18 tie; the earlier hour wins.
        assert_eq!(lf.peak_hour, Some(9));
        assert_eq!(
            lf.common_items,
            vec![
                RankedCount {
                    label: "black backpack".to_string(),
                    count: 3
                },
                RankedCount {
                    label: "umbrella".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_medical_and_safety_insights() {
        let storage = create_test_storage();
        let asha = register(&storage, "Asha", "9999999999", Role::User);
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        file_at(&storage, &asha, medical_details(), "2024-05-01T10:00:00.000000Z", Status::Pending);
        let mut volunteer = medical_details();
        if let ComplaintDetails::MedicalAssistance(d) = &mut volunteer {
            d.assistance_type = AssistanceType::Volunteer;
            d.station_left = "Lucknow".to_string();
        }
        file_at(&storage, &asha, volunteer, "2024-05-01T10:00:00.000000Z", Status::Pending);

        file_at(&storage, &asha, safety_details("Delhi", "Agra", date, true), "2024-05-01T22:00:00.000000Z", Status::Pending);
        file_at(&storage, &asha, safety_details("Delhi", "Agra", date, false), "2024-05-01T22:10:00.000000Z", Status::Pending);
        file_at(&storage, &asha, safety_details("Agra", "Delhi", date, false), "2024-05-01T06:00:00.000000Z", Status::Pending);

        let insights = Analytics::new(&storage, config()).insights().unwrap();
        assert_eq!(insights.medical.total_cases, 2);
        assert_eq!(insights.medical.emergency_rate, Some(50.0));
        assert_eq!(insights.medical.common_symptoms[0].count, 2);
        assert_eq!(insights.medical.high_risk_stations.len(), 2);
        assert_eq!(insights.medical.high_risk_stations[0].label, "Kanpur");

        assert_eq!(insights.safety.total_requests, 3);
        assert_eq!(insights.safety.risky_hour, Some(22));
        assert_eq!(insights.safety.common_routes[0].label, "Delhi to Agra");
        assert_eq!(insights.safety.common_routes[0].count, 2);
    }

    #[test]
    fn test_lost_found_weekday_hour_grid() {
        let storage = create_test_storage();
        let asha = register(&storage, "Asha", "9999999999", Role::User);

        // 2024-05-01 is a Wednesday, 2024-05-05 a Sunday.
        file_at(&storage, &asha, lost_found_details(), "2024-05-01T09:15:00.000000Z", Status::Pending);
        file_at(&storage, &asha, lost_found_details(), "2024-05-01T09:45:00.000000Z", Status::Pending);
        file_at(&storage, &asha, lost_found_details(), "2024-05-01T23:59:00.000000Z", Status::Pending);
        file_at(&storage, &asha, lost_found_details(), "2024-05-05T00:10:00.000000Z", Status::Pending);

        let grid = Analytics::new(&storage, config())
            .insights()
            .unwrap()
            .lost_found
            .weekday_hours;
        assert_eq!(grid[2][9], 2);
        assert_eq!(grid[2][23], 1);
        assert_eq!(grid[6][0], 1);
        assert_eq!(grid.iter().flatten().sum::<usize>(), 4);
    }

    #[test]
    fn test_safety_station_counts_combine_both_ends() {
        let storage = create_test_storage();
        let asha = register(&storage, "Asha", "9999999999", Role::User);
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        for (from, to) in [("Delhi", "Agra"), ("Delhi", "Jaipur"), ("Agra", "Mathura")] {
            Registry::new(&storage)
                .create(&asha, safety_details(from, to, date, false))
                .unwrap();
        }

        let analytics = Analytics::new(
            &storage,
            AnalyticsConfig {
                top_n: 1,
                ..AnalyticsConfig::default()
            },
        );
        let safety = analytics.insights().unwrap().safety;
        let counts: Vec<(&str, usize)> = safety
            .station_counts
            .iter()
            .map(|r| (r.label.as_str(), r.count))
            .collect();
        // Not limited by top_n.
        assert_eq!(
            counts,
            vec![("Agra", 2), ("Delhi", 2), ("Jaipur", 1), ("Mathura", 1)]
        );
        assert_eq!(safety.common_routes.len(), 1);
    }

    #[test]
    fn test_top_n_limits_rankings() {
        let storage = create_test_storage();
        let asha = register(&storage, "Asha", "9999999999", Role::User);
        for item in ["a", "b", "c"] {
            let mut details = lost_found_details();
            if let ComplaintDetails::LostFound(d) = &mut details {
                d.item_description = item.to_string();
            }
            Registry::new(&storage).create(&asha, details).unwrap();
        }

        let analytics = Analytics::new(
            &storage,
            AnalyticsConfig {
                top_n: 2,
                ..AnalyticsConfig::default()
            },
        );
        let items = analytics.insights().unwrap().lost_found.common_items;
        let labels: Vec<&str> = items.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn test_daily_volumes_span_all_kinds() {
        let storage = create_test_storage();
        let asha = register(&storage, "Asha", "9999999999", Role::User);
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        file_at(&storage, &asha, lost_found_details(), "2024-05-02T08:00:00.000000Z", Status::Resolved);
        file_at(&storage, &asha, medical_details(), "2024-05-01T08:00:00.000000Z", Status::Pending);
        file_at(&storage, &asha, safety_details("Delhi", "Agra", date, true), "2024-05-01T09:00:00.000000Z", Status::Resolved);

        let volumes = Analytics::new(&storage, config()).daily_volumes().unwrap();
        assert_eq!(volumes, vec![volume(1, 2, 1), volume(2, 1, 1)]);
        assert_eq!(storage.count_complaints(ComplaintKind::LostFound).unwrap(), 1);
    }

    #[test]
    fn test_forecast_empty_history_predicts_zero() {
        let storage = create_test_storage();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let forecast = Analytics::new(&storage, config()).forecast(today).unwrap();

        assert_eq!(forecast.days.len(), 7);
        assert_eq!(forecast.days[0].date, today);
        assert_eq!(forecast.days[6].date, NaiveDate::from_ymd_opt(2024, 6, 7).unwrap());
        assert!(forecast
            .days
            .iter()
            .all(|d| d.predicted_cases == 0 && d.predicted_resolutions == 0));
    }

    #[test]
    fn test_forecast_basis_short_history_uses_overall_mean() {
        let volumes = vec![volume(1, 2, 1), volume(2, 4, 4), volume(3, 3, 0)];
        let (avg, rate) = forecast_basis(&volumes, 7);
        assert!((avg - 3.0).abs() < f64::EPSILON);
        assert!((rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_forecast_basis_uses_rolling_window() {
        let volumes = vec![volume(1, 10, 0), volume(2, 2, 0), volume(3, 4, 0)];
        let (avg, _) = forecast_basis(&volumes, 2);
        assert!((avg - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_forecast_rounds_half_to_even() {
        let storage = create_test_storage();
        let asha = register(&storage, "Asha", "9999999999", Role::User);

        // 3 cases on day one, 2 on day two: mean 2.5 rounds to 2.
        for (at, status) in [
            ("2024-05-01T08:00:00.000000Z", Status::Resolved),
            ("2024-05-01T09:00:00.000000Z", Status::Resolved),
            ("2024-05-01T10:00:00.000000Z", Status::Resolved),
            ("2024-05-02T08:00:00.000000Z", Status::Resolved),
            ("2024-05-02T09:00:00.000000Z", Status::Resolved),
        ] {
            file_at(&storage, &asha, lost_found_details(), at, status);
        }

        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let forecast = Analytics::new(&storage, config()).forecast(today).unwrap();
        assert!((forecast.average_cases - 2.5).abs() < f64::EPSILON);
        assert!((forecast.resolution_rate - 1.0).abs() < f64::EPSILON);
        assert_eq!(forecast.days[0].predicted_cases, 2);
        assert_eq!(forecast.days[0].predicted_resolutions, 2);
    }

    #[test]
    fn test_forecast_days_configurable() {
        let storage = create_test_storage();
        let analytics = Analytics::new(
            &storage,
            AnalyticsConfig {
                forecast_days: 3,
                ..AnalyticsConfig::default()
            },
        );
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(analytics.forecast(today).unwrap().days.len(), 3);
    }

    #[test]
    fn test_rank_and_hour_helpers() {
        assert_eq!(most_common_hour([5, 7, 7, 5].into_iter()), Some(5));
        assert_eq!(most_common_hour(std::iter::empty()), None);
        assert_eq!(most_common_hour([30, 4].into_iter()), Some(4));
        assert_eq!(round_count(2.5), 2);
        assert_eq!(round_count(3.5), 4);

        let grid = weekday_hour_grid([(0, 0), (6, 23), (7, 0), (0, 24)].into_iter());
        assert_eq!(grid[0][0], 1);
        assert_eq!(grid[6][23], 1);
        assert_eq!(grid.iter().flatten().sum::<usize>(), 2);
        assert_eq!(percentage(1, 4), Some(25.0));
        assert_eq!(percentage(0, 0), None);

        let ranked = rank(["x", "y", "y"].into_iter().map(String::from), 5);
        assert_eq!(ranked[0].label, "y");
        assert_eq!(ranked[1].label, "x");
    }
}

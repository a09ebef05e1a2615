mod report;

use crate::campus;
use crate::config::Config;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::Locale;
use crate::progress::{self, attendance::AttendanceBreakdown, member::MemberStats, policy};
use crate::tasks::snapshot_refresher;
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const LATEST_DEBATES: u32 = 4;

#[derive(Debug, Parser)]
#[command(name = "trusty-council", about = "Council attendance, votes and policy progress", version)]
pub struct Cli {
    /// Language for outcome and status labels
    #[arg(long, value_enum, default_value_t = Locale::Th, global = true)]
    pub locale: Locale,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replace the stored documents with a CMS snapshot
    Import { path: PathBuf },
    /// List meetings with their vote items and motions
    Meetings,
    /// Tally and seat chart for one vote item
    Vote {
        meeting_id: String,
        /// Position of the vote item within the meeting, from 0
        #[arg(default_value_t = 0)]
        index: usize,
        /// Seats in the chart, overrides TOTAL_SEATS
        #[arg(long)]
        seats: Option<usize>,
        /// Seat same-outcome votes next to each other
        #[arg(long)]
        cluster: bool,
    },
    /// Attendance, votes and motions of one member
    Member { member_id: String },
    /// Attendance across all meetings
    Attendance,
    /// Policies and their progress
    Policies {
        /// all, central, or a campus name
        #[arg(long, default_value = "all")]
        filter: String,
    },
    /// Candidates grouped by province
    Candidates {
        /// Only this province, e.g. TH-13
        #[arg(long)]
        province: Option<String>,
    },
    /// The latest debates, newest first
    Debates,
    /// Keep re-importing a snapshot on the refresh interval
    Watch { path: PathBuf },
}

pub async fn handle_command(database: Arc<Database>, config: &Config, cli: Cli) -> Result<()> {
    let locale = cli.locale;
    let json = cli.json;

    match cli.command {
        Command::Import { path } => {
            let summary = snapshot_refresher::refresh_once(&database, &path).await?;
            info!("Imported snapshot {}", path.display());
            emit(json, &summary, || report::format_import(&summary))?;
        }
        Command::Meetings => {
            let meetings = database.list_meetings().await?;
            emit(json, &meetings, || report::format_meetings(&meetings, locale))?;
        }
        Command::Vote { meeting_id, index, seats, cluster } => {
            let total_seats = seats.unwrap_or(config.total_seats);
            let (topic, votes) = database.get_vote_records(&meeting_id, index).await?;
            let vote_report = progress::build_vote_report(&topic, &votes, total_seats, cluster)?;
            emit(json, &vote_report, || report::format_vote_report(&vote_report, locale))?;
        }
        Command::Member { member_id } => {
            let attendance = database.get_member_attendance(&member_id).await?;
            let votes = database.get_member_votes(&member_id).await?;
            let motions = database.count_member_motions(&member_id).await?;
            let name = database.member_name(&member_id).await?;

            if name.is_none() && attendance.is_empty() && votes.is_empty() && motions == 0 {
                return Err(Error::NotFound(format!("member {}", member_id)));
            }

            let stats = MemberStats::new(&member_id, &attendance, &votes, motions, config.leave_policy);
            emit(json, &stats, || report::format_member_stats(&stats, name.as_deref(), locale))?;
        }
        Command::Attendance => {
            let breakdown = AttendanceBreakdown::from_statuses(database.get_all_attendance().await?);
            emit(json, &breakdown, || report::format_attendance(&breakdown, locale))?;
        }
        Command::Policies { filter } => {
            let filter: policy::PolicyFilter = filter.parse()?;
            let policies = database.get_policies().await?;
            let matching = policy::filter_policies(&policies, &filter);
            emit(json, &matching, || report::format_policies(&matching))?;
        }
        Command::Candidates { province } => {
            if let Some(id) = province.as_deref() {
                if !campus::is_province_id(id) {
                    return Err(Error::InvalidInput(format!("Not a province id: {}", id)));
                }
            }

            let candidates = database.get_candidates().await?;
            let mut grouped = campus::group_by_province(&candidates);
            if let Some(id) = province.as_deref() {
                grouped.retain(|province_id, _| *province_id == id);
            }
            emit(json, &grouped, || report::format_candidates(&grouped))?;
        }
        Command::Debates => {
            let debates = database.get_latest_debates(LATEST_DEBATES).await?;
            emit(json, &debates, || report::format_debates(&debates))?;
        }
        Command::Watch { path } => {
            let every = Duration::from_secs(config.refresh_interval_secs);
            tokio::select! {
                _ = snapshot_refresher::refresh_snapshot_task(Arc::clone(&database), path, every) => {}
                _ = tokio::signal::ctrl_c() => info!("Received Ctrl-C, stopping refresher"),
            }
        }
    }

    Ok(())
}

fn emit<T, F>(json: bool, value: &T, text: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vote_subcommand() {
        let cli = Cli::try_parse_from(["trusty-council", "--locale", "en", "vote", "meeting-1", "2", "--seats", "50", "--cluster"])
            .unwrap();

        assert_eq!(cli.locale, Locale::En);
        match cli.command {
            Command::Vote { meeting_id, index, seats, cluster } => {
                assert_eq!(meeting_id, "meeting-1");
                assert_eq!(index, 2);
                assert_eq!(seats, Some(50));
                assert!(cluster);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn defaults_to_thai_text() {
        let cli = Cli::try_parse_from(["trusty-council", "attendance"]).unwrap();
        assert_eq!(cli.locale, Locale::Th);
        assert!(!cli.json);
    }

    #[test]
    fn parses_debates_subcommand() {
        let cli = Cli::try_parse_from(["trusty-council", "--json", "debates"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Debates));
    }

    #[tokio::test]
    async fn unknown_policy_campus_is_rejected() {
        let db = Arc::new(Database::new("sqlite::memory:", 1).await.unwrap());
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            total_seats: 100,
            refresh_interval_secs: 60,
            leave_policy: Default::default(),
        };
        let cli = Cli::try_parse_from(["trusty-council", "policies", "--filter", "Chiang Mai"]).unwrap();

        let result = handle_command(db, &config, cli).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn rejects_malformed_province() {
        let db = Arc::new(Database::new("sqlite::memory:", 1).await.unwrap());
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            total_seats: 100,
            refresh_interval_secs: 60,
            leave_policy: Default::default(),
        };
        let cli = Cli::try_parse_from(["trusty-council", "candidates", "--province", "Rangsit"]).unwrap();

        let result = handle_command(db, &config, cli).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn unknown_member_is_not_found() {
        let db = Arc::new(Database::new("sqlite::memory:", 1).await.unwrap());
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            total_seats: 100,
            refresh_interval_secs: 60,
            leave_policy: Default::default(),
        };
        let cli = Cli::try_parse_from(["trusty-council", "member", "ghost"]).unwrap();

        let result = handle_command(db, &config, cli).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}

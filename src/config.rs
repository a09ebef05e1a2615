use std::{env, fmt::Display, str::FromStr};

use log::{info, warn};

use crate::error::{Error, Result};
use crate::progress::attendance::LeavePolicy;
use crate::progress::seats::DEFAULT_TOTAL_SEATS;

const DEFAULT_DATABASE_URL: &str = "sqlite:trusty_council.db";
// Same cadence as the progress page revalidation
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub total_seats: usize,
    pub refresh_interval_secs: u64,
    pub leave_policy: LeavePolicy,
}

impl Config {
    pub fn load() -> Result<Self> {
        let total_seats: usize = try_load("TOTAL_SEATS", &DEFAULT_TOTAL_SEATS.to_string())?;
        if total_seats == 0 {
            return Err(Error::Config("TOTAL_SEATS must be positive".to_string()));
        }

        let refresh_interval_secs: u64 =
            try_load("REFRESH_INTERVAL_SECS", &DEFAULT_REFRESH_INTERVAL_SECS.to_string())?;
        if refresh_interval_secs == 0 {
            return Err(Error::Config("REFRESH_INTERVAL_SECS must be positive".to_string()));
        }

        let leave_counts_as_missed: bool = try_load("LEAVE_COUNTS_AS_MISSED", "true")?;

        Ok(Self {
            database_url: try_load("DATABASE_URL", DEFAULT_DATABASE_URL)?,
            total_seats,
            refresh_interval_secs,
            leave_policy: if leave_counts_as_missed {
                LeavePolicy::CountsAsMissed
            } else {
                LeavePolicy::Excused
            },
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim().parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        Error::Config(format!("{key}={raw}: {e}"))
    })
}

// SPDX-License-Identifier: MIT OR Apache-2.0

use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Permission tier grantable to a user login for a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    View,
    Admin,
    NoAccess,
}

impl AccessLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Admin => "admin",
            Self::NoAccess => "noaccess",
        }
    }

    pub const fn all() -> &'static [AccessLevel] {
        &[Self::View, Self::Admin, Self::NoAccess]
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::other(format!("unknown access level: {s}")))
    }
}

/// Aggregation granularity of a statistics query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    pub const fn all() -> &'static [Period] {
        &[Self::Day, Self::Week, Self::Month, Self::Year]
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|period| period.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::other(format!("unknown period: {s}")))
    }
}

/// The period/date pair every statistics call is scoped by.
///
/// Defaults to the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsQuery {
    pub period: Period,
    pub date: NaiveDate,
}

impl Default for StatsQuery {
    fn default() -> Self {
        Self::today(Period::default())
    }
}

impl StatsQuery {
    pub fn new(period: Period, date: NaiveDate) -> Self {
        Self { period, date }
    }

    /// `period` ending on the local current date.
    pub fn today(period: Period) -> Self {
        Self::new(period, Local::now().date_naive())
    }

    /// The date as piwik expects it, `YYYY-MM-DD`.
    pub fn date_param(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Visit statistics of one site for one period, from `VisitsSummary.get`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub visits: u64,
    pub unique_visitors: u64,
    pub actions: u64,
    pub max_actions_per_visit: u64,
    pub bounces: u64,
    pub total_time_spent_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_level_strings() {
        assert_eq!(AccessLevel::View.to_string(), "view");
        assert_eq!(AccessLevel::Admin.to_string(), "admin");
        assert_eq!(AccessLevel::NoAccess.to_string(), "noaccess");
        assert_eq!("NOACCESS".parse::<AccessLevel>().unwrap(), AccessLevel::NoAccess);
        assert!("owner".parse::<AccessLevel>().is_err());
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("week".parse::<Period>().unwrap(), Period::Week);
        assert_eq!(Period::default(), Period::Day);
        assert!("decade".parse::<Period>().is_err());
    }

    #[test]
    fn test_stats_query_default_is_today() {
        let query = StatsQuery::default();
        assert_eq!(query.period, Period::Day);
        assert_eq!(query.date, Local::now().date_naive());
    }

    #[test]
    fn test_date_param() {
        let query = StatsQuery::new(Period::Year, NaiveDate::from_ymd_opt(2009, 1, 5).unwrap());
        assert_eq!(query.date_param(), "2009-01-05");
    }

    #[test]
    fn test_json_output_skips_empty_fields() {
        let output: JsonOutput<()> = JsonOutput::err("boom");
        assert!(!output.success);
        assert_eq!(output.error.as_deref(), Some("boom"));
        assert!(output.data.is_none());
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::NaiveDateTime;
use libpiwik::{JsonOutput, Result, Site, StatsQuery, StatsSummary};
use serde::Serialize;

mod ansi {
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";

    #[inline]
    pub fn bold(s: &str) -> String {
        format!("{BOLD}{s}{RESET}")
    }
}

#[derive(Debug, Serialize)]
struct SiteView<'a> {
    id: Option<u64>,
    name: &'a str,
    main_url: &'a str,
    created_at: Option<NaiveDateTime>,
}

impl<'a> From<&'a Site> for SiteView<'a> {
    fn from(site: &'a Site) -> Self {
        Self {
            id: site.id(),
            name: site.name(),
            main_url: site.main_url(),
            created_at: site.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Metric<'a> {
    metric: &'a str,
    query: StatsQuery,
    value: u64,
}

#[derive(Debug, Serialize)]
struct Confirmation<'a> {
    action: &'a str,
    confirmed: bool,
}

/// Prints results either as plain text or as a json envelope.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    pub fn site(&self, site: &Site) -> Result<()> {
        if self.json {
            return print_json(&SiteView::from(site));
        }

        println!("{} {}", ansi::bold("id:"), format_id(site.id()));
        println!("{} {}", ansi::bold("name:"), site.name());
        println!("{} {}", ansi::bold("main url:"), site.main_url());
        if let Some(created_at) = site.created_at() {
            println!("{} {created_at} UTC", ansi::bold("created:"));
        }
        Ok(())
    }

    pub fn summary(&self, query: StatsQuery, summary: &StatsSummary) -> Result<()> {
        if self.json {
            return print_json(summary);
        }

        println!(
            "{} {} of {}",
            ansi::bold("period:"),
            query.period,
            query.date_param()
        );
        let rows = [
            ("visits", summary.visits),
            ("unique visitors", summary.unique_visitors),
            ("actions", summary.actions),
            ("max actions/visit", summary.max_actions_per_visit),
            ("bounces", summary.bounces),
            ("time spent (s)", summary.total_time_spent_seconds),
        ];
        for (label, value) in rows {
            println!("  {label:<20}{value:>10}");
        }
        Ok(())
    }

    pub fn metric(&self, metric: &str, query: StatsQuery, value: u64) -> Result<()> {
        if self.json {
            return print_json(&Metric {
                metric,
                query,
                value,
            });
        }

        println!("{value}");
        Ok(())
    }

    pub fn confirmation(&self, action: &str, confirmed: bool) -> Result<()> {
        if self.json {
            return print_json(&Confirmation { action, confirmed });
        }

        if confirmed {
            println!("{} {action}", ansi::bold("success:"));
        } else {
            eprintln!("{} {action} was not confirmed by the server", ansi::bold("warn:"));
        }
        Ok(())
    }

    pub fn error(&self, msg: &str) {
        if self.json {
            let output: JsonOutput<()> = JsonOutput::err(msg);
            match serde_json::to_string(&output) {
                Ok(line) => println!("{line}"),
                Err(_) => eprintln!("error: {msg}"),
            }
        } else {
            eprintln!("{} {msg}", ansi::bold("error:"));
        }
    }

    pub fn hint(&self, msg: &str) {
        if !self.json {
            eprintln!("{} {msg}", ansi::bold("hint:"));
        }
    }
}

fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let output = JsonOutput::ok(data);
    let text = serde_json::to_string_pretty(&output)
        .map_err(|e| libpiwik::Error::other(format!("failed to encode json: {e}")))?;
    println!("{text}");
    Ok(())
}

fn format_id(id: Option<u64>) -> String {
    id.map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string())
}

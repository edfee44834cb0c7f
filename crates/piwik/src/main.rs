// SPDX-License-Identifier: MIT OR Apache-2.0

mod cli_config;
mod exit_code;
mod output;

use std::io::{self, BufRead, Write};

use chrono::{Days, Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use libpiwik::{AccessLevel, ApiClient, Error, Period, Result, Site, StatsQuery};

use cli_config::CliConfig;
use exit_code::ExitCode;
use output::Output;

#[derive(Parser)]
#[command(name = "piwik")]
#[command(about = "manage sites and read visit statistics on a piwik server")]
#[command(version)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(long, global = true, env = "PIWIK_URL", help = "piwik base url")]
    url: Option<String>,

    #[arg(
        long,
        global = true,
        env = "PIWIK_TOKEN",
        hide_env_values = true,
        help = "piwik auth token"
    )]
    token: Option<String>,

    #[arg(long, global = true, help = "request timeout in seconds")]
    timeout: Option<u64>,

    #[arg(long, global = true, help = "verify the server's tls certificate")]
    verify_tls: bool,

    #[arg(long, global = true, help = "output results as json")]
    json: bool,

    #[arg(long, help = "open ~/.piwik in editor")]
    edit_config: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand, about = "create, show, update or delete sites")]
    Site(SiteCommand),
    #[command(subcommand, about = "grant or revoke user access to a site")]
    Access(AccessCommand),
    #[command(about = "show visit statistics for a site")]
    Stats {
        #[arg(help = "site id")]
        id: u64,
        #[arg(
            long,
            value_parser = str::parse::<Period>,
            default_value_t = Period::Day,
            help = "day, week, month or year"
        )]
        period: Period,
        #[arg(long, value_parser = parse_date, help = "YYYY-MM-DD, today or yesterday [default: today]")]
        date: Option<NaiveDate>,
        #[arg(long, value_enum, default_value_t = Metric::Summary)]
        metric: Metric,
    },
}

#[derive(Subcommand)]
enum SiteCommand {
    #[command(about = "show a site")]
    Show {
        #[arg(help = "site id")]
        id: u64,
    },
    #[command(about = "register a new site")]
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        main_url: String,
    },
    #[command(about = "change a site's name or main url")]
    Update {
        #[arg(help = "site id")]
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        main_url: Option<String>,
    },
    #[command(about = "delete a site")]
    Delete {
        #[arg(help = "site id")]
        id: u64,
        #[arg(short = 'y', long, help = "do not ask for confirmation")]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum AccessCommand {
    #[command(about = "give a user access to a site")]
    Grant {
        #[arg(help = "site id")]
        id: u64,
        #[arg(help = "user login")]
        login: String,
        #[arg(
            long,
            value_parser = str::parse::<AccessLevel>,
            default_value_t = AccessLevel::View,
            help = "view, admin or noaccess"
        )]
        level: AccessLevel,
    },
    #[command(about = "remove a user's access to a site")]
    Revoke {
        #[arg(help = "site id")]
        id: u64,
        #[arg(help = "user login")]
        login: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Metric {
    Summary,
    Visits,
    UniqueVisitors,
    Actions,
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    let today = Local::now().date_naive();
    match value {
        "today" => Ok(today),
        "yesterday" => today
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| "date out of range".to_string()),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .map_err(|e| format!("expected YYYY-MM-DD, today or yesterday: {e}")),
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output { json: cli.json };

    let exit_code = run(&cli, output).unwrap_or_else(|e| {
        output.error(&e.to_string());
        if let Some(hint) = hint_for(&e) {
            output.hint(hint);
        }
        ExitCode::FatalError
    });

    std::process::exit(exit_code.into());
}

fn hint_for(error: &Error) -> Option<&'static str> {
    error
        .is_configuration()
        .then_some("run `piwik --edit-config` or pass --url and --token")
}

fn run(cli: &Cli, output: Output) -> Result<ExitCode> {
    if cli.edit_config {
        CliConfig::edit_config()?;
        return Ok(ExitCode::Success);
    }

    let Some(command) = &cli.command else {
        return Err(Error::other("no command given, see `piwik --help`"));
    };

    let config = CliConfig {
        url: cli.url.clone(),
        token: cli.token.clone(),
        timeout_secs: cli.timeout,
        verify_tls: cli.verify_tls,
    };
    let client = config.client()?;

    match command {
        Commands::Site(command) => do_site(command, client, output),
        Commands::Access(command) => do_access(command, client, output),
        Commands::Stats {
            id,
            period,
            date,
            metric,
        } => {
            let query = match date {
                Some(date) => StatsQuery::new(*period, *date),
                None => StatsQuery::today(*period),
            };
            do_stats(*id, query, *metric, client, output)
        }
    }
}

fn do_site(command: &SiteCommand, client: ApiClient, output: Output) -> Result<ExitCode> {
    match command {
        SiteCommand::Show { id } => {
            let site = Site::load(*id, client)?;
            output.site(&site)?;
            Ok(ExitCode::Success)
        }
        SiteCommand::Create { name, main_url } => {
            let mut site = Site::new(name.as_str(), main_url.as_str(), client);
            let created = site.create()?;
            if created {
                output.site(&site)?;
            } else {
                output.confirmation("create", false)?;
            }
            Ok(ExitCode::from_confirmed(created))
        }
        SiteCommand::Update { id, name, main_url } => {
            if name.is_none() && main_url.is_none() {
                return Err(Error::other("nothing to update, pass --name or --main-url"));
            }
            let mut site = Site::load(*id, client)?;
            if let Some(name) = name {
                site.set_name(name.as_str())?;
            }
            if let Some(main_url) = main_url {
                site.set_main_url(main_url.as_str())?;
            }
            let updated = site.update()?;
            output.confirmation("update", updated)?;
            Ok(ExitCode::from_confirmed(updated))
        }
        SiteCommand::Delete { id, yes } => {
            if !*yes && output.json {
                return Err(Error::other("pass --yes to delete in --json mode"));
            }
            let site = Site::load(*id, client)?;
            delete_site(site, *yes, confirm_delete, output)
        }
    }
}

/// Destroys `site` unless the user declines. A declined delete is unconfirmed.
fn delete_site(
    mut site: Site,
    yes: bool,
    confirm: impl FnOnce(&Site) -> bool,
    output: Output,
) -> Result<ExitCode> {
    if !yes && !confirm(&site) {
        eprintln!("aborted");
        return Ok(ExitCode::Unconfirmed);
    }

    let deleted = site.destroy()?;
    output.confirmation("delete", deleted)?;
    Ok(ExitCode::from_confirmed(deleted))
}

fn do_access(command: &AccessCommand, client: ApiClient, output: Output) -> Result<ExitCode> {
    let (id, login, level) = match command {
        AccessCommand::Grant { id, login, level } => (*id, login, *level),
        AccessCommand::Revoke { id, login } => (*id, login, AccessLevel::NoAccess),
    };

    let site = Site::load(id, client)?;
    let confirmed = site.set_access(level, login)?;
    output.confirmation(&format!("set {level} access for {login}"), confirmed)?;

    Ok(ExitCode::from_confirmed(confirmed))
}

fn do_stats(
    id: u64,
    query: StatsQuery,
    metric: Metric,
    client: ApiClient,
    output: Output,
) -> Result<ExitCode> {
    let site = Site::load(id, client)?;

    match metric {
        Metric::Summary => output.summary(query, &site.summary(query)?)?,
        Metric::Visits => output.metric("visits", query, site.visits(query)?)?,
        Metric::UniqueVisitors => {
            output.metric("unique_visitors", query, site.unique_visitors(query)?)?
        }
        Metric::Actions => output.metric("actions", query, site.actions(query)?)?,
    }

    Ok(ExitCode::Success)
}

/// Asks before deleting. Without a terminal on stdin nothing is deleted.
fn confirm_delete(site: &Site) -> bool {
    if !atty::is(atty::Stream::Stdin) {
        eprintln!("refusing to delete without a terminal, pass --yes");
        return false;
    }

    print!(
        "delete site {} ({}, {})? [y/N] ",
        site.id().unwrap_or_default(),
        site.name(),
        site.main_url()
    );
    io::stdout().flush().ok();

    read_confirmation(io::stdin().lock())
}

fn read_confirmation(mut input: impl BufRead) -> bool {
    let mut line = String::new();
    if input.read_line(&mut line).is_err() {
        return false;
    }

    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, sync::Arc};

    use libpiwik::{Credentials, Transport};
    use parking_lot::Mutex;

    use super::*;

    /// Replays canned bodies and records every requested url.
    #[derive(Clone, Default)]
    struct RecordingTransport {
        responses: Arc<Mutex<VecDeque<String>>>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingTransport {
        fn respond(self, body: &str) -> Self {
            self.responses.lock().push_back(body.to_string());
            self
        }
    }

    impl Transport for RecordingTransport {
        fn get(&self, url: &str) -> Result<String> {
            self.requests.lock().push(url.to_string());
            self.responses
                .lock()
                .pop_front()
                .ok_or_else(|| Error::other("no canned response"))
        }
    }

    const SITE_XML: &str = "<result><row><idsite>3</idsite><name>Blog</name>\
        <main_url>http://blog.example.com</main_url>\
        <ts_created>2008-10-28 16:00:00</ts_created></row></result>";

    fn loaded_site(transport: &RecordingTransport) -> Site {
        let client = ApiClient::with_transport(
            Credentials::new("http://stats.example.com", "secret"),
            transport.clone(),
        );
        Site::load(3, client).unwrap()
    }

    fn deletes(transport: &RecordingTransport) -> usize {
        transport
            .requests
            .lock()
            .iter()
            .filter(|url| url.contains("method=SitesManager.deleteSite"))
            .count()
    }

    #[test]
    fn json_delete_without_yes_is_refused() {
        let cli = Cli::try_parse_from([
            "piwik",
            "--url",
            "http://127.0.0.1:9",
            "--token",
            "x",
            "--json",
            "site",
            "delete",
            "3",
        ])
        .unwrap();

        let err = run(&cli, Output { json: true }).unwrap_err();

        assert!(matches!(err, Error::Other(msg) if msg.contains("--yes")));
    }

    #[test]
    fn declined_delete_is_unconfirmed_and_sends_nothing() {
        let transport = RecordingTransport::default().respond(SITE_XML);
        let site = loaded_site(&transport);

        let code = delete_site(site, false, |_| false, Output { json: false }).unwrap();

        assert_eq!(code, ExitCode::Unconfirmed);
        assert_eq!(deletes(&transport), 0);
    }

    #[test]
    fn confirmed_delete_destroys_site() {
        let transport = RecordingTransport::default()
            .respond(SITE_XML)
            .respond(r#"<result><success message="ok" /></result>"#);
        let site = loaded_site(&transport);

        let code = delete_site(site, false, |_| true, Output { json: false }).unwrap();

        assert_eq!(code, ExitCode::Success);
        assert_eq!(deletes(&transport), 1);
    }

    #[test]
    fn yes_skips_the_prompt() {
        let transport = RecordingTransport::default()
            .respond(SITE_XML)
            .respond(r#"<result><success message="ok" /></result>"#);
        let site = loaded_site(&transport);

        let code = delete_site(
            site,
            true,
            |_| panic!("prompt must not run"),
            Output { json: false },
        )
        .unwrap();

        assert_eq!(code, ExitCode::Success);
        assert_eq!(deletes(&transport), 1);
    }

    #[test]
    fn test_read_confirmation() {
        assert!(read_confirmation("y\n".as_bytes()));
        assert!(read_confirmation("YES\n".as_bytes()));
        assert!(!read_confirmation("\n".as_bytes()));
        assert!(!read_confirmation("no\n".as_bytes()));
        assert!(!read_confirmation("".as_bytes()));
    }

    #[test]
    fn configuration_errors_get_the_edit_hint() {
        assert!(hint_for(&Error::Config("bad toml".to_string())).is_some());
        assert!(hint_for(&Error::MissingConfiguration("empty".to_string())).is_some());
        assert!(hint_for(&Error::Api("Invalid token".to_string())).is_none());
    }

    #[test]
    fn test_cli_rejects_unknown_period() {
        assert!(Cli::try_parse_from(["piwik", "stats", "3", "--period", "decade"]).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(parse_date("today").unwrap(), Local::now().date_naive());
        assert!(parse_date("29/02/2024").is_err());
    }

    #[test]
    fn test_cli_parses_stats() {
        let cli = Cli::try_parse_from([
            "piwik", "stats", "3", "--period", "month", "--date", "2024-03-01", "--metric",
            "unique-visitors",
        ])
        .unwrap();
        let Some(Commands::Stats {
            id, period, date, ..
        }) = cli.command
        else {
            panic!("expected stats command");
        };
        assert_eq!(id, 3);
        assert_eq!(period, Period::Month);
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_cli_parses_access_levels() {
        let cli =
            Cli::try_parse_from(["piwik", "access", "grant", "1", "alice", "--level", "noaccess"])
                .unwrap();
        let Some(Commands::Access(AccessCommand::Grant { level, .. })) = cli.command else {
            panic!("expected access grant");
        };
        assert_eq!(level, AccessLevel::NoAccess);
    }
}

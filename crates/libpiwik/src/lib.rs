// SPDX-License-Identifier: MIT OR Apache-2.0

//! # libpiwik
//!
//! A blocking client for the HTTP API of a [Piwik](https://piwik.org) web analytics server.
//!
//! ## Features
//!
//! - **Sites**: create, load, update and delete tracked sites
//! - **Access control**: grant view or admin access to a user login, or revoke it
//! - **Statistics**: visits, unique visitors, actions and a combined summary
//!   for a day, week, month or year
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use libpiwik::{ApiClient, Period, Site, StatsQuery};
//!
//! # fn main() -> libpiwik::Result<()> {
//! // reads ~/.piwik, writing an empty template there on first use
//! let client = ApiClient::resolve(None, None)?;
//!
//! let site = Site::load(1, client)?;
//! let summary = site.summary(StatsQuery::today(Period::Week))?;
//! println!("{}: {} visits this week", site.name(), summary.visits);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Credentials come either from explicit values or from `~/.piwik`:
//!
//! ```toml
//! piwik_url = "http://stats.example.com"
//! auth_token = "secret"
//! ```
//!
//! A missing or incomplete file yields [`Error::MissingConfiguration`]; the
//! caller is expected to ask the user to edit the file and retry.
//!
//! ### Error Handling
//!
//! Every failure is returned through [`Result`]; nothing is retried or
//! swallowed. Remote error payloads become [`Error::Api`], operations that need
//! a saved site fail with [`Error::UnknownSite`] before touching the network,
//! and transport failures surface as [`Error::Network`].

pub mod api;
pub mod config;
pub mod error;
pub mod paths;
pub mod site;
pub mod types;

mod coerce;

pub use api::{ApiClient, HttpTransport, Request, Transport, TransportConfig};
pub use config::{Credentials, ensure_config_file};
pub use error::{Error, Result};
pub use paths::config_path;
pub use site::Site;
pub use types::{AccessLevel, JsonOutput, Period, StatsQuery, StatsSummary};

// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::{
    ApiClient, Error, Result,
    api::Request,
    coerce,
    types::{AccessLevel, StatsQuery, StatsSummary},
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Identity assigned by the remote service. Id and creation time only ever
/// exist together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Persisted {
    id: u64,
    created_at: NaiveDateTime,
}

/// A tracked web property on a piwik server.
///
/// A site is either new (built with [`Site::new`], no id yet) or persisted
/// (returned by [`Site::load`] or after a successful [`Site::create`]).
/// After [`Site::destroy`] the instance is frozen and refuses every mutation.
///
/// # Examples
///
/// ```rust,no_run
/// use libpiwik::{ApiClient, Site};
///
/// # fn main() -> libpiwik::Result<()> {
/// let client = ApiClient::resolve(None, None)?;
/// let mut site = Site::new("Blog", "http://blog.example.com/", client);
/// site.save()?;
/// site.give_view_access_to("alice")?;
/// println!("{} visits today", site.visits(Default::default())?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Site {
    name: String,
    main_url: String,
    persisted: Option<Persisted>,
    frozen: bool,
    client: ApiClient,
}

impl Site {
    /// Builds a new, not yet persisted site. A trailing `/` on `main_url` is dropped.
    pub fn new(name: impl Into<String>, main_url: impl Into<String>, client: ApiClient) -> Self {
        Self {
            name: name.into(),
            main_url: strip_trailing_slash(&main_url.into()),
            persisted: None,
            frozen: false,
            client,
        }
    }

    /// Fetches the site identified by `id`.
    ///
    /// Remote failures, such as an unknown id or missing view access, are
    /// returned as they come from the request engine.
    pub fn load(id: u64, client: ApiClient) -> Result<Self> {
        if id == 0 {
            return Err(Error::validation("expected a site id"));
        }

        let record = client.call(&Request::GetSiteFromId { id_site: id })?;

        let remote_id = coerce::int(record.get("idsite"));
        let id = u64::try_from(remote_id)
            .ok()
            .filter(|&id| id > 0)
            .ok_or_else(|| Error::xml_parse(format!("no site returned for id {id}")))?;
        let created_at = parse_timestamp(record.get("ts_created").unwrap_or_default())?;

        Ok(Self {
            name: record.get("name").unwrap_or_default().to_string(),
            main_url: strip_trailing_slash(record.get("main_url").unwrap_or_default()),
            persisted: Some(Persisted { id, created_at }),
            frozen: false,
            client,
        })
    }

    pub fn id(&self) -> Option<u64> {
        self.persisted.map(|p| p.id)
    }

    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.persisted.map(|p| p.created_at)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn main_url(&self) -> &str {
        &self.main_url
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Returns true if the site does not exist on the server yet.
    pub fn is_new(&self) -> bool {
        self.persisted.is_none()
    }

    /// Returns true once [`Site::destroy`] has been called.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.ensure_mutable()?;
        self.name = name.into();
        Ok(())
    }

    pub fn set_main_url(&mut self, main_url: impl Into<String>) -> Result<()> {
        self.ensure_mutable()?;
        self.main_url = strip_trailing_slash(&main_url.into());
        Ok(())
    }

    /// Calls [`Site::create`] for a new site, [`Site::update`] otherwise.
    pub fn save(&mut self) -> Result<bool> {
        if self.is_new() {
            self.create()
        } else {
            self.update()
        }
    }

    /// Registers this new site with `SitesManager.addSite`.
    ///
    /// Returns true if the server assigned a positive id. The creation time is
    /// taken locally. When the server answers with a non-positive id the site
    /// stays new.
    pub fn create(&mut self) -> Result<bool> {
        self.ensure_mutable()?;
        if !self.is_new() {
            return Err(Error::validation(
                "site already exists in piwik, call `update` instead",
            ));
        }
        self.validate()?;

        let record = self.client.call(&Request::AddSite {
            site_name: self.name.clone(),
            urls: self.main_url.clone(),
        })?;

        let Some(id) = u64::try_from(coerce::int(record.value()))
            .ok()
            .filter(|&id| id > 0)
        else {
            log::warn!(target: "site", "'{}' was not assigned an id", self.name);
            return Ok(false);
        };

        self.persisted = Some(Persisted {
            id,
            created_at: Utc::now().naive_utc(),
        });
        log::debug!(target: "site", "created '{}' with id {id}", self.name);

        Ok(true)
    }

    /// Pushes name and main url with `SitesManager.updateSite`.
    pub fn update(&mut self) -> Result<bool> {
        self.ensure_mutable()?;
        let id_site = self.require_id()?;
        self.validate()?;

        let record = self.client.call(&Request::UpdateSite {
            id_site,
            site_name: self.name.clone(),
            urls: self.main_url.clone(),
        })?;

        Ok(coerce::flag(&record, "success"))
    }

    /// Not supported; always fails with [`Error::NotImplemented`].
    pub fn reload(&mut self) -> Result<()> {
        Err(Error::NotImplemented("reload"))
    }

    /// Deletes the site with `SitesManager.deleteSite`.
    ///
    /// The instance is frozen as soon as the server answers, before its
    /// `success` flag is looked at. A delete the server reports as failed
    /// therefore still leaves this instance frozen. Transport and api errors
    /// leave it untouched.
    pub fn destroy(&mut self) -> Result<bool> {
        self.ensure_mutable()?;
        let id_site = self.require_id()?;

        let record = self.client.call(&Request::DeleteSite { id_site })?;
        self.frozen = true;

        let success = coerce::flag(&record, "success");
        if success {
            log::debug!(target: "site", "deleted site {id_site}");
        } else {
            log::warn!(target: "site", "delete of site {id_site} not confirmed, instance frozen anyway");
        }

        Ok(success)
    }

    pub fn give_view_access_to(&self, login: &str) -> Result<bool> {
        self.set_access(AccessLevel::View, login)
    }

    pub fn give_admin_access_to(&self, login: &str) -> Result<bool> {
        self.set_access(AccessLevel::Admin, login)
    }

    pub fn give_no_access_to(&self, login: &str) -> Result<bool> {
        self.set_access(AccessLevel::NoAccess, login)
    }

    /// Alias of [`Site::give_no_access_to`].
    pub fn remove_access_from(&self, login: &str) -> Result<bool> {
        self.give_no_access_to(login)
    }

    /// Sets `login`'s access to this site with `UsersManager.setUserAccess`.
    pub fn set_access(&self, access: AccessLevel, login: &str) -> Result<bool> {
        let id_sites = self.require_id()?;

        let record = self.client.call(&Request::SetUserAccess {
            id_sites,
            access,
            user_login: login.to_string(),
        })?;

        Ok(coerce::flag(&record, "success"))
    }

    /// Visit statistics for the period, from `VisitsSummary.get`.
    pub fn summary(&self, query: StatsQuery) -> Result<StatsSummary> {
        let id_site = self.require_id()?;
        let record = self.client.call(&Request::VisitsSummary { id_site, query })?;

        Ok(StatsSummary {
            visits: coerce::count(record.get("nb_visits")),
            unique_visitors: coerce::count(record.get("nb_uniq_visitors")),
            actions: coerce::count(record.get("nb_actions")),
            max_actions_per_visit: coerce::count(record.get("max_actions")),
            bounces: coerce::count(record.get("bounce_count")),
            total_time_spent_seconds: coerce::count(record.get("sum_visit_length")),
        })
    }

    pub fn visits(&self, query: StatsQuery) -> Result<u64> {
        let id_site = self.require_id()?;
        self.scalar(&Request::Visits { id_site, query })
    }

    pub fn unique_visitors(&self, query: StatsQuery) -> Result<u64> {
        let id_site = self.require_id()?;
        self.scalar(&Request::UniqueVisitors { id_site, query })
    }

    /// Number of actions (pageviews) for the period.
    pub fn actions(&self, query: StatsQuery) -> Result<u64> {
        let id_site = self.require_id()?;
        self.scalar(&Request::Actions { id_site, query })
    }

    /// Alias of [`Site::actions`].
    pub fn pageviews(&self, query: StatsQuery) -> Result<u64> {
        self.actions(query)
    }

    fn scalar(&self, request: &Request) -> Result<u64> {
        let record = self.client.call(request)?;
        Ok(coerce::count(record.value()))
    }

    fn require_id(&self) -> Result<u64> {
        self.id().ok_or(Error::UnknownSite)
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.frozen {
            return Err(Error::Frozen);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("name can not be blank"));
        }
        if self.main_url.trim().is_empty() {
            return Err(Error::validation("main url can not be blank"));
        }
        Ok(())
    }
}

fn strip_trailing_slash(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_string()
}

/// Parses piwik's `ts_created`, normally `YYYY-MM-DD HH:MM:SS` in UTC.
fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();

    if let Ok(ts) = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
        return Ok(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.naive_utc());
    }
    if let Some(ts) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(ts);
    }

    Err(Error::timestamp(format!("unrecognized ts_created '{value}'")))
}

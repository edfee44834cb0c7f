// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::types::{AccessLevel, StatsQuery};

/// One remote piwik API method together with its typed parameters.
///
/// [`Request::params`] yields parameters in declaration order so that built
/// urls are reproducible; the remote API itself does not care about order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `SitesManager.getSiteFromId (idSite)`
    GetSiteFromId { id_site: u64 },
    /// `SitesManager.addSite (siteName, urls)`
    AddSite { site_name: String, urls: String },
    /// `SitesManager.updateSite (idSite, siteName, urls)`
    UpdateSite {
        id_site: u64,
        site_name: String,
        urls: String,
    },
    /// `SitesManager.deleteSite (idSite)`
    DeleteSite { id_site: u64 },
    /// `UsersManager.setUserAccess (idSites, access, userLogin)`
    SetUserAccess {
        id_sites: u64,
        access: AccessLevel,
        user_login: String,
    },
    /// `VisitsSummary.get (idSite, period, date)`
    VisitsSummary { id_site: u64, query: StatsQuery },
    /// `VisitsSummary.getVisits (idSite, period, date)`
    Visits { id_site: u64, query: StatsQuery },
    /// `VisitsSummary.getUniqueVisitors (idSite, period, date)`
    UniqueVisitors { id_site: u64, query: StatsQuery },
    /// `VisitsSummary.getActions (idSite, period, date)`
    Actions { id_site: u64, query: StatsQuery },
}

impl Request {
    pub const fn method(&self) -> &'static str {
        match self {
            Self::GetSiteFromId { .. } => "SitesManager.getSiteFromId",
            Self::AddSite { .. } => "SitesManager.addSite",
            Self::UpdateSite { .. } => "SitesManager.updateSite",
            Self::DeleteSite { .. } => "SitesManager.deleteSite",
            Self::SetUserAccess { .. } => "UsersManager.setUserAccess",
            Self::VisitsSummary { .. } => "VisitsSummary.get",
            Self::Visits { .. } => "VisitsSummary.getVisits",
            Self::UniqueVisitors { .. } => "VisitsSummary.getUniqueVisitors",
            Self::Actions { .. } => "VisitsSummary.getActions",
        }
    }

    /// Stringified parameters, not yet url-encoded.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::GetSiteFromId { id_site } | Self::DeleteSite { id_site } => {
                vec![("idSite", id_site.to_string())]
            }
            Self::AddSite { site_name, urls } => {
                vec![("siteName", site_name.clone()), ("urls", urls.clone())]
            }
            Self::UpdateSite {
                id_site,
                site_name,
                urls,
            } => vec![
                ("idSite", id_site.to_string()),
                ("siteName", site_name.clone()),
                ("urls", urls.clone()),
            ],
            Self::SetUserAccess {
                id_sites,
                access,
                user_login,
            } => vec![
                ("idSites", id_sites.to_string()),
                ("access", access.to_string()),
                ("userLogin", user_login.clone()),
            ],
            Self::VisitsSummary { id_site, query }
            | Self::Visits { id_site, query }
            | Self::UniqueVisitors { id_site, query }
            | Self::Actions { id_site, query } => vec![
                ("idSite", id_site.to_string()),
                ("period", query.period.to_string()),
                ("date", query.date_param()),
            ],
        }
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use crate::{Credentials, Error, Result};

use super::{
    config::TransportConfig,
    request::Request,
    transport::{HttpTransport, Transport},
    xml::{self, Record},
};

/// Request engine for one piwik install.
///
/// Turns a typed [`Request`] into a signed GET url, performs it and maps
/// `<error message="...">` payloads to [`Error::Api`]. Cloning is cheap; the
/// transport is shared.
#[derive(Clone)]
pub struct ApiClient {
    credentials: Credentials,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client using the default HTTP transport.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, &TransportConfig::default())
    }

    pub fn with_config(credentials: Credentials, config: &TransportConfig) -> Result<Self> {
        Ok(Self::with_transport(
            credentials,
            HttpTransport::with_config(config)?,
        ))
    }

    pub fn with_transport(credentials: Credentials, transport: impl Transport + 'static) -> Self {
        Self {
            credentials,
            transport: Arc::new(transport),
        }
    }

    /// Uses the explicit url and token when both are given, otherwise `~/.piwik`.
    pub fn resolve(base_url: Option<&str>, auth_token: Option<&str>) -> Result<Self> {
        Self::new(Credentials::resolve(base_url, auth_token)?)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Builds the signed url for `request`.
    ///
    /// Fails with [`Error::MissingConfiguration`] if either credential is empty.
    pub fn request_url(&self, request: &Request) -> Result<String> {
        if !self.credentials.is_complete() {
            return Err(Error::missing_configuration(
                "please edit ~/.piwik to include your piwik_url and auth_token",
            ));
        }

        let mut url = format!(
            "{}/?module=API&format=xml&method={}&token_auth={}",
            self.credentials.base_url(),
            request.method(),
            self.credentials.auth_token()
        );
        for (key, value) in request.params() {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(&value));
        }

        Ok(url)
    }

    /// Performs `request` and returns the raw xml body.
    pub fn invoke(&self, request: &Request) -> Result<String> {
        let url = self.request_url(request)?;
        log::debug!(target: "api", "calling {}", request.method());

        let body = self.transport.get(&url)?;

        if let Some(message) = xml::error_message(&body)? {
            log::debug!(target: "api", "{} failed: {message}", request.method());
            return Err(Error::api(message));
        }

        Ok(body)
    }

    /// Performs `request` and flattens the answer.
    pub fn call(&self, request: &Request) -> Result<Record> {
        xml::flatten(&self.invoke(request)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::testing::StubTransport;

    fn client(transport: &StubTransport) -> ApiClient {
        ApiClient::with_transport(
            Credentials::new("http://stats.example.com", "secret"),
            transport.clone(),
        )
    }

    #[test]
    fn test_request_url_layout() {
        let client = client(&StubTransport::new());
        let url = client
            .request_url(&Request::AddSite {
                site_name: "My Blog".to_string(),
                urls: "http://blog.example.com".to_string(),
            })
            .unwrap();
        assert_eq!(
            url,
            "http://stats.example.com/?module=API&format=xml&method=SitesManager.addSite\
             &token_auth=secret&siteName=My%20Blog&urls=http%3A%2F%2Fblog.example.com"
        );
    }

    #[test]
    fn test_missing_credentials_skip_network() {
        let transport = StubTransport::new().respond("<result>1</result>");
        let client = ApiClient::with_transport(Credentials::new("", "secret"), transport.clone());

        let err = client.invoke(&Request::DeleteSite { id_site: 1 }).unwrap_err();

        assert!(matches!(err, Error::MissingConfiguration(_)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_empty_token_is_missing_configuration() {
        let transport = StubTransport::new();
        let client =
            ApiClient::with_transport(Credentials::new("http://stats.example.com", ""), transport);
        let err = client.request_url(&Request::GetSiteFromId { id_site: 1 }).unwrap_err();
        assert!(matches!(err, Error::MissingConfiguration(_)));
    }

    #[test]
    fn test_error_payload_becomes_api_error() {
        let transport = StubTransport::new()
            .respond(r#"<?xml version="1.0" ?><result><error message="Invalid token" /></result>"#);
        let client = client(&transport);

        let err = client.invoke(&Request::GetSiteFromId { id_site: 1 }).unwrap_err();

        assert!(matches!(err, Error::Api(msg) if msg == "Invalid token"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_success_body_returned_raw() {
        let body = "<?xml version=\"1.0\" ?>\n<result>5</result>";
        let transport = StubTransport::new().respond(body);
        let client = client(&transport);

        assert_eq!(client.invoke(&Request::DeleteSite { id_site: 5 }).unwrap(), body);
        assert_eq!(
            transport.last_request().unwrap(),
            "http://stats.example.com/?module=API&format=xml&method=SitesManager.deleteSite\
             &token_auth=secret&idSite=5"
        );
    }

    #[test]
    fn test_call_flattens() {
        let transport = StubTransport::new().respond("<result>120</result>");
        let client = client(&transport);
        let record = client
            .call(&Request::Visits {
                id_site: 1,
                query: Default::default(),
            })
            .unwrap();
        assert_eq!(record.value(), Some("120"));
    }
}

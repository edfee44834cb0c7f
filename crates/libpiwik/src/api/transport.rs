// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::Result;

use super::config::{TransportConfig, USER_AGENT};

/// A blocking HTTP GET returning the response body.
///
/// [`HttpTransport`] is the real implementation; the seam exists so the
/// request engine can run against canned responses.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<String>;
}

/// reqwest-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_config(&TransportConfig::default())
    }

    pub fn with_config(config: &TransportConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.text()?)
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub const USER_AGENT: &str = concat!("piwik/", env!("CARGO_PKG_VERSION"));

/// Settings for the HTTP transport.
///
/// Certificate verification is off by default: piwik installs are commonly
/// served with self-signed certificates. This is a known weakness; set
/// `verify_tls` to opt back in.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub verify_tls: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportConfig {
    pub const fn new() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
            timeout: REQUEST_TIMEOUT,
            verify_tls: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }
}

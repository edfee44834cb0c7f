// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{path::Path, time::Duration};

use libpiwik::{ApiClient, Credentials, Error, Result, TransportConfig};

/// Connection settings gathered from flags and environment.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
    pub verify_tls: bool,
}

impl CliConfig {
    /// Builds a client from explicit credentials, falling back to `~/.piwik`.
    pub fn client(&self) -> Result<ApiClient> {
        let credentials = Credentials::resolve(self.url.as_deref(), self.token.as_deref())?;

        let mut transport = TransportConfig::new().with_verify_tls(self.verify_tls);
        if let Some(secs) = self.timeout_secs {
            transport = transport.with_timeout(Duration::from_secs(secs));
        }

        ApiClient::with_config(credentials, &transport)
    }

    /// Creates `~/.piwik` from the template if needed and opens it in `$EDITOR`.
    pub fn edit_config() -> Result<()> {
        let path = libpiwik::config_path();
        libpiwik::ensure_config_file(&path)?;
        open_in_editor(&path)
    }
}

fn open_in_editor(path: &Path) -> Result<()> {
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "nano".to_string());
    std::process::Command::new(&editor)
        .arg(path)
        .status()
        .map_err(|e| Error::other(format!("failed to open editor {editor}: {e}")))?;
    Ok(())
}

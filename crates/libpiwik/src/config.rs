// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{fs, path::Path};

use serde::Deserialize;

use crate::{Error, Result, paths};

const CONFIG_TEMPLATE: &str = r#"# .piwik
#
# Please fill in fields like this:
#
#  piwik_url = "http://your.piwik.site"
#  auth_token = "secret"
#
piwik_url = ""
auth_token = ""
"#;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    piwik_url: Option<String>,
    auth_token: Option<String>,
}

/// Base URL and auth token of a piwik install.
///
/// Credentials are immutable once built. Every [`Site`](crate::Site) owns its
/// own copy through its [`ApiClient`](crate::ApiClient); nothing is cached
/// process-wide.
///
/// # Examples
///
/// ```rust
/// use libpiwik::Credentials;
///
/// let credentials = Credentials::new("http://stats.example.com/", "secret");
/// assert_eq!(credentials.base_url(), "http://stats.example.com");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    base_url: String,
    auth_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Builds credentials from explicit values. A trailing `/` on the url is dropped.
    ///
    /// Empty values are accepted here; the request engine rejects them with
    /// [`Error::MissingConfiguration`] before any network call.
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.into(),
        }
    }

    /// Uses the explicit pair when both are given, otherwise reads `~/.piwik`.
    pub fn resolve(base_url: Option<&str>, auth_token: Option<&str>) -> Result<Self> {
        Self::resolve_from(&paths::config_path(), base_url, auth_token)
    }

    /// Like [`Credentials::resolve`], falling back to the file at `path`.
    ///
    /// A half-given pair is ignored entirely; both values then come from the file.
    pub fn resolve_from(
        path: &Path,
        base_url: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<Self> {
        match (base_url, auth_token) {
            (Some(url), Some(token)) => Ok(Self::new(url, token)),
            _ => Self::load_from(path),
        }
    }

    /// Loads credentials from the default per-user config file.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads credentials from `path`, writing an empty template there first if
    /// the file does not exist.
    ///
    /// Fails with [`Error::MissingConfiguration`] when either field is empty,
    /// which is always the case right after the template has been written.
    pub fn load_from(path: &Path) -> Result<Self> {
        let created = ensure_config_file(path)?;

        let content = fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "failed to parse config file {} (expected TOML such as \
                 `piwik_url = \"http://your.piwik.site\"` and `auth_token = \"secret\"`): {e}",
                path.display()
            ))
        })?;

        let url = file.piwik_url.filter(|v| !v.trim().is_empty());
        let token = file.auth_token.filter(|v| !v.trim().is_empty());

        match (url, token) {
            (Some(url), Some(token)) => Ok(Self::new(url.trim(), token.trim())),
            _ if created => Err(Error::missing_configuration(format!(
                "wrote a template to {}, fill in your piwik_url and auth_token",
                path.display()
            ))),
            _ => Err(Error::missing_configuration(format!(
                "please edit {} to include your piwik_url and auth_token",
                path.display()
            ))),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    /// Returns true when both fields are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.base_url.is_empty() && !self.auth_token.is_empty()
    }
}

/// Writes the commented template to `path` unless a file already exists there.
///
/// Returns `true` if the template was written.
pub fn ensure_config_file(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, CONFIG_TEMPLATE)?;
    log::info!(target: "config", "wrote empty template to {}", path.display());

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_strips_trailing_slash() {
        let credentials = Credentials::new("http://stats.example.com/", "secret");
        assert_eq!(credentials.base_url(), "http://stats.example.com");
        assert_eq!(credentials.auth_token(), "secret");
        assert!(credentials.is_complete());
    }

    #[test]
    fn test_debug_hides_token() {
        let credentials = Credentials::new("http://stats.example.com", "secret");
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("stats.example.com"));
    }

    #[test]
    fn test_resolve_prefers_explicit_values() {
        let credentials = Credentials::resolve(Some("http://a.example"), Some("tok")).unwrap();
        assert_eq!(credentials, Credentials::new("http://a.example", "tok"));
    }

    fn write_config(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join(".piwik");
        fs::write(
            &path,
            "piwik_url = \"http://file.example\"\nauth_token = \"file-token\"\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn resolve_with_only_url_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir);

        let credentials = Credentials::resolve_from(&path, Some("http://a.example"), None).unwrap();

        assert_eq!(credentials, Credentials::new("http://file.example", "file-token"));
    }

    #[test]
    fn resolve_with_only_token_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir);

        let credentials = Credentials::resolve_from(&path, None, Some("tok")).unwrap();

        assert_eq!(credentials, Credentials::new("http://file.example", "file-token"));
    }

    #[test]
    fn resolve_with_both_values_skips_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".piwik");

        let credentials =
            Credentials::resolve_from(&path, Some("http://a.example/"), Some("tok")).unwrap();

        assert_eq!(credentials, Credentials::new("http://a.example", "tok"));
        assert!(!path.exists());
    }

    #[test]
    fn missing_file_writes_template_and_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".piwik");

        let err = Credentials::load_from(&path).unwrap_err();

        assert!(matches!(err, Error::MissingConfiguration(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), CONFIG_TEMPLATE);
    }

    #[test]
    fn template_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".piwik");
        fs::write(&path, "piwik_url = \"http://x\"\n").unwrap();

        assert!(!ensure_config_file(&path).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "piwik_url = \"http://x\"\n");
    }

    #[test]
    fn filled_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".piwik");
        fs::write(
            &path,
            "# comment\npiwik_url = \"http://stats.example.com/\"\nauth_token = \"abc123\"\n",
        )
        .unwrap();

        let credentials = Credentials::load_from(&path).unwrap();

        assert_eq!(credentials.base_url(), "http://stats.example.com");
        assert_eq!(credentials.auth_token(), "abc123");
    }

    #[test]
    fn blank_token_is_missing_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".piwik");
        fs::write(&path, "piwik_url = \"http://x\"\nauth_token = \"  \"\n").unwrap();

        let err = Credentials::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::MissingConfiguration(_)));
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".piwik");
        fs::write(&path, "piwik_url: http://x\n").unwrap();

        let err = Credentials::load_from(&path).unwrap_err();
        assert!(matches!(&err, Error::Config(msg) if msg.contains("piwik_url = \"")));
    }
}

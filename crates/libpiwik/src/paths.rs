// SPDX-License-Identifier: MIT OR Apache-2.0

use std::path::PathBuf;

pub(crate) const CONFIG_FILE_NAME: &str = ".piwik";

/// gets the user's home directory, checking the same variables on every platform
fn user_home() -> PathBuf {
    ["HOME", "USERPROFILE", "HOMEPATH"]
        .iter()
        .find_map(|var| std::env::var_os(var).filter(|v| !v.is_empty()))
        .map(PathBuf::from)
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default())
}

/// Location of the per-user credentials file (`~/.piwik`).
pub fn config_path() -> PathBuf {
    user_home().join(CONFIG_FILE_NAME)
}

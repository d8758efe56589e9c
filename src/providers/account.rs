use std::{fs, path::PathBuf};

use serde::Deserialize;
use tracing::debug;

/// The signed-in identity recorded by the host application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AccountInfo {
    #[serde(rename = "emailAddress")]
    pub email: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

pub trait AccountCollector {
    fn collect_account(&self) -> Option<AccountInfo>;
}

/// Reads `oauthAccount` from `~/.claude.json`.
#[derive(Debug, Clone, Default)]
pub struct HomeAccountCollector {
    /// Overrides the home directory lookup.
    pub home: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HostConfig {
    #[serde(rename = "oauthAccount")]
    oauth_account: Option<AccountInfo>,
}

impl AccountCollector for HomeAccountCollector {
    fn collect_account(&self) -> Option<AccountInfo> {
        let home = self.home.clone().or_else(dirs::home_dir)?;
        let path = home.join(".claude.json");
        let contents = fs::read_to_string(&path).ok()?;
        let config: HostConfig = serde_json::from_str(&contents)
            .map_err(|err| debug!(path = %path.display(), %err, "account file unparsable"))
            .ok()?;
        config
            .oauth_account
            .filter(|account| !account.email.is_empty())
    }
}

#[derive(Debug, Default)]
pub struct StubAccountCollector {
    pub account: Option<AccountInfo>,
}

impl AccountCollector for StubAccountCollector {
    fn collect_account(&self) -> Option<AccountInfo> {
        self.account.clone()
    }
}

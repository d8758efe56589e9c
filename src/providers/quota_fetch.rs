//! OAuth credential lookup and the usage API call behind the quota cache.

use std::{fs, path::PathBuf, time::Duration};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::quota::QuotaInfo;

const USAGE_API_URL: &str = "https://api.anthropic.com/api/oauth/usage";
const USAGE_API_TIMEOUT: Duration = Duration::from_secs(3);
const OAUTH_BETA: &str = "oauth-2025-04-20";

// ── Credential Reading ──────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct Credentials {
    #[serde(rename = "claudeAiOauth")]
    claude_ai_oauth: Option<OAuthCredentials>,
}

#[derive(Debug, Default, Deserialize)]
struct OAuthCredentials {
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
}

impl Credentials {
    fn into_token(self) -> Option<String> {
        self.claude_ai_oauth?
            .access_token
            .filter(|token| !token.is_empty())
    }
}

/// Keychain first on macOS, then `~/.claude/.credentials.json`.
pub fn read_access_token() -> Option<String> {
    #[cfg(target_os = "macos")]
    {
        if let Some(token) = keychain_token() {
            return Some(token);
        }
    }

    file_token()
}

#[cfg(target_os = "macos")]
fn keychain_token() -> Option<String> {
    let output = std::process::Command::new("/usr/bin/security")
        .args([
            "find-generic-password",
            "-s",
            "Claude Code-credentials",
            "-w",
        ])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let json_str = String::from_utf8(output.stdout).ok()?;
    serde_json::from_str::<Credentials>(json_str.trim())
        .ok()?
        .into_token()
}

fn credentials_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".claude").join(".credentials.json"))
}

fn file_token() -> Option<String> {
    let path = credentials_path()?;
    let contents = fs::read_to_string(&path).ok()?;
    serde_json::from_str::<Credentials>(&contents)
        .map_err(|err| debug!(%err, "credentials file unreadable"))
        .ok()?
        .into_token()
}

// ── API Call ────────────────────────────────────────────────────────

pub fn fetch_quota(access_token: &str) -> Option<QuotaInfo> {
    let client = reqwest::blocking::Client::builder()
        .timeout(USAGE_API_TIMEOUT)
        .user_agent(concat!("howl/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| debug!(%err, "http client build failed"))
        .ok()?;

    let response = client
        .get(USAGE_API_URL)
        .bearer_auth(access_token)
        .header("anthropic-beta", OAUTH_BETA)
        .send()
        .map_err(|err| debug!(%err, "usage request failed"))
        .ok()?;

    if !response.status().is_success() {
        debug!(status = %response.status(), "usage request rejected");
        return None;
    }

    let usage: UsageApiResponse = response
        .json()
        .map_err(|err| debug!(%err, "usage response unparsable"))
        .ok()?;
    Some(usage.into_quota())
}

// ── API Response Parsing ────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UsageApiResponse {
    five_hour: UsagePeriod,
    seven_day: UsagePeriod,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UsagePeriod {
    utilization: f64,
    resets_at: Option<String>,
}

impl UsagePeriod {
    fn remaining(&self) -> f64 {
        100.0 - self.utilization
    }

    fn reset_time(&self) -> Option<DateTime<Utc>> {
        parse_reset(self.resets_at.as_deref()?)
    }
}

impl UsageApiResponse {
    fn into_quota(self) -> QuotaInfo {
        QuotaInfo {
            remaining_5h: self.five_hour.remaining(),
            remaining_7d: self.seven_day.remaining(),
            resets_at_5h: self.five_hour.reset_time(),
            resets_at_7d: self.seven_day.reset_time(),
        }
    }
}

fn parse_reset(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn credentials_file_yields_token() {
        let json = r#"{
            "claudeAiOauth": {
                "accessToken": "sk-ant-oat01-test",
                "refreshToken": "rt-test",
                "subscriptionType": "max"
            }
        }"#;
        let creds: Credentials = serde_json::from_str(json).unwrap();
        assert_eq!(creds.into_token().as_deref(), Some("sk-ant-oat01-test"));
    }

    #[test]
    fn empty_token_is_absent() {
        let creds: Credentials =
            serde_json::from_str(r#"{"claudeAiOauth": {"accessToken": ""}}"#).unwrap();
        assert!(creds.into_token().is_none());
        let creds: Credentials = serde_json::from_str("{}").unwrap();
        assert!(creds.into_token().is_none());
    }

    #[test]
    fn usage_response_converts_to_remaining() {
        let json = r#"{
            "five_hour": {"utilization": 25.0, "resets_at": "2025-11-04T04:59:59Z"},
            "seven_day": {"utilization": 35.5, "resets_at": null},
            "seven_day_opus": {"utilization": 0.0}
        }"#;
        let response: UsageApiResponse = serde_json::from_str(json).unwrap();
        let quota = response.into_quota();
        assert_eq!(quota.remaining_5h, 75.0);
        assert_eq!(quota.remaining_7d, 64.5);
        assert_eq!(
            quota.resets_at_5h,
            Some(Utc.with_ymd_and_hms(2025, 11, 4, 4, 59, 59).unwrap())
        );
        assert_eq!(quota.resets_at_7d, None);
    }

    #[test]
    fn reset_times_accept_offsets_and_fractions() {
        let z = parse_reset("2025-11-04T04:59:59Z");
        assert_eq!(parse_reset("2025-11-04T04:59:59+00:00"), z);
        assert_eq!(
            parse_reset("2025-11-03T20:59:59-08:00"),
            z,
            "offsets normalize to UTC"
        );
        assert!(parse_reset("2025-11-04T04:59:59.123456Z").is_some());
        assert!(parse_reset("not-a-date").is_none());
        assert!(parse_reset("").is_none());
    }
}

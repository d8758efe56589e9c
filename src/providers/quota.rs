use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

use super::quota_fetch::{fetch_quota, read_access_token};

// ── Quota Info ──────────────────────────────────────────────────────

/// Remaining subscription allowance for the rolling 5-hour and 7-day windows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuotaInfo {
    pub remaining_5h: f64,
    pub remaining_7d: f64,
    pub resets_at_5h: Option<DateTime<Utc>>,
    pub resets_at_7d: Option<DateTime<Utc>>,
}

// ── Quota Collector Trait ───────────────────────────────────────────

pub trait QuotaCollector {
    fn collect_quota(&self, session_id: &str) -> Option<QuotaInfo>;
}

// ── Cached API Collector (production) ───────────────────────────────

pub const QUOTA_CACHE_TTL: Duration = Duration::from_secs(60);

/// Serves quota from a per-session cache file, refreshing it from the
/// usage API once the entry is older than the TTL.
#[derive(Debug, Clone)]
pub struct CachedApiQuotaCollector {
    pub cache_root: PathBuf,
    pub ttl: Duration,
}

impl Default for CachedApiQuotaCollector {
    fn default() -> Self {
        Self {
            cache_root: std::env::temp_dir(),
            ttl: QUOTA_CACHE_TTL,
        }
    }
}

impl QuotaCollector for CachedApiQuotaCollector {
    fn collect_quota(&self, session_id: &str) -> Option<QuotaInfo> {
        let path = quota_cache_path(&self.cache_root, session_id)?;
        let now = Utc::now();

        if let Some(cached) = load_cache(&path) {
            if cached.is_fresh(now, self.ttl) {
                return Some(cached.quota);
            }
        }

        let token = read_access_token()?;
        let quota = fetch_quota(&token)?;
        write_cache(
            &path,
            &QuotaCacheFile {
                fetched_at: now,
                quota: quota.clone(),
            },
        );
        Some(quota)
    }
}

// ── Stub Collector (testing) ────────────────────────────────────────

#[derive(Debug, Default)]
pub struct StubQuotaCollector {
    pub info: Option<QuotaInfo>,
}

impl QuotaCollector for StubQuotaCollector {
    fn collect_quota(&self, _session_id: &str) -> Option<QuotaInfo> {
        self.info.clone()
    }
}

// ── Cache File Format ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaCacheFile {
    pub fetched_at: DateTime<Utc>,
    pub quota: QuotaInfo,
}

impl QuotaCacheFile {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = now.signed_duration_since(self.fetched_at);
        age.num_milliseconds() >= 0 && (age.num_milliseconds() as u128) < ttl.as_millis()
    }
}

/// `<root>/howl-<session>/usage.json`. Only the last path component of the
/// session id is used, so it cannot escape `root`.
pub fn quota_cache_path(root: &Path, session_id: &str) -> Option<PathBuf> {
    let name = Path::new(session_id.trim()).file_name()?.to_str()?;
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(root.join(format!("howl-{name}")).join("usage.json"))
}

fn load_cache(path: &Path) -> Option<QuotaCacheFile> {
    let contents = fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents)
        .map_err(|err| debug!(path = %path.display(), %err, "discarding quota cache"))
        .ok()
}

/// Atomic write through a sibling temp file. Failures are logged and dropped.
fn write_cache(path: &Path, cache: &QuotaCacheFile) {
    let Some(dir) = path.parent() else {
        return;
    };
    if let Err(err) = fs::create_dir_all(dir) {
        debug!(%err, "quota cache dir not writable");
        return;
    }
    let contents = match serde_json::to_string(cache) {
        Ok(c) => c,
        Err(_) => return,
    };
    let tmp_path = path.with_extension("tmp");
    if fs::write(&tmp_path, contents).is_ok() {
        let _ = fs::rename(&tmp_path, path);
    }
}

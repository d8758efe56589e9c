use serde::Deserialize;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Config files larger than this are ignored.
pub const MAX_CONFIG_BYTES: u64 = 4096;

/// Longest priority list kept after validation.
pub const MAX_PRIORITY: usize = 5;

// ── Presets ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Full,
    Minimal,
    Developer,
    CostFocused,
}

impl Preset {
    /// Unknown or empty names resolve to `Full`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "minimal" => Self::Minimal,
            "developer" => Self::Developer,
            "cost-focused" => Self::CostFocused,
            _ => Self::Full,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Minimal => "minimal",
            Self::Developer => "developer",
            Self::CostFocused => "cost-focused",
        }
    }

    pub fn features(self) -> FeatureToggles {
        match self {
            Self::Full => FeatureToggles::all(),
            Self::Minimal => FeatureToggles::default(),
            Self::Developer => FeatureToggles {
                account: true,
                git: true,
                line_changes: true,
                response_speed: true,
                quota: true,
                tools: true,
                agents: true,
                cache_efficiency: true,
                vim_mode: true,
                ..FeatureToggles::default()
            },
            Self::CostFocused => FeatureToggles {
                account: true,
                response_speed: true,
                quota: true,
                api_wait_ratio: true,
                cost_velocity: true,
                ..FeatureToggles::default()
            },
        }
    }
}

// ── Feature Toggles ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    pub account: bool,
    pub git: bool,
    pub line_changes: bool,
    pub response_speed: bool,
    pub quota: bool,
    pub tools: bool,
    pub agents: bool,
    pub cache_efficiency: bool,
    pub api_wait_ratio: bool,
    pub cost_velocity: bool,
    pub vim_mode: bool,
    pub agent_name: bool,
}

impl FeatureToggles {
    pub fn all() -> Self {
        Self {
            account: true,
            git: true,
            line_changes: true,
            response_speed: true,
            quota: true,
            tools: true,
            agents: true,
            cache_efficiency: true,
            api_wait_ratio: true,
            cost_velocity: true,
            vim_mode: true,
            agent_name: true,
        }
    }

    /// Field-wise OR: an override can switch a feature on, never off.
    pub fn merge(self, over: &FeatureToggles) -> Self {
        Self {
            account: self.account || over.account,
            git: self.git || over.git,
            line_changes: self.line_changes || over.line_changes,
            response_speed: self.response_speed || over.response_speed,
            quota: self.quota || over.quota,
            tools: self.tools || over.tools,
            agents: self.agents || over.agents,
            cache_efficiency: self.cache_efficiency || over.cache_efficiency,
            api_wait_ratio: self.api_wait_ratio || over.api_wait_ratio,
            cost_velocity: self.cost_velocity || over.cost_velocity,
            vim_mode: self.vim_mode || over.vim_mode,
            agent_name: self.agent_name || over.agent_name,
        }
    }

    pub fn enabled(&self, metric: Metric) -> bool {
        match metric {
            Metric::Quota => self.quota,
            Metric::Git => self.git,
            Metric::LineChanges => self.line_changes,
            Metric::ResponseSpeed => self.response_speed,
            Metric::Account => self.account,
        }
    }
}

// ── Priority Metrics ────────────────────────────────────────────────

/// Metrics whose position on the metrics line can be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Quota,
    Git,
    LineChanges,
    ResponseSpeed,
    Account,
}

impl Metric {
    pub const DEFAULT_ORDER: [Metric; 5] = [
        Metric::Git,
        Metric::LineChanges,
        Metric::ResponseSpeed,
        Metric::Quota,
        Metric::Account,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "quota" => Some(Self::Quota),
            "git" => Some(Self::Git),
            "line_changes" => Some(Self::LineChanges),
            "response_speed" => Some(Self::ResponseSpeed),
            "account" => Some(Self::Account),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Quota => "quota",
            Self::Git => "git",
            Self::LineChanges => "line_changes",
            Self::ResponseSpeed => "response_speed",
            Self::Account => "account",
        }
    }
}

/// Normalizes a raw priority list: trimmed, lowercased, first occurrence
/// wins, unknown names dropped, at most [`MAX_PRIORITY`] entries.
pub fn validate_priority<S: AsRef<str>>(raw: &[S]) -> Vec<Metric> {
    let mut out = Vec::with_capacity(MAX_PRIORITY);
    for name in raw {
        let Some(metric) = Metric::from_name(&name.as_ref().trim().to_lowercase()) else {
            continue;
        };
        if out.contains(&metric) {
            continue;
        }
        out.push(metric);
        if out.len() == MAX_PRIORITY {
            break;
        }
    }
    out
}

// ── Thresholds ──────────────────────────────────────────────────────

/// Validated color boundaries. Percent and rate fields are integral,
/// money and quota fields are fractional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub context_danger: i64,
    pub context_warning: i64,
    pub context_moderate: i64,
    pub session_cost_high: f64,
    pub session_cost_medium: f64,
    pub cache_excellent: i64,
    pub cache_good: i64,
    pub wait_high: i64,
    pub wait_medium: i64,
    pub speed_fast: i64,
    pub speed_moderate: i64,
    pub cost_velocity_high: f64,
    pub cost_velocity_medium: f64,
    pub quota_critical: f64,
    pub quota_low: f64,
    pub quota_medium: f64,
    pub quota_high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            context_danger: 85,
            context_warning: 70,
            context_moderate: 50,
            session_cost_high: 5.0,
            session_cost_medium: 1.0,
            cache_excellent: 80,
            cache_good: 50,
            wait_high: 60,
            wait_medium: 35,
            speed_fast: 60,
            speed_moderate: 30,
            cost_velocity_high: 0.50,
            cost_velocity_medium: 0.10,
            quota_critical: 10.0,
            quota_low: 25.0,
            quota_medium: 50.0,
            quota_high: 75.0,
        }
    }
}

/// Per-field overrides as written in the config file. Zero means unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThresholdOverrides {
    pub context_danger: i64,
    pub context_warning: i64,
    pub context_moderate: i64,
    pub session_cost_high: f64,
    pub session_cost_medium: f64,
    pub cache_excellent: i64,
    pub cache_good: i64,
    pub wait_high: i64,
    pub wait_medium: i64,
    pub speed_fast: i64,
    pub speed_moderate: i64,
    pub cost_velocity_high: f64,
    pub cost_velocity_medium: f64,
    pub quota_critical: f64,
    pub quota_low: f64,
    pub quota_medium: f64,
    pub quota_high: f64,
}

fn pick_int(base: i64, over: i64) -> i64 {
    if over > 0 {
        over
    } else {
        base
    }
}

// NaN and infinities count as unset.
fn pick_float(base: f64, over: f64) -> f64 {
    if over.is_finite() && over > 0.0 {
        over
    } else {
        base
    }
}

fn repair_money_pair(high: &mut f64, medium: &mut f64) {
    *high = high.max(0.02);
    *medium = medium.max(0.01);
    if *medium >= *high {
        *medium = (*high * 0.5).max(0.01);
    }
}

impl Thresholds {
    /// Positive overrides replace defaults; everything else keeps the base.
    pub fn merge(self, over: &ThresholdOverrides) -> Self {
        Self {
            context_danger: pick_int(self.context_danger, over.context_danger),
            context_warning: pick_int(self.context_warning, over.context_warning),
            context_moderate: pick_int(self.context_moderate, over.context_moderate),
            session_cost_high: pick_float(self.session_cost_high, over.session_cost_high),
            session_cost_medium: pick_float(self.session_cost_medium, over.session_cost_medium),
            cache_excellent: pick_int(self.cache_excellent, over.cache_excellent),
            cache_good: pick_int(self.cache_good, over.cache_good),
            wait_high: pick_int(self.wait_high, over.wait_high),
            wait_medium: pick_int(self.wait_medium, over.wait_medium),
            speed_fast: pick_int(self.speed_fast, over.speed_fast),
            speed_moderate: pick_int(self.speed_moderate, over.speed_moderate),
            cost_velocity_high: pick_float(self.cost_velocity_high, over.cost_velocity_high),
            cost_velocity_medium: pick_float(self.cost_velocity_medium, over.cost_velocity_medium),
            quota_critical: pick_float(self.quota_critical, over.quota_critical),
            quota_low: pick_float(self.quota_low, over.quota_low),
            quota_medium: pick_float(self.quota_medium, over.quota_medium),
            quota_high: pick_float(self.quota_high, over.quota_high),
        }
    }

    /// Clamps every field into range and repairs inverted ramps.
    ///
    /// Each chain is clamped head first, and every later member is clamped
    /// into the interval left by the one before it. The upper bound of each
    /// member reserves one step per member still to come, so a chain can
    /// never be pushed off the top of its range and a second pass finds
    /// nothing to change.
    pub fn validate(mut self) -> Self {
        // danger > warning > moderate, all within [0,100]
        self.context_danger = self.context_danger.clamp(2, 100);
        self.context_warning = self.context_warning.clamp(1, self.context_danger - 1);
        self.context_moderate = self.context_moderate.clamp(0, self.context_warning - 1);

        self.cache_excellent = self.cache_excellent.clamp(1, 100);
        self.cache_good = self.cache_good.clamp(0, self.cache_excellent - 1);

        self.wait_high = self.wait_high.clamp(1, 100);
        self.wait_medium = self.wait_medium.clamp(0, self.wait_high - 1);

        self.speed_fast = self.speed_fast.max(2);
        self.speed_moderate = self.speed_moderate.clamp(1, self.speed_fast - 1);

        repair_money_pair(&mut self.session_cost_high, &mut self.session_cost_medium);
        repair_money_pair(&mut self.cost_velocity_high, &mut self.cost_velocity_medium);

        // critical < low < medium < high, within [0,100]
        self.quota_critical = self.quota_critical.clamp(0.0, 97.0);
        self.quota_low = self.quota_low.clamp(self.quota_critical + 1.0, 98.0);
        self.quota_medium = self.quota_medium.clamp(self.quota_low + 1.0, 99.0);
        self.quota_high = self.quota_high.clamp(self.quota_medium + 1.0, 100.0);

        self
    }
}

// ── Policy ──────────────────────────────────────────────────────────

/// Resolved, validated display policy. Only obtainable through
/// [`Policy::resolve`], so renderers never see unvalidated thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    preset: Preset,
    features: FeatureToggles,
    priority: Vec<Metric>,
    thresholds: Thresholds,
}

impl Policy {
    pub fn resolve<S: AsRef<str>>(
        preset_name: &str,
        features: &FeatureToggles,
        priority: &[S],
        thresholds: &ThresholdOverrides,
    ) -> Self {
        let preset = Preset::parse(preset_name);
        Self {
            preset,
            features: preset.features().merge(features),
            priority: validate_priority(priority),
            thresholds: Thresholds::default().merge(thresholds).validate(),
        }
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn features(&self) -> &FeatureToggles {
        &self.features
    }

    pub fn priority(&self) -> &[Metric] {
        &self.priority
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::resolve::<&str>(
            Preset::Full.name(),
            &FeatureToggles::default(),
            &[],
            &ThresholdOverrides::default(),
        )
    }
}

// ── Config File (TOML) ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub preset: String,
    pub priority: Vec<String>,
    pub features: FeatureToggles,
    pub thresholds: ThresholdOverrides,
}

impl ConfigFile {
    pub fn into_policy(self) -> Policy {
        Policy::resolve(
            &self.preset,
            &self.features,
            &self.priority,
            &self.thresholds,
        )
    }
}

/// `$HOWL_CONFIG`, else `~/.claude/howl/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("HOWL_CONFIG").filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".claude").join("howl").join("config.toml"))
}

/// Loads the policy, falling back to the default on any failure.
pub fn load_policy() -> Policy {
    match config_path() {
        Some(path) => load_policy_from(&path),
        None => {
            debug!("no home directory, using default policy");
            Policy::default()
        }
    }
}

pub fn load_policy_from(path: &Path) -> Policy {
    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(err) => {
            debug!(path = %path.display(), %err, "config not readable");
            return Policy::default();
        }
    };
    if size > MAX_CONFIG_BYTES {
        debug!(path = %path.display(), size, "config too large, ignoring");
        return Policy::default();
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            debug!(path = %path.display(), %err, "config read failed");
            return Policy::default();
        }
    };

    match toml::from_str::<ConfigFile>(&contents) {
        Ok(file) => file.into_policy(),
        Err(err) => {
            debug!(path = %path.display(), %err, "invalid config");
            Policy::default()
        }
    }
}

/// Generate the default config file content.
pub fn default_config_toml() -> &'static str {
    r#"preset = "full"              # full | minimal | developer | cost-focused
priority = []                  # up to 5 of: quota, git, line_changes, response_speed, account

[features]                     # true switches a feature on over the preset
# account = true
# git = true
# line_changes = true
# response_speed = true
# quota = true
# tools = true
# agents = true
# cache_efficiency = true
# api_wait_ratio = true
# cost_velocity = true
# vim_mode = true
# agent_name = true

[thresholds]                   # positive values replace the defaults below
# context_danger = 85
# context_warning = 70
# context_moderate = 50
# session_cost_high = 5.0
# session_cost_medium = 1.0
# cache_excellent = 80
# cache_good = 50
# wait_high = 60
# wait_medium = 35
# speed_fast = 60
# speed_moderate = 30
# cost_velocity_high = 0.50
# cost_velocity_medium = 0.10
# quota_critical = 10.0
# quota_low = 25.0
# quota_medium = 50.0
# quota_high = 75.0
"#
}

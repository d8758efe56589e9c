use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a counter leniently: negatives and `null` become 0, fractional
/// values are truncated and oversized ones saturate.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Unsigned(u64),
        Signed(i64),
        Float(f64),
    }

    Ok(match Option::<Count>::deserialize(deserializer)? {
        Some(Count::Unsigned(n)) => n,
        Some(Count::Float(f)) if f.is_finite() && f > 0.0 => f as u64,
        Some(Count::Signed(_) | Count::Float(_)) | None => 0,
    })
}

// ── Stdin Snapshot ──────────────────────────────────────────────────

/// One point-in-time view of the session, read once from stdin.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Snapshot {
    #[serde(deserialize_with = "null_as_default")]
    pub session_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub transcript_path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cwd: String,
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub model: ModelInfo,
    #[serde(deserialize_with = "null_as_default")]
    pub workspace: WorkspaceInfo,
    #[serde(deserialize_with = "null_as_default")]
    pub cost: CostInfo,
    #[serde(deserialize_with = "null_as_default")]
    pub context_window: ContextWindow,
    pub output_style: Option<OutputStyleInfo>,
    pub vim: Option<VimInfo>,
    pub agent: Option<AgentInfo>,
}

impl Snapshot {
    /// Directory used for git lookups and the workspace label.
    pub fn project_dir(&self) -> Option<&str> {
        [
            self.workspace.project_dir.as_str(),
            self.workspace.current_dir.as_str(),
            self.cwd.as_str(),
        ]
        .into_iter()
        .find(|dir| !dir.is_empty())
    }

    pub fn vim_mode(&self) -> Option<&str> {
        self.vim
            .as_ref()
            .map(|vim| vim.mode.as_str())
            .filter(|mode| !mode.is_empty())
    }

    pub fn agent_name(&self) -> Option<&str> {
        self.agent
            .as_ref()
            .map(|agent| agent.name.as_str())
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub display_name: String,
}

impl ModelInfo {
    /// Display name, then id, then `?`.
    pub fn label(&self) -> &str {
        if !self.display_name.is_empty() {
            &self.display_name
        } else if !self.id.is_empty() {
            &self.id
        } else {
            "?"
        }
    }

    pub fn tier(&self) -> ModelTier {
        let name = if self.display_name.is_empty() {
            &self.id
        } else {
            &self.display_name
        };
        ModelTier::classify(name)
    }

    /// Short tag for models served through a cloud provider.
    pub fn provider_suffix(&self) -> &'static str {
        let id = self.id.to_lowercase();
        if id.contains("anthropic.claude-") {
            " BR"
        } else if id.contains("publishers/anthropic") {
            " VX"
        } else {
            ""
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Opus,
    Sonnet,
    Haiku,
    Unknown,
}

impl ModelTier {
    pub fn classify(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("opus") {
            Self::Opus
        } else if lower.contains("sonnet") {
            Self::Sonnet
        } else if lower.contains("haiku") {
            Self::Haiku
        } else {
            Self::Unknown
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkspaceInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub current_dir: String,
    #[serde(deserialize_with = "null_as_default")]
    pub project_dir: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CostInfo {
    pub total_cost_usd: f64,
    #[serde(deserialize_with = "lenient_count")]
    pub total_duration_ms: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub total_api_duration_ms: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub total_lines_added: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub total_lines_removed: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ContextWindow {
    #[serde(deserialize_with = "lenient_count")]
    pub total_input_tokens: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub total_output_tokens: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub context_window_size: u64,
    pub used_percentage: Option<f64>,
    pub remaining_percentage: Option<f64>,
    pub current_usage: Option<CurrentUsage>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CurrentUsage {
    #[serde(deserialize_with = "lenient_count")]
    pub input_tokens: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub output_tokens: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub cache_creation_input_tokens: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub cache_read_input_tokens: u64,
}

impl CurrentUsage {
    /// Tokens occupying the context window for the last request.
    pub fn context_tokens(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.cache_creation_input_tokens)
            .saturating_add(self.cache_read_input_tokens)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputStyleInfo {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct VimInfo {
    pub mode: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentInfo {
    pub name: String,
}

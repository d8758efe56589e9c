pub mod config;
pub mod error;
pub mod metrics;
pub mod providers;
pub mod render;
pub mod types;

use config::Policy;
use metrics::DerivedMetrics;
use providers::{
    AccountCollector, CachedApiQuotaCollector, FileTranscriptCollector, GitCollector,
    HomeAccountCollector, LocalGitCollector, QuotaCollector, TranscriptCollector,
};
use render::{
    layout::{render_frame, Facts, RenderInput},
    RenderOptions,
};
use tracing::debug;
use types::Snapshot;

/// Parses one snapshot, gathers collaborator facts and renders the lines.
pub struct HowlRunner {
    git: Box<dyn GitCollector>,
    quota: Box<dyn QuotaCollector>,
    transcript: Box<dyn TranscriptCollector>,
    account: Box<dyn AccountCollector>,
}

impl Default for HowlRunner {
    fn default() -> Self {
        Self {
            git: Box::new(LocalGitCollector::default()),
            quota: Box::new(CachedApiQuotaCollector::default()),
            transcript: Box::new(FileTranscriptCollector),
            account: Box::new(HomeAccountCollector::default()),
        }
    }
}

impl HowlRunner {
    pub fn with_collectors(
        git: impl GitCollector + 'static,
        quota: impl QuotaCollector + 'static,
        transcript: impl TranscriptCollector + 'static,
        account: impl AccountCollector + 'static,
    ) -> Self {
        Self {
            git: Box::new(git),
            quota: Box::new(quota),
            transcript: Box::new(transcript),
            account: Box::new(account),
        }
    }

    /// Blank input renders as an empty snapshot; anything else must be a
    /// JSON object.
    pub fn run_from_str(
        &self,
        input: &str,
        policy: &Policy,
        options: &RenderOptions,
    ) -> error::Result<Vec<String>> {
        let input = if input.trim().is_empty() { "{}" } else { input };
        let snapshot: Snapshot = serde_json::from_str(input)?;
        Ok(self.render(&snapshot, policy, options))
    }

    pub fn render(&self, snapshot: &Snapshot, policy: &Policy, options: &RenderOptions) -> Vec<String> {
        let metrics = DerivedMetrics::from_snapshot(snapshot);

        // Facts are gathered regardless of toggles: the danger layout shows
        // quota and git even when they are switched off.
        let git = snapshot
            .project_dir()
            .and_then(|dir| self.git.collect_git(dir));
        let quota = self.quota.collect_quota(&snapshot.session_id);
        let activity = self.transcript.collect_activity(&snapshot.transcript_path);
        let account = self.account.collect_account();
        debug!(
            context_percent = metrics.context_percent,
            git = git.is_some(),
            quota = quota.is_some(),
            activity = activity.is_some(),
            account = account.is_some(),
            "facts collected"
        );

        let input = RenderInput {
            snapshot,
            metrics: &metrics,
            facts: Facts {
                git: git.as_ref(),
                quota: quota.as_ref(),
                activity: activity.as_ref(),
                account: account.as_ref(),
            },
        };
        render_frame(&input, policy, options)
    }
}

pub fn run_from_str(
    input: &str,
    policy: &Policy,
    options: &RenderOptions,
) -> error::Result<Vec<String>> {
    HowlRunner::default().run_from_str(input, policy, options)
}

use std::{
    io::Read,
    process::{Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use tracing::debug;

/// Upper bound on each git invocation.
pub const GIT_TIMEOUT: Duration = Duration::from_secs(1);

const POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GitInfo {
    pub branch: String,
    pub dirty: bool,
}

pub trait GitCollector {
    fn collect_git(&self, dir: &str) -> Option<GitInfo>;
}

#[derive(Debug, Clone, Copy)]
pub struct LocalGitCollector {
    pub timeout: Duration,
}

impl Default for LocalGitCollector {
    fn default() -> Self {
        Self {
            timeout: GIT_TIMEOUT,
        }
    }
}

impl GitCollector for LocalGitCollector {
    fn collect_git(&self, dir: &str) -> Option<GitInfo> {
        if dir.is_empty() {
            return None;
        }

        // A detached HEAD reports the literal "HEAD".
        let branch = git_stdout(dir, &["rev-parse", "--abbrev-ref", "HEAD"], self.timeout)?;
        let branch = branch.trim();
        if branch.is_empty() {
            return None;
        }

        let dirty = git_stdout(
            dir,
            &["status", "--porcelain", "--untracked-files=no"],
            self.timeout,
        )
        .is_some_and(|status| parse_dirty(&status));

        Some(GitInfo {
            branch: branch.to_string(),
            dirty,
        })
    }
}

#[derive(Debug, Default)]
pub struct StubGitCollector {
    pub info: Option<GitInfo>,
}

impl GitCollector for StubGitCollector {
    fn collect_git(&self, _dir: &str) -> Option<GitInfo> {
        self.info.clone()
    }
}

fn parse_dirty(porcelain: &str) -> bool {
    porcelain.lines().any(|line| !line.trim().is_empty())
}

/// Runs git and returns stdout, killing the child once `timeout` elapses.
fn git_stdout(dir: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let mut child = Command::new("git")
        .args(["-C", dir])
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| debug!(%err, "git spawn failed"))
        .ok()?;

    // Drain stdout on its own thread so a full pipe cannot stall the child.
    let mut pipe = child.stdout.take()?;
    let reader = thread::spawn(move || {
        let mut buf = String::new();
        pipe.read_to_string(&mut buf).ok().map(|_| buf)
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                debug!(?args, "git timed out");
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(err) => {
                debug!(%err, "git wait failed");
                return None;
            }
        }
    };

    let stdout = reader.join().ok()??;
    status.success().then_some(stdout)
}

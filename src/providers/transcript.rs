use std::{
    collections::BTreeMap,
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Bytes read from the end of the transcript.
pub const TAIL_BYTES: u64 = 64 * 1024;
/// Lines kept from that tail.
pub const TAIL_LINES: usize = 100;

/// Agent descriptions shorter than this are used as the display name.
const AGENT_DESCRIPTION_MAX: usize = 30;

/// Recent tool usage and agents still running, taken from the transcript tail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityInfo {
    pub tools: BTreeMap<String, u32>,
    pub agents: Vec<String>,
}

pub trait TranscriptCollector {
    fn collect_activity(&self, transcript_path: &str) -> Option<ActivityInfo>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FileTranscriptCollector;

impl TranscriptCollector for FileTranscriptCollector {
    fn collect_activity(&self, transcript_path: &str) -> Option<ActivityInfo> {
        if transcript_path.is_empty() {
            return None;
        }
        let lines = match tail_lines(Path::new(transcript_path), TAIL_BYTES, TAIL_LINES) {
            Ok(lines) => lines,
            Err(err) => {
                debug!(path = transcript_path, %err, "transcript unreadable");
                return None;
            }
        };
        Some(scan_lines(lines.iter().map(String::as_str)))
    }
}

#[derive(Debug, Default)]
pub struct StubTranscriptCollector {
    pub activity: Option<ActivityInfo>,
}

impl TranscriptCollector for StubTranscriptCollector {
    fn collect_activity(&self, _transcript_path: &str) -> Option<ActivityInfo> {
        self.activity.clone()
    }
}

// ── Transcript Entries ──────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TranscriptEntry {
    message: Message,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Message {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    id: String,
    name: String,
    input: Value,
    tool_use_id: String,
}

impl ContentBlock {
    fn input_str(&self, key: &str) -> &str {
        self.input.get(key).and_then(Value::as_str).unwrap_or("")
    }
}

/// Counts tool uses and tracks agents started by `Task` until their
/// matching `tool_result` arrives. Unparsable lines are skipped.
fn scan_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> ActivityInfo {
    let mut tools: BTreeMap<String, u32> = BTreeMap::new();
    // (tool_use id, display name), in start order
    let mut running: Vec<(String, String)> = Vec::new();

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let Ok(entry) = serde_json::from_str::<TranscriptEntry>(line) else {
            continue;
        };

        for block in entry.message.content {
            match block.kind.as_str() {
                "tool_use" if !block.name.is_empty() => match block.name.as_str() {
                    "Task" => {
                        let subagent = block.input_str("subagent_type");
                        if subagent.is_empty() {
                            continue;
                        }
                        let description = block.input_str("description");
                        let name = if !description.is_empty()
                            && description.chars().count() < AGENT_DESCRIPTION_MAX
                        {
                            description
                        } else {
                            subagent
                        };
                        running.retain(|(id, _)| *id != block.id);
                        running.push((block.id.clone(), name.to_string()));
                    }
                    "TodoWrite" => {}
                    other => *tools.entry(shorten_tool_name(other).to_string()).or_default() += 1,
                },
                "tool_result" if !block.tool_use_id.is_empty() => {
                    running.retain(|(id, _)| *id != block.tool_use_id);
                }
                _ => {}
            }
        }
    }

    ActivityInfo {
        tools,
        agents: running.into_iter().map(|(_, name)| name).collect(),
    }
}

/// `mcp__server__tool` becomes `tool`; plain names pass through.
fn shorten_tool_name(name: &str) -> &str {
    let parts: Vec<&str> = name.split("__").collect();
    if parts.len() < 3 {
        return name;
    }
    parts[parts.len() - 1]
}

/// Reads at most `max_bytes` from the end of `path` and returns the last
/// `max_lines` complete lines.
fn tail_lines(path: &Path, max_bytes: u64, max_lines: usize) -> std::io::Result<Vec<String>> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(Vec::new());
    }

    let start = len.saturating_sub(max_bytes);
    file.seek(SeekFrom::Start(start))?;
    let mut buf = Vec::with_capacity((len - start) as usize);
    file.take(max_bytes).read_to_end(&mut buf)?;

    // Started mid-line: drop the partial prefix.
    let body: &[u8] = if start > 0 {
        match buf.iter().position(|&b| b == b'\n') {
            Some(idx) => &buf[idx + 1..],
            None => &buf,
        }
    } else {
        &buf
    };

    let text = String::from_utf8_lossy(body);
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    if lines.len() > max_lines {
        lines.drain(..lines.len() - max_lines);
    }
    Ok(lines)
}

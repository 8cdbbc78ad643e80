use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::groq::Message;

/// Most-recent entries kept in the transcript, both in memory and on
/// disk. Older turns are dropped permanently, not archived.
pub const MAX_HISTORY: usize = 20;

/// File-backed conversation transcript. Exclusively owns the on-disk
/// JSON document; no other component writes it.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HistoryStore { path: path.into() }
    }

    /// Reads the persisted transcript. A missing file or invalid JSON
    /// yields an empty history rather than an error.
    pub fn load(&self) -> Vec<Message> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }

    /// Overwrites the persisted transcript, pretty-printed with a
    /// 4-space indent. I/O errors propagate.
    pub fn save(&self, messages: &[Message]) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        messages
            .serialize(&mut ser)
            .context("Failed to serialize chat history")?;
        fs::write(&self.path, buf)
            .with_context(|| format!("Failed to write chat history to {}", self.path.display()))?;
        Ok(())
    }
}

/// Appends `message` and returns only the last `MAX_HISTORY` entries.
pub fn append_and_truncate(mut history: Vec<Message>, message: Message) -> Vec<Message> {
    history.push(message);
    let start = history.len().saturating_sub(MAX_HISTORY);
    history.split_off(start)
}

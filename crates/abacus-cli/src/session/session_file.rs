use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use abacus::models::message::Message;

use crate::configuration::config_dir;

pub fn ensure_session_dir() -> Result<PathBuf> {
    let session_dir = config_dir()?.join("sessions");

    if !session_dir.exists() {
        fs::create_dir_all(&session_dir)?;
    }

    Ok(session_dir)
}

pub fn session_path(name: &str) -> Result<PathBuf> {
    Ok(ensure_session_dir()?.join(format!("{}.jsonl", name)))
}

/// Write the trace as JSON Lines, replacing whatever the file held before
pub fn persist_messages(session_file: &Path, messages: &[Message]) -> Result<()> {
    if let Some(parent) = session_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(session_file)
        .with_context(|| format!("Failed to create trace file {}", session_file.display()))?;
    persist_messages_internal(file, messages)
}

fn persist_messages_internal(session_file: File, messages: &[Message]) -> Result<()> {
    let mut writer = std::io::BufWriter::new(session_file);

    for message in messages {
        serde_json::to_writer(&mut writer, &message)?;
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

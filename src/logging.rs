//! Chat logging persistence layer
//!
//! Provides file-based logging of chat messages organized by channel.
//! Logs are stored in XDG_DATA_HOME/cord-client/logs/ with the structure:
//! logs/channel_id/YYYY-MM-DD.log

use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::error::{Error, Result};
use crate::message::{Message, Snowflake};

/// A log entry to be written to disk
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub channel_id: Snowflake,
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub content: String,
}

impl From<&Message> for LogEntry {
    fn from(msg: &Message) -> Self {
        Self {
            channel_id: msg.channel_id,
            timestamp: msg.timestamp,
            author: msg.author.display_name().to_string(),
            // One line per entry
            content: msg.content.replace(['\r', '\n'], " "),
        }
    }
}

/// Logger manages file-based chat logging without blocking the caller
pub struct Logger {
    /// Channel to send log entries to the background thread
    tx: Sender<LogEntry>,
    worker: JoinHandle<()>,
}

impl Logger {
    /// Create a logger writing under the platform data directory
    pub fn new() -> Result<Self> {
        Self::with_directory(get_log_directory()?)
    }

    /// Create a logger rooted at `log_dir` and spawn the writer thread
    pub fn with_directory(log_dir: impl Into<PathBuf>) -> Result<Self> {
        let log_dir = log_dir.into();
        fs::create_dir_all(&log_dir)?;

        let (tx, rx) = unbounded::<LogEntry>();
        let worker = thread::spawn(move || {
            run_logger_thread(rx, log_dir);
        });

        Ok(Self { tx, worker })
    }

    /// Log a message (non-blocking, queued for background writing)
    pub fn log(&self, msg: &Message) {
        // If send fails, the logger thread has stopped - silently ignore
        let _ = self.tx.send(LogEntry::from(msg));
    }

    /// Stop accepting entries and wait until everything queued is on disk
    pub fn close(self) {
        drop(self.tx);
        if self.worker.join().is_err() {
            log::warn!("chat logger thread panicked");
        }
    }
}

/// Background thread that handles all file I/O
fn run_logger_thread(rx: Receiver<LogEntry>, log_dir: PathBuf) {
    // Cache of open file handles to avoid reopening files constantly
    let mut file_cache: HashMap<PathBuf, BufWriter<File>> = HashMap::new();

    while let Ok(entry) = rx.recv() {
        if let Err(e) = write_log_entry(&mut file_cache, &log_dir, &entry) {
            log::error!("chat log write failed: {}", e);
        }
    }

    // Flush all cached files on shutdown
    for (_, mut writer) in file_cache.drain() {
        let _ = writer.flush();
    }
}

/// Write a single log entry to the appropriate file
fn write_log_entry(
    file_cache: &mut HashMap<PathBuf, BufWriter<File>>,
    log_dir: &Path,
    entry: &LogEntry,
) -> Result<()> {
    let path = log_file_path(log_dir, entry);

    // Get or create buffered writer for this file
    let writer = match file_cache.entry(path) {
        std::collections::hash_map::Entry::Occupied(slot) => slot.into_mut(),
        std::collections::hash_map::Entry::Vacant(slot) => {
            if let Some(dir) = slot.key().parent() {
                fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(slot.key())?;
            slot.insert(BufWriter::new(file))
        }
    };

    // Format: [HH:MM:SS] <Name> Message
    writeln!(
        writer,
        "[{}] <{}> {}",
        entry.timestamp.format("%H:%M:%S"),
        entry.author,
        entry.content
    )?;
    writer.flush()?;

    Ok(())
}

/// logs/channel_id/YYYY-MM-DD.log, dated by the message itself
fn log_file_path(log_dir: &Path, entry: &LogEntry) -> PathBuf {
    log_dir
        .join(entry.channel_id.to_string())
        .join(format!("{}.log", entry.timestamp.format("%Y-%m-%d")))
}

/// Get the platform-specific log directory using XDG conventions
fn get_log_directory() -> Result<PathBuf> {
    let base = directories::BaseDirs::new().ok_or(Error::NoDataDir)?;

    // Use XDG_DATA_HOME on Linux, equivalent on other platforms
    let data_dir = base.data_dir();
    Ok(data_dir.join("cord-client").join("logs"))
}

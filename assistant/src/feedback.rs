//! Append-only feedback log.
//!
//! One CSV row per submission: `original_input, bot_reply, feedback`.
//! UTF-8, no header, never read back.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::FeedbackError;

pub const DEFAULT_FEEDBACK_LOG: &str = "feedback.csv";

/// One rating of a bot reply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub original_input: String,
    pub bot_reply: String,
    pub feedback: String,
}

pub struct FeedbackLog {
    path: PathBuf,
    // Serializes writers so rows never interleave.
    write_lock: Mutex<()>,
}

impl FeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row, creating the file if needed.
    ///
    /// # Errors
    /// [`FeedbackError`] if the file cannot be opened or written.
    pub async fn submit(&self, record: FeedbackRecord) -> Result<(), FeedbackError> {
        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || append_row(&path, &record))
            .await
            .map_err(|e| FeedbackError::Task(e.to_string()))??;

        info!(path = %self.path.display(), "feedback row appended");
        Ok(())
    }
}

fn append_row(path: &Path, record: &FeedbackRecord) -> Result<(), FeedbackError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    wtr.write_record([&record.original_input, &record.bot_reply, &record.feedback])?;
    wtr.flush()?;
    debug!(feedback = %record.feedback, "row flushed");
    Ok(())
}

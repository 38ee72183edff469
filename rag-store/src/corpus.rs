//! Corpus readers: FAQ tables and dialogue transcripts.
//!
//! FAQ tables carry the columns `type, customer_input, bot_reply`. The
//! dialogue source is a JSON array of `{ "turns": [{ "speaker", "text" }] }`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::RagError;

/// One FAQ row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub customer_input: String,
    pub bot_reply: String,
}

impl FaqRecord {
    /// Text that gets embedded for this record.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.customer_input, self.bot_reply)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DialogueTurn {
    pub speaker: String,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Dialogue {
    pub turns: Vec<DialogueTurn>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShotRole {
    User,
    Assistant,
}

impl ShotRole {
    /// `customer` (any case) is the user; every other speaker is the assistant.
    pub fn from_speaker(speaker: &str) -> Self {
        if speaker.to_lowercase() == "customer" {
            ShotRole::User
        } else {
            ShotRole::Assistant
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShotRole::User => "user",
            ShotRole::Assistant => "assistant",
        }
    }
}

/// A dialogue turn normalized to `{role, content}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FewShot {
    pub role: ShotRole,
    pub content: String,
}

/// Text encodings tried when decoding a FAQ table, in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf8Sig,
    Latin1,
}

impl TextEncoding {
    pub const PRIORITY: [TextEncoding; 3] =
        [TextEncoding::Utf8, TextEncoding::Utf8Sig, TextEncoding::Latin1];

    /// Decodes `bytes`; `None` on a decode error.
    ///
    /// Plain UTF-8 refuses a leading byte-order mark so that `Utf8Sig` gets
    /// the chance to strip it instead of leaking it into the first header.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        const BOM: &[u8] = b"\xEF\xBB\xBF";
        match self {
            TextEncoding::Utf8 => {
                if bytes.starts_with(BOM) {
                    return None;
                }
                std::str::from_utf8(bytes).ok().map(str::to_owned)
            }
            TextEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(BOM).unwrap_or(bytes);
                std::str::from_utf8(body).ok().map(str::to_owned)
            }
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

/// Reads one FAQ table, trying each encoding in [`TextEncoding::PRIORITY`].
///
/// # Errors
/// `RagError::Ingestion` if the file cannot be read, no encoding decodes it,
/// or a row lacks a required column.
pub fn read_faq_file(path: &Path) -> Result<Vec<FaqRecord>, RagError> {
    let bytes = fs::read(path).map_err(|e| RagError::ingestion(path, e))?;

    for enc in TextEncoding::PRIORITY {
        match enc.decode(&bytes) {
            Some(text) => {
                let rows = parse_faq_csv(&text).map_err(|e| RagError::ingestion(path, e))?;
                info!(path = %path.display(), encoding = ?enc, rows = rows.len(), "FAQ file loaded");
                return Ok(rows);
            }
            None => warn!(path = %path.display(), encoding = ?enc, "decode failed, trying next encoding"),
        }
    }

    Err(RagError::ingestion(path, "no encoding could decode the file"))
}

/// Parses FAQ rows from decoded CSV text with a header line.
pub fn parse_faq_csv(text: &str) -> Result<Vec<FaqRecord>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    rdr.deserialize().collect()
}

/// Reads and concatenates several FAQ tables in the given order.
pub fn read_faq_sources<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<FaqRecord>, RagError> {
    let mut all = Vec::new();
    for p in paths {
        all.extend(read_faq_file(p.as_ref())?);
    }
    debug!(sources = paths.len(), total = all.len(), "FAQ sources merged");
    Ok(all)
}

/// Reads the dialogue document.
pub fn read_dialogue_file(path: &Path) -> Result<Vec<Dialogue>, RagError> {
    let text = fs::read_to_string(path).map_err(|e| RagError::ingestion(path, e))?;
    let dialogues: Vec<Dialogue> =
        serde_json::from_str(&text).map_err(|e| RagError::ingestion(path, e))?;
    info!(path = %path.display(), dialogues = dialogues.len(), "dialogue file loaded");
    Ok(dialogues)
}

/// Flattens every dialogue into one shot sequence; indexes are global.
pub fn few_shots(dialogues: &[Dialogue]) -> Vec<FewShot> {
    dialogues
        .iter()
        .flat_map(|d| d.turns.iter())
        .map(|t| FewShot {
            role: ShotRole::from_speaker(&t.speaker),
            content: t.text.clone(),
        })
        .collect()
}

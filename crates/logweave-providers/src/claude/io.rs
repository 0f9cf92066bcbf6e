use crate::{DecodeError, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{trace, warn};

use super::schema::{Content, ContentBlock, Record, RecordPayload};

/// Lazily decodes one [`Record`] per non-blank line.
///
/// Lines that are not valid JSON records are yielded as [`DecodeError`] so
/// callers can skip them; an I/O failure mid-file ends the sequence.
pub struct RecordReader<R> {
    reader: Option<R>,
    line_no: usize,
    buf: Vec<u8>,
}

impl RecordReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }

    /// Like [`RecordReader::open`], but an unreadable file yields no records
    pub fn open_lossy(path: &Path) -> Self {
        match Self::open(path) {
            Ok(reader) => reader,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot open session log");
                Self {
                    reader: None,
                    line_no: 0,
                    buf: Vec::new(),
                }
            }
        }
    }
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            line_no: 0,
            buf: Vec::new(),
        }
    }

    /// Iterate only over records that decoded, tracing the rest
    pub fn decoded(self) -> impl Iterator<Item = Record> {
        self.filter_map(|item| match item {
            Ok(record) => Some(record),
            Err(err) => {
                trace!(error = %err, "skipping undecodable line");
                None
            }
        })
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = std::result::Result<Record, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let reader = self.reader.as_mut()?;
            self.buf.clear();
            match reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.reader = None;
                    return None;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(line = self.line_no + 1, error = %err, "stopped reading session log");
                    self.reader = None;
                    return None;
                }
            }
            self.line_no += 1;

            let Ok(line) = std::str::from_utf8(&self.buf) else {
                return Some(Err(DecodeError::Encoding { line: self.line_no }));
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            return Some(
                serde_json::from_str::<Record>(line).map_err(|source| DecodeError::Json {
                    line: self.line_no,
                    source,
                }),
            );
        }
    }
}

/// Read every decodable record of a log file.
///
/// An unreadable file yields an empty list.
pub fn read_records(path: &Path) -> Vec<Record> {
    RecordReader::open_lossy(path).decoded().collect()
}

/// Header information for listing sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionPreview {
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    #[serde(serialize_with = "logweave_types::timestamp::serialize")]
    pub timestamp: Option<DateTime<Utc>>,
    /// First meaningful user utterance, at most 100 characters
    pub snippet: Option<String>,
    pub is_sidechain: bool,
}

const PREVIEW_SCAN_LIMIT: usize = 200;
const SNIPPET_CHARS: usize = 100;

static MARKUP_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Extract header information from a session file without correlating it
pub fn session_preview(path: &Path) -> Result<SessionPreview> {
    let reader = RecordReader::open(path)?;
    let mut preview = SessionPreview::default();

    for record in reader.decoded().take(PREVIEW_SCAN_LIMIT) {
        if !matches!(
            record.payload,
            RecordPayload::User(_) | RecordPayload::Assistant(_)
        ) {
            continue;
        }
        if preview.session_id.is_none() {
            preview.session_id = record.session_id.clone();
        }
        if preview.cwd.is_none() {
            preview.cwd = record.cwd.clone();
        }
        if preview.timestamp.is_none() {
            preview.timestamp = record.timestamp;
        }

        if let RecordPayload::User(user) = &record.payload {
            if preview.snippet.is_none() && !record.is_sidechain && !user.is_meta {
                preview.snippet = user
                    .message
                    .as_ref()
                    .and_then(|message| preview_snippet(&message.content));
            }
            preview.is_sidechain = record.is_sidechain;
        }

        if preview.session_id.is_some()
            && preview.cwd.is_some()
            && preview.timestamp.is_some()
            && preview.snippet.is_some()
        {
            break;
        }
    }

    Ok(preview)
}

fn preview_snippet(content: &Content) -> Option<String> {
    match content {
        Content::Text(text) => snippet_from(text),
        Content::Blocks(blocks) => blocks.iter().find_map(|block| match block {
            ContentBlock::Text { text } => snippet_from(text),
            _ => None,
        }),
        Content::Other(_) => None,
    }
}

/// Filter out interruption markers, continuation notices, status lines and
/// bare image placeholders; strip markup tags from what remains.
fn snippet_from(text: &str) -> Option<String> {
    let text = text.trim();
    if text.starts_with("tool_use_id")
        || text.contains("[Request interrupted")
        || text.to_lowercase().contains("session is being continued")
    {
        return None;
    }

    let stripped = MARKUP_TAG.replace_all(text, "");
    let mut cleaned = stripped.trim();
    if cleaned.contains("is running") && cleaned.contains('…') {
        return None;
    }
    if cleaned.starts_with("[Image #") {
        let (_, rest) = cleaned.split_once(']')?;
        cleaned = rest.trim();
    }

    if cleaned.chars().count() <= 3 {
        return None;
    }
    Some(
        cleaned
            .chars()
            .take(SNIPPET_CHARS)
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect(),
    )
}

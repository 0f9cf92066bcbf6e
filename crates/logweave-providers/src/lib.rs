// Error types
pub mod error;

// Claude Code session logs
pub mod claude;

pub use claude::{
    Content, ContentBlock, Record, RecordKind, RecordPayload, RecordReader, SessionPreview,
    SubagentLocator, SubagentTranscript, extract_agent_id, flatten_content, read_records,
    session_preview, tool_result_text,
};

// Error types
pub use error::{DecodeError, Error, Result};

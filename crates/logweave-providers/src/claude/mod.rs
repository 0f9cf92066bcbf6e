pub mod flatten;
pub mod io;
pub mod schema;
pub mod subagent;

pub use self::flatten::{flatten_content, thinking_texts, tool_result_text};
pub use self::io::{RecordReader, SessionPreview, read_records, session_preview};
pub use self::schema::{Content, ContentBlock, Record, RecordKind, RecordPayload};
pub use self::subagent::{
    SubagentLocator, SubagentTranscript, extract_agent_id, index_subagent_files,
    load_subagent_transcript, locate_subagent,
};

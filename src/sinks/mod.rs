use anyhow::Result;
use serde_json::{Map, Value};

pub mod count;
pub mod jsonl;

pub use self::count::CountSink;
pub use self::jsonl::JsonlSink;

/// A matched record on its way out, with any derived mapping fields.
#[derive(Clone, Debug)]
pub struct MatchedRow {
    pub line: u64,
    pub fields: Map<String, Value>,
}

pub trait RecordSink: Send {
    fn add_record(&mut self, row: MatchedRow) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
}

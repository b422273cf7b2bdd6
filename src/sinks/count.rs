use super::{MatchedRow, RecordSink};
use anyhow::Result;
use std::io::Write;

/// Counts matched records and writes only the total on finish.
pub struct CountSink {
    count: u64,
    writer: Box<dyn Write + Send>,
}

impl CountSink {
    pub fn stdout() -> Self {
        Self::from_writer(Box::new(std::io::stdout()))
    }

    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self { count: 0, writer }
    }
}

impl RecordSink for CountSink {
    fn add_record(&mut self, _row: MatchedRow) -> Result<()> {
        self.count += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        writeln!(self.writer, "{}", self.count)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn test_counts_rows() {
        let output = tempfile::NamedTempFile::new().unwrap();
        let file = output.reopen().unwrap();
        let mut sink = CountSink::from_writer(Box::new(file));
        for line in 1..=3 {
            sink.add_record(MatchedRow {
                line,
                fields: Map::new(),
            })
            .unwrap();
        }
        sink.finish().unwrap();

        let content = std::fs::read_to_string(output.path()).unwrap();
        assert_eq!(content, "3\n");
    }
}

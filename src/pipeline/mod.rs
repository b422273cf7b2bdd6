use anyhow::{Result, bail};
use rayon::prelude::*;
use serde_json::{Map, Value};
use std::sync::Arc;
use yql::record_from_json;

use crate::config::{CompiledConfig, RuntimeConfig};
use crate::mapping::evaluate_mapping;
use crate::sinks::MatchedRow;

/// One line of JSON Lines input, numbered from 1. Bytes are decoded as
/// UTF-8 when the line is processed.
#[derive(Clone, Debug)]
pub struct InputLine {
    pub number: u64,
    pub raw: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub rows: Vec<MatchedRow>,
    pub invalid: u64,
}

pub trait BatchProcessor: Send + Sync {
    fn process_batch(&self, batch: &[InputLine]) -> Result<BatchOutcome>;
}

/// Evaluates the compiled filter against each line, in parallel within a batch.
pub struct FilterProcessor {
    pub config: Arc<CompiledConfig>,
    pub runtime: Arc<RuntimeConfig>,
}

impl BatchProcessor for FilterProcessor {
    fn process_batch(&self, batch: &[InputLine]) -> Result<BatchOutcome> {
        let outcomes = batch
            .par_iter()
            .map(|line| process_line(line, &self.config, &self.runtime))
            .collect::<Result<Vec<_>>>()?;

        let mut result = BatchOutcome::default();
        for outcome in outcomes {
            match outcome {
                LineOutcome::Matched(row) => result.rows.push(row),
                LineOutcome::Rejected => {}
                LineOutcome::Invalid => result.invalid += 1,
            }
        }
        Ok(result)
    }
}

#[derive(Debug)]
pub enum LineOutcome {
    Matched(MatchedRow),
    Rejected,
    Invalid,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid_line(line: &InputLine, reason: String, runtime: &RuntimeConfig) -> Result<LineOutcome> {
    if runtime.strict {
        bail!("Pipeline: Invalid input on line {}: {}", line.number, reason);
    }
    tracing::warn!("Skipping line {}: {}", line.number, reason);
    Ok(LineOutcome::Invalid)
}

/// Parse one line and test it against the filter.
///
/// Blank lines are ignored. A `null` line is an absent record and never
/// matches. Matching records gain one string field per mapping that produced
/// a value, replacing any input field of the same name.
pub fn process_line(
    line: &InputLine,
    config: &CompiledConfig,
    runtime: &RuntimeConfig,
) -> Result<LineOutcome> {
    let text = match std::str::from_utf8(&line.raw) {
        Ok(text) => text.trim(),
        Err(err) => return invalid_line(line, format!("invalid UTF-8: {}", err), runtime),
    };
    if text.is_empty() {
        return Ok(LineOutcome::Rejected);
    }

    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => return invalid_line(line, format!("invalid JSON: {}", err), runtime),
    };

    let (mut fields, record) = match value {
        Value::Object(fields) => {
            let record = record_from_json(&fields);
            (fields, Some(record))
        }
        Value::Null => (Map::new(), None),
        other => {
            let reason = format!("expected a JSON object, found {}", json_kind(&other));
            return invalid_line(line, reason, runtime);
        }
    };

    if !config.filter.matches(record.as_ref()) {
        return Ok(LineOutcome::Rejected);
    }

    if let Some(record) = &record {
        for (name, mapping) in &config.mappings {
            if let Some(value) = evaluate_mapping(mapping, record) {
                fields.insert(name.clone(), Value::String(value.to_string()));
            }
        }
    }

    Ok(LineOutcome::Matched(MatchedRow {
        line: line.number,
        fields,
    }))
}

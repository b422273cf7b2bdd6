//! Mapping rule definitions and evaluation.

use anyhow::Result;
use serde::Deserialize;
use yql::{Filter, Record};

/// A mapping definition with ordered rules.
#[derive(Debug, Clone)]
pub struct Mapping {
    pub rules: Vec<CompiledRule>,
    pub default: Option<String>,
}

/// A compiled mapping rule.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub filter: Filter,
    pub value: String,
}

/// Raw mapping rule from YAML (before compilation).
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct MappingRule {
    /// The predicate text
    #[serde(rename = "match")]
    pub match_expr: String,
    /// The value to return if this rule matches
    pub value: String,
}

/// Raw mapping from YAML (before compilation).
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct MappingConfig {
    pub rules: Vec<MappingRule>,
    #[serde(default)]
    pub default: Option<String>,
}

impl Mapping {
    /// Compile a mapping from config.
    pub fn compile(name: &str, config: &MappingConfig) -> Result<Self> {
        let mut rules = Vec::with_capacity(config.rules.len());

        for (i, rule) in config.rules.iter().enumerate() {
            let filter = Filter::compile(&rule.match_expr).map_err(|e| {
                anyhow::anyhow!("Error parsing rule {} in mapping '{}': {}", i + 1, name, e)
            })?;

            rules.push(CompiledRule {
                filter,
                value: rule.value.clone(),
            });
        }

        Ok(Mapping {
            rules,
            default: config.default.clone(),
        })
    }
}

/// Evaluate a mapping against a record, returning the first matching value.
pub fn evaluate_mapping<'a>(mapping: &'a Mapping, record: &Record) -> Option<&'a str> {
    mapping
        .rules
        .iter()
        .find(|rule| rule.filter.matches(Some(record)))
        .map(|rule| rule.value.as_str())
        .or(mapping.default.as_deref())
}

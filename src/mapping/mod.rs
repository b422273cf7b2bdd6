//! Mapping rules for derived fields.
//!
//! Mappings provide first-match-wins rule evaluation to classify
//! records into categories.

mod rules;

pub use rules::{Mapping, MappingConfig, evaluate_mapping};

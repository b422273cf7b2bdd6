use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use yql::Filter;

use crate::mapping::{Mapping, MappingConfig};

pub const DEFAULT_BATCH_SIZE: usize = 4096;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FiltersConfig {
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub mappings: BTreeMap<String, MappingConfig>,
}

impl FiltersConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()
            .with_context(|| format!("Config: Failed to read {:?}", path))?;
        settings
            .try_deserialize()
            .with_context(|| format!("Config: Invalid filter configuration in {:?}", path))
    }

    /// Compile the predicate and mappings. `filter_override` replaces the
    /// configured predicate when given.
    pub fn compile(&self, filter_override: Option<&str>) -> Result<CompiledConfig> {
        let source = filter_override
            .or(self.filter.as_deref())
            .context("Config: No filter given; pass --where or set `filter` in the config")?;

        let filter = Filter::compile(source)
            .map_err(|e| anyhow::anyhow!("Config: Invalid filter '{}': {}", source, e))?;

        let mappings = self
            .mappings
            .iter()
            .map(|(name, config)| Ok((name.clone(), Mapping::compile(name, config)?)))
            .collect::<Result<Vec<_>>>()
            .context("Config: Failed to compile mappings")?;

        Ok(CompiledConfig { filter, mappings })
    }
}

#[derive(Debug, Clone)]
pub struct CompiledConfig {
    pub filter: Filter,
    pub mappings: Vec<(String, Mapping)>,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub batch_size: usize,
    pub strict: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            strict: false,
        }
    }
}

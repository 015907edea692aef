use crate::definition::InstrumentDefinition;
use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

const DEFAULT_INSTRUMENTS: &str = include_str!("instruments.toml");

static DEFAULT_CATALOG: OnceLock<Result<InstrumentCatalog>> = OnceLock::new();

/// Every instrument a run may target, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentCatalog {
    #[serde(default)]
    pub instrument: Vec<InstrumentDefinition>,
}

impl InstrumentCatalog {
    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn find(&self, name: &str) -> Option<&InstrumentDefinition> {
        self.instrument.iter().find(|def| def.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.instrument.iter().map(|def| def.name.as_str())
    }
}

/// The built-in instrument table.
pub fn default_catalog() -> Result<&'static InstrumentCatalog> {
    match DEFAULT_CATALOG.get_or_init(|| {
        InstrumentCatalog::from_toml(DEFAULT_INSTRUMENTS).context("built-in instrument table")
    }) {
        Ok(catalog) => Ok(catalog),
        Err(e) => Err(anyhow!("{e:#}")),
    }
}

/// Load instruments from `path`, or the built-in table when no path is given
/// or the file does not exist.
pub fn load_catalog(path: Option<&Path>) -> Result<InstrumentCatalog> {
    let Some(path) = path else {
        return default_catalog().cloned();
    };
    if !path.exists() {
        warn!(
            "could not find instrument file at {}, falling back to built-in instruments",
            path.display()
        );
        return default_catalog().cloned();
    }
    let s = std::fs::read_to_string(path).with_context(|| path.display().to_string())?;
    InstrumentCatalog::from_toml(&s).with_context(|| path.display().to_string())
}

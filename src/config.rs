//! Runtime configuration.
//!
//! Precedence: explicit path > `DOCGATE_CONFIG` > `./docgate.toml` > defaults,
//! then `DOCGATE_*` environment variables override individual values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::collector::{DEFAULT_IDENTITY_FIELD, DEFAULT_PAGE_LIMIT};
use crate::errors::GateError;
use crate::filter::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_SORT_FIELDS};
use crate::registry::{Expose, PropertyRegistry, ValueType};

const DEFAULT_MAX_LIMIT: u64 = 10_000;
const CONFIG_FILE: &str = "docgate.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    pub dir: Option<PathBuf>,
    pub level: Option<String>,
    pub retention: Option<usize>,
}

/// One exposed storage field, as declared in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyConfig {
    pub field: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub filterable: bool,
    #[serde(default, rename = "type")]
    pub value_type: ValueType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<PropertyConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub identity_field: String,
    pub default_limit: u64,
    pub max_limit: u64,
    pub max_filter_depth: usize,
    pub max_sort_fields: usize,
    pub log: LogConfig,
    pub entities: Vec<EntityConfig>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
            max_filter_depth: DEFAULT_MAX_DEPTH,
            max_sort_fields: DEFAULT_MAX_SORT_FIELDS,
            log: LogConfig::default(),
            entities: Vec::new(),
        }
    }
}

impl GateConfig {
    /// # Errors
    /// Returns `GateError::Config` on malformed TOML or inconsistent limits.
    pub fn from_toml_str(s: &str) -> Result<Self, GateError> {
        let cfg: Self = toml::from_str(s).map_err(|e| GateError::Config(e.to_string()))?;
        cfg.check()?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns `GateError::Config` if a named config file is missing or malformed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, GateError> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("DOCGATE_CONFIG").ok().map(PathBuf::from));
        let mut cfg = match named {
            Some(path) => Self::from_file(&path)?,
            None => {
                let local = PathBuf::from(CONFIG_FILE);
                if local.exists() { Self::from_file(&local)? } else { Self::default() }
            }
        };
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    fn from_file(path: &Path) -> Result<Self, GateError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| GateError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&s)
    }

    /// Applies `DOCGATE_IDENTITY_FIELD`, `DOCGATE_DEFAULT_LIMIT` and `DOCGATE_MAX_LIMIT`
    /// as returned by `var`.
    ///
    /// # Errors
    /// Returns `GateError::Config` for unparseable numbers.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), GateError> {
        if let Some(field) = var("DOCGATE_IDENTITY_FIELD").filter(|s| !s.is_empty()) {
            self.identity_field = field;
        }
        if let Some(s) = var("DOCGATE_DEFAULT_LIMIT") {
            self.default_limit = parse_u64("DOCGATE_DEFAULT_LIMIT", &s)?;
        }
        if let Some(s) = var("DOCGATE_MAX_LIMIT") {
            self.max_limit = parse_u64("DOCGATE_MAX_LIMIT", &s)?;
        }
        self.check()
    }

    fn check(&self) -> Result<(), GateError> {
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(GateError::Config(format!(
                "default_limit must be between 1 and max_limit ({})",
                self.max_limit
            )));
        }
        if self.identity_field.is_empty() {
            return Err(GateError::Config("identity_field must not be empty".into()));
        }
        Ok(())
    }

    /// Builds the registry declared for `entity`.
    ///
    /// # Errors
    /// Returns `GateError::Config` if the entity is not declared or exposes a name twice.
    pub fn registry(&self, entity: &str) -> Result<PropertyRegistry, GateError> {
        let decl = self
            .entities
            .iter()
            .find(|e| e.name == entity)
            .ok_or_else(|| GateError::Config(format!("entity '{entity}' is not declared")))?;
        decl.properties
            .iter()
            .fold(PropertyRegistry::builder(&decl.name), |b, p| {
                let mut opts = Expose::new().value_type(p.value_type);
                if p.filterable {
                    opts = opts.filterable();
                }
                if let Some(alias) = &p.alias {
                    opts = opts.alias(alias.clone());
                }
                b.expose(p.field.clone(), opts)
            })
            .build()
    }
}

fn parse_u64(key: &str, s: &str) -> Result<u64, GateError> {
    s.trim().parse::<u64>().map_err(|e| GateError::Config(format!("{key}: {e}")))
}

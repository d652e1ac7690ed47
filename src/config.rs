//! Configuration loaded from YAML.
//!
//! Every section has defaults, so an empty document yields a working setup
//! pointed at the public Ubergraph endpoint:
//!
//! ```yaml
//! sparql:
//!   endpoint: https://ubergraph.apps.renci.org/sparql
//!   timeout_secs: 120
//!   prefixes:
//!     EXO: http://example.org/exo_
//! query:
//!   chunk_size: 90
//!   mirror_chunk_size: 45
//!   default_predicates: ["rdfs:subClassOf"]
//! logger:
//!   enable: true
//!   level: info
//!   format: compact
//! ```

use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    errors::{Error, Result},
    ontology::value_objects::PrefixMap,
};

pub const DEFAULT_ENDPOINT: &str = "https://ubergraph.apps.renci.org/sparql";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub sparql: SparqlSettings,
    #[serde(default)]
    pub query: QuerySettings,
    #[serde(default)]
    pub logger: Logger,
}

/// Query service connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct SparqlSettings {
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Extra prefixes, merged over the built-in ones.
    pub prefixes: BTreeMap<String, String>,
}

impl Default for SparqlSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 120,
            prefixes: BTreeMap::new(),
        }
    }
}

impl SparqlSettings {
    /// Built-in prefixes extended with the configured ones.
    #[must_use]
    pub fn prefix_map(&self) -> PrefixMap {
        let mut map = PrefixMap::default();
        map.extend(self.prefixes.clone());
        map
    }
}

/// Batching and defaults for enrichment queries.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct QuerySettings {
    /// CURIEs per `VALUES` block for validation and enrichment queries.
    pub chunk_size: usize,
    /// Subject and object chunk size of the mirror query.
    pub mirror_chunk_size: usize,
    pub default_predicates: Vec<String>,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            chunk_size: 90,
            mirror_chunk_size: 45,
            default_predicates: vec!["rdfs:subClassOf".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Logger {
    pub enable: bool,
    pub level: LogLevel,
    pub format: LogFormat,
    /// Replaces the level-derived filter entirely, e.g. `ontoseed=trace`.
    pub override_filter: Option<String>,
    pub file_appender: Option<LoggerFileAppender>,
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            enable: true,
            level: LogLevel::default(),
            format: LogFormat::default(),
            override_filter: None,
            file_appender: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

/// Rolling file output, written through a non-blocking worker.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggerFileAppender {
    pub dir: String,
    #[serde(default = "default_file_prefix")]
    pub filename_prefix: String,
    #[serde(default)]
    pub rotation: LogRotation,
}

fn default_file_prefix() -> String {
    "ontoseed.log".to_string()
}

impl Config {
    /// Reads and parses a YAML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parses a YAML document. An empty document yields the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

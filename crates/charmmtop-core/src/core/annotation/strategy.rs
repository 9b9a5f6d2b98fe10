use crate::core::models::residue::ResidueMetadata;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationStrategy {
    Sterol,
    Detergent,
    GenericLipid,
    Model,
}

#[derive(Debug, Error)]
#[error("Invalid annotation strategy string")]
pub struct ParseAnnotationStrategyError;

impl FromStr for AnnotationStrategy {
    type Err = ParseAnnotationStrategyError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sterol" => Ok(Self::Sterol),
            "detergent" => Ok(Self::Detergent),
            "generic-lipid" | "generic_lipid" | "lipid" => Ok(Self::GenericLipid),
            "model" => Ok(Self::Model),
            _ => Err(ParseAnnotationStrategyError),
        }
    }
}

impl fmt::Display for AnnotationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Sterol => "sterol",
                Self::Detergent => "detergent",
                Self::GenericLipid => "generic-lipid",
                Self::Model => "model",
            }
        )
    }
}

/// Maps residue metadata to an annotation strategy.
///
/// Residues outside `lipid_streams` are never annotated (they select
/// [`AnnotationStrategy::Model`]). Within a lipid stream the substream picks
/// the strategy, falling back to `default_strategy`.
///
/// ```toml
/// lipid_streams = ["lipid"]
/// default_strategy = "generic-lipid"
///
/// [substreams]
/// cholesterol = "sterol"
/// detergent = "detergent"
/// model = "model"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AnnotationRules {
    pub lipid_streams: Vec<String>,
    pub substreams: HashMap<String, AnnotationStrategy>,
    pub default_strategy: AnnotationStrategy,
}

impl Default for AnnotationRules {
    fn default() -> Self {
        Self {
            lipid_streams: vec!["lipid".to_string()],
            substreams: HashMap::from([
                ("cholesterol".to_string(), AnnotationStrategy::Sterol),
                ("detergent".to_string(), AnnotationStrategy::Detergent),
                ("model".to_string(), AnnotationStrategy::Model),
            ]),
            default_strategy: AnnotationStrategy::GenericLipid,
        }
    }
}

impl AnnotationRules {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| ConfigError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn select(&self, metadata: &ResidueMetadata) -> AnnotationStrategy {
        let is_lipid = metadata.stream.as_deref().is_some_and(|stream| {
            self.lipid_streams
                .iter()
                .any(|s| s.eq_ignore_ascii_case(stream))
        });
        if !is_lipid {
            return AnnotationStrategy::Model;
        }
        metadata
            .substream
            .as_deref()
            .and_then(|sub| self.substreams.get(&sub.to_lowercase()))
            .copied()
            .unwrap_or(self.default_strategy)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

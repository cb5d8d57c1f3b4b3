//! Network definition files.
//!
//! A network file describes a linear conditional Gaussian network as JSON:
//! every variable with its intercept, noise and weighted parents, plus an
//! optional random seed and view configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::GraphError;
use crate::inference::{InferenceError, LinearGaussianNetwork};
use crate::viz::DrawConfig;

/// Current network file format version.
/// Increment this when making breaking changes to the format.
pub const NETWORK_VERSION: u32 = 1;

fn default_weight() -> f64 {
    1.0
}

fn default_version() -> u32 {
    NETWORK_VERSION
}

/// A complete network definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkFile {
    /// Human-readable name.
    pub name: String,
    /// Format version for future compatibility.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Variables, in insertion order.
    pub nodes: Vec<VariableData>,
    /// Seed for the sampler; entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// How to draw the network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<DrawConfig>,
}

/// A single variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableData {
    pub id: String,
    /// Display label; the id when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Intercept of the conditional mean.
    pub mean: f64,
    /// Conditional standard deviation.
    pub stdev: f64,
    #[serde(default)]
    pub parents: Vec<ParentData>,
}

impl VariableData {
    pub fn new(id: impl Into<String>, mean: f64, stdev: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            mean,
            stdev,
            parents: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_parent(mut self, id: impl Into<String>, weight: f64) -> Self {
        self.parents.push(ParentData {
            id: id.into(),
            weight,
        });
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// A weighted parent link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentData {
    pub id: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// Error type for network file operations.
#[derive(Debug, Error)]
pub enum NetworkFileError {
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid network file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("incompatible network version: found {found}, expected <= {expected}")]
    IncompatibleVersion { found: u32, expected: u32 },
    #[error("invalid network: {0}")]
    Network(#[from] InferenceError),
    #[error("cannot display network: {0}")]
    Graph(#[from] GraphError),
}

impl NetworkFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: NETWORK_VERSION,
            nodes: Vec::new(),
            seed: None,
            view: None,
        }
    }

    /// Check if this file's version is readable by this build.
    pub fn is_compatible(&self) -> bool {
        self.version <= NETWORK_VERSION
    }

    /// The network shown when no file is given.
    pub fn demo() -> Self {
        let mut file = Self::new("Sprinkler");
        file.nodes = vec![
            VariableData::new("season", 0.0, 1.0).with_name("Season"),
            VariableData::new("rain", 0.5, 1.0)
                .with_name("Rain")
                .with_parent("season", 0.8),
            VariableData::new("sprinkler", 1.0, 0.75)
                .with_name("Sprinkler")
                .with_parent("season", -0.6),
            VariableData::new("wet", 0.0, 0.5)
                .with_name("Wet grass")
                .with_parent("rain", 1.0)
                .with_parent("sprinkler", 0.7),
            VariableData::new("slippery", 0.0, 0.5)
                .with_name("Slippery")
                .with_parent("wet", 1.2),
        ];
        file
    }

    /// Parse and version-check a JSON definition.
    pub fn from_json(json: &str) -> Result<Self, NetworkFileError> {
        let file: Self = serde_json::from_str(json)?;
        if !file.is_compatible() {
            return Err(NetworkFileError::IncompatibleVersion {
                found: file.version,
                expected: NETWORK_VERSION,
            });
        }
        Ok(file)
    }

    pub fn to_json(&self) -> Result<String, NetworkFileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the network. Parents may be listed before they are defined.
    pub fn build_network(&self) -> Result<LinearGaussianNetwork, NetworkFileError> {
        let mut network = match self.seed {
            Some(seed) => LinearGaussianNetwork::with_seed(seed),
            None => LinearGaussianNetwork::new(),
        };

        for node in &self.nodes {
            network.add_node(node.id.as_str(), node.display_name(), node.mean, node.stdev)?;
        }
        for node in &self.nodes {
            for parent in &node.parents {
                network.add_parent(&node.id, &parent.id, parent.weight)?;
            }
        }

        Ok(network)
    }

    /// View configuration, falling back to defaults.
    pub fn draw_config(&self) -> DrawConfig {
        let mut config = self.view.clone().unwrap_or_default();
        if self.view.is_none() {
            config.container = self.name.clone();
        }
        config
    }
}

impl Default for NetworkFile {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Save a network definition to a JSON file.
pub fn save_to_file(file: &NetworkFile, path: &Path) -> Result<(), NetworkFileError> {
    std::fs::write(path, file.to_json()?)?;
    Ok(())
}

/// Load a network definition from a JSON file.
pub fn load_from_file(path: &Path) -> Result<NetworkFile, NetworkFileError> {
    let json = std::fs::read_to_string(path)?;
    NetworkFile::from_json(&json)
}

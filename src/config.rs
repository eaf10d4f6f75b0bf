//! Settings for the `mlp` driver.

use crate::error::{Error, Result};

use serde_derive::Deserialize;
use std::fs::File;
use std::path::Path;

/// Training settings as read from a YAML file or the command line.
///
/// Every field may be omitted; [`resolve`](TrainConfig::resolve) fills the
/// gaps with defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainConfig {
    /// Neurons in the hidden layer
    pub hidden: Option<usize>,
    /// Classes, i.e. neurons in the output layer
    pub outputs: Option<usize>,
    pub epochs: Option<usize>,
    pub learning_rate: Option<f64>,
    /// Seed for the initial weights; drawn from entropy when absent
    pub seed: Option<u64>,
    /// Emit the epoch error every this many epochs
    pub log_every: Option<usize>,
}

/// Fully resolved training settings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Settings {
    pub hidden: usize,
    pub outputs: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub seed: Option<u64>,
    pub log_every: usize,
}

impl TrainConfig {
    /// Reads a config from the YAML file at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Ok(serde_yaml::from_reader(file)?)
    }

    /// Merges configs; fields set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        TrainConfig {
            hidden: other.hidden.or(self.hidden),
            outputs: other.outputs.or(self.outputs),
            epochs: other.epochs.or(self.epochs),
            learning_rate: other.learning_rate.or(self.learning_rate),
            seed: other.seed.or(self.seed),
            log_every: other.log_every.or(self.log_every),
        }
    }

    /// Applies defaults to every unset field.
    pub fn resolve(&self) -> Settings {
        Settings {
            hidden: self.hidden.unwrap_or(4),
            outputs: self.outputs.unwrap_or(2),
            epochs: self.epochs.unwrap_or(1000),
            learning_rate: self.learning_rate.unwrap_or(0.2),
            seed: self.seed,
            log_every: self.log_every.unwrap_or(100),
        }
    }
}

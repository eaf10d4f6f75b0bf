//! Utilities for training networks.

use crate::error::{Error, Result};
use crate::network::Network;
use crate::utils::{label_of, one_hot};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// A builder for training runs.
///
/// Training is online: weights are updated after every row, rows are visited
/// in order, and the run lasts a fixed number of epochs.
#[derive(Clone, Debug)]
pub struct Trainer {
    learning_rate: f64,
    epochs: usize,
    logging: Logging,
    cancel: Option<Arc<AtomicBool>>,
}

impl Trainer {
    /// Creates a new Trainer instance.
    ///
    /// Logs on training completion unless told otherwise.
    pub fn new(learning_rate: f64, epochs: usize) -> Self {
        Trainer {
            learning_rate,
            epochs,
            logging: Logging::Completion,
            cancel: None,
        }
    }

    /// Sets the type of logging to be emitted during training.
    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = logging;
        self
    }

    /// Sets a flag that stops training after the current epoch once raised.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Trains `network` in place on `dataset`.
    ///
    /// Every row holds the network's features followed by a class label in
    /// `[0, output_count)`. `output_count` must match the network's output
    /// layer. Nothing is modified if validation fails.
    #[instrument(skip_all, fields(rows = dataset.len(), epochs = self.epochs))]
    pub fn train(
        &self,
        network: &mut Network,
        dataset: &[Vec<f64>],
        output_count: usize,
    ) -> Result<Training> {
        let labels = self.validate(network, dataset, output_count)?;
        let targets: Vec<Vec<f64>> = labels
            .into_iter()
            .map(|label| one_hot(label, output_count))
            .collect();

        let start_time = Instant::now();
        let mut epoch_errors = Vec::with_capacity(self.epochs);
        let mut cancelled = false;
        for epoch in 0..self.epochs {
            if self.is_cancelled() {
                warn!(epoch, "training cancelled");
                cancelled = true;
                break;
            }
            let mut sum_error = 0.0;
            for (row, expected) in dataset.iter().zip(&targets) {
                sum_error += network.train_row(row, expected, self.learning_rate);
            }
            if !network.is_finite() {
                return Err(Error::NumericInstability { epoch });
            }
            self.logging.iteration(epoch, self.learning_rate, sum_error);
            epoch_errors.push(sum_error);
        }
        self.logging.completion(&epoch_errors, start_time);
        Ok(Training {
            epoch_errors,
            cancelled,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    /// Verifies the run's parameters against the network and returns the
    /// label of every row.
    fn validate(
        &self,
        network: &Network,
        dataset: &[Vec<f64>],
        output_count: usize,
    ) -> Result<Vec<usize>> {
        if !self.learning_rate.is_finite() {
            return Err(Error::InvalidConfiguration(format!(
                "learning rate {} is not finite",
                self.learning_rate
            )));
        }
        if output_count != network.output_count() {
            return Err(Error::InvalidConfiguration(format!(
                "{} classes requested but the network has {} outputs",
                output_count,
                network.output_count()
            )));
        }
        let width = network.input_count() + 1;
        dataset
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if row.len() < width {
                    return Err(Error::InvalidConfiguration(format!(
                        "row {} has {} values, expected {} features and a label",
                        i,
                        row.len(),
                        network.input_count()
                    )));
                }
                match label_of(row) {
                    Some(label) if label < output_count => Ok(label),
                    _ => Err(Error::InvalidLabel {
                        row: i,
                        label: row[row.len() - 1],
                    }),
                }
            })
            .collect()
    }
}

/// The result of a training run.
#[derive(Clone, Debug, PartialEq)]
pub struct Training {
    /// The summed squared error of every completed epoch.
    pub epoch_errors: Vec<f64>,
    /// True if the cancel flag stopped the run early.
    pub cancelled: bool,
}

/// Logging frequency to use during training
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Logging {
    /// No logs will be emitted
    Silent,
    /// A summary will be emitted at completion
    Completion,
    /// A summary will be emitted after every `n` epochs
    Iterations(usize),
}

impl Logging {
    /// Performs logging at the end of `epoch`.
    fn iteration(&self, epoch: usize, learning_rate: f64, error: f64) {
        match *self {
            Logging::Iterations(freq) if freq > 0 && epoch % freq == 0 => {
                info!(epoch, learning_rate, error, "epoch complete");
            }
            Logging::Silent => {}
            _ => debug!(epoch, learning_rate, error, "epoch complete"),
        }
    }

    /// Performs logging at the end of training.
    fn completion(&self, epoch_errors: &[f64], start_time: Instant) {
        if let Logging::Silent = *self {
            return;
        }
        info!(
            epochs = epoch_errors.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            final_error = epoch_errors.last().copied(),
            "training complete"
        );
    }
}

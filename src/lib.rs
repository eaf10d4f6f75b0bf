//! A multilayer perceptron with one hidden layer, trained with online
//! backpropagation.

pub mod config;
pub mod dataset;
pub mod error;
pub mod layer;
pub mod network;
pub mod neuron;
pub mod trainer;
pub mod weights;

mod utils;

pub use error::{Error, Result};
pub use network::{Evaluation, Network};
pub use trainer::{Logging, Trainer, Training};

use crate::error::{Error, Result};
use crate::neuron::Neuron;

use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use serde_derive::Serialize;

/// A single layer of the network.
///
/// The same type serves as both the hidden and the output layer. Every neuron
/// weighs the same number of inputs, and the neuron count never changes after
/// construction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Layer {
    neurons: Vec<Neuron>,
}

impl Layer {
    /// Initializes a new, untrained layer.
    ///
    /// Arguments:
    ///
    ///  * `neuron_count` - the number of neurons in the layer.
    ///  * `input_width` - the number of inputs to each neuron. Every neuron
    ///                    receives `input_width + 1` weights, the last being
    ///                    its bias.
    ///  * `rng` - the random source; each weight is drawn from `[0, 1)`.
    pub fn random<R>(neuron_count: usize, input_width: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let range = Uniform::new(0.0, 1.0);
        let neurons = (0..neuron_count)
            .map(|_| {
                let weights = (0..input_width + 1).map(|_| range.sample(rng)).collect();
                Neuron::new(weights)
            })
            .collect();
        Layer { neurons }
    }

    /// Rebuilds a layer from one weight vector per neuron, bias last.
    ///
    /// Fails if there are no neurons, if a neuron has no weights, or if the
    /// neurons disagree on their input width.
    pub fn from_weights(weights: Vec<Vec<f64>>) -> Result<Self> {
        let width = match weights.first() {
            Some(first) => first.len(),
            None => {
                return Err(Error::InvalidConfiguration(
                    "a layer needs at least one neuron".into(),
                ))
            }
        };
        if width == 0 {
            return Err(Error::InvalidConfiguration(
                "a neuron needs at least a bias weight".into(),
            ));
        }
        if let Some(i) = weights.iter().position(|w| w.len() != width) {
            return Err(Error::InvalidConfiguration(format!(
                "neuron {} has {} weights, expected {}",
                i,
                weights[i].len(),
                width
            )));
        }
        Ok(Layer {
            neurons: weights.into_iter().map(Neuron::new).collect(),
        })
    }

    /// Returns every neuron's weight vector, in neuron order.
    pub fn weights(&self) -> Vec<Vec<f64>> {
        self.neurons.iter().map(|n| n.weights().to_vec()).collect()
    }

    /// Returns the number of neurons in this layer.
    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    /// Returns the number of inputs each neuron weighs, excluding the bias.
    pub fn input_width(&self) -> usize {
        self.neurons.first().map_or(0, Neuron::input_width)
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub(crate) fn neurons_mut(&mut self) -> &mut [Neuron] {
        &mut self.neurons
    }

    /// Returns the outputs stored by the last forward pass.
    pub fn outputs(&self) -> Vec<f64> {
        self.neurons.iter().map(Neuron::output).collect()
    }

    /// Feeds `inputs` through every neuron, storing and returning the outputs.
    pub(crate) fn forward(&mut self, inputs: &[f64]) -> Vec<f64> {
        self.neurons
            .iter_mut()
            .map(|neuron| {
                let output = Neuron::transfer(neuron.activate(inputs));
                neuron.set_output(output);
                output
            })
            .collect()
    }

    /// Applies the update rule to every neuron using its stored delta.
    pub(crate) fn adjust(&mut self, inputs: &[f64], rate: f64) {
        for neuron in &mut self.neurons {
            neuron.adjust(inputs, rate);
        }
    }

    /// Returns true if every weight is a finite number.
    pub(crate) fn is_finite(&self) -> bool {
        self.neurons
            .iter()
            .all(|n| n.weights().iter().all(|w| w.is_finite()))
    }
}

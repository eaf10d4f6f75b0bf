//! A single sigmoid neuron.

use serde_derive::Serialize;

/// One neuron of a layer.
///
/// The final weight is the bias, combined with an implicit constant input of
/// `1.0`. `output` and `delta` hold the results of the most recent forward and
/// backward passes and are overwritten by the next one.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Neuron {
    weights: Vec<f64>,
    #[serde(skip)]
    output: f64,
    #[serde(skip)]
    delta: f64,
}

impl Neuron {
    /// Creates a neuron from its weights, bias last.
    ///
    /// # Panics
    ///
    /// If `weights` is empty; every neuron carries at least its bias.
    pub fn new(weights: Vec<f64>) -> Self {
        assert!(!weights.is_empty(), "a neuron needs at least a bias weight");
        Neuron {
            weights,
            output: 0.0,
            delta: 0.0,
        }
    }

    /// All weights, bias last.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// The number of inputs this neuron weighs, excluding the bias.
    pub fn input_width(&self) -> usize {
        self.weights.len() - 1
    }

    pub fn bias(&self) -> f64 {
        self.weights[self.weights.len() - 1]
    }

    /// The output stored by the last forward pass.
    pub fn output(&self) -> f64 {
        self.output
    }

    /// The error signal stored by the last backward pass.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub(crate) fn set_output(&mut self, output: f64) {
        self.output = output;
    }

    pub(crate) fn set_delta(&mut self, delta: f64) {
        self.delta = delta;
    }

    /// Computes the weighted sum of `inputs` plus the bias.
    ///
    /// Only the first `min(input_width, inputs.len())` inputs participate.
    /// Extra inputs, such as the trailing label of a training row, are
    /// ignored, and weights without a matching input contribute nothing.
    pub fn activate(&self, inputs: &[f64]) -> f64 {
        match self.weights.split_last() {
            Some((bias, weights)) => weights
                .iter()
                .zip(inputs)
                .fold(*bias, |sum, (w, x)| sum + w * x),
            None => 0.0,
        }
    }

    /// The sigmoid `1 / (1 + e^-x)`.
    pub fn transfer(activation: f64) -> f64 {
        1.0 / (1.0 + (-activation).exp())
    }

    /// The sigmoid derivative, expressed through the neuron's own output.
    ///
    /// Takes `y = transfer(x)` rather than `x`, so nothing before activation
    /// needs to be stored.
    pub fn transfer_derivative(output: f64) -> f64 {
        output * (1.0 - output)
    }

    /// Moves the weights along the stored delta.
    ///
    /// Every weight with a matching input gains `rate * delta * input`, and
    /// the bias gains `rate * delta`. Inputs are matched the same way as in
    /// [`activate`](Neuron::activate).
    pub fn adjust(&mut self, inputs: &[f64], rate: f64) {
        let step = rate * self.delta;
        if let Some((bias, weights)) = self.weights.split_last_mut() {
            for (w, x) in weights.iter_mut().zip(inputs) {
                *w += step * x;
            }
            *bias += step;
        }
    }
}

//! A [multilayer perceptron](https://en.wikipedia.org/wiki/Multilayer_perceptron)
//! with a single hidden layer.
//!
//! # Example
//!
//! Let's separate two clusters of points:
//!
//! ```
//! # use mlp::network::Network;
//! # use rand::SeedableRng;
//! let dataset = vec![
//!     vec![2.7810836, 2.550537003, 0.0],
//!     vec![1.465489372, 2.362125076, 0.0],
//!     vec![7.627531214, 2.759262235, 1.0],
//!     vec![5.332441248, 2.088626775, 1.0],
//! ];
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let mut network = Network::new(2, 4, 2, &mut rng).unwrap();
//! let errors = network.train(&dataset, 0.2, 50, 2).unwrap();
//! assert_eq!(errors.len(), 50);
//!
//! let class = network.predict(&[3.0, 2.5]);
//! assert!(class < 2);
//! ```

use crate::error::{Error, Result};
use crate::layer::Layer;
use crate::neuron::Neuron;
use crate::trainer::{Logging, Trainer};
use crate::utils::{argmax, label_of};

use rand::Rng;
use serde_derive::Serialize;
use tracing::debug;

/// A network of one hidden and one output layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Network {
    hidden: Layer,
    output: Layer,
}

impl Network {
    /// Creates a new, untrained network with random weights.
    ///
    /// Arguments:
    ///  * `input_count` - the number of features in a row.
    ///  * `hidden_count` - the number of neurons in the hidden layer.
    ///  * `output_count` - the number of neurons in the output layer, one per
    ///                     class.
    ///  * `rng` - the source of the initial weights.
    pub fn new<R>(
        input_count: usize,
        hidden_count: usize,
        output_count: usize,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        if hidden_count == 0 || output_count == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "hidden and output layers need neurons, got {} and {}",
                hidden_count, output_count
            )));
        }
        let hidden = Layer::random(hidden_count, input_count, rng);
        let output = Layer::random(output_count, hidden_count, rng);
        Ok(Network { hidden, output })
    }

    /// Assembles a network from existing layers, such as imported weights.
    ///
    /// The output layer must weigh exactly one input per hidden neuron.
    pub fn from_layers(hidden: Layer, output: Layer) -> Result<Self> {
        if hidden.is_empty() || output.is_empty() {
            return Err(Error::InvalidConfiguration(
                "hidden and output layers need neurons".into(),
            ));
        }
        if output.input_width() != hidden.len() {
            return Err(Error::InvalidConfiguration(format!(
                "output layer weighs {} inputs but the hidden layer has {} neurons",
                output.input_width(),
                hidden.len()
            )));
        }
        Ok(Network { hidden, output })
    }

    /// Returns the number of features the network reads from a row.
    pub fn input_count(&self) -> usize {
        self.hidden.input_width()
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }

    /// Returns the number of classes the network distinguishes.
    pub fn output_count(&self) -> usize {
        self.output.len()
    }

    pub fn hidden(&self) -> &Layer {
        &self.hidden
    }

    pub fn output(&self) -> &Layer {
        &self.output
    }

    /// Feeds `row` through the network, returning the output layer.
    ///
    /// Every neuron's stored output is overwritten, so a backward pass must
    /// follow for the same row before any other propagation.
    pub fn forward_propagate(&mut self, row: &[f64]) -> Vec<f64> {
        let hidden_outputs = self.hidden.forward(row);
        self.output.forward(&hidden_outputs)
    }

    /// Assigns every neuron its error delta for the `expected` outputs.
    ///
    /// Output deltas follow the usual rule. The hidden deltas do *not*: for
    /// every output neuron in turn, a running sum starts at zero and walks all
    /// hidden weights (neuron by neuron, bias included), adding
    /// `weight * output delta` and recording each partial sum. Hidden neuron
    /// `h` is scaled by the `h`-th recorded sum. The connecting output weights
    /// are never consulted, so this is not the gradient of the squared error.
    ///
    /// # Panics
    ///
    /// If `expected` does not hold one value per output neuron.
    pub fn back_propagate(&mut self, expected: &[f64]) {
        assert_eq!(expected.len(), self.output.len());
        for (neuron, target) in self.output.neurons_mut().iter_mut().zip(expected) {
            let output = neuron.output();
            neuron.set_delta((target - output) * Neuron::transfer_derivative(output));
        }

        let wanted = self.hidden.len();
        let mut signals = Vec::with_capacity(wanted);
        'outputs: for out in self.output.neurons() {
            let mut error = 0.0;
            for weight in self.hidden.neurons().iter().flat_map(Neuron::weights) {
                if signals.len() == wanted {
                    break 'outputs;
                }
                error += weight * out.delta();
                signals.push(error);
            }
        }

        for (neuron, signal) in self.hidden.neurons_mut().iter_mut().zip(signals) {
            let output = neuron.output();
            neuron.set_delta(signal * Neuron::transfer_derivative(output));
        }
    }

    /// Moves every weight along its neuron's delta.
    ///
    /// The hidden layer reads its inputs from `row`; the output layer reads
    /// the hidden layer's stored outputs.
    pub fn update_weights(&mut self, row: &[f64], learning_rate: f64) {
        self.hidden.adjust(row, learning_rate);
        let inputs = self.hidden.outputs();
        self.output.adjust(&inputs, learning_rate);
    }

    /// Trains the network on `dataset` with online gradient descent.
    ///
    /// Every row is a list of features followed by its class label. Rows are
    /// visited in order, `epochs` times. Returns the summed squared error of
    /// each epoch.
    pub fn train(
        &mut self,
        dataset: &[Vec<f64>],
        learning_rate: f64,
        epochs: usize,
        output_count: usize,
    ) -> Result<Vec<f64>> {
        let training = Trainer::new(learning_rate, epochs)
            .logging(Logging::Iterations(1))
            .train(self, dataset, output_count)?;
        Ok(training.epoch_errors)
    }

    /// Runs one training step on `row` and returns its squared error.
    ///
    /// `expected` is the one-hot encoding of the row's label.
    pub(crate) fn train_row(&mut self, row: &[f64], expected: &[f64], learning_rate: f64) -> f64 {
        let outputs = self.forward_propagate(row);
        let error: f64 = outputs
            .iter()
            .zip(expected)
            .map(|(o, e)| (e - o) * (e - o))
            .sum();
        self.back_propagate(expected);
        self.update_weights(row, learning_rate);
        error
    }

    /// Returns the class the network assigns to `row`.
    ///
    /// A trailing label in `row` is ignored. Ties go to the lowest index.
    pub fn predict(&mut self, row: &[f64]) -> usize {
        let outputs = self.forward_propagate(row);
        debug!(?outputs, "predicted outputs");
        argmax(&outputs)
    }

    /// Predicts every row of `dataset` and compares against its label.
    pub fn evaluate(&mut self, dataset: &[Vec<f64>]) -> Evaluation {
        let mut correct = 0;
        for row in dataset {
            let predicted = self.predict(row);
            let expected = label_of(row);
            debug!(?expected, predicted, "scored row");
            if expected == Some(predicted) {
                correct += 1;
            }
        }
        Evaluation {
            correct,
            total: dataset.len(),
        }
    }

    /// Returns true if every weight is a finite number.
    pub(crate) fn is_finite(&self) -> bool {
        self.hidden.is_finite() && self.output.is_finite()
    }
}

/// The outcome of scoring a network against labelled rows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub correct: usize,
    pub total: usize,
}

impl Evaluation {
    /// The fraction of rows classified correctly, `0.0` for no rows.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixed(hidden: Vec<Vec<f64>>, output: Vec<Vec<f64>>) -> Network {
        Network::from_layers(
            Layer::from_weights(hidden).unwrap(),
            Layer::from_weights(output).unwrap(),
        )
        .unwrap()
    }

    fn clusters() -> Vec<Vec<f64>> {
        vec![
            vec![2.7810836, 2.550537003, 0.0],
            vec![1.465489372, 2.362125076, 0.0],
            vec![3.396561688, 4.400293529, 0.0],
            vec![1.38807019, 1.850220317, 0.0],
            vec![3.06407332, 3.005305973, 0.0],
            vec![7.627531214, 2.759262235, 1.0],
            vec![5.332441248, 2.088626775, 1.0],
            vec![6.922596716, 1.77106367, 1.0],
            vec![8.675418651, -0.242068655, 1.0],
            vec![7.673756466, 3.508563011, 1.0],
        ]
    }

    #[test]
    fn topology() {
        let mut rng = StdRng::seed_from_u64(3);
        let network = Network::new(3, 5, 2, &mut rng).unwrap();
        assert_eq!(network.input_count(), 3);
        assert_eq!(network.hidden_count(), 5);
        assert_eq!(network.output_count(), 2);
        assert!(network.hidden().neurons().iter().all(|n| n.weights().len() == 4));
        assert!(network.output().neurons().iter().all(|n| n.weights().len() == 6));
    }

    #[test]
    fn zero_inputs() {
        let mut rng = StdRng::seed_from_u64(3);
        let network = Network::new(0, 2, 2, &mut rng).unwrap();
        assert!(network.hidden().neurons().iter().all(|n| n.weights().len() == 1));
    }

    #[test]
    fn empty_hidden_layer() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(Network::new(2, 0, 2, &mut rng).is_err());
    }

    #[test]
    fn empty_output_layer() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(Network::new(2, 2, 0, &mut rng).is_err());
    }

    #[test]
    fn mismatched_layers() {
        let hidden = Layer::from_weights(vec![vec![0.1, 0.2]; 3]).unwrap();
        let output = Layer::from_weights(vec![vec![0.1, 0.2, 0.3]]).unwrap();
        assert!(Network::from_layers(hidden, output).is_err());
    }

    #[test]
    fn forward_with_fixed_weights() {
        let mut network = fixed(
            vec![vec![0.5, -0.25, 0.1], vec![-1.0, 0.75, 0.0]],
            vec![vec![1.0, 2.0, -1.5]],
        );
        let row = [1.0, 2.0, 0.0];
        let h0 = 1.0 / (1.0 + (-(0.1 + 0.5 * 1.0 - 0.25 * 2.0f64)).exp());
        let h1 = 1.0 / (1.0 + (-(0.0 - 1.0 * 1.0 + 0.75 * 2.0f64)).exp());
        let o0 = 1.0 / (1.0 + (-(-1.5 + 1.0 * h0 + 2.0 * h1)).exp());

        let outputs = network.forward_propagate(&row);
        assert_eq!(outputs.len(), 1);
        assert_abs_diff_eq!(outputs[0], o0, epsilon = 1e-6);
        assert_abs_diff_eq!(network.hidden().outputs()[0], h0, epsilon = 1e-6);
        assert_abs_diff_eq!(network.hidden().outputs()[1], h1, epsilon = 1e-6);
    }

    #[test]
    fn output_deltas_and_update() {
        // Zero weights put every output at 0.5 and every derivative at 0.25.
        let mut network = fixed(vec![vec![0.0, 0.0, 0.0]; 2], vec![vec![0.0, 0.0, 0.0]; 2]);
        let row = [3.0, -2.0, 1.0];
        network.forward_propagate(&row);
        network.back_propagate(&[0.0, 1.0]);

        assert_eq!(network.output().neurons()[0].delta(), -0.125);
        assert_eq!(network.output().neurons()[1].delta(), 0.125);
        assert!(network.hidden().neurons().iter().all(|n| n.delta() == 0.0));

        network.update_weights(&row, 0.5);
        assert_eq!(network.hidden().weights(), vec![vec![0.0, 0.0, 0.0]; 2]);
        assert_eq!(
            network.output().weights(),
            vec![vec![-0.03125, -0.03125, -0.0625], vec![0.03125, 0.03125, 0.0625]]
        );
    }

    #[test]
    fn hidden_deltas_use_hidden_weights() {
        // The output weights are all zero, yet the hidden neurons still
        // receive deltas taken from partial sums over the hidden weights.
        let mut network = fixed(vec![vec![0.5, 0.0], vec![0.25, 0.0]], vec![vec![0.0, 0.0, 0.0]]);
        let row = [0.0, 0.0];
        let errors = network.train(&[row.to_vec()], 1.0, 1, 1).unwrap();

        assert_eq!(errors, vec![0.25]);
        assert_eq!(network.output().neurons()[0].delta(), 0.125);
        assert_eq!(network.hidden().neurons()[0].delta(), 0.015625);
        assert_eq!(network.hidden().neurons()[1].delta(), 0.015625);
        assert_eq!(
            network.hidden().weights(),
            vec![vec![0.5, 0.015625], vec![0.25, 0.015625]]
        );
        assert_eq!(network.output().weights(), vec![vec![0.0625, 0.0625, 0.125]]);
    }

    #[test]
    fn hidden_signals_span_neurons() {
        // With one weight per hidden neuron the partial sums run across
        // neurons: 1 * d, (1 + 2) * d, (1 + 2 + 3) * d.
        let mut network = fixed(vec![vec![1.0], vec![2.0], vec![3.0]], vec![vec![0.0; 4]]);
        network.forward_propagate(&[]);
        network.back_propagate(&[1.0]);

        let d = network.output().neurons()[0].delta();
        assert_abs_diff_eq!(d, 0.125);
        for (neuron, sum) in network.hidden().neurons().iter().zip(&[1.0, 3.0, 6.0]) {
            let y = neuron.output();
            assert_abs_diff_eq!(neuron.delta(), sum * d * y * (1.0 - y), epsilon = 1e-12);
        }
    }

    #[test]
    fn predict_picks_largest_output() {
        let mut network = fixed(
            vec![vec![0.0]],
            vec![vec![0.0, -1.0], vec![0.0, 2.0], vec![0.0, 1.0]],
        );
        assert_eq!(network.predict(&[]), 1);
    }

    #[test]
    fn predict_ties_go_to_first() {
        let mut network = fixed(
            vec![vec![0.0]],
            vec![vec![0.0, -1.0], vec![0.0, 2.0], vec![0.0, 2.0]],
        );
        assert_eq!(network.predict(&[7.0]), 1);
    }

    #[test]
    fn separates_clusters() {
        let dataset = clusters();
        let mut network = fixed(
            vec![
                vec![0.13, 0.85, 0.76],
                vec![0.26, 0.50, 0.45],
                vec![0.65, 0.79, 0.09],
                vec![0.03, 0.84, 0.43],
            ],
            vec![vec![0.47, 0.38, 0.73, 0.21, 0.92], vec![0.54, 0.18, 0.61, 0.05, 0.37]],
        );
        let errors = network.train(&dataset, 0.2, 300, 2).unwrap();
        assert_eq!(errors.len(), 300);
        assert!(errors[299] < errors[0]);

        let score = network.evaluate(&dataset);
        assert_eq!(score.total, 10);
        assert!(score.accuracy() >= 0.9, "{:?}", score);
    }

    #[test]
    fn seeded_training_is_reproducible() {
        let dataset = clusters();
        let mut a = Network::new(2, 3, 2, &mut StdRng::seed_from_u64(11)).unwrap();
        let mut b = Network::new(2, 3, 2, &mut StdRng::seed_from_u64(11)).unwrap();
        let ea = a.train(&dataset, 0.2, 20, 2).unwrap();
        let eb = b.train(&dataset, 0.2, 20, 2).unwrap();
        assert_eq!(ea, eb);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_evaluation() {
        let score = Evaluation { correct: 0, total: 0 };
        assert_eq!(score.accuracy(), 0.0);
    }
}

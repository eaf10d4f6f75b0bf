//! Weight export and import.
//!
//! Each layer is stored as its own CSV file with one line per neuron, in
//! neuron order, holding that neuron's weights with the bias last. Values use
//! the shortest representation that parses back to the same `f64`, so an
//! exported network imports bit for bit.

use crate::dataset;
use crate::error::{Error, Result};
use crate::layer::Layer;
use crate::network::Network;

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// Writes the weights of every neuron in `layer` to `writer`.
pub fn export<W: Write>(layer: &Layer, writer: W) -> Result<()> {
    dataset::to_writer(writer, &layer.weights())
}

/// Reads a layer back from the format written by [`export`].
///
/// The number of weights per neuron is taken from the data.
pub fn import<R: Read>(reader: R) -> Result<Layer> {
    Layer::from_weights(dataset::from_reader(reader)?)
}

/// Exports both layers of `network` to the files at the given paths.
pub fn save_network<P, Q>(network: &Network, hidden_path: P, output_path: Q) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    save_layer(network.hidden(), hidden_path.as_ref())?;
    save_layer(network.output(), output_path.as_ref())?;
    info!(
        hidden = %hidden_path.as_ref().display(),
        output = %output_path.as_ref().display(),
        "exported weights"
    );
    Ok(())
}

/// Imports a network from a pair of layer files.
///
/// The input count is implied by the hidden layer's weights, and the output
/// layer must weigh one input per hidden neuron.
pub fn load_network<P, Q>(hidden_path: P, output_path: Q) -> Result<Network>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let hidden = load_layer(hidden_path.as_ref())?;
    let output = load_layer(output_path.as_ref())?;
    let network = Network::from_layers(hidden, output)?;
    info!(
        inputs = network.input_count(),
        hidden = network.hidden_count(),
        outputs = network.output_count(),
        "imported weights"
    );
    Ok(network)
}

fn save_layer(layer: &Layer, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    export(layer, file)
}

fn load_layer(path: &Path) -> Result<Layer> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    import(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn one_line_per_neuron() {
        let layer = Layer::from_weights(vec![vec![0.5, -1.25, 2.0], vec![1e-7, 0.0, 3.5]]).unwrap();
        let mut buffer = Vec::new();
        export(&layer, &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "0.5,-1.25,2\n1e-7,0,3.5\n");
    }

    #[test]
    fn import_takes_width_from_data() {
        let layer = import("0.1,0.2,0.3,0.4\n0.5,0.6,0.7,0.8\n".as_bytes()).unwrap();
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.input_width(), 3);
        assert_eq!(layer.neurons()[1].bias(), 0.8);
    }

    #[test]
    fn import_rejects_empty_file() {
        assert!(import("".as_bytes()).is_err());
    }

    #[test]
    fn import_rejects_bad_numbers() {
        let result = import("0.1,x\n".as_bytes());
        assert!(matches!(result, Err(Error::Parse { line: 1, field: 1, .. })));
    }

    #[test]
    fn network_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let hidden_path = dir.path().join("hidden_layer.csv");
        let output_path = dir.path().join("output_layer.csv");

        let mut rng = StdRng::seed_from_u64(5);
        let mut network = Network::new(3, 4, 2, &mut rng).unwrap();
        save_network(&network, &hidden_path, &output_path).unwrap();
        let mut imported = load_network(&hidden_path, &output_path).unwrap();

        assert_eq!(imported.hidden().weights(), network.hidden().weights());
        assert_eq!(imported.output().weights(), network.output().weights());
        let row = [0.3, -1.2, 4.0, 1.0];
        assert_eq!(imported.forward_propagate(&row), network.forward_propagate(&row));
    }

    #[test]
    fn mismatched_layer_files() {
        let dir = tempfile::tempdir().unwrap();
        let hidden_path = dir.path().join("hidden_layer.csv");
        let output_path = dir.path().join("output_layer.csv");
        std::fs::write(&hidden_path, "0.1,0.2\n0.3,0.4\n").unwrap();
        std::fs::write(&output_path, "0.1,0.2\n").unwrap();
        let result = load_network(&hidden_path, &output_path);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn missing_layer_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_network(dir.path().join("a.csv"), dir.path().join("b.csv"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}

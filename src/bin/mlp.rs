use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mlp::config::TrainConfig;
use mlp::{dataset, weights, Evaluation, Logging, Network, Trainer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "Train and run a one-hidden-layer perceptron")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a new network on a CSV dataset
    Train {
        /// Training rows: features followed by a class label
        #[arg(short, long, value_name = "PATH")]
        data: PathBuf,
        /// Rows to score the trained network against
        #[arg(short, long, value_name = "PATH")]
        test: Option<PathBuf>,
        /// YAML file with training settings; flags take precedence
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,
        #[arg(long, value_name = "INT")]
        hidden: Option<usize>,
        #[arg(long, value_name = "INT")]
        outputs: Option<usize>,
        #[arg(short, long, value_name = "INT")]
        epochs: Option<usize>,
        #[arg(short, long, value_name = "FLOAT")]
        learning_rate: Option<f64>,
        #[arg(short, long, value_name = "INT")]
        seed: Option<u64>,
        #[arg(long, value_name = "INT")]
        log_every: Option<usize>,
        /// Directory to write hidden_layer.csv and output_layer.csv into
        #[arg(long, value_name = "DIR")]
        export: Option<PathBuf>,
    },
    /// Score previously exported weights against a CSV dataset
    Predict {
        #[arg(long, value_name = "PATH", default_value = "hidden_layer.csv")]
        hidden_weights: PathBuf,
        #[arg(long, value_name = "PATH", default_value = "output_layer.csv")]
        output_weights: PathBuf,
        #[arg(short, long, value_name = "PATH")]
        data: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    match Cli::parse().command {
        Command::Train {
            data,
            test,
            config,
            hidden,
            outputs,
            epochs,
            learning_rate,
            seed,
            log_every,
            export,
        } => {
            let file_config = match config {
                Some(path) => TrainConfig::from_file(&path)
                    .with_context(|| format!("reading config {}", path.display()))?,
                None => TrainConfig::default(),
            };
            let flags = TrainConfig {
                hidden,
                outputs,
                epochs,
                learning_rate,
                seed,
                log_every,
            };
            train(&data, test.as_deref(), file_config.merge(flags), export.as_deref())
        }
        Command::Predict {
            hidden_weights,
            output_weights,
            data,
        } => predict(&hidden_weights, &output_weights, &data),
    }
}

fn train(data: &Path, test: Option<&Path>, config: TrainConfig, export: Option<&Path>) -> Result<()> {
    let settings = config.resolve();
    let rows = load(data)?;
    let input_count = match rows.first() {
        Some(row) if !row.is_empty() => row.len() - 1,
        _ => bail!("{} holds no rows", data.display()),
    };

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut network = Network::new(input_count, settings.hidden, settings.outputs, &mut rng)?;
    info!(
        inputs = input_count,
        hidden = settings.hidden,
        outputs = settings.outputs,
        rows = rows.len(),
        "training network"
    );

    Trainer::new(settings.learning_rate, settings.epochs)
        .logging(Logging::Iterations(settings.log_every))
        .train(&mut network, &rows, settings.outputs)?;

    report("training", &network.evaluate(&rows));
    if let Some(test) = test {
        let rows = load(test)?;
        report("test", &network.evaluate(&rows));
    }

    if let Some(dir) = export {
        weights::save_network(
            &network,
            dir.join("hidden_layer.csv"),
            dir.join("output_layer.csv"),
        )?;
    }
    Ok(())
}

fn predict(hidden_weights: &Path, output_weights: &Path, data: &Path) -> Result<()> {
    let mut network = weights::load_network(hidden_weights, output_weights)
        .context("importing weights")?;
    let rows = load(data)?;
    for row in &rows {
        let class = network.predict(row);
        info!(?row, class, "prediction");
    }
    report("prediction", &network.evaluate(&rows));
    Ok(())
}

fn load(path: &Path) -> Result<Vec<Vec<f64>>> {
    dataset::load(path).with_context(|| format!("loading dataset {}", path.display()))
}

fn report(set: &str, score: &Evaluation) {
    info!(
        set,
        correct = score.correct,
        total = score.total,
        accuracy = format!("{:.2}%", score.accuracy() * 100.0).as_str(),
        "scored"
    );
}

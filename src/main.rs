use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use ironwood_id3::{Dataset, DecisionTree, Evaluation, SplitCriterion, TreeConfig, Value};
use ironwood_io::ExampleReader;

#[derive(Parser)]
#[command(name = "ironwood")]
#[command(about = "ID3 decision tree training, evaluation, and prediction")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for random-tree attribute sampling
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel classification (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// How example files are laid out.
#[derive(Args, Debug, Clone)]
struct FileArgs {
    /// Field delimiter (a single ASCII character)
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Zero-based attribute columns holding numbers, comma separated
    #[arg(long, value_delimiter = ',')]
    numeric: Vec<usize>,

    /// Token marking a missing value; enables repair and substitution
    #[arg(long)]
    missing: Option<String>,

    /// The last column of every row is the example weight
    #[arg(long, default_value_t = false)]
    weighted: bool,
}

/// Tree growth parameters.
#[derive(Args, Debug, Clone)]
struct TreeArgs {
    /// Impurity criterion: "entropy", "majority-error", or "gini"
    #[arg(long, default_value = "entropy")]
    criterion: String,

    /// Maximum tree depth (unlimited if not set)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Attributes sampled per split; 0 scores every attribute
    #[arg(long, default_value_t = 0)]
    feature_sample_size: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Train on one file and report accuracy on it and on a test file
    Evaluate {
        /// Path to the training file
        #[arg(long)]
        train: PathBuf,

        /// Path to the test file
        #[arg(long)]
        test: PathBuf,

        #[command(flatten)]
        file: FileArgs,

        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Train on one file and print the predicted label of every input row
    Predict {
        /// Path to the training file
        #[arg(long)]
        train: PathBuf,

        /// Path to the rows to classify (same layout as the training file)
        #[arg(long)]
        input: PathBuf,

        #[command(flatten)]
        file: FileArgs,

        #[command(flatten)]
        tree: TreeArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct EvaluateOutput {
    criterion: String,
    random_tree: bool,
    train: Evaluation,
    train_accuracy: f64,
    test: Evaluation,
    test_accuracy: f64,
    n_nodes: usize,
    n_leaves: usize,
    depth: usize,
}

#[derive(Serialize)]
struct PredictOutput {
    n_examples: usize,
    predictions: Vec<String>,
}

fn reader(path: &Path, file: &FileArgs) -> Result<ExampleReader> {
    if !file.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character, got {:?}", file.delimiter);
    }
    Ok(ExampleReader::new(path)
        .with_delimiter(file.delimiter as u8)
        .with_numeric_columns(file.numeric.iter().copied())
        .with_missing_token(file.missing.clone())
        .with_weight_column(file.weighted))
}

fn tree_config(file: &FileArgs, tree: &TreeArgs, seed: u64) -> Result<TreeConfig> {
    let criterion: SplitCriterion = tree.criterion.parse()?;
    Ok(TreeConfig::new()
        .with_criterion(criterion)
        .with_max_depth(tree.max_depth)
        .with_numeric_attributes(file.numeric.iter().copied())
        .with_missing_value(file.missing.clone().map(Value::from))
        .with_feature_sample_size(tree.feature_sample_size)
        .with_seed(seed))
}

/// Read the training file and fit a tree, random when a sample size is set.
fn train(path: &Path, file: &FileArgs, config: &TreeConfig) -> Result<(Dataset, DecisionTree)> {
    let mut dataset = reader(path, file)?
        .read()
        .context("failed to read training file")?;
    let tree = if config.feature_sample_size() > 0 {
        config.fit_random(&mut dataset)
    } else {
        config.fit(&mut dataset)
    }
    .context("training failed")?;
    Ok((dataset, tree))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Evaluate {
            train: train_path,
            test,
            file,
            tree: tree_args,
        } => {
            let config = tree_config(&file, &tree_args, cli.seed)?;
            let (train_set, tree) = train(&train_path, &file, &config)?;

            let test_set = reader(&test, &file)?
                .read()
                .context("failed to read test file")?;

            let train_eval = tree
                .evaluate(&train_set, &config)
                .context("evaluation on training file failed")?;
            let test_eval = tree
                .evaluate(&test_set, &config)
                .context("evaluation on test file failed")?;
            info!(
                train_accuracy = train_eval.accuracy(),
                test_accuracy = test_eval.accuracy(),
                "evaluation complete"
            );

            let output = EvaluateOutput {
                criterion: config.criterion().to_string(),
                random_tree: config.feature_sample_size() > 0,
                train_accuracy: train_eval.accuracy(),
                train: train_eval,
                test_accuracy: test_eval.accuracy(),
                test: test_eval,
                n_nodes: tree.n_nodes(),
                n_leaves: tree.n_leaves(),
                depth: tree.depth(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Predict {
            train: train_path,
            input,
            file,
            tree: tree_args,
        } => {
            let config = tree_config(&file, &tree_args, cli.seed)?;
            let (_, tree) = train(&train_path, &file, &config)?;

            let input_set = reader(&input, &file)?
                .read()
                .context("failed to read input file")?;
            let predictions = tree
                .classify_batch(input_set.examples(), &config)
                .context("prediction failed")?;

            let output = PredictOutput {
                n_examples: predictions.len(),
                predictions: predictions.iter().map(ToString::to_string).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

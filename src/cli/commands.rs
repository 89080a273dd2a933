// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands and all their flags:
//
//   consolidate — raw CSVs → cleaned CSV
//   train       — cleaned CSV → artifacts/
//   predict     — one prediction from --field name=value pairs
//   form        — interactive prediction session
//
// Every Args struct converts into an application config, so the
// application layer never sees clap types.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{
    consolidate_use_case::ConsolidateConfig,
    predict_use_case::PredictConfig,
    train_use_case::TrainConfig,
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge the raw CSV files into one cleaned dataset
    Consolidate(ConsolidateArgs),

    /// Train the price network on the cleaned dataset
    Train(TrainArgs),

    /// Predict one price from field values
    Predict(PredictArgs),

    /// Open the interactive prediction form
    Form(FormArgs),
}

#[derive(Args, Debug)]
pub struct ConsolidateArgs {
    /// Directory containing the raw *.csv files
    #[arg(long, default_value = "datasets")]
    pub input_dir: PathBuf,

    /// Where the cleaned CSV is written
    #[arg(long, default_value = "casas_limpias.csv")]
    pub output: PathBuf,
}

impl From<ConsolidateArgs> for ConsolidateConfig {
    fn from(a: ConsolidateArgs) -> Self {
        ConsolidateConfig {
            input_dir:   a.input_dir,
            output_path: a.output,
        }
    }
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Cleaned dataset with a `price` column
    #[arg(long, default_value = "casas_limpias.csv")]
    pub dataset: PathBuf,

    /// Directory for weights, scaler, encoding and metrics
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: PathBuf,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 100)]
    pub epochs: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Share of rows held out for the final test MAE
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Share of the training rows (taken from the end) used for validation loss
    #[arg(long, default_value_t = 0.2)]
    pub validation_fraction: f64,

    /// Seeds the split, the weight initialisation and the batch order
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 64)]
    pub hidden1: usize,

    #[arg(long, default_value_t = 32)]
    pub hidden2: usize,

    #[arg(long, default_value_t = 16)]
    pub hidden3: usize,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            dataset_path:        a.dataset,
            artifact_dir:        a.artifact_dir,
            epochs:              a.epochs,
            batch_size:          a.batch_size,
            lr:                  a.lr,
            test_fraction:       a.test_fraction,
            validation_fraction: a.validation_fraction,
            seed:                a.seed,
            hidden1:             a.hidden1,
            hidden2:             a.hidden2,
            hidden3:             a.hidden3,
        }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Field value as name=value; repeat for every field
    #[arg(long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,

    /// Directory written by `train`
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: PathBuf,

    /// Cleaned dataset to cross-check the persisted vocabularies against
    #[arg(long)]
    pub dataset: Option<PathBuf>,
}

impl From<PredictArgs> for PredictConfig {
    fn from(a: PredictArgs) -> Self {
        PredictConfig {
            artifact_dir: a.artifact_dir,
            dataset_path: a.dataset,
            fields:       a.fields,
        }
    }
}

#[derive(Args, Debug)]
pub struct FormArgs {
    /// Directory written by `train`; missing artifacts start demo mode
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: PathBuf,

    /// Cleaned dataset to cross-check the persisted vocabularies against
    #[arg(long)]
    pub dataset: Option<PathBuf>,
}

/// `livingArea=2000` → ("livingArea", "2000")
pub fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

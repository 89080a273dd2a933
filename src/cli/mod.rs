// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. `clap` parses the
// arguments; all work is delegated to Layer 2 (application).
//
//   1. `consolidate` — clean and merge the raw CSV files
//   2. `train`       — fit the network and save artifacts
//   3. `predict`     — one prediction from --field pairs
//   4. `form`        — interactive session (demo mode when
//                      the artifacts cannot be loaded)

pub mod commands;
pub mod form;

use anyhow::Result;
use clap::Parser;
use std::io;

use crate::application::{
    consolidate_use_case::ConsolidateUseCase,
    predict_use_case::{InferenceContext, PredictUseCase, PredictionSession},
    train_use_case::TrainUseCase,
};
use crate::domain::prediction::format_currency;
use commands::{Commands, ConsolidateArgs, FormArgs, PredictArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "house-price-estimator",
    version,
    about = "Clean housing CSVs, train a price network, and estimate prices."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// The CLI layer only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Consolidate(args) => run_consolidate(args),
            Commands::Train(args)       => run_train(args),
            Commands::Predict(args)     => run_predict(args),
            Commands::Form(args)        => run_form(args),
        }
    }
}

fn run_consolidate(args: ConsolidateArgs) -> Result<()> {
    let report = ConsolidateUseCase::new(args.into()).execute()?;

    println!("Files read:               {}", report.files);
    println!("Rows read:                {}", report.raw_rows);
    println!("Duplicates removed:       {}", report.duplicates_removed);
    println!("Rows with missing values: {}", report.incomplete_removed);
    println!("Rows written:             {}", report.rows_written);
    println!("Columns: {}", report.columns.join(", "));
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    tracing::info!("Starting training on '{}'", args.dataset.display());
    let report = TrainUseCase::new(args.into()).execute()?;

    println!(
        "Training complete: {} features, {} train / {} validation / {} test rows.",
        report.feature_count, report.n_train, report.n_validation, report.n_test
    );
    if report.rows_skipped > 0 {
        println!("Rows skipped for missing values: {}", report.rows_skipped);
    }
    if let Some(epoch) = report.best_epoch {
        println!("Lowest validation loss at epoch {epoch}.");
    }
    println!("Test mean absolute error: {}", format_currency(report.test_mae));
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let price = PredictUseCase::new(args.into()).execute()?;
    println!("Estimated price: {}", format_currency(price));
    Ok(())
}

fn run_form(args: FormArgs) -> Result<()> {
    let stdin  = io::stdin();
    let stdout = io::stdout();

    match InferenceContext::load(&args.artifact_dir, args.dataset.as_deref()) {
        Ok(context) => {
            let layout = context.form_layout();
            let mut session = PredictionSession::new(context, layout);
            form::run_form(&mut session, stdin.lock(), stdout.lock())
        }
        Err(e) => {
            tracing::warn!("Artifacts not available, starting in demo mode: {e:#}");
            let mut session: PredictionSession<InferenceContext> = PredictionSession::demo();
            form::run_form(&mut session, stdin.lock(), stdout.lock())
        }
    }
}

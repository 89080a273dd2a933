// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam.
//
//   - Training uses TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on EvalBackend (NdArray)
//   - Validation and test loaders therefore use EvalBackend
//
// Each epoch: one shuffled pass over the training split,
// then the mean-squared error on the validation hold-out.
// After the last epoch the network is written to the artifact
// directory, read back, and that reloaded copy is scored on
// the test split (mean absolute error). The recorder stores
// half precision, so the reported MAE is the one `predict`
// will actually see.

use anyhow::Result;
use burn::{
    backend::{ndarray::NdArrayDevice, Autodiff, NdArray},
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::ElementConversion,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{HousingBatch, HousingBatcher},
    dataset::{HousingDataset, HousingSample},
};
use crate::infra::{
    checkpoint::ArtifactStore,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::model::{PriceRegressor, PriceRegressorConfig};

pub type TrainBackend = Autodiff<NdArray>;
pub type EvalBackend  = NdArray;

/// What a finished training run reports back.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub best_epoch: Option<usize>,
    pub test_mae:   f64,
}

/// Samples for the three roles of one run.
pub struct TrainingSplits {
    pub train:      Vec<HousingSample>,
    pub validation: Vec<HousingSample>,
    pub test:       Vec<HousingSample>,
}

pub fn run_training(
    cfg:       &TrainConfig,
    model_cfg: &PriceRegressorConfig,
    splits:    TrainingSplits,
    store:     &ArtifactStore,
) -> Result<TrainingOutcome> {
    let device = NdArrayDevice::default();
    tracing::info!("Using NdArray device: {:?}", device);
    train_loop(cfg, model_cfg, splits, store, device)
}

fn train_loop(
    cfg:       &TrainConfig,
    model_cfg: &PriceRegressorConfig,
    splits:    TrainingSplits,
    store:     &ArtifactStore,
    device:    NdArrayDevice,
) -> Result<TrainingOutcome> {
    // Same seed → same initial weights and batch order
    TrainBackend::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: PriceRegressor<TrainBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: {} inputs, hidden {}→{}→{}, {} parameters",
        model_cfg.input_dim, model_cfg.hidden1, model_cfg.hidden2, model_cfg.hidden3,
        model.num_params(),
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let mut optim = AdamConfig::new().with_epsilon(1e-7).init();

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader = DataLoaderBuilder::new(HousingBatcher::<TrainBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .build(HousingDataset::new(splits.train));

    let val_loader = DataLoaderBuilder::new(HousingBatcher::<EvalBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .build(HousingDataset::new(splits.validation));

    let test_loader = DataLoaderBuilder::new(HousingBatcher::<EvalBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .build(HousingDataset::new(splits.test));

    let metrics_log = MetricsLogger::new(store.dir())?;
    let mut best: Option<(usize, f64)> = None;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let mut loss_sum = 0.0f64;
        let mut seen     = 0usize;

        for batch in train_loader.iter() {
            let count = batch.prices.dims()[0];
            let loss  = model.forward_loss(batch.features, batch.prices);

            loss_sum += loss.clone().into_scalar().elem::<f64>() * count as f64;
            seen     += count;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let train_loss = if seen > 0 { loss_sum / seen as f64 } else { f64::NAN };
        let (val_loss, _) = evaluate(&model.valid(), &*val_loader);

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4}",
            epoch, cfg.epochs, train_loss, val_loss,
        );

        let m = EpochMetrics::new(epoch, train_loss, val_loss);
        metrics_log.log(&m)?;
        if m.is_improvement(best.map_or(f64::INFINITY, |(_, loss)| loss)) {
            best = Some((epoch, val_loss));
        }
    }

    if let Some((epoch, loss)) = best {
        tracing::info!("Lowest validation loss {:.4} at epoch {}", loss, epoch);
    }

    // ── Save, reload, then score the served network ──────────────────────────
    store.save_model(&model.valid())?;
    tracing::info!("Training complete, network saved to '{}'", store.dir().display());

    let served = store.load_model(model_cfg.init::<EvalBackend>(&device), &device)?;
    let (_, test_mae) = evaluate(&served, &*test_loader);

    Ok(TrainingOutcome {
        best_epoch: best.map(|(epoch, _)| epoch),
        test_mae,
    })
}

/// Mean-squared and mean-absolute error over every batch of `loader`.
/// Both are NaN when the loader is empty.
fn evaluate(
    model:  &PriceRegressor<EvalBackend>,
    loader: &dyn DataLoader<HousingBatch<EvalBackend>>,
) -> (f64, f64) {
    let mut squared  = 0.0f64;
    let mut absolute = 0.0f64;
    let mut count    = 0usize;

    for batch in loader.iter() {
        count += batch.prices.dims()[0];
        let diff = model.forward(batch.features) - batch.prices;
        squared  += (diff.clone() * diff.clone()).sum().into_scalar().elem::<f64>();
        absolute += diff.abs().sum().into_scalar().elem::<f64>();
    }

    if count == 0 {
        (f64::NAN, f64::NAN)
    } else {
        (squared / count as f64, absolute / count as f64)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ml::inferencer::Inferencer;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::tempdir;

    // NdArray draws every random weight from one process-wide RNG.
    // Tests that seed it or initialise a network hold this lock so
    // parallel tests cannot interleave their draws.
    static BACKEND_RNG: Mutex<()> = Mutex::new(());

    pub(crate) fn lock_backend_rng() -> MutexGuard<'static, ()> {
        BACKEND_RNG.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn samples(n: usize) -> Vec<HousingSample> {
        (0..n)
            .map(|i| {
                let x = i as f64 / n as f64;
                HousingSample::new(&[x, 1.0 - x, x * x], 1000.0 + 500.0 * x)
            })
            .collect()
    }

    #[test]
    fn test_reported_mae_matches_reloaded_network() {
        let _rng      = lock_backend_rng();
        let tmp       = tempdir().unwrap();
        let store     = ArtifactStore::new(tmp.path());
        let cfg       = TrainConfig { epochs: 3, batch_size: 4, ..TrainConfig::default() };
        let model_cfg = PriceRegressorConfig::new(3);
        store.save_model_config(&model_cfg).unwrap();

        let test    = samples(10);
        let splits  = TrainingSplits { train: samples(24), validation: samples(6), test: test.clone() };
        let outcome = run_training(&cfg, &model_cfg, splits, &store).unwrap();
        assert!(outcome.best_epoch.is_some());

        let inferencer = Inferencer::from_artifacts(&store).unwrap();
        let mae = test
            .iter()
            .map(|s| {
                let features: Vec<f64> = s.features.iter().map(|&x| f64::from(x)).collect();
                (inferencer.predict(&features).unwrap() - f64::from(s.price)).abs()
            })
            .sum::<f64>()
            / test.len() as f64;

        assert!((mae - outcome.test_mae).abs() < 1e-3 * outcome.test_mae.max(1.0));
    }
}

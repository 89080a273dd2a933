// ============================================================
// Layer 6 — Artifact Store
// ============================================================
// Saves and restores everything a later `predict` needs.
//
// What gets saved per training run:
//   1. model.mpk.gz       — network weights (CompactRecorder)
//   2. model_config.json  — layer widths, to rebuild the network
//   3. scaler.json        — per-feature mean and scale
//   4. encoding.json      — numeric columns + category vocabularies
//   5. train_config.json  — hyperparameters of the run
//   6. metrics.csv        — written by MetricsLogger
//
// The weights alone are useless without 2–4: the network has
// to be rebuilt with the same shape, and every request has to
// be encoded and scaled exactly like the training rows were.
//
//   artifacts/
//     model.mpk.gz
//     model_config.json
//     scaler.json
//     encoding.json
//     train_config.json
//     metrics.csv

use anyhow::{anyhow, Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{encoder::EncodingScheme, scaler::StandardScaler};
use crate::ml::model::{PriceRegressor, PriceRegressorConfig};

const MODEL_STEM:   &str = "model";
const MODEL_FILE:   &str = "model.mpk.gz";
const MODEL_CONFIG: &str = "model_config.json";
const SCALER:       &str = "scaler.json";
const ENCODING:     &str = "encoding.json";
const TRAIN_CONFIG: &str = "train_config.json";

/// Directory holding the artifacts of one training run.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Does not touch the filesystem; call `ensure_dir` before saving.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create artifact directory '{}'", self.dir.display()))
    }

    /// True when every file `predict` reads is present.
    pub fn is_complete(&self) -> bool {
        [MODEL_FILE, MODEL_CONFIG, SCALER, ENCODING, TRAIN_CONFIG]
            .iter()
            .all(|name| self.dir.join(name).is_file())
    }

    // ── Network ───────────────────────────────────────────────────────────────

    pub fn save_model<B: Backend>(&self, model: &PriceRegressor<B>) -> Result<()> {
        // Recorder appends the .mpk.gz extension itself
        let path = self.dir.join(MODEL_STEM);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .map_err(|e| anyhow!("Failed to save network to '{}': {e:?}", path.display()))?;
        tracing::debug!("Saved network weights to '{}'", path.display());
        Ok(())
    }

    pub fn load_model<B: Backend>(
        &self,
        model:  PriceRegressor<B>,
        device: &B::Device,
    ) -> Result<PriceRegressor<B>> {
        let path = self.dir.join(MODEL_STEM);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .map_err(|e| {
                anyhow!(
                    "Cannot load network from '{}'. Have you run 'train' first? ({e:?})",
                    path.display()
                )
            })?;
        Ok(model.load_record(record))
    }

    pub fn save_model_config(&self, cfg: &PriceRegressorConfig) -> Result<()> {
        let path = self.dir.join(MODEL_CONFIG);
        cfg.save(&path)
            .with_context(|| format!("Cannot write '{}'", path.display()))
    }

    pub fn load_model_config(&self) -> Result<PriceRegressorConfig> {
        let path = self.dir.join(MODEL_CONFIG);
        PriceRegressorConfig::load(&path)
            .map_err(|e| anyhow!("Cannot read '{}': {e:?}", path.display()))
    }

    // ── Preprocessing state ───────────────────────────────────────────────────

    pub fn save_scaler(&self, scaler: &StandardScaler) -> Result<()> {
        self.write_json(SCALER, scaler)
    }

    pub fn load_scaler(&self) -> Result<StandardScaler> {
        self.read_json(SCALER)
    }

    pub fn save_encoding(&self, scheme: &EncodingScheme) -> Result<()> {
        self.write_json(ENCODING, scheme)
    }

    pub fn load_encoding(&self) -> Result<EncodingScheme> {
        self.read_json(ENCODING)
    }

    pub fn save_train_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json(TRAIN_CONFIG, cfg)
    }

    pub fn load_train_config(&self) -> Result<TrainConfig> {
        self.read_json(TRAIN_CONFIG)
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read '{}'. Make sure you have run 'train' before 'predict'.",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("'{}' is not a valid artifact", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::trainer::tests::lock_backend_rng;
    use burn::backend::NdArray;
    use tempfile::tempdir;

    #[test]
    fn test_scaler_round_trip_and_completeness() {
        let tmp   = tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path().join("run"));
        store.ensure_dir().unwrap();
        assert!(!store.is_complete());

        let names  = vec!["a".to_string(), "b".to_string()];
        let scaler = StandardScaler::fit(names, &[vec![1.0, 2.0], vec![3.0, 6.0]]).unwrap();
        store.save_scaler(&scaler).unwrap();
        assert_eq!(store.load_scaler().unwrap(), scaler);
    }

    #[test]
    fn test_missing_artifact_mentions_train() {
        let tmp   = tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path());
        let err   = store.load_encoding().unwrap_err();
        assert!(err.to_string().contains("train"));
    }

    #[test]
    fn test_model_weights_survive_reload() {
        let _rng   = lock_backend_rng();
        let tmp    = tempdir().unwrap();
        let store  = ArtifactStore::new(tmp.path());
        let device = Default::default();
        let cfg    = PriceRegressorConfig::new(4);

        let model: PriceRegressor<NdArray> = cfg.init(&device);
        store.save_model(&model).unwrap();
        store.save_model_config(&cfg).unwrap();

        let loaded_cfg = store.load_model_config().unwrap();
        assert_eq!(loaded_cfg.input_dim, 4);
        assert_eq!(loaded_cfg.hidden1, 64);

        let fresh: PriceRegressor<NdArray> = loaded_cfg.init(&device);
        let loaded = store.load_model(fresh, &device).unwrap();

        let input  = Tensor::<NdArray, 2>::ones([1, 4], &device);
        let before = model.forward(input.clone()).into_data().to_vec::<f32>().unwrap();
        let after  = loaded.forward(input).into_data().to_vec::<f32>().unwrap();
        // CompactRecorder stores half precision
        assert!((before[0] - after[0]).abs() < 1e-2);
    }
}

// ============================================================
// Layer 5 — Inferencer
// ============================================================
use anyhow::{ensure, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, NdArray},
    prelude::*,
    tensor::TensorData,
};

use crate::error::EstimatorError;
use crate::infra::checkpoint::ArtifactStore;
use crate::ml::model::{PriceRegressor, PriceRegressorConfig};

type InferBackend = NdArray;

pub struct Inferencer {
    model:  PriceRegressor<InferBackend>,
    config: PriceRegressorConfig,
    device: NdArrayDevice,
}

impl Inferencer {
    /// Rebuild the architecture from its saved config, then load the weights.
    pub fn from_artifacts(store: &ArtifactStore) -> Result<Self> {
        let device = NdArrayDevice::default();
        let config = store.load_model_config()?;
        let model: PriceRegressor<InferBackend> = config.init(&device);
        let model  = store.load_model(model, &device)?;
        tracing::info!("Network loaded ({} inputs)", config.input_dim);
        Ok(Self { model, config, device })
    }

    pub fn input_dim(&self) -> usize {
        self.config.input_dim
    }

    pub fn config(&self) -> &PriceRegressorConfig {
        &self.config
    }

    /// One forward pass over a single scaled feature vector.
    pub fn predict(&self, features: &[f64]) -> Result<f64> {
        ensure!(
            features.len() == self.input_dim(),
            EstimatorError::FeatureMismatch {
                expected: self.input_dim(),
                actual:   features.len(),
            }
        );

        let row: Vec<f32> = features.iter().map(|&x| x as f32).collect();
        let input = Tensor::<InferBackend, 2>::from_data(
            TensorData::new(row, [1, features.len()]),
            &self.device,
        );

        let output = self
            .model
            .forward(input)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read network output: {e:?}"))?;

        let price = output.first().copied().map(f64::from).unwrap_or(f64::NAN);
        ensure!(price.is_finite(), EstimatorError::NonFinitePrediction);

        tracing::debug!("Forward pass over {} features → {:.2}", features.len(), price);
        Ok(price)
    }
}

// ============================================================
// Layer 4 — Housing Batcher
// ============================================================
// Implements Burn's Batcher trait: stacks N samples of D
// features into a [N, D] feature tensor and a [N, 1] price
// tensor (the same shape as the network output, so the MSE
// loss compares like with like).
//
// All samples share the same width because every row went
// through the same encode → reconcile step.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::dataset::HousingSample;

/// A batch of listings for one forward pass.
#[derive(Debug, Clone)]
pub struct HousingBatch<B: Backend> {
    /// Scaled features — shape: [batch_size, n_features]
    pub features: Tensor<B, 2>,

    /// Prices — shape: [batch_size, 1]
    pub prices: Tensor<B, 2>,
}

/// Holds the target device so tensors are created on it.
#[derive(Clone, Debug)]
pub struct HousingBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> HousingBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<HousingSample, HousingBatch<B>> for HousingBatcher<B> {
    fn batch(&self, items: Vec<HousingSample>) -> HousingBatch<B> {
        let batch_size = items.len();
        let width      = items.first().map_or(0, HousingSample::feature_count);

        // Row-major flatten: [s1_f1, s1_f2, ..., sN_fD]
        let flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.features.iter().copied())
            .collect();
        let prices: Vec<f32> = items.iter().map(|s| s.price).collect();

        let features = Tensor::<B, 2>::from_data(
            TensorData::new(flat, [batch_size, width]),
            &self.device,
        );
        let prices = Tensor::<B, 2>::from_data(
            TensorData::new(prices, [batch_size, 1]),
            &self.device,
        );

        HousingBatch { features, prices }
    }
}

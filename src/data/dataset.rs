use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One scaled listing and its price, ready for batching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingSample {
    pub features: Vec<f32>,
    pub price:    f32,
}

impl HousingSample {
    pub fn new(features: &[f64], price: f64) -> Self {
        Self {
            features: features.iter().map(|&x| x as f32).collect(),
            price:    price as f32,
        }
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }
}

pub struct HousingDataset {
    samples: Vec<HousingSample>,
}

impl HousingDataset {
    pub fn new(samples: Vec<HousingSample>) -> Self { Self { samples } }
}

impl Dataset<HousingSample> for HousingDataset {
    fn get(&self, index: usize) -> Option<HousingSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_indexing() {
        let ds = HousingDataset::new(vec![
            HousingSample::new(&[1.0, 2.0], 100.0),
            HousingSample::new(&[3.0, 4.0], 200.0),
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(1).unwrap().price, 200.0);
        assert_eq!(ds.get(0).unwrap().feature_count(), 2);
        assert!(ds.get(2).is_none());
    }
}

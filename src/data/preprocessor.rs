// ============================================================
// Layer 4 — Inference Preprocessor
// ============================================================
// Reproduces training-time preprocessing for one request:
//
//   1. One-hot encode with the persisted vocabularies
//   2. Reconcile onto the scaler's feature order
//      (zero-fill missing indicators, drop unexpected columns)
//   3. Apply the persisted scaling
//
// Construction checks that the encoding scheme and the scaler
// agree on the feature order. A mismatch would silently feed
// values into the wrong network inputs, so it is refused here.

use crate::data::encoder::EncodingScheme;
use crate::data::scaler::StandardScaler;
use crate::domain::request::PredictionRequest;
use crate::error::EstimatorError;

#[derive(Debug, Clone)]
pub struct Preprocessor {
    scheme: EncodingScheme,
    scaler: StandardScaler,
}

impl Preprocessor {
    pub fn new(scheme: EncodingScheme, scaler: StandardScaler) -> Result<Self, EstimatorError> {
        let derived = scheme.feature_names();
        let stored  = &scaler.feature_names;

        if let Some(position) = derived
            .iter()
            .zip(stored)
            .position(|(a, b)| a != b)
        {
            return Err(EstimatorError::FeatureOrderMismatch { position });
        }
        if derived.len() != stored.len() {
            return Err(EstimatorError::FeatureMismatch {
                expected: stored.len(),
                actual:   derived.len(),
            });
        }

        Ok(Self { scheme, scaler })
    }

    pub fn scheme(&self) -> &EncodingScheme {
        &self.scheme
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Feature order expected by the network.
    pub fn feature_names(&self) -> &[String] {
        &self.scaler.feature_names
    }

    /// Steps 1–2: encode and reconcile, unscaled.
    pub fn encode(&self, request: &PredictionRequest) -> Result<Vec<f64>, EstimatorError> {
        Ok(self.scheme.encode(request)?.reconcile(self.feature_names()))
    }

    /// Step 3: apply the persisted scaling.
    pub fn scale(&self, features: &[f64]) -> Result<Vec<f64>, EstimatorError> {
        self.scaler.transform(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::encoder::CategoryVocabulary;

    fn scheme() -> EncodingScheme {
        EncodingScheme {
            target:      "price".into(),
            numeric:     vec!["livingArea".into(), "lotSize".into()],
            categorical: vec![
                CategoryVocabulary::new("fuel", ["electric", "gas", "oil"].map(String::from)),
                CategoryVocabulary::new("waterfront", ["No", "Yes"].map(String::from)),
            ],
        }
    }

    fn fitted() -> Preprocessor {
        let s    = scheme();
        let rows = vec![
            vec![1000.0, 0.2, 0.0, 0.0, 0.0],
            vec![3000.0, 0.8, 1.0, 0.0, 1.0],
            vec![2000.0, 0.5, 0.0, 1.0, 0.0],
        ];
        let scaler = StandardScaler::fit(s.feature_names(), &rows).unwrap();
        Preprocessor::new(s, scaler).unwrap()
    }

    #[test]
    fn test_vector_matches_persisted_order_for_any_selection() {
        let p = fitted();
        for fuel in ["electric", "gas", "oil"] {
            for water in ["No", "Yes"] {
                let req = PredictionRequest::new()
                    .with_numeric("livingArea", 2000.0)
                    .with_category("fuel", fuel)
                    .with_category("waterfront", water);
                let v = p.scale(&p.encode(&req).unwrap()).unwrap();
                assert_eq!(v.len(), p.feature_names().len());
                assert!(v.iter().all(|x| x.is_finite()));
            }
        }
    }

    #[test]
    fn test_encode_then_scale_uses_stored_statistics() {
        let p   = fitted();
        let req = PredictionRequest::new()
            .with_numeric("livingArea", 2000.0)
            .with_numeric("lotSize", 0.5);
        let v = p.scale(&p.encode(&req).unwrap()).unwrap();
        // 2000 and 0.5 are the fitted means
        assert!(v[0].abs() < 1e-12);
        assert!(v[1].abs() < 1e-12);
    }

    #[test]
    fn test_scaler_with_other_order_is_refused() {
        let s        = scheme();
        let mut names = s.feature_names();
        names.swap(2, 3);
        let scaler = StandardScaler::fit(names, &[vec![0.0; 5]]).unwrap();
        assert_eq!(
            Preprocessor::new(s, scaler).unwrap_err(),
            EstimatorError::FeatureOrderMismatch { position: 2 }
        );
    }

    #[test]
    fn test_scaler_with_fewer_features_is_refused() {
        let s      = scheme();
        let names  = s.feature_names()[..4].to_vec();
        let scaler = StandardScaler::fit(names, &[vec![0.0; 4]]).unwrap();
        assert!(matches!(
            Preprocessor::new(s, scaler),
            Err(EstimatorError::FeatureMismatch { expected: 4, actual: 5 })
        ));
    }
}

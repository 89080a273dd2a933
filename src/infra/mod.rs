// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence used by both training and
// prediction:
//
//   checkpoint.rs — ArtifactStore
//                   Network weights via Burn's CompactRecorder,
//                   plus the JSON files (model config, scaler,
//                   encoding scheme, train config) that make a
//                   saved network usable again.
//
//   metrics.rs    — Training metrics logging
//                   One CSV row per epoch (train and validation
//                   loss) for plotting learning curves.

/// Training artifacts: weights, scaler, encoding, configs
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

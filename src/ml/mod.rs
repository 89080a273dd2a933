// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn network code lives here.
//
//   model.rs      — The price regressor: four dense layers
//                   (64 → 32 → 16 with ReLU, then 1 linear
//                   output) trained with mean-squared error
//
//   trainer.rs    — The training loop: shuffled mini-batches,
//                   Adam updates, per-epoch validation loss,
//                   test-set mean absolute error
//
//   inferencer.rs — Loads the persisted network and runs one
//                   forward pass per scaled feature vector
//
// Everything runs on the CPU NdArray backend; the training
// backend wraps it in Autodiff.

/// Feed-forward regression network
pub mod model;

/// Training loop with validation and test evaluation
pub mod trainer;

/// Inference engine — loads the network and predicts one price
pub mod inferencer;

// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw CSV listings to tensor batches.
//
//   datasets/*.csv
//       │
//       ▼
//   CsvLoader         → reads files into Tables (missing cells = None)
//       │
//       ▼
//   consolidator      → union, drop duplicates, drop incomplete rows
//       │
//       ▼
//   Schema            → numeric vs categorical columns, target check
//       │
//       ▼
//   EncodingScheme    → sorted vocabularies, reference-dropped one-hot,
//       │               reconciliation onto the feature order
//       ▼
//   StandardScaler    → zero mean / unit variance per feature
//       │
//       ▼
//   splitter          → seeded train/test split, validation tail
//       │
//       ▼
//   HousingDataset    → implements Burn's Dataset trait
//       │
//       ▼
//   HousingBatcher    → stacks samples into tensor batches
//
// Training and inference share the encode → reconcile → scale
// path (see `preprocessor`), so the two can never drift apart.

/// Reads and writes CSV tables
pub mod loader;

/// Merges tables and removes duplicate / incomplete rows
pub mod consolidator;

/// Infers numeric and categorical columns
pub mod schema;

/// Category vocabularies, one-hot encoding and reconciliation
pub mod encoder;

/// Standard (z-score) feature scaling
pub mod scaler;

/// The encode → reconcile → scale pipeline used at inference
pub mod preprocessor;

/// Implements Burn's Dataset trait for housing samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded train/test split and validation hold-out
pub mod splitter;

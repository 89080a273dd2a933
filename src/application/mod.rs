// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one goal per command.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No argument parsing or terminal I/O (that's Layer 1)
//   - Only workflow coordination and session state

// Raw CSVs → one cleaned CSV
pub mod consolidate_use_case;

// The training workflow
pub mod train_use_case;

// Inference context, form session and one-shot prediction
pub mod predict_use_case;

// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Each use case wires the data and infra layers together for
// one CLI command. No printing here; results are returned to
// Layer 1 which decides how to show them.

// Table and catalog statistics
pub mod stats_use_case;

// Assemble (and optionally batch) a range of triplets
pub mod sample_use_case;

// Build or load the query tokenizer
pub mod tokenizer_use_case;

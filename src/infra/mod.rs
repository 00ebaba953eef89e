// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by the application layer:
//
//   config.rs          - DatasetConfig, saved/loaded as JSON
//   tokenizer_store.rs - loads a tokenizer.json or builds a
//                        word-level one from the query texts
//   triplet_log.rs     - CSV record of sampled triplets

/// Dataset layout and assembly settings
pub mod config;

/// Tokenizer loading and building
pub mod tokenizer_store;

/// Sampled triplet CSV writer
pub mod triplet_log;

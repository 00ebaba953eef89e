// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types and traits describing queries, models and
// the triplets the data layer assembles from them.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only plain structs, enums, and traits

// Query records, ground-truth associations and dataset splits
pub mod query;

// A 3D point cloud as a list of xyz points
pub mod point_cloud;

// A (query, positive model, negative model) example
pub mod triplet;

// Abstractions the data layer implements
pub mod traits;

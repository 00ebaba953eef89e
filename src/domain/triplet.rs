// ============================================================
// Layer 3 - Triplet Domain Type
// ============================================================
// One contrastive training example before any tensors exist:
// the query, a model that matches it, and a model that does not.
//
// Invariant: false_model_id is never among the query's
// ground-truth models; true_model_id always is.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triplet {
    pub query_id:       String,
    pub query_text:     String,
    pub true_model_id:  String,
    pub false_model_id: String,
}

// ============================================================
// Layer 3 - Query and Association Types
// ============================================================
// A text query is identified by its id and may be paired with
// several models in the ground truth, and a model with several
// queries. Each ground-truth row becomes one Association.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// One natural-language query. The same text may describe many models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub query_id:   String,
    pub query_text: String,
}

impl QueryRecord {
    pub fn new(query_id: impl Into<String>, query_text: impl Into<String>) -> Self {
        Self {
            query_id:   query_id.into(),
            query_text: query_text.into(),
        }
    }
}

/// A recorded (query, model) match from a ground-truth table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Association {
    pub query_id: String,
    pub model_id: String,
}

impl Association {
    pub fn new(query_id: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            model_id: model_id.into(),
        }
    }
}

/// Which ground-truth table the dataset iterates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    #[default]
    Train,
    Validation,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train      => "train",
            Split::Validation => "validation",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "train"               => Ok(Split::Train),
            "validation" | "val"  => Ok(Split::Validation),
            other => Err(format!(
                "unknown split '{other}' (expected 'train' or 'validation')"
            )),
        }
    }
}

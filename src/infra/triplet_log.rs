// ============================================================
// Layer 6 - Triplet Log
// ============================================================
// Writes assembled triplets to CSV so a sampling run can be
// audited or replayed against a fixed set of negatives.
//
// Example output:
//   index,split,query_id,true_model_id,false_model_id,negative_draws,query_text
//   0,train,q1,m1,m4,1,a red chair
//   1,train,q1,m2,m3,2,a red chair

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    path::PathBuf,
};

use crate::data::dataset::TripletItem;
use crate::domain::query::Split;

/// One CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripletRecord {
    pub index:          usize,
    pub split:          Split,
    pub query_id:       String,
    pub true_model_id:  String,
    pub false_model_id: String,
    pub negative_draws: usize,
    pub query_text:     String,
}

impl TripletRecord {
    pub fn from_item(index: usize, split: Split, item: &TripletItem) -> Self {
        let t = &item.triplet;
        Self {
            index,
            split,
            query_id:       t.query_id.clone(),
            true_model_id:  t.true_model_id.clone(),
            false_model_id: t.false_model_id.clone(),
            negative_draws: item.negative_draws,
            query_text:     t.query_text.clone(),
        }
    }
}

pub struct TripletLog {
    writer: csv::Writer<File>,
    path:   PathBuf,
    rows:   usize,
}

impl TripletLog {
    /// Create (or truncate) the CSV file, creating parent directories.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        let writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Cannot create triplet log '{}'", path.display()))?;

        Ok(Self { writer, path, rows: 0 })
    }

    pub fn log(&mut self, record: &TripletRecord) -> Result<()> {
        self.writer
            .serialize(record)
            .with_context(|| format!("Cannot write to '{}'", self.path.display()))?;
        self.rows += 1;
        Ok(())
    }

    /// Flush buffered rows. Returns how many rows were written.
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        tracing::debug!("Wrote {} triplets to '{}'", self.rows, self.path.display());
        Ok(self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(index: usize, false_model: &str) -> TripletRecord {
        TripletRecord {
            index,
            split:          Split::Validation,
            query_id:       "q1".into(),
            true_model_id:  "m1".into(),
            false_model_id: false_model.into(),
            negative_draws: 2,
            query_text:     "a chair, with arms".into(),
        }
    }

    #[test]
    fn test_rows_read_back() {
        let dir  = TempDir::new().unwrap();
        let path = dir.path().join("logs/triplets.csv");

        let mut log = TripletLog::create(&path).unwrap();
        log.log(&record(0, "m7")).unwrap();
        log.log(&record(1, "m9")).unwrap();
        assert_eq!(log.finish().unwrap(), 2);

        let rows: Vec<TripletRecord> = csv::Reader::from_path(&path)
            .unwrap()
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows, vec![record(0, "m7"), record(1, "m9")]);
    }
}

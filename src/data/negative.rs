// ============================================================
// Layer 4 - Negative Sampler
// ============================================================
// Picks a model that does NOT match a query, uniformly over the
// catalog minus the query's positives.
//
// Draws are rejection-sampled from the catalog. After
// `max_draws` rejected draws the sampler enumerates the
// complement and picks from it directly, which yields the same
// distribution and fails cleanly when the complement is empty.

use rand::{seq::SliceRandom, Rng};
use std::collections::HashSet;
use thiserror::Error;

pub const DEFAULT_MAX_DRAWS: usize = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SamplingError {
    #[error("model catalog is empty")]
    EmptyCatalog,

    #[error("query '{query_id}' matches every model in the catalog; no negative exists")]
    NoNegativeCandidate { query_id: String },
}

/// A sampled negative and how many draws it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegativeDraw {
    pub model_id: String,
    pub draws:    usize,
}

#[derive(Debug, Clone, Copy)]
pub struct NegativeSampler {
    max_draws: usize,
}

impl NegativeSampler {
    pub fn new(max_draws: usize) -> Self {
        Self { max_draws }
    }

    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng:       &mut R,
        query_id:  &str,
        catalog:   &[String],
        positives: &HashSet<String>,
    ) -> Result<NegativeDraw, SamplingError> {
        if catalog.is_empty() {
            return Err(SamplingError::EmptyCatalog);
        }

        for draw in 1..=self.max_draws {
            let candidate = &catalog[rng.gen_range(0..catalog.len())];
            if !positives.contains(candidate) {
                return Ok(NegativeDraw { model_id: candidate.clone(), draws: draw });
            }
        }

        tracing::warn!(
            "Query '{}' rejected {} draws ({} positives, catalog {}); sampling from complement",
            query_id,
            self.max_draws,
            positives.len(),
            catalog.len(),
        );

        let complement: Vec<&String> = catalog
            .iter()
            .filter(|m| !positives.contains(*m))
            .collect();

        complement
            .choose(rng)
            .map(|m| NegativeDraw { model_id: (*m).clone(), draws: self.max_draws })
            .ok_or_else(|| SamplingError::NoNegativeCandidate { query_id: query_id.to_string() })
    }
}

impl Default for NegativeSampler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DRAWS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn ids(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn set(xs: &[&str]) -> HashSet<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_never_returns_a_positive() {
        let catalog   = ids(&["A", "B", "C"]);
        let positives = set(&["A"]);
        let sampler   = NegativeSampler::default();
        let mut rng   = StdRng::seed_from_u64(7);

        let mut seen = HashSet::new();
        for _ in 0..200 {
            let draw = sampler.sample(&mut rng, "Q1", &catalog, &positives).unwrap();
            assert_ne!(draw.model_id, "A");
            seen.insert(draw.model_id);
        }
        // Both negatives should come up over 200 draws
        assert_eq!(seen, set(&["B", "C"]));
    }

    #[test]
    fn test_saturated_query_fails_instead_of_hanging() {
        let catalog   = ids(&["A", "B"]);
        let positives = set(&["A", "B"]);
        let mut rng   = StdRng::seed_from_u64(1);

        let err = NegativeSampler::new(50)
            .sample(&mut rng, "Q1", &catalog, &positives)
            .unwrap_err();
        assert_eq!(err, SamplingError::NoNegativeCandidate { query_id: "Q1".into() });
    }

    #[test]
    fn test_zero_draw_cap_uses_complement() {
        let catalog   = ids(&["A", "B", "C"]);
        let positives = set(&["A", "C"]);
        let mut rng   = StdRng::seed_from_u64(3);

        let draw = NegativeSampler::new(0)
            .sample(&mut rng, "Q1", &catalog, &positives)
            .unwrap();
        assert_eq!(draw.model_id, "B");
    }

    #[test]
    fn test_empty_catalog() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = NegativeSampler::default()
            .sample(&mut rng, "Q1", &[], &HashSet::new())
            .unwrap_err();
        assert_eq!(err, SamplingError::EmptyCatalog);
    }

    #[test]
    fn test_same_seed_same_negatives() {
        let catalog   = ids(&["A", "B", "C", "D", "E"]);
        let positives = set(&["A"]);
        let sampler   = NegativeSampler::default();

        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| sampler.sample(&mut rng, "Q", &catalog, &positives).unwrap().model_id)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
    }
}

// ============================================================
// Layer 6 - Tokenizer Store
// ============================================================
// Provides the tokenizer used to encode text queries.
//
// Either a pretrained HuggingFace `tokenizer.json` (for example
// bert-base-uncased) is placed in the store directory, or a
// word-level vocabulary is built from the query texts and
// written there in the same JSON format. The built tokenizer
// uses BERT's special token ids so encoded sequences look the
// same either way: [CLS]=101, [SEP]=102, [PAD]=0.

use anyhow::{anyhow, Context, Result};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tokenizers::{
    normalizers::BertNormalizer, pre_tokenizers::whitespace::Whitespace, NormalizedString,
    Normalizer, OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer, Tokenizer,
};

pub const TOKENIZER_FILE: &str = "tokenizer.json";

const SPECIAL_TOKENS: [(&str, u32); 5] = [
    ("[PAD]",  0),
    ("[UNK]",  100),
    ("[CLS]",  101),
    ("[SEP]",  102),
    ("[MASK]", 103),
];

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(TOKENIZER_FILE)
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Load the stored tokenizer, or build one from `texts` if none exists yet.
    pub fn load_or_build(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        if self.exists() {
            tracing::info!("Loading tokenizer from '{}'", self.path().display());
            self.load()
        } else {
            tracing::info!("Building word-level tokenizer (vocab_size={})", vocab_size);
            self.build_and_save(texts, vocab_size)
        }
    }

    pub fn load(&self) -> Result<Tokenizer> {
        load_tokenizer(&self.path())
    }

    /// Count words over `texts`, keep the most frequent ones, and
    /// write a WordLevel tokenizer JSON. Words are split by the same
    /// normalizer and pre-tokenizer the JSON declares, so every
    /// counted word is reachable at encode time.
    pub fn build_and_save(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let normalizer    = word_normalizer();
        let pre_tokenizer = Whitespace::default();

        let mut freq: HashMap<String, usize> = HashMap::new();
        for text in texts {
            for word in split_words(text, &normalizer, &pre_tokenizer)? {
                *freq.entry(word).or_insert(0) += 1;
            }
        }

        // Ties broken alphabetically so the same corpus gives the same ids
        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(vocab_size.saturating_sub(SPECIAL_TOKENS.len()));

        let mut vocab = serde_json::Map::new();
        for (token, id) in SPECIAL_TOKENS {
            vocab.insert(token.to_string(), serde_json::json!(id));
        }
        let mut next_id = 104u32;
        for (word, _) in &words {
            if !vocab.contains_key(word) {
                vocab.insert(word.clone(), serde_json::json!(next_id));
                next_id += 1;
            }
        }

        let added_tokens: Vec<serde_json::Value> = SPECIAL_TOKENS
            .iter()
            .map(|(content, id)| {
                serde_json::json!({
                    "id": id, "content": content, "single_word": false,
                    "lstrip": false, "rstrip": false, "normalized": false, "special": true
                })
            })
            .collect();

        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": added_tokens,
            "normalizer": serde_json::to_value(&normalizer)?,
            "pre_tokenizer": serde_json::to_value(&pre_tokenizer)?,
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "[UNK]"
            }
        });

        let path = self.path();
        fs::write(&path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;

        tracing::info!(
            "Tokenizer built with {} words, saved to '{}'",
            words.len(),
            path.display()
        );

        load_tokenizer(&path)
    }
}

/// Lowercasing with `strip_accents` unset also strips accents.
fn word_normalizer() -> BertNormalizer {
    BertNormalizer::new(true, true, None, true)
}

/// Normalize `text` and split it into `\w+` and punctuation runs.
fn split_words(
    text:          &str,
    normalizer:    &BertNormalizer,
    pre_tokenizer: &Whitespace,
) -> Result<Vec<String>> {
    let mut normalized = NormalizedString::from(text);
    normalizer
        .normalize(&mut normalized)
        .map_err(|e| anyhow!("Cannot normalize '{text}': {e}"))?;

    let mut pre_tokenized = PreTokenizedString::from(normalized);
    pre_tokenizer
        .pre_tokenize(&mut pre_tokenized)
        .map_err(|e| anyhow!("Cannot pre-tokenize '{text}': {e}"))?;

    Ok(pre_tokenized
        .get_splits(OffsetReferential::Normalized, OffsetType::Byte)
        .into_iter()
        .map(|(word, _, _)| word.to_string())
        .collect())
}

/// Load any HuggingFace tokenizer JSON file.
pub fn load_tokenizer(path: &Path) -> Result<Tokenizer> {
    Tokenizer::from_file(path)
        .map_err(|e| anyhow::anyhow!("Cannot load tokenizer from '{}': {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_build_then_reload() {
        let dir   = TempDir::new().unwrap();
        let store = TokenizerStore::new(dir.path());
        let texts = vec!["A red chair".to_string(), "a round table, red".to_string()];

        assert!(!store.exists());
        let built = store.load_or_build(&texts, 100).unwrap();
        assert!(store.exists());

        let reloaded = store.load_or_build(&[], 100).unwrap();
        let a = built.encode("red chair", false).unwrap();
        let b = reloaded.encode("red chair", false).unwrap();
        assert_eq!(a.get_ids(), b.get_ids());
        assert_eq!(built.token_to_id("[CLS]"), Some(101));
    }

    #[test]
    fn test_most_frequent_word_gets_first_id() {
        let dir   = TempDir::new().unwrap();
        let store = TokenizerStore::new(dir.path());
        let texts = vec!["chair chair table".to_string()];

        let tok = store.build_and_save(&texts, 100).unwrap();
        assert_eq!(tok.token_to_id("chair"), Some(104));
        assert_eq!(tok.token_to_id("table"), Some(105));
    }

    #[test]
    fn test_unknown_word_maps_to_unk() {
        let dir   = TempDir::new().unwrap();
        let store = TokenizerStore::new(dir.path());
        let tok   = store.build_and_save(&["chair".to_string()], 100).unwrap();

        let enc = tok.encode("sofa", false).unwrap();
        assert_eq!(enc.get_ids(), &[100]);
    }

    #[test]
    fn test_hyphenated_and_accented_words_are_in_vocab() {
        let dir   = TempDir::new().unwrap();
        let store = TokenizerStore::new(dir.path());
        let texts = vec![
            "a four-legged café table".to_string(),
            "the chair's back is curved".to_string(),
        ];
        let tok = store.build_and_save(&texts, 100).unwrap();

        for query in ["four-legged café table", "chair's back"] {
            let enc = tok.encode(query, false).unwrap();
            assert!(!enc.get_ids().contains(&100), "'{query}' hit [UNK]: {:?}", enc.get_tokens());
        }
        assert!(tok.token_to_id("cafe").is_some());
        assert!(tok.token_to_id("four-legged").is_none());
    }
}

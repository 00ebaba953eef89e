// ============================================================
// Layer 4 - Text Encoder
// ============================================================
// Turns a query string into a fixed-length id sequence and
// attention mask:
//
//   [CLS] t1 t2 ... tk [SEP] [PAD] ... [PAD]     (max_len total)
//     1    1  1      1    1    0   ...   0
//
// Content beyond max_len - 2 tokens is cut so [SEP] always
// survives. Encoding the same text twice gives the same output.

use anyhow::{anyhow, ensure, Result};
use tokenizers::Tokenizer;

pub const DEFAULT_MAX_TEXT_LEN: usize = 64;

const CLS_TOKEN: &str = "[CLS]";
const SEP_TOKEN: &str = "[SEP]";
const PAD_TOKEN: &str = "[PAD]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedText {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
}

pub struct TextEncoder {
    tokenizer: Tokenizer,
    max_len:   usize,
    cls_id:    u32,
    sep_id:    u32,
    pad_id:    u32,
}

impl TextEncoder {
    pub fn new(mut tokenizer: Tokenizer, max_len: usize) -> Result<Self> {
        ensure!(
            max_len >= 2,
            "max_len must leave room for [CLS] and [SEP] (got {max_len})"
        );

        // Padding is applied here, not by the tokenizer
        tokenizer.with_padding(None);

        let cls_id = tokenizer.token_to_id(CLS_TOKEN).unwrap_or(101);
        let sep_id = tokenizer.token_to_id(SEP_TOKEN).unwrap_or(102);
        let pad_id = tokenizer.token_to_id(PAD_TOKEN).unwrap_or(0);

        Ok(Self { tokenizer, max_len, cls_id, sep_id, pad_id })
    }

    pub fn encode(&self, text: &str) -> Result<EncodedText> {
        let enc = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| anyhow!("Cannot tokenise '{text}': {e}"))?;

        let content = enc.get_ids();
        let keep    = content.len().min(self.max_len - 2);

        let mut input_ids = Vec::with_capacity(self.max_len);
        input_ids.push(self.cls_id);
        input_ids.extend_from_slice(&content[..keep]);
        input_ids.push(self.sep_id);

        let mut attention_mask = vec![1u32; input_ids.len()];

        input_ids.resize(self.max_len, self.pad_id);
        attention_mask.resize(self.max_len, 0);

        Ok(EncodedText { input_ids, attention_mask })
    }
}

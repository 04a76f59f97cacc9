use tokenizers::{PaddingDirection, PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use super::error::{InferenceError, LoadError};

/// Pad token used when the tokenizer does not declare one; RoBERTa's `<pad>`.
const FALLBACK_PAD_TOKEN: &str = "<pad>";

/// Token ids and attention mask of one example, both exactly
/// `max_sequence_length` long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedText {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
}

impl EncodedText {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }

    /// Number of real (non-padding) tokens.
    pub fn token_count(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m == 1).count()
    }
}

/// Configures right truncation and right padding to a fixed length.
///
/// The pad id comes from the tokenizer's own padding settings when present,
/// otherwise from the vocabulary entry for `<pad>`.
pub(crate) fn configure_fixed_length(tokenizer: &mut Tokenizer, max_length: usize) -> Result<(), LoadError> {
    let (pad_id, pad_token) = match tokenizer.get_padding() {
        Some(params) => (params.pad_id, params.pad_token.clone()),
        None => {
            let id = tokenizer.token_to_id(FALLBACK_PAD_TOKEN).ok_or_else(|| {
                LoadError::InvalidModel(format!("Tokenizer vocabulary has no {} token", FALLBACK_PAD_TOKEN))
            })?;
            (id, FALLBACK_PAD_TOKEN.to_string())
        }
    };

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(LoadError::Tokenizer)?;
    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::Fixed(max_length),
        direction: PaddingDirection::Right,
        pad_id,
        pad_token,
        ..Default::default()
    }));
    Ok(())
}

/// Encodes `text` with special tokens using a tokenizer prepared by
/// [`configure_fixed_length`].
pub(crate) fn encode_fixed(tokenizer: &Tokenizer, text: &str, max_length: usize) -> Result<EncodedText, InferenceError> {
    let encoding = tokenizer.encode(text, true).map_err(InferenceError::Encoding)?;

    let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| i64::from(id)).collect();
    let attention_mask: Vec<i64> = encoding.get_attention_mask().iter().map(|&m| i64::from(m)).collect();

    check_fixed_length(&input_ids, &attention_mask, max_length)?;
    Ok(EncodedText { input_ids, attention_mask })
}

fn check_fixed_length(input_ids: &[i64], attention_mask: &[i64], max_length: usize) -> Result<(), InferenceError> {
    for (sequence, actual) in [("input_ids", input_ids.len()), ("attention_mask", attention_mask.len())] {
        if actual != max_length {
            return Err(InferenceError::Length {
                sequence,
                expected: max_length,
                actual,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A whitespace WordLevel tokenizer with RoBERTa-style special tokens.
    pub(crate) const TINY_TOKENIZER_JSON: &str = r#"{
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": null,
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": {
                    "<s>": 0, "<pad>": 1, "</s>": 2, "<unk>": 3,
                    "the": 4, "cat": 5, "is": 6, "purring": 7, "softly": 8, "hissing": 9
                },
                "unk_token": "<unk>"
            }
        }"#;

    pub(crate) fn tiny_tokenizer() -> Tokenizer {
        Tokenizer::from_bytes(TINY_TOKENIZER_JSON.as_bytes()).expect("valid tokenizer json")
    }

    #[test]
    fn test_pads_on_the_right() {
        let mut tokenizer = tiny_tokenizer();
        configure_fixed_length(&mut tokenizer, 8).unwrap();

        let encoded = encode_fixed(&tokenizer, "the cat is purring", 8).unwrap();
        assert_eq!(encoded.input_ids, vec![4, 5, 6, 7, 1, 1, 1, 1]);
        assert_eq!(encoded.attention_mask, vec![1, 1, 1, 1, 0, 0, 0, 0]);
        assert_eq!(encoded.token_count(), 4);
    }

    #[test]
    fn test_truncates_long_input() {
        let mut tokenizer = tiny_tokenizer();
        configure_fixed_length(&mut tokenizer, 4).unwrap();

        let long_text = "the cat is purring softly ".repeat(50);
        let encoded = encode_fixed(&tokenizer, &long_text, 4).unwrap();
        assert_eq!(encoded.input_ids, vec![4, 5, 6, 7]);
        assert_eq!(encoded.attention_mask, vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_length_is_fixed_for_any_input() {
        let mut tokenizer = tiny_tokenizer();
        configure_fixed_length(&mut tokenizer, 192).unwrap();

        for text in ["", "cat", "unseen words map to unk", &"hissing ".repeat(500)] {
            let encoded = encode_fixed(&tokenizer, text, 192).unwrap();
            assert_eq!(encoded.len(), 192);
            assert_eq!(encoded.attention_mask.len(), 192);
        }
    }

    #[test]
    fn test_unconfigured_tokenizer_is_rejected() {
        let tokenizer = tiny_tokenizer();
        let result = encode_fixed(&tokenizer, "the cat", 8);
        assert!(matches!(
            result,
            Err(InferenceError::Length { sequence: "input_ids", expected: 8, actual: 2 })
        ));
    }

    #[test]
    fn test_mask_length_mismatch_names_the_mask() {
        let ids = vec![4, 5, 1, 1];
        let mask = vec![1, 1];
        let err = check_fixed_length(&ids, &mask, 4).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::Length { sequence: "attention_mask", expected: 4, actual: 2 }
        ));
        assert_eq!(err.to_string(), "Encoded attention_mask has length 2, expected 4");
        assert!(check_fixed_length(&ids, &[1, 1, 0, 0], 4).is_ok());
    }

    #[test]
    fn test_missing_pad_token() {
        let json = r#"{
            "version": "1.0", "truncation": null, "padding": null, "added_tokens": [],
            "normalizer": null, "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null, "decoder": null,
            "model": { "type": "WordLevel", "vocab": { "<unk>": 0, "cat": 1 }, "unk_token": "<unk>" }
        }"#;
        let mut tokenizer = Tokenizer::from_bytes(json.as_bytes()).unwrap();
        assert!(matches!(
            configure_fixed_length(&mut tokenizer, 8),
            Err(LoadError::InvalidModel(_))
        ));
    }
}

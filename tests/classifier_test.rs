use cattolingo::{
    classify, normalize, predict, Emotion, EncodedText, InferenceError, SequenceClassifier,
};
use std::sync::Arc;
use std::thread;

/// Scores each label by how many of its keywords appear in the text.
struct KeywordClassifier;

const KEYWORDS: [&str; 9] = [
    "hissing", "gagging", "purring", "sitting", "sleeping", "crying", "hiding", "jumping", "scratching",
];

impl SequenceClassifier for KeywordClassifier {
    fn encode(&self, text: &str) -> Result<EncodedText, InferenceError> {
        // One id per keyword hit, padded to a fixed length of 16.
        let mut input_ids: Vec<i64> = text
            .split(' ')
            .filter_map(|word| KEYWORDS.iter().position(|k| *k == word))
            .map(|i| i as i64 + 2)
            .take(16)
            .collect();
        let real = input_ids.len();
        input_ids.resize(16, 1);
        let attention_mask = (0..16).map(|i| if i < real { 1 } else { 0 }).collect();
        Ok(EncodedText { input_ids, attention_mask })
    }

    fn logits(&self, encoded: &EncodedText) -> Result<Vec<f32>, InferenceError> {
        let mut logits = vec![0.0f32; 9];
        for (&id, &mask) in encoded.input_ids.iter().zip(&encoded.attention_mask) {
            if mask == 1 {
                logits[(id - 2) as usize] += 1.0;
            }
        }
        Ok(logits)
    }
}

#[test]
fn test_end_to_end_with_keyword_model() -> Result<(), Box<dyn std::error::Error>> {
    let text = "the cat is purring softly";
    assert_eq!(normalize(text), text);

    let emotion = predict(text, &KeywordClassifier)?;
    assert_eq!(emotion, Some(Emotion::Happy));
    Ok(())
}

#[test]
fn test_no_keywords_ties_to_first_label() -> Result<(), InferenceError> {
    // All logits are zero; the lowest index wins.
    assert_eq!(predict("the cat stares", &KeywordClassifier)?, Some(Emotion::Angry));
    Ok(())
}

#[test]
fn test_urls_do_not_reach_model() -> Result<(), InferenceError> {
    let prediction = classify("hiding under the bed www.hiding.example http://hiding", &KeywordClassifier)?
        .expect("non-empty input");
    assert_eq!(prediction.emotion, Emotion::Scared);
    // Only the one un-linked keyword counted.
    assert!(prediction.scores[6].1 > prediction.scores[0].1);
    Ok(())
}

#[test]
fn test_blank_input_has_no_result() -> Result<(), InferenceError> {
    assert_eq!(predict("", &KeywordClassifier)?, None);
    assert_eq!(predict("   ", &KeywordClassifier)?, None);
    Ok(())
}

#[test]
fn test_shared_across_threads() {
    let classifier: Arc<dyn SequenceClassifier> = Arc::new(KeywordClassifier);
    let mut handles = vec![];

    for _ in 0..3 {
        let classifier = Arc::clone(&classifier);
        handles.push(thread::spawn(move || {
            predict("sleeping in a box", classifier.as_ref()).unwrap()
        }));
    }

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(Emotion::Relaxed));
    }
}

#[test]
fn test_prediction_serializes_label_names() -> Result<(), Box<dyn std::error::Error>> {
    let prediction = classify("jumping at a shadow", &KeywordClassifier)?.expect("non-empty input");
    let json = serde_json::to_value(&prediction)?;
    assert_eq!(json["emotion"], "surprised");
    assert_eq!(json["scores"].as_array().map(Vec::len), Some(9));
    Ok(())
}

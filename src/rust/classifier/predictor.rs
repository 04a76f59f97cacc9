use log::debug;
use serde::Serialize;

use super::emotion::Emotion;
use super::error::InferenceError;
use super::model::SequenceClassifier;
use crate::text::{is_blank, normalize};

/// A label together with the softmax probability of every class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub emotion: Emotion,
    /// Probability of the predicted class
    pub confidence: f32,
    /// `(label, probability)` in class-index order
    pub scores: Vec<(Emotion, f32)>,
}

/// Predicts the emotion described by `text`.
///
/// Returns `Ok(None)` for empty or whitespace-only input without calling
/// the model. Encoding and forward-pass failures are returned as-is; they
/// never degrade into a default label.
///
/// ```no_run
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// use cattolingo::{load, predict, LoadOptions};
///
/// let classifier = load(&LoadOptions::default()).await?;
/// if let Some(emotion) = predict("the cat is purring softly", classifier.as_ref())? {
///     println!("{} {}", emotion, emotion.emoji());
/// }
/// # Ok(())
/// # }
/// ```
pub fn predict<C>(text: &str, classifier: &C) -> Result<Option<Emotion>, InferenceError>
where
    C: SequenceClassifier + ?Sized,
{
    let Some(logits) = run_model(text, classifier)? else {
        return Ok(None);
    };
    let index = argmax(&logits)?;
    Ok(Some(Emotion::from_index(index)))
}

/// Like [`predict`], with per-class probabilities.
pub fn classify<C>(text: &str, classifier: &C) -> Result<Option<Prediction>, InferenceError>
where
    C: SequenceClassifier + ?Sized,
{
    let Some(logits) = run_model(text, classifier)? else {
        return Ok(None);
    };
    let index = argmax(&logits)?;
    let probabilities = softmax(&logits);

    let scores = probabilities
        .iter()
        .enumerate()
        .map(|(i, &p)| (Emotion::from_index(i), p))
        .collect();

    Ok(Some(Prediction {
        emotion: Emotion::from_index(index),
        confidence: probabilities[index],
        scores,
    }))
}

fn run_model<C>(text: &str, classifier: &C) -> Result<Option<Vec<f32>>, InferenceError>
where
    C: SequenceClassifier + ?Sized,
{
    if is_blank(text) {
        return Ok(None);
    }
    let cleaned = normalize(text);
    debug!("Classifying normalized text: {:?}", cleaned);

    let encoded = classifier.encode(&cleaned)?;
    debug!("Encoded {} tokens ({} real)", encoded.len(), encoded.token_count());

    let logits = classifier.logits(&encoded)?;
    debug!("Logits: {:?}", logits);
    Ok(Some(logits))
}

/// Index of the largest logit. On exact ties the lowest index wins.
///
/// # Errors
/// `Output` when `logits` is empty or contains NaN or infinity.
pub fn argmax(logits: &[f32]) -> Result<usize, InferenceError> {
    if logits.is_empty() {
        return Err(InferenceError::Output("Model returned no logits".into()));
    }
    if let Some(pos) = logits.iter().position(|l| !l.is_finite()) {
        return Err(InferenceError::Output(format!("Non-finite logit at index {}: {}", pos, logits[pos])));
    }

    let mut best = 0;
    for (i, &value) in logits.iter().enumerate().skip(1) {
        if value > logits[best] {
            best = i;
        }
    }
    Ok(best)
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

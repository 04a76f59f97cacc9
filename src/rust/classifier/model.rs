use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{error, info};
use ndarray::Array2;
use ort::session::Session;
use ort::value::{Tensor, ValueType};
use tokenizers::Tokenizer;

use super::encoding::{configure_fixed_length, encode_fixed, EncodedText};
use super::error::{InferenceError, LoadError};
use crate::runtime::{create_session_builder, RuntimeConfig};
use crate::ModelCharacteristics;

const REQUIRED_INPUTS: [&str; 2] = ["input_ids", "attention_mask"];

/// The two steps the predictor needs from a loaded model.
///
/// Implemented by [`EmotionClassifier`]; tests substitute stubs.
pub trait SequenceClassifier: Send + Sync {
    /// Encodes normalized text into a fixed-length example.
    fn encode(&self, text: &str) -> Result<EncodedText, InferenceError>;

    /// Runs one forward pass and returns one logit per class.
    fn logits(&self, encoded: &EncodedText) -> Result<Vec<f32>, InferenceError>;
}

/// A loaded tokenizer and ONNX sequence-classification session.
///
/// Never mutated after construction, so a shared `Arc<EmotionClassifier>`
/// can be used from any thread without locking.
#[derive(Debug)]
pub struct EmotionClassifier {
    model_path: PathBuf,
    tokenizer_path: PathBuf,
    tokenizer: Tokenizer,
    /// Same vocabulary without truncation or padding, for token counting
    raw_tokenizer: Tokenizer,
    session: Session,
    characteristics: ModelCharacteristics,
}

/// Summary of a loaded classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub num_labels: usize,
    pub max_sequence_length: usize,
    pub input_names: Vec<String>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<EmotionClassifier>();
    }
};

impl EmotionClassifier {
    /// Loads the tokenizer and the ONNX graph from local files.
    ///
    /// # Errors
    /// - `Tokenizer` if `tokenizer.json` cannot be parsed or configured
    /// - `InvalidModel` if the vocabulary has no pad token, the graph lacks
    ///   `input_ids`/`attention_mask` inputs, or its first output is not a
    ///   `[batch, num_labels]` tensor
    /// - `Session` if ONNX Runtime rejects the graph
    pub fn from_files(
        model_path: impl AsRef<Path>,
        tokenizer_path: impl AsRef<Path>,
        characteristics: ModelCharacteristics,
        runtime_config: &RuntimeConfig,
    ) -> Result<Self, LoadError> {
        let model_path = model_path.as_ref().to_path_buf();
        let tokenizer_path = tokenizer_path.as_ref().to_path_buf();

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            error!("Failed to load tokenizer: {}", e);
            LoadError::Tokenizer(e)
        })?;
        let raw_tokenizer = tokenizer.clone();
        configure_fixed_length(&mut tokenizer, characteristics.max_sequence_length)?;
        info!("Tokenizer loaded from {:?}", tokenizer_path);

        let session = create_session_builder(runtime_config)?.commit_from_file(&model_path)?;
        Self::validate_model(&session, characteristics.num_labels)?;
        info!("Model structure validated successfully");

        Ok(Self {
            model_path,
            tokenizer_path,
            tokenizer,
            raw_tokenizer,
            session,
            characteristics,
        })
    }

    pub fn characteristics(&self) -> &ModelCharacteristics {
        &self.characteristics
    }

    pub fn info(&self) -> ClassifierInfo {
        ClassifierInfo {
            model_path: self.model_path.clone(),
            tokenizer_path: self.tokenizer_path.clone(),
            num_labels: self.characteristics.num_labels,
            max_sequence_length: self.characteristics.max_sequence_length,
            input_names: self.session.inputs.iter().map(|i| i.name.clone()).collect(),
        }
    }

    /// Counts tokens before truncation, including special tokens.
    pub fn count_tokens(&self, text: &str) -> Result<usize, InferenceError> {
        self.raw_tokenizer
            .encode(text, true)
            .map(|encoding| encoding.get_ids().len())
            .map_err(InferenceError::Encoding)
    }

    fn validate_model(session: &Session, num_labels: usize) -> Result<(), LoadError> {
        for required in REQUIRED_INPUTS {
            if !session.inputs.iter().any(|input| input.name == required) {
                return Err(LoadError::InvalidModel(format!("Model has no '{}' input", required)));
            }
        }
        let output = session.outputs.first().ok_or_else(|| {
            LoadError::InvalidModel("Model must have at least 1 output for logits".to_string())
        })?;
        match &output.output_type {
            ValueType::Tensor { dimensions, .. } => {
                check_output_dimensions(dimensions, num_labels).map_err(LoadError::InvalidModel)
            }
            other => Err(LoadError::InvalidModel(format!(
                "Output '{}' must be a tensor, found {:?}",
                output.name, other
            ))),
        }
    }
}

/// Declared output dims must be `[batch, num_labels]`; `-1` marks a
/// dynamic axis, which is checked again on every forward pass.
fn check_output_dimensions(dimensions: &[i64], num_labels: usize) -> Result<(), String> {
    match dimensions {
        [_, labels] if *labels < 0 || *labels as usize == num_labels => Ok(()),
        [_, labels] => Err(format!(
            "Classification head has {} labels, expected {}",
            labels, num_labels
        )),
        _ => Err(format!("Expected logits of rank 2, model declares {:?}", dimensions)),
    }
}

fn check_logits_shape(shape: &[usize], num_labels: usize) -> Result<(), InferenceError> {
    if shape != [1, num_labels] {
        return Err(InferenceError::Output(format!(
            "Expected logits of shape [1, {}], got {:?}",
            num_labels, shape
        )));
    }
    Ok(())
}

impl SequenceClassifier for EmotionClassifier {
    fn encode(&self, text: &str) -> Result<EncodedText, InferenceError> {
        encode_fixed(&self.tokenizer, text, self.characteristics.max_sequence_length)
    }

    /// Expects `[1, num_labels]` logits as the first output.
    fn logits(&self, encoded: &EncodedText) -> Result<Vec<f32>, InferenceError> {
        let len = encoded.len();
        let input_ids = Array2::from_shape_vec((1, len), encoded.input_ids.clone())?;
        let attention_mask = Array2::from_shape_vec((1, len), encoded.attention_mask.clone())?;

        let mut inputs = HashMap::new();
        inputs.insert("input_ids", Tensor::from_array(input_ids)?);
        inputs.insert("attention_mask", Tensor::from_array(attention_mask)?);

        let outputs = self.session.run(inputs)?;
        let logits = outputs[0].try_extract_tensor::<f32>()?;

        check_logits_shape(logits.shape(), self.characteristics.num_labels)?;
        Ok(logits.iter().copied().collect())
    }
}

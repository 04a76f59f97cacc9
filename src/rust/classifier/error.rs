use crate::model_manager::ModelError;

/// The model or tokenizer could not be constructed.
///
/// Fatal for the session: no prediction can run without a handle.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Failed to create the cache directory
    #[error("Cache directory error: {0}")]
    Cache(#[source] std::io::Error),
    /// Failed to fetch or verify the model artifacts
    #[error("Model download failed: {0}")]
    Download(#[from] ModelError),
    /// Error occurred while loading or configuring the tokenizer
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[source] tokenizers::Error),
    /// Error occurred while building the ONNX session
    #[error("Model error: {0}")]
    Session(#[from] ort::Error),
    /// The ONNX graph does not have the expected inputs or outputs
    #[error("Invalid model structure: {0}")]
    InvalidModel(String),
    /// The blocking load task panicked or was cancelled
    #[error("Load task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A single prediction failed; the loaded handle stays usable.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The tokenizer could not encode the input
    #[error("Tokenizer error: {0}")]
    Encoding(#[source] tokenizers::Error),
    /// The encoding does not have the fixed length the model expects
    #[error("Encoded {sequence} has length {actual}, expected {expected}")]
    Length {
        sequence: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Input tensors could not be built from the encoding
    #[error("Failed to build input tensor: {0}")]
    Shape(#[from] ndarray::ShapeError),
    /// Error occurred while running the forward pass
    #[error("Forward pass failed: {0}")]
    Forward(#[from] ort::Error),
    /// The model produced logits that cannot be ranked
    #[error("Malformed model output: {0}")]
    Output(String),
}

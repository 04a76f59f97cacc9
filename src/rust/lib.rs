//! Predicts a cat's emotion from a free-text description of its behavior.
//!
//! A pretrained RoBERTa sequence classifier (exported to ONNX) maps the
//! text to one of nine labels. The model is fetched from the Hugging Face
//! hub on first use and kept for the rest of the process.
//!
//! # Basic Usage
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use cattolingo::{load, predict, LoadOptions};
//!
//! let classifier = load(&LoadOptions::default()).await?;
//!
//! match predict("the cat is purring softly", classifier.as_ref())? {
//!     Some(emotion) => println!("Emotion: {} {}", emotion, emotion.emoji()),
//!     None => println!("Nothing to analyze"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! [`load`] returns an `Arc<EmotionClassifier>`; concurrent first callers
//! share one load, and the handle can be used from any thread afterwards.

pub mod classifier;
mod runtime;
pub mod model_manager;
pub mod models;
pub mod text;

pub use classifier::{
    argmax, classify, load, load_uncached, loaded, predict, ClassifierInfo, Emotion, EmotionClassifier,
    EncodedText, InferenceError, LoadError, LoadOptions, ModelLoader, ParseEmotionError, Prediction,
    SequenceClassifier,
};
pub use runtime::{RuntimeConfig, create_session_builder};
pub use model_manager::{ModelManager, ModelError};
pub use models::{BuiltinModel, ModelCharacteristics, ModelInfo};
pub use text::normalize;

pub fn init_logger() {
    env_logger::init();
}

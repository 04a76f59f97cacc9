mod emotion;
mod encoding;
mod error;
mod loader;
mod model;
mod predictor;

pub use emotion::{Emotion, ParseEmotionError};
pub use encoding::EncodedText;
pub use error::{InferenceError, LoadError};
pub use loader::{load, load_uncached, loaded, LoadOptions, ModelLoader};
pub use model::{ClassifierInfo, EmotionClassifier, SequenceClassifier};
pub use predictor::{argmax, classify, predict, Prediction};

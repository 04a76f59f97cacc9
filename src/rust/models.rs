use serde::{Deserialize, Serialize};

const HUB_BASE_URL: &str = "https://huggingface.co";

/// Represents the available built-in models in the library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinModel {
    /// RoBERTa-large fine-tuned on cat behavior descriptions
    ///
    /// Characteristics:
    /// - Classes: 9 emotions
    /// - Max sequence length: 192
    /// - Size: ~1.4GB
    CatEmotionRoberta,
}

/// Characteristics of a model including its capabilities and requirements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCharacteristics {
    /// Number of logits produced by the classification head
    pub num_labels: usize,
    /// Fixed length every encoding is padded or truncated to
    pub max_sequence_length: usize,
    /// Approximate size of the model in memory
    pub model_size_mb: usize,
}

/// Where a model's files live on the hub and how to verify them.
///
/// Hashes are optional; when present the downloaded bytes must match the
/// SHA-256 hex digest exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Local directory name under the cache root
    pub name: String,
    /// Hub repository, e.g. `owner/model`
    pub repo_id: String,
    /// Branch, tag or commit
    pub revision: String,
    /// Path of the ONNX graph inside the repository
    pub model_file: String,
    /// Path of the `tokenizer.json` inside the repository
    pub tokenizer_file: String,
    pub model_hash: Option<String>,
    pub tokenizer_hash: Option<String>,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>, repo_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repo_id: repo_id.into(),
            revision: "main".to_string(),
            model_file: "model.onnx".to_string(),
            tokenizer_file: "tokenizer.json".to_string(),
            model_hash: None,
            tokenizer_hash: None,
        }
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    pub fn model_url(&self) -> String {
        self.file_url(&self.model_file)
    }

    pub fn tokenizer_url(&self) -> String {
        self.file_url(&self.tokenizer_file)
    }

    fn file_url(&self, file: &str) -> String {
        format!("{}/{}/resolve/{}/{}", HUB_BASE_URL, self.repo_id, self.revision, file)
    }
}

impl BuiltinModel {
    /// Get the characteristics of the model
    pub fn characteristics(&self) -> ModelCharacteristics {
        match self {
            Self::CatEmotionRoberta => ModelCharacteristics {
                num_labels: 9,
                max_sequence_length: 192,
                model_size_mb: 1420,
            },
        }
    }

    /// Get the hub location of the model and tokenizer files
    pub fn get_model_info(&self) -> ModelInfo {
        match self {
            Self::CatEmotionRoberta => {
                ModelInfo::new("cattolingo-nlp-roberta-large", "Nour87/cattolingo-nlp-roberta-large")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_urls() {
        let info = BuiltinModel::CatEmotionRoberta.get_model_info();
        assert_eq!(
            info.model_url(),
            "https://huggingface.co/Nour87/cattolingo-nlp-roberta-large/resolve/main/model.onnx"
        );
        assert_eq!(
            info.tokenizer_url(),
            "https://huggingface.co/Nour87/cattolingo-nlp-roberta-large/resolve/main/tokenizer.json"
        );
    }

    #[test]
    fn test_revision_pins_url() {
        let info = ModelInfo::new("demo", "owner/demo").with_revision("v2");
        assert!(info.model_url().contains("/resolve/v2/"));
    }

    #[test]
    fn test_characteristics() {
        let c = BuiltinModel::CatEmotionRoberta.characteristics();
        assert_eq!(c.num_labels, 9);
        assert_eq!(c.max_sequence_length, 192);
    }
}

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use log::info;
use tokio::sync::OnceCell;

use super::error::LoadError;
use super::model::EmotionClassifier;
use crate::model_manager::ModelManager;
use crate::models::{BuiltinModel, ModelCharacteristics, ModelInfo};
use crate::runtime::RuntimeConfig;

/// Everything needed to resolve and construct the classifier.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub model: ModelInfo,
    pub characteristics: ModelCharacteristics,
    /// Overrides [`ModelManager::get_default_models_dir`]
    pub cache_dir: Option<PathBuf>,
    pub runtime: RuntimeConfig,
    /// Delete cached files and download them again
    pub fresh: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        let model = BuiltinModel::CatEmotionRoberta;
        Self {
            model: model.get_model_info(),
            characteristics: model.characteristics(),
            cache_dir: None,
            runtime: RuntimeConfig::default(),
            fresh: false,
        }
    }
}

/// Builds a value at most once and hands out shared references to it.
///
/// Concurrent first callers wait on the same initialization. A failed
/// initialization stores nothing, so the next call runs `init` again.
#[derive(Debug)]
pub struct ModelLoader<T> {
    cell: OnceCell<Arc<T>>,
}

impl<T> ModelLoader<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Returns the cached value, running `init` only if nothing is cached.
    pub async fn get_or_load<F, Fut, E>(&self, init: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.cell
            .get_or_try_init(|| async move { init().await.map(Arc::new) })
            .await
            .map(Arc::clone)
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}

impl<T> Default for ModelLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

static SHARED_CLASSIFIER: ModelLoader<EmotionClassifier> = ModelLoader::new();

/// Returns the process-wide classifier, loading it on first use.
///
/// Only the first successful call's `options` take effect; later calls
/// return the cached handle regardless of their options.
pub async fn load(options: &LoadOptions) -> Result<Arc<EmotionClassifier>, LoadError> {
    SHARED_CLASSIFIER.get_or_load(|| load_uncached(options.clone())).await
}

/// The process-wide classifier, if [`load`] has succeeded.
pub fn loaded() -> Option<Arc<EmotionClassifier>> {
    SHARED_CLASSIFIER.get()
}

/// Downloads the artifacts if needed and constructs a fresh classifier.
pub async fn load_uncached(options: LoadOptions) -> Result<EmotionClassifier, LoadError> {
    let manager = match &options.cache_dir {
        Some(dir) => ModelManager::new(dir),
        None => ModelManager::new_default(),
    }
    .map_err(LoadError::Cache)?;

    info!(
        "Loading model {} (~{}MB) from {} into {:?}",
        options.model.name,
        options.characteristics.model_size_mb,
        options.model.repo_id,
        manager.models_dir()
    );
    if options.fresh {
        info!("Fresh download requested - removing any existing model files...");
        manager.remove_download(&options.model)?;
    }
    manager.ensure_model_downloaded(&options.model).await?;
    let (model_path, tokenizer_path) = manager.require_downloaded(&options.model)?;

    let LoadOptions {
        characteristics,
        runtime,
        ..
    } = options;
    let classifier = tokio::task::spawn_blocking(move || {
        EmotionClassifier::from_files(model_path, tokenizer_path, characteristics, &runtime)
    })
    .await??;

    info!("Model loaded successfully");
    Ok(classifier)
}

use std::path::{Path, PathBuf};
use std::fs;
use std::io;
use std::sync::Arc;
use std::env;
use tokio::sync::Mutex;
use sha2::{Sha256, Digest};

use crate::models::ModelInfo;

pub const CACHE_ENV_VAR: &str = "CATTOLINGO_CACHE";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model not downloaded: {0}")]
    NotDownloaded(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("Download of {url} failed with HTTP status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Model verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
}

/// Downloads model artifacts from the hub into a local cache directory.
///
/// Files are laid out as `<models_dir>/<model name>/<file name>`.
#[derive(Debug, Clone)]
pub struct ModelManager {
    models_dir: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

impl ModelManager {
    /// Creates a new ModelManager with the default models directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_models_dir())
    }

    /// Returns the default models directory path
    pub fn get_default_models_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var(CACHE_ENV_VAR) {
            return PathBuf::from(path).join("models");
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("cattolingo").join("models");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("cattolingo").join("models");
        }

        // 4. If all else fails, use system temp directory
        env::temp_dir().join("cattolingo").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn get_model_path(&self, info: &ModelInfo) -> PathBuf {
        self.models_dir.join(&info.name).join(file_name(&info.model_file))
    }

    pub fn get_tokenizer_path(&self, info: &ModelInfo) -> PathBuf {
        self.models_dir.join(&info.name).join(file_name(&info.tokenizer_file))
    }

    pub fn is_model_downloaded(&self, info: &ModelInfo) -> bool {
        let model_path = self.get_model_path(info);
        let tokenizer_path = self.get_tokenizer_path(info);
        log::debug!("Model path: {:?} (exists: {})", model_path, model_path.exists());
        log::debug!("Tokenizer path: {:?} (exists: {})", tokenizer_path, tokenizer_path.exists());
        model_path.exists() && tokenizer_path.exists()
    }

    /// Fails with `NotDownloaded` unless both files are already cached.
    pub fn require_downloaded(&self, info: &ModelInfo) -> Result<(PathBuf, PathBuf), ModelError> {
        if !self.is_model_downloaded(info) {
            return Err(ModelError::NotDownloaded(info.name.clone()));
        }
        Ok((self.get_model_path(info), self.get_tokenizer_path(info)))
    }

    pub async fn download_model(&self, info: &ModelInfo) -> Result<(), ModelError> {
        let _lock = self.download_lock.lock().await;

        let model_dir = self.models_dir.join(&info.name);
        log::info!("Creating model directory at {:?}", model_dir);
        fs::create_dir_all(&model_dir)?;

        let model_path = self.get_model_path(info);
        let result = self
            .fetch_if_stale(&info.model_url(), &model_path, info.model_hash.as_deref(), "model")
            .await;
        let result = match result {
            Ok(()) => {
                let tokenizer_path = self.get_tokenizer_path(info);
                self.fetch_if_stale(
                    &info.tokenizer_url(),
                    &tokenizer_path,
                    info.tokenizer_hash.as_deref(),
                    "tokenizer",
                )
                .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                log::info!("Model and tokenizer ready to use");
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to set up model '{}': {}", info.name, e);
                let _ = self.remove_download(info);
                Err(e)
            }
        }
    }

    async fn fetch_if_stale(
        &self,
        url: &str,
        path: &Path,
        expected_hash: Option<&str>,
        file_type: &str,
    ) -> Result<(), ModelError> {
        if path.exists() {
            match expected_hash {
                None => {
                    log::info!("{} file already cached at {:?}", file_type, path);
                    return Ok(());
                }
                Some(hash) if self.verify_file(path, hash)? => {
                    log::info!("Existing {} file verified successfully", file_type);
                    return Ok(());
                }
                Some(_) => log::warn!("{} file verification failed, redownloading", file_type),
            }
        }
        self.download_and_verify_file(url, path, expected_hash, file_type).await
    }

    fn verify_file(&self, path: &Path, expected_hash: &str) -> Result<bool, ModelError> {
        let bytes = fs::read(path)?;
        let hash = sha256_hex(&bytes);
        log::debug!("Verifying {:?}: calculated {}, expected {}", path, hash, expected_hash);
        Ok(hash == expected_hash)
    }

    /// Checks that both files exist and match their hashes, when hashes are known.
    pub fn verify_model(&self, info: &ModelInfo) -> Result<bool, ModelError> {
        let model_path = self.get_model_path(info);
        let tokenizer_path = self.get_tokenizer_path(info);

        if !model_path.exists() || !tokenizer_path.exists() {
            log::info!("One or both files do not exist");
            return Ok(false);
        }

        let model_ok = match &info.model_hash {
            Some(hash) => self.verify_file(&model_path, hash)?,
            None => true,
        };
        let tokenizer_ok = match &info.tokenizer_hash {
            Some(hash) => self.verify_file(&tokenizer_path, hash)?,
            None => true,
        };

        log::info!("Model hash verification: {}, tokenizer hash verification: {}", model_ok, tokenizer_ok);
        Ok(model_ok && tokenizer_ok)
    }

    async fn download_and_verify_file(
        &self,
        url: &str,
        path: &Path,
        expected_hash: Option<&str>,
        file_type: &str,
    ) -> Result<(), ModelError> {
        log::info!("Downloading {} file from {} to {:?}", file_type, url, path);
        let response = reqwest::get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::HttpStatus { url: url.to_string(), status });
        }
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        if let Some(expected) = expected_hash {
            let hash = sha256_hex(&bytes);
            if hash != expected {
                log::error!("{} hash mismatch: expected {}, got {}", file_type, expected, hash);
                return Err(ModelError::HashMismatch {
                    file_type: file_type.to_string(),
                    expected: expected.to_string(),
                    actual: hash,
                });
            }
        }

        write_atomically(path, &bytes)?;

        if let Some(expected) = expected_hash {
            if !self.verify_file(path, expected)? {
                return Err(ModelError::VerificationFailed);
            }
        }

        log::info!("{} file downloaded successfully", file_type);
        Ok(())
    }

    pub fn remove_download(&self, info: &ModelInfo) -> Result<(), ModelError> {
        let model_path = self.get_model_path(info);
        let tokenizer_path = self.get_tokenizer_path(info);

        if model_path.exists() {
            fs::remove_file(&model_path)?;
        }
        if tokenizer_path.exists() {
            fs::remove_file(&tokenizer_path)?;
        }
        Ok(())
    }

    /// Ensures that a model is downloaded and verified.
    /// If the model doesn't exist, it will be downloaded.
    /// If verification fails, it will be re-downloaded.
    pub async fn ensure_model_downloaded(&self, info: &ModelInfo) -> Result<(), ModelError> {
        log::info!("Checking if model {} is downloaded...", info.name);
        if !self.is_model_downloaded(info) {
            log::info!("Model not found, downloading...");
            self.download_model(info).await?;
        } else if !self.verify_model(info)? {
            log::info!("Model verification failed, re-downloading...");
            self.remove_download(info)?;
            self.download_model(info).await?;
        } else {
            log::info!("Model verification successful");
        }
        Ok(())
    }
}

/// Writes to `<path>.part` and renames it into place, so an interrupted
/// download never leaves a truncated file at `path`.
fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let partial = partial_path(path);
    if let Err(e) = fs::write(&partial, bytes).and_then(|()| fs::rename(&partial, path)) {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

fn file_name(path_in_repo: &str) -> &str {
    path_in_repo.rsplit('/').next().unwrap_or(path_in_repo)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

//! Pronunciation audio: synthesis, storage and URL building.
//!
//! [`AudioStore`] owns the directory of generated mp3 files. [`AudioService`]
//! wraps a [`SpeechSynthesizer`] and turns forms into [`AudioRef`]s; any
//! failure becomes [`AudioRef::Unavailable`] for that form only.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lexicon_types::AudioRef;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::speech::SpeechSynthesizer;

#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
    public_base_url: String,
}

impl AudioStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    /// `{sha256 hex of form}_{yyyymmdd_HHMMSS}.mp3`
    pub fn file_name(form: &str, at: DateTime<Utc>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(form.as_bytes());
        format!(
            "{:x}_{}.mp3",
            hasher.finalize(),
            at.format("%Y%m%d_%H%M%S")
        )
    }

    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/files/{}", self.public_base_url, file_name)
    }

    /// Write `bytes` for `form` and return the new file name.
    pub async fn save(&self, form: &str, bytes: &[u8]) -> io::Result<String> {
        self.ensure_dir().await?;
        let name = Self::file_name(form, Utc::now());
        fs::write(self.dir.join(&name), bytes).await?;
        Ok(name)
    }

    /// Contents of a stored file, `None` when it does not exist or the name
    /// could escape the directory.
    pub async fn read(&self, file_name: &str) -> io::Result<Option<Vec<u8>>> {
        if !is_plain_file_name(file_name) {
            return Ok(None);
        }
        match fs::read(self.dir.join(file_name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && !name.contains("..")
}

pub struct AudioService {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    store: AudioStore,
    concurrency: usize,
    timeout: Duration,
}

impl AudioService {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        store: AudioStore,
        concurrency: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            synthesizer,
            store,
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    pub fn store(&self) -> &AudioStore {
        &self.store
    }

    /// Synthesize and store audio for one form.
    pub async fn resolve(&self, form: &str) -> AudioRef {
        let input = form.split_whitespace().collect::<Vec<_>>().join(" ");
        if input.is_empty() {
            return AudioRef::Unavailable;
        }

        let bytes = match tokio::time::timeout(self.timeout, self.synthesizer.synthesize(&input))
            .await
        {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(err)) => {
                warn!(form = %input, %err, "speech synthesis failed");
                return AudioRef::Unavailable;
            }
            Err(_) => {
                warn!(form = %input, timeout = ?self.timeout, "speech synthesis timed out");
                return AudioRef::Unavailable;
            }
        };

        match self.store.save(&input, &bytes).await {
            Ok(name) => {
                debug!(form = %input, file = %name, "stored audio");
                AudioRef::Url(self.store.url_for(&name))
            }
            Err(err) => {
                warn!(form = %input, %err, "failed to store audio");
                AudioRef::Unavailable
            }
        }
    }

    /// Resolve many forms concurrently. Duplicates are synthesized once;
    /// the map is keyed by the forms as given.
    pub async fn resolve_all(self: &Arc<Self>, forms: Vec<String>) -> HashMap<String, AudioRef> {
        let mut seen = HashSet::new();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        for form in forms {
            if !seen.insert(form.clone()) {
                continue;
            }
            let service = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let audio = match semaphore.acquire_owned().await {
                    Ok(_permit) => service.resolve(&form).await,
                    Err(_) => AudioRef::Unavailable,
                };
                (form, audio)
            });
        }

        let mut resolved = HashMap::with_capacity(seen.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((form, audio)) => {
                    resolved.insert(form, audio);
                }
                Err(err) => warn!(%err, "audio task failed"),
            }
        }
        resolved
    }
}

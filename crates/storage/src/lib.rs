use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use settle_core::{ErrorCategory, WaitError};
use std::path::{Path, PathBuf};

/// What a stored artifact contains; decides the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Screenshot,
    Html,
    Record,
}

impl ArtifactKind {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Screenshot => "png",
            Self::Html => "html",
            Self::Record => "json",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub kind: ArtifactKind,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, kind: ArtifactKind, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), kind, bytes }
    }
}

/// Summary written next to the screenshot and HTML of a failed step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    pub step: String,
    pub message: String,
    pub category: ErrorCategory,
    pub context: serde_json::Value,
    pub screenshot: Option<PathBuf>,
    pub html: Option<PathBuf>,
}

impl FailureRecord {
    pub fn from_error(step: impl Into<String>, error: &WaitError) -> Self {
        Self {
            step: step.into(),
            message: error.to_string(),
            category: error.category(),
            context: error.context(),
            screenshot: None,
            html: None,
        }
    }

    pub fn to_artifact(&self) -> Result<Artifact> {
        let data = serde_json::to_vec_pretty(self)?;
        Ok(Artifact::new(self.step.clone(), ArtifactKind::Record, data))
    }
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist the artifact and return where it ended up.
    async fn save(&self, artifact: &Artifact) -> Result<PathBuf>;
}

/// Writes artifacts as `{name}-{id}.{ext}` into one directory.
pub struct DirArtifactStore {
    pub folder: PathBuf,
}

impl DirArtifactStore {
    pub fn new(folder: impl AsRef<Path>) -> Result<Self> {
        let folder = folder.as_ref().to_path_buf();
        std::fs::create_dir_all(&folder)?;
        Ok(Self { folder })
    }

    fn file_name(artifact: &Artifact) -> String {
        let stem: String = artifact
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let id = uuid::Uuid::new_v4().simple().to_string();
        format!("{}-{}.{}", stem, &id[..8], artifact.kind.extension())
    }
}

#[async_trait]
impl ArtifactStore for DirArtifactStore {
    async fn save(&self, artifact: &Artifact) -> Result<PathBuf> {
        let path = self.folder.join(Self::file_name(artifact));
        tokio::fs::write(&path, &artifact.bytes).await?;
        tracing::debug!(path = %path.display(), bytes = artifact.bytes.len(), "artifact saved");
        Ok(path)
    }
}

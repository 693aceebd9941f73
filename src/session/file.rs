use super::{CurrentProject, SessionError, SessionSink};
use std::path::{Path, PathBuf};

/// Session persisted as a small JSON document
pub struct FileSession {
    path: PathBuf,
}

impl FileSession {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored selection, if any
    pub fn current(&self) -> Result<Option<CurrentProject>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| SessionError::Io {
            path: self.path.clone(),
            source,
        })?;
        let current: CurrentProject = serde_json::from_str(&content)?;

        Ok(Some(current))
    }

    /// Overwrite the stored selection
    pub fn save(&self, current: &CurrentProject) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SessionError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(current)?;
        std::fs::write(&self.path, json).map_err(|source| SessionError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(
            project_id = current.current_project_id,
            path = %self.path.display(),
            "saved session"
        );

        Ok(())
    }

    /// Forget the stored selection
    pub fn clear(&self) -> Result<(), SessionError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|source| SessionError::Io {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

impl SessionSink for FileSession {
    fn record_selection(&self, id: u64, name: &str) {
        if let Err(e) = self.save(&CurrentProject::new(id, name)) {
            tracing::warn!(error = %e, project_id = id, "failed to persist selected project");
        }
    }
}

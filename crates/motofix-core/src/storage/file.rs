//! File-backed session storage
//!
//! Each key is a file inside a private directory. On Unix the directory is
//! created `0700` and files are written `0600`.

use super::SessionStorage;
use crate::error::{MotofixError, MotofixResult};
use std::path::{Path, PathBuf};

/// File-based session storage
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    base_path: PathBuf,
}

impl FileSessionStorage {
    /// Create new file-based storage rooted at `base_path`
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Create storage rooted at `base_path`, creating the directory securely
    pub fn open(base_path: impl Into<PathBuf>) -> MotofixResult<Self> {
        let storage = Self::new(base_path);
        storage.ensure_dir()?;
        Ok(storage)
    }

    /// Directory holding the session files
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn ensure_dir(&self) -> MotofixResult<()> {
        let path = &self.base_path;

        #[cfg(unix)]
        {
            use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
            let mut builder = std::fs::DirBuilder::new();
            builder.recursive(true).mode(0o700);
            builder
                .create(path)
                .map_err(|e| storage_error(e, path))?;

            let mode = std::fs::metadata(path)
                .map_err(|e| storage_error(e, path))?
                .permissions()
                .mode()
                & 0o777;
            if mode != 0o700 {
                tracing::warn!(
                    "Session directory has insecure permissions: {:o}. Expected 0700. Fixing...",
                    mode
                );
                std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
                    .map_err(|e| storage_error(e, path))?;
            }
        }

        #[cfg(not(unix))]
        {
            std::fs::create_dir_all(path).map_err(|e| storage_error(e, path))?;
        }

        Ok(())
    }

    fn key_path(&self, key: &str) -> PathBuf {
        // Sanitize key to prevent path traversal
        let safe_key = key.replace(['/', '\\'], "_").replace("..", "_");
        self.base_path.join(format!("{}.json", safe_key))
    }
}

/// Write `value` to a file that is owner-only from the moment it is created
fn write_private(path: &Path, value: &str) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        // a leftover tmp file keeps its old mode across open()
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(value.as_bytes())?;
    file.sync_all()
}

fn storage_error(err: std::io::Error, path: &Path) -> MotofixError {
    MotofixError::storage_with_path(err.to_string(), path.display().to_string())
}

impl SessionStorage for FileSessionStorage {
    fn get(&self, key: &str) -> MotofixResult<Option<String>> {
        let path = self.key_path(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(e, &path)),
        }
    }

    fn set(&self, key: &str, value: &str) -> MotofixResult<()> {
        self.ensure_dir()?;
        let path = self.key_path(key);

        // Write to a sibling and rename so readers never see a torn value
        let tmp = path.with_extension("json.tmp");
        write_private(&tmp, value).map_err(|e| storage_error(e, &tmp))?;

        std::fs::rename(&tmp, &path).map_err(|e| storage_error(e, &path))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> MotofixResult<()> {
        let path = self.key_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(e, &path)),
        }
    }
}

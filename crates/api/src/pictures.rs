//! On-disk storage for profile pictures, served statically under `/pictures`.

use std::path::{Component, Path, PathBuf};

use eyre::{eyre, Result};
use tokio::fs;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct PictureStore {
    dir: PathBuf,
}

impl PictureStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `data` under `filename`, replacing any existing file.
    pub async fn save(&self, filename: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(filename)?;
        fs::create_dir_all(&self.dir).await?;
        fs::write(&path, data).await?;

        info!(path = %path.display(), size = data.len(), "Profile picture stored");
        Ok(())
    }

    /// Removes a stored picture; a missing file is not an error.
    pub async fn remove(&self, filename: &str) -> Result<()> {
        let path = self.path_for(filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Old profile picture removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Filenames must be a single plain path component.
    fn path_for(&self, filename: &str) -> Result<PathBuf> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.dir.join(filename)),
            _ => Err(eyre!("Refusing to store picture under '{}'", filename)),
        }
    }
}

use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Prefix of every stored image reference; the files are served under `/images`.
pub const IMAGE_REF_PREFIX: &str = "images/";

/// Upload filenames are random per millisecond; a collision is retried.
const MAX_NAME_ATTEMPTS: usize = 8;

/// Manages uploaded image files on disk.
///
/// Each image is stored as a flat file in the image root. The ledger only ever
/// sees the reference `images/<filename>`.
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub async fn new(dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Image storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an uploaded image and return its reference.
    pub async fn save(&self, original_name: Option<&str>, data: &[u8]) -> io::Result<String> {
        let mut last_err = None;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let filename = stored_filename(original_name);
            let path = self.dir.join(&filename);

            match fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => {
                    persist(&path, file, data).await?;
                    debug!("Stored image {} ({} bytes)", filename, data.len());
                    return Ok(format!("{IMAGE_REF_PREFIX}{filename}"));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => last_err = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or_else(|| io::Error::other("could not pick an image filename")))
    }

    /// Best-effort removal; failures are logged, never returned.
    pub async fn remove(&self, reference: &str) {
        let Some(path) = self.resolve(reference) else {
            warn!("Refusing to remove unexpected image reference '{}'", reference);
            return;
        };

        match fs::remove_file(&path).await {
            Ok(()) => debug!("Removed image {}", reference),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Image {} already gone", reference);
            }
            Err(e) => warn!("Failed to remove image {}: {}", reference, e),
        }
    }

    pub async fn remove_all(&self, references: &[String]) {
        for reference in references {
            self.remove(reference).await;
        }
    }

    /// Map a reference back to a path inside the image root. Anything that is
    /// not a bare filename under the prefix is rejected.
    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let name = reference.strip_prefix(IMAGE_REF_PREFIX)?;
        let is_bare = !name.is_empty()
            && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
            && name != ".."
            && name != ".";
        is_bare.then(|| self.dir.join(name))
    }
}

/// Write `data` into the freshly created file at `path`. On failure the file
/// is removed again so no truncated image stays behind.
async fn persist<W: AsyncWrite + Unpin>(path: &Path, mut file: W, data: &[u8]) -> io::Result<()> {
    let written = async {
        file.write_all(data).await?;
        file.flush().await
    }
    .await;

    if written.is_err() {
        drop(file);
        if let Err(e) = fs::remove_file(path).await {
            warn!("Failed to remove partial image {}: {}", path.display(), e);
        }
    }
    written
}

/// `photo_<unix millis>_<0..9999><.ext>`, keeping only a sane lowercased extension.
pub fn stored_filename(original_name: Option<&str>) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let random: u32 = rand::rng().random_range(0..10_000);
    let ext = original_name.map(extension).unwrap_or_default();
    format!("photo_{timestamp}_{random}{ext}")
}

fn extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

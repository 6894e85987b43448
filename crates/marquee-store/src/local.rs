//! File-backed favorites store

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use marquee_core::{FavoriteEntry, FavoritesBackend, MovieId, StorageError};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Favorites persisted as a single JSON file under a directory
///
/// Every operation is a guarded read-modify-write of the whole file; the set
/// is small (it is one user's favorites), so whole-file rewrites are cheaper
/// than maintaining an incremental format. Writes go through a temp file and
/// rename so a crash never leaves a half-written list.
pub struct LocalFavoritesStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl LocalFavoritesStore {
    const FAVORITES_FILE: &'static str = "favorites.json";

    /// Open (or create) a favorites store rooted at the given directory
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;

        let path = dir.join(Self::FAVORITES_FILE);
        if !fs::try_exists(&path).await? {
            fs::write(&path, "[]").await?;
        }

        info!("Opened favorites store at {:?}", path);
        Ok(Self {
            path,
            guard: Mutex::new(()),
        })
    }

    async fn read_entries(&self) -> Result<Vec<FavoriteEntry>, StorageError> {
        let json = fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&json)?)
    }

    async fn write_entries(&self, entries: &[FavoriteEntry]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl FavoritesBackend for LocalFavoritesStore {
    async fn add(&self, entry: &FavoriteEntry) -> Result<(), StorageError> {
        let _guard = self.guard.lock().await;
        let mut entries = self.read_entries().await?;
        entries.retain(|e| e.movie_id() != entry.movie_id());
        entries.push(entry.clone());
        self.write_entries(&entries).await?;
        debug!("Persisted favorite {}", entry.movie_id());
        Ok(())
    }

    async fn remove(&self, movie_id: MovieId) -> Result<(), StorageError> {
        let _guard = self.guard.lock().await;
        let mut entries = self.read_entries().await?;
        entries.retain(|e| e.movie_id() != movie_id);
        self.write_entries(&entries).await?;
        debug!("Removed favorite {}", movie_id);
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<FavoriteEntry>, StorageError> {
        let _guard = self.guard.lock().await;
        self.read_entries().await
    }
}

use std::{
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use error::DatabaseError;
use lending::LendingDocument;
use manga::MangasDocument;
use reading::ReadingDocument;
use user::UsersDocument;

pub mod error;
pub mod lending;
pub mod manga;
pub mod reading;
pub mod user;

pub const USERS_FILE: &str = "users.json";
pub const MANGAS_FILE: &str = "mangas.json";
pub const LENDING_FILE: &str = "manga-status.json";
pub const READING_FILE: &str = "tasks.json";

/// A whole collection kept as one JSON document on disk.
///
/// Reads deserialize the full file; a missing file is the empty document.
/// Writes go to a sibling temp file that is renamed over the target, and
/// are serialized by a per-collection lock.
pub struct JsonFile<T> {
    path: PathBuf,
    writer: Arc<Mutex<()>>,
    _document: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonFile<T> {
    fn clone(&self) -> Self {
        JsonFile {
            path: self.path.clone(),
            writer: self.writer.clone(),
            _document: PhantomData,
        }
    }
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFile {
            path: path.into(),
            writer: Arc::new(Mutex::new(())),
            _document: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[tracing::instrument(name = "read document", skip_all, fields(path = %self.path.display()))]
    pub async fn read(&self) -> Result<T, DatabaseError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("document missing, using empty collection");
                return Ok(T::default());
            }
            Err(source) => {
                return Err(DatabaseError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_slice(&raw).map_err(|source| DatabaseError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    pub async fn write(&self, document: &T) -> Result<(), DatabaseError> {
        let _guard = self.writer.lock().await;
        self.persist(document).await
    }

    /// Read, mutate and write back while holding the collection's writer
    /// lock. Nothing is written when `mutate` fails.
    pub async fn update<R, E, F>(&self, mutate: F) -> Result<R, E>
    where
        F: FnOnce(&mut T) -> Result<R, E>,
        E: From<DatabaseError>,
    {
        let _guard = self.writer.lock().await;

        let mut document = self.read().await?;
        let result = mutate(&mut document)?;
        self.persist(&document).await?;

        Ok(result)
    }

    #[tracing::instrument(name = "persist document", skip_all, fields(path = %self.path.display()))]
    async fn persist(&self, document: &T) -> Result<(), DatabaseError> {
        let raw = serde_json::to_vec_pretty(document).map_err(|source| {
            DatabaseError::Serialize {
                path: self.path.clone(),
                source,
            }
        })?;

        let staging = self.path.with_extension("json.tmp");
        let io_error = |source| DatabaseError::Io {
            path: self.path.clone(),
            source,
        };

        tokio::fs::write(&staging, raw).await.map_err(io_error)?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(io_error)?;

        Ok(())
    }
}

/// The four collections backing the library.
#[derive(Clone)]
pub struct Database {
    pub users: JsonFile<UsersDocument>,
    pub mangas: JsonFile<MangasDocument>,
    pub lending: JsonFile<LendingDocument>,
    pub reading: JsonFile<ReadingDocument>,
}

impl Database {
    pub async fn open(data_dir: &Path) -> Result<Self, DatabaseError> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|source| DatabaseError::Io {
                path: data_dir.to_path_buf(),
                source,
            })?;

        tracing::info!(data_dir = %data_dir.display(), "Opened JSON document store");

        Ok(Database {
            users: JsonFile::new(data_dir.join(USERS_FILE)),
            mangas: JsonFile::new(data_dir.join(MANGAS_FILE)),
            lending: JsonFile::new(data_dir.join(LENDING_FILE)),
            reading: JsonFile::new(data_dir.join(READING_FILE)),
        })
    }
}

/// Millisecond timestamp id, bumped past the largest existing id.
pub fn next_id(existing: impl Iterator<Item = i64>) -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    match existing.max() {
        Some(max) if max >= now => max + 1,
        _ => now,
    }
}

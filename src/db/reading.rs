use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    model::{CompletedReading, ReadingHistoryEntry, ReadingTask},
};

use super::{Database, manga::get_manga_by_id};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ReadingError {
    #[error("Manga not found in the reading list")]
    NotFound,
    #[error("Manga is already in the reading list")]
    AlreadyReading,
}

#[derive(Serialize, Deserialize, Default, Debug)]
pub struct ReadingDocument {
    #[serde(rename = "mangasEmLeitura", default)]
    pub reading: Vec<ReadingTask>,
    #[serde(rename = "mangasLidos", default)]
    pub completed: Vec<CompletedReading>,
    #[serde(rename = "historicoLeitura", default)]
    pub history: Vec<ReadingHistoryEntry>,
}

impl ReadingDocument {
    fn position(&self, user_id: i64, manga_id: i64) -> Result<usize, Error> {
        self.reading
            .iter()
            .position(|task| task.belongs_to(user_id, manga_id))
            .ok_or(Error::Reading(ReadingError::NotFound))
    }
}

#[tracing::instrument(name = "get reading list", skip_all, fields(user_id = user_id))]
pub async fn get_reading(db: &Database, user_id: i64) -> Result<Vec<ReadingTask>, Error> {
    let document = db.reading.read().await?;

    Ok(document
        .reading
        .into_iter()
        .filter(|task| task.user_id == user_id)
        .collect())
}

#[tracing::instrument(name = "get completed readings", skip_all, fields(user_id = user_id))]
pub async fn get_completed(db: &Database, user_id: i64) -> Result<Vec<CompletedReading>, Error> {
    let document = db.reading.read().await?;

    Ok(document
        .completed
        .into_iter()
        .filter(|entry| entry.task.user_id == user_id)
        .collect())
}

#[tracing::instrument(name = "get reading history", skip_all, fields(user_id = user_id))]
pub async fn get_history(db: &Database, user_id: i64) -> Result<Vec<ReadingHistoryEntry>, Error> {
    let document = db.reading.read().await?;

    Ok(document
        .history
        .into_iter()
        .filter(|entry| entry.completed.task.user_id == user_id)
        .collect())
}

#[tracing::instrument(name = "add to reading list", skip_all, fields(user_id = user_id, manga_id = manga_id))]
pub async fn add_to_reading(
    db: &Database,
    user_id: i64,
    manga_id: i64,
) -> Result<ReadingTask, Error> {
    get_manga_by_id(db, manga_id).await?;

    db.reading
        .update(|document| {
            if document
                .reading
                .iter()
                .any(|task| task.belongs_to(user_id, manga_id))
            {
                return Err(Error::Reading(ReadingError::AlreadyReading));
            }

            let task = ReadingTask::new(user_id, manga_id, chrono::Utc::now());
            document.reading.push(task.clone());
            Ok(task)
        })
        .await
}

#[tracing::instrument(name = "update reading progress", skip_all, fields(user_id = user_id, manga_id = manga_id))]
pub async fn update_progress(
    db: &Database,
    user_id: i64,
    manga_id: i64,
    chapter: u32,
) -> Result<ReadingTask, Error> {
    db.reading
        .update(|document| {
            let index = document.position(user_id, manga_id)?;
            let task = &mut document.reading[index];
            task.last_chapter = chapter;
            task.updated_at = Some(chrono::Utc::now());
            Ok(task.clone())
        })
        .await
}

/// Moves a task out of the reading list into both the completed list and
/// the history log in a single write.
#[tracing::instrument(name = "complete reading", skip_all, fields(user_id = user_id, manga_id = manga_id))]
pub async fn complete_reading(
    db: &Database,
    user_id: i64,
    manga_id: i64,
) -> Result<CompletedReading, Error> {
    db.reading
        .update(|document| {
            let index = document.position(user_id, manga_id)?;
            let now = chrono::Utc::now();

            let completed = CompletedReading {
                task: document.reading.remove(index),
                completed_at: now,
            };
            document.completed.push(completed.clone());
            document.history.push(ReadingHistoryEntry {
                completed: completed.clone(),
                recorded_at: now,
            });

            Ok(completed)
        })
        .await
}

#[tracing::instrument(name = "remove from reading list", skip_all, fields(user_id = user_id, manga_id = manga_id))]
pub async fn remove_from_reading(
    db: &Database,
    user_id: i64,
    manga_id: i64,
) -> Result<ReadingTask, Error> {
    db.reading
        .update(|document| {
            let index = document.position(user_id, manga_id)?;
            Ok(document.reading.remove(index))
        })
        .await
}

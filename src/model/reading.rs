use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A manga a user is currently reading.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReadingTask {
    #[serde(rename = "mangaId")]
    pub manga_id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "dataInicio")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "ultimoCapitulo")]
    pub last_chapter: u32,
    #[serde(rename = "ultimaAtualizacao", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ReadingTask {
    pub fn new(user_id: i64, manga_id: i64, now: DateTime<Utc>) -> Self {
        ReadingTask {
            manga_id,
            user_id,
            started_at: now,
            last_chapter: 0,
            updated_at: None,
        }
    }

    pub fn belongs_to(&self, user_id: i64, manga_id: i64) -> bool {
        self.user_id == user_id && self.manga_id == manga_id
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompletedReading {
    #[serde(flatten)]
    pub task: ReadingTask,
    #[serde(rename = "dataConclusao")]
    pub completed_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReadingHistoryEntry {
    #[serde(flatten)]
    pub completed: CompletedReading,
    #[serde(rename = "dataRegistro")]
    pub recorded_at: DateTime<Utc>,
}

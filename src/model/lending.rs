use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a manga is in the lending cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LendingState {
    Available,
    InUse { holder: i64, since: DateTime<Utc> },
}

/// One user's custody period over a manga. `ended_at` is empty while the
/// period is still running.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UsageEntry {
    #[serde(rename = "usuarioId")]
    pub user_id: i64,
    #[serde(rename = "dataInicio")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "dataFim")]
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LendingError {
    #[error("Manga {0} not found")]
    NotFound(i64),
    #[error("This manga is already in use by another user")]
    AlreadyInUse { holder: i64 },
    #[error("This manga is not in use")]
    NotInUse,
    #[error("This manga is in use by another user")]
    HeldByAnotherUser,
}

#[derive(thiserror::Error, Debug)]
#[error("lending record for manga {id} is inconsistent: {reason}")]
pub struct InconsistentLendingRecord {
    id: i64,
    reason: &'static str,
}

/// Lending status of a single manga.
///
/// Only closed usage entries are stored; the open one is derived from
/// [`LendingState::InUse`], so a record can never carry two open entries.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "LendingRecord", into = "LendingRecord")]
pub struct MangaLending {
    id: i64,
    state: LendingState,
    updated_at: Option<DateTime<Utc>>,
    closed: Vec<UsageEntry>,
}

impl MangaLending {
    pub fn new(id: i64) -> Self {
        MangaLending {
            id,
            state: LendingState::Available,
            updated_at: None,
            closed: Vec::new(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn state(&self) -> LendingState {
        self.state
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn is_available(&self) -> bool {
        self.state == LendingState::Available
    }

    pub fn holder(&self) -> Option<i64> {
        match self.state {
            LendingState::Available => None,
            LendingState::InUse { holder, .. } => Some(holder),
        }
    }

    /// Full usage history in chronological order, including the running
    /// period if the manga is in use.
    pub fn history(&self) -> Vec<UsageEntry> {
        let mut history = self.closed.clone();
        if let LendingState::InUse { holder, since } = self.state {
            history.push(UsageEntry {
                user_id: holder,
                started_at: since,
                ended_at: None,
            });
        }
        history
    }

    pub fn take(&mut self, user_id: i64, now: DateTime<Utc>) -> Result<(), LendingError> {
        match self.state {
            LendingState::InUse { holder, .. } => Err(LendingError::AlreadyInUse { holder }),
            LendingState::Available => {
                self.state = LendingState::InUse {
                    holder: user_id,
                    since: now,
                };
                self.updated_at = Some(now);
                Ok(())
            }
        }
    }

    /// Ends the running custody period of `user_id` and returns the closed
    /// entry.
    pub fn release(&mut self, user_id: i64, now: DateTime<Utc>) -> Result<UsageEntry, LendingError> {
        match self.state {
            LendingState::Available => Err(LendingError::NotInUse),
            LendingState::InUse { holder, .. } if holder != user_id => {
                Err(LendingError::HeldByAnotherUser)
            }
            LendingState::InUse { holder, since } => {
                let entry = UsageEntry {
                    user_id: holder,
                    started_at: since,
                    ended_at: Some(now),
                };
                self.closed.push(entry.clone());
                self.state = LendingState::Available;
                self.updated_at = Some(now);
                Ok(entry)
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    #[serde(rename = "disponivel")]
    Available,
    #[serde(rename = "em_uso")]
    InUse,
}

/// On-disk shape of a lending record.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LendingRecord {
    id: i64,
    status: StatusKind,
    #[serde(default)]
    usuario_atual: Option<i64>,
    #[serde(default)]
    ultima_atualizacao: Option<DateTime<Utc>>,
    #[serde(default)]
    historico_uso: Vec<UsageEntry>,
}

impl TryFrom<LendingRecord> for MangaLending {
    type Error = InconsistentLendingRecord;

    fn try_from(record: LendingRecord) -> Result<Self, Self::Error> {
        let id = record.id;
        let inconsistent = |reason| InconsistentLendingRecord { id, reason };

        let (open, closed): (Vec<UsageEntry>, Vec<UsageEntry>) = record
            .historico_uso
            .into_iter()
            .partition(|entry| entry.ended_at.is_none());

        let state = match (record.status, record.usuario_atual, open.as_slice()) {
            (StatusKind::Available, None, []) => LendingState::Available,
            (StatusKind::Available, _, _) => {
                return Err(inconsistent("available but still held"));
            }
            (StatusKind::InUse, Some(holder), [entry]) if entry.user_id == holder => {
                LendingState::InUse {
                    holder,
                    since: entry.started_at,
                }
            }
            (StatusKind::InUse, None, _) => return Err(inconsistent("in use without a holder")),
            (StatusKind::InUse, Some(_), _) => {
                return Err(inconsistent("in use without exactly one matching open entry"));
            }
        };

        Ok(MangaLending {
            id,
            state,
            updated_at: record.ultima_atualizacao,
            closed,
        })
    }
}

impl From<MangaLending> for LendingRecord {
    fn from(lending: MangaLending) -> Self {
        let historico_uso = lending.history();
        let (status, usuario_atual) = match lending.state {
            LendingState::Available => (StatusKind::Available, None),
            LendingState::InUse { holder, .. } => (StatusKind::InUse, Some(holder)),
        };

        LendingRecord {
            id: lending.id,
            status,
            usuario_atual,
            ultima_atualizacao: lending.updated_at,
            historico_uso,
        }
    }
}

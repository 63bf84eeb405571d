use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    model::{LendingError, MangaLending},
};

use super::Database;

#[derive(Serialize, Deserialize, Default, Debug)]
pub struct LendingDocument {
    #[serde(default)]
    pub mangas: Vec<MangaLending>,
}

impl LendingDocument {
    fn find_mut(&mut self, manga_id: i64) -> Result<&mut MangaLending, Error> {
        self.mangas
            .iter_mut()
            .find(|lending| lending.id() == manga_id)
            .ok_or(Error::Lending(LendingError::NotFound(manga_id)))
    }
}

#[tracing::instrument(name = "get lending status", skip_all, fields(manga_id = manga_id))]
pub async fn get_lending_status(db: &Database, manga_id: i64) -> Result<MangaLending, Error> {
    let found = db
        .lending
        .read()
        .await?
        .mangas
        .into_iter()
        .find(|lending| lending.id() == manga_id);

    if let Some(lending) = found {
        return Ok(lending);
    }

    if is_catalogued(db, manga_id).await? {
        return Ok(MangaLending::new(manga_id));
    }

    Err(Error::Lending(LendingError::NotFound(manga_id)))
}

async fn is_catalogued(db: &Database, manga_id: i64) -> Result<bool, Error> {
    let document = db.mangas.read().await?;

    Ok(document.mangas.iter().any(|manga| manga.id == manga_id))
}

/// Opens an `Available` record for `manga_id` unless one exists.
#[tracing::instrument(name = "ensure lending record", skip_all, fields(manga_id = manga_id))]
pub async fn ensure_lending_record(db: &Database, manga_id: i64) -> Result<MangaLending, Error> {
    db.lending
        .update(|document| {
            if let Some(existing) = document.mangas.iter().find(|l| l.id() == manga_id) {
                return Ok::<_, Error>(existing.clone());
            }

            let lending = MangaLending::new(manga_id);
            document.mangas.push(lending.clone());
            Ok(lending)
        })
        .await
}

async fn take(db: &Database, manga_id: i64, user_id: i64) -> Result<MangaLending, Error> {
    db.lending
        .update(|document| {
            let lending = document.find_mut(manga_id)?;
            lending
                .take(user_id, chrono::Utc::now())
                .map_err(Error::Lending)?;
            Ok::<_, Error>(lending.clone())
        })
        .await
}

/// Marks `manga_id` as held by `user_id`. A catalogued manga whose
/// lending record was never written gets one on first use.
#[tracing::instrument(name = "use manga", skip_all, fields(manga_id = manga_id, user_id = user_id))]
pub async fn use_manga(db: &Database, manga_id: i64, user_id: i64) -> Result<MangaLending, Error> {
    let lending = match take(db, manga_id, user_id).await {
        Err(Error::Lending(LendingError::NotFound(_))) => {
            if !is_catalogued(db, manga_id).await? {
                return Err(Error::Lending(LendingError::NotFound(manga_id)));
            }

            tracing::warn!("Catalogued manga had no lending record");
            ensure_lending_record(db, manga_id).await?;
            take(db, manga_id, user_id).await?
        }
        result => result?,
    };

    tracing::info!("Manga marked as in use");

    Ok(lending)
}

#[tracing::instrument(name = "return manga", skip_all, fields(manga_id = manga_id, user_id = user_id))]
pub async fn return_manga(
    db: &Database,
    manga_id: i64,
    user_id: i64,
) -> Result<MangaLending, Error> {
    let lending = db
        .lending
        .update(|document| {
            let lending = document.find_mut(manga_id)?;
            lending
                .release(user_id, chrono::Utc::now())
                .map_err(Error::Lending)?;
            Ok::<_, Error>(lending.clone())
        })
        .await?;

    tracing::info!("Manga returned");

    Ok(lending)
}

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    model::{Manga, MangaDraft},
    util::slugify,
};

use super::{Database, error::DatabaseError, lending::ensure_lending_record, next_id};

#[derive(Serialize, Deserialize, Default, Debug)]
pub struct MangasDocument {
    #[serde(default)]
    pub mangas: Vec<Manga>,
}

#[tracing::instrument(name = "get mangas", skip_all)]
pub async fn get_mangas(db: &Database) -> Result<Vec<Manga>, Error> {
    Ok(db.mangas.read().await?.mangas)
}

/// Mangas matching `query` on title, author, genres or synopsis. A blank
/// query returns the whole catalogue.
#[tracing::instrument(name = "search mangas", skip_all, fields(query = ?query))]
pub async fn search_mangas(db: &Database, query: Option<&str>) -> Result<Vec<Manga>, Error> {
    let mangas = get_mangas(db).await?;

    let needle = match query.map(str::trim) {
        Some(needle) if !needle.is_empty() => needle.to_lowercase(),
        _ => return Ok(mangas),
    };

    Ok(mangas
        .into_iter()
        .filter(|manga| manga.matches(&needle))
        .collect())
}

#[tracing::instrument(name = "get manga by id", skip_all, fields(manga_id = manga_id))]
pub async fn get_manga_by_id(db: &Database, manga_id: i64) -> Result<Manga, Error> {
    get_mangas(db)
        .await?
        .into_iter()
        .find(|manga| manga.id == manga_id)
        .ok_or(Error::Database(DatabaseError::NotFound))
}

/// Adds a manga to the catalogue and opens its lending record.
#[tracing::instrument(name = "insert manga", skip_all, fields(title = %draft.title))]
pub async fn insert_manga(db: &Database, draft: MangaDraft) -> Result<Manga, Error> {
    let manga = db
        .mangas
        .update(|document| {
            let manga = Manga {
                id: next_id(document.mangas.iter().map(|manga| manga.id)),
                slug: Some(slugify(&draft.title)),
                title: draft.title,
                author: draft.author,
                status: draft.status,
                rating: draft.rating,
                chapters: draft.chapters,
                genres: draft.genres,
                synopsis: draft.synopsis,
                image: draft.image,
                created_at: Some(chrono::Utc::now()),
            };
            document.mangas.push(manga.clone());

            Ok::<_, Error>(manga)
        })
        .await?;

    ensure_lending_record(db, manga.id).await?;

    Ok(manga)
}

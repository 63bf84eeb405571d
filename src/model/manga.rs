use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Manga {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "autor")]
    pub author: String,
    /// Free-text publication status ("Em andamento", "Completo", ...).
    #[serde(default)]
    pub status: Option<String>,
    #[serde(
        rename = "nota",
        default,
        deserialize_with = "deserialize_option_number_from_string"
    )]
    pub rating: Option<f64>,
    #[serde(
        rename = "capitulos",
        default,
        deserialize_with = "deserialize_option_number_from_string"
    )]
    pub chapters: Option<u32>,
    #[serde(rename = "generos", default, deserialize_with = "deserialize_genres")]
    pub genres: Vec<String>,
    #[serde(rename = "sinopse", default)]
    pub synopsis: String,
    /// Donated entries store the cover under `capa`.
    #[serde(
        rename = "imagem",
        alias = "capa",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(
        rename = "dataCadastro",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Genres arrive either as a list or as one comma separated string.
fn deserialize_genres<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Genres {
        List(Vec<String>),
        Joined(String),
        Null,
    }

    let genres = match Genres::deserialize(deserializer)? {
        Genres::List(genres) => genres,
        Genres::Joined(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|genre| !genre.is_empty())
            .map(str::to_string)
            .collect(),
        Genres::Null => Vec::new(),
    };

    Ok(genres)
}

impl Manga {
    /// Case-insensitive substring match over title, author, genres and
    /// synopsis. `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.author.to_lowercase().contains(needle)
            || self
                .genres
                .iter()
                .any(|genre| genre.to_lowercase().contains(needle))
            || self.synopsis.to_lowercase().contains(needle)
    }
}

/// Fields supplied when a manga enters the catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct MangaDraft {
    pub title: String,
    pub author: String,
    pub status: Option<String>,
    pub rating: Option<f64>,
    pub chapters: Option<u32>,
    pub genres: Vec<String>,
    pub synopsis: String,
    pub image: Option<String>,
}

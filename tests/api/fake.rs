use fake::{
    Fake,
    faker::{lorem::en::Sentence, name::en::Name},
};
use manga_library::model::MangaDraft;
use rand::Rng;

const GENRES: [&str; 6] = ["Ação", "Aventura", "Comédia", "Drama", "Fantasia", "Shounen"];

pub fn fake_manga_draft() -> MangaDraft {
    let mut rng = rand::rng();

    MangaDraft {
        title: format!("Manga {}", Name().fake::<String>()),
        author: Name().fake(),
        status: Some("Em andamento".to_string()),
        rating: Some(rng.random_range(0.0..=10.0)),
        chapters: Some(rng.random_range(1..=500)),
        genres: vec![GENRES[rng.random_range(0..GENRES.len())].to_string()],
        synopsis: Sentence(6..12).fake(),
        image: None,
    }
}

pub fn titled_manga_draft(title: &str, author: &str, genres: &[&str], synopsis: &str) -> MangaDraft {
    MangaDraft {
        title: title.to_string(),
        author: author.to_string(),
        genres: genres.iter().map(|genre| genre.to_string()).collect(),
        synopsis: synopsis.to_string(),
        ..fake_manga_draft()
    }
}

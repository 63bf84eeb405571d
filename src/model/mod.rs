pub mod lending;
pub mod manga;
pub mod reading;
pub mod user;

pub use lending::{LendingError, LendingState, MangaLending, UsageEntry};
pub use manga::{Manga, MangaDraft};
pub use reading::{CompletedReading, ReadingHistoryEntry, ReadingTask};
pub use user::{User, UserProfile};

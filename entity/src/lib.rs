mod chapter;
mod filter;
mod manga;
mod page;
mod tag;

pub use chapter::MangaChapter;
pub use filter::{MangaListFilter, SortOrder};
pub use manga::{ContentRating, Manga, MangaState};
pub use page::MangaPage;
pub use tag::{unique_tags, MangaTag};

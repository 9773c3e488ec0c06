mod scraper_queries;

pub use entity::*;
pub use scraper_queries::*;

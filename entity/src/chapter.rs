use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MangaChapter {
    pub id: u64,
    pub name: String,
    pub number: f32,
    /// 0 when the source has no volumes
    pub volume: i32,
    pub url: String,
    /// Epoch millis, 0 when unknown
    pub upload_date: i64,
    pub scanlator: Option<String>,
    pub branch: Option<String>,
    pub source: String,
}

impl PartialEq for MangaChapter {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MangaChapter {}

impl Hash for MangaChapter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

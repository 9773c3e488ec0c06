use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MangaPage {
    pub id: u64,
    pub url: String,
    pub preview: Option<String>,
    pub source: String,
}

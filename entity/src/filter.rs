use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{MangaState, MangaTag};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Updated,
    Popularity,
    Rating,
    Newest,
    Alphabetical,
    Relevance,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MangaListFilter {
    pub query: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<MangaTag>,
    #[serde(default)]
    pub states: BTreeSet<MangaState>,
}

impl MangaListFilter {
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    /// The trimmed query, if there is anything left to search for
    pub fn query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.query().is_none() && self.tags.is_empty() && self.states.is_empty()
    }
}

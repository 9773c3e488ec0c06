use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::{MangaChapter, MangaTag};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MangaState {
    Ongoing,
    Finished,
    Paused,
    Upcoming,
    #[default]
    Unknown,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentRating {
    Safe,
    Suggestive,
    Adult,
    #[default]
    Unknown,
}

/// A title as published by one source.
///
/// `id` is derived from `source` and the relative `url`, so two values with the
/// same id describe the same title even when their other fields differ.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Manga {
    pub id: u64,
    pub source: String,
    /// Relative to the source domain
    pub url: String,
    pub public_url: String,
    pub title: String,
    pub alt_title: Option<String>,
    pub cover_url: Option<String>,
    pub large_cover_url: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<MangaTag>,
    #[serde(default)]
    pub state: MangaState,
    #[serde(default)]
    pub content_rating: ContentRating,
    #[serde(default)]
    pub authors: BTreeSet<String>,
    pub description: Option<String>,
    /// `None` until the details were fetched
    pub chapters: Option<Vec<MangaChapter>>,
}

impl Manga {
    pub fn has_chapters(&self) -> bool {
        self.chapters.as_ref().is_some_and(|chapters| !chapters.is_empty())
    }

    pub fn with_chapters(self, chapters: Vec<MangaChapter>) -> Self {
        Self {
            chapters: Some(chapters),
            ..self
        }
    }

    pub fn with_authors<I, S>(self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            authors: authors.into_iter().map(Into::into).collect(),
            ..self
        }
    }
}

impl PartialEq for Manga {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Manga {}

impl Hash for Manga {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

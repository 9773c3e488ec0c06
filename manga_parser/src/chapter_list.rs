use std::collections::HashSet;

use crate::model::MangaChapter;

/// Collects chapters in insertion order, dropping any whose id was seen before.
#[derive(Debug, Default)]
pub struct ChapterListBuilder {
    chapters: Vec<MangaChapter>,
    ids: HashSet<u64>,
}

impl ChapterListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chapters: Vec::with_capacity(capacity),
            ids: HashSet::with_capacity(capacity),
        }
    }

    /// Returns false if a chapter with the same id is already in the list
    pub fn add(&mut self, chapter: MangaChapter) -> bool {
        if !self.ids.insert(chapter.id) {
            return false;
        }
        self.chapters.push(chapter);
        true
    }

    pub fn add_all<I>(&mut self, chapters: I)
    where
        I: IntoIterator<Item = MangaChapter>,
    {
        for chapter in chapters {
            self.add(chapter);
        }
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Stable, so chapters sharing a number keep their insertion order
    pub fn sort_by_number(&mut self) {
        self.chapters.sort_by(|a, b| a.number.total_cmp(&b.number));
    }

    pub fn into_list(self) -> Vec<MangaChapter> {
        self.chapters
    }
}

impl FromIterator<MangaChapter> for ChapterListBuilder {
    fn from_iter<I: IntoIterator<Item = MangaChapter>>(iter: I) -> Self {
        let mut builder = Self::new();
        builder.add_all(iter);
        builder
    }
}

use std::sync::Arc;

use futures::future::join_all;
use itertools::Itertools;
use manga_parser::{model::Manga, parser::Parser};

/// Chooses the related list out of one candidate list per keyword.
pub trait SelectionPolicy: Send + Sync {
    /// `candidates` are in keyword order
    fn select(&self, candidates: Vec<Vec<Manga>>) -> Vec<Manga>;
}

/// The shortest list that is not empty, the first one on ties. A keyword that
/// still matches but matches little is taken as the most specific one.
#[derive(Clone, Copy, Debug, Default)]
pub struct SmallestNonEmpty;

impl SelectionPolicy for SmallestNonEmpty {
    fn select(&self, candidates: Vec<Vec<Manga>>) -> Vec<Manga> {
        candidates
            .into_iter()
            .min_by_key(|candidate| {
                if candidate.is_empty() {
                    usize::MAX
                } else {
                    candidate.len()
                }
            })
            .unwrap_or_default()
    }
}

/// Finds manga related to a seed by searching every word of its titles.
pub struct RelatedMangaFinder {
    parsers: Vec<Arc<dyn Parser>>,
    policy: Box<dyn SelectionPolicy>,
}

impl RelatedMangaFinder {
    /// Parsers that cannot search are skipped
    pub fn new(parsers: Vec<Arc<dyn Parser>>) -> Self {
        Self {
            parsers: parsers
                .into_iter()
                .filter(|parser| parser.can_search())
                .collect(),
            policy: Box::new(SmallestNonEmpty),
        }
    }

    pub fn with_policy(self, policy: impl SelectionPolicy + 'static) -> Self {
        Self {
            policy: Box::new(policy),
            ..self
        }
    }

    pub fn sources(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|parser| parser.source()).collect()
    }

    pub async fn find_related(&self, seed: &Manga) -> Vec<Manga> {
        let keywords = keywords(seed);
        if keywords.is_empty() {
            return vec![];
        }

        let candidates = join_all(
            keywords
                .iter()
                .map(|keyword| self.search_keyword(seed, keyword)),
        )
        .await;
        debug!(
            "Related to '{}': {:?}",
            seed.title,
            keywords.iter().zip(candidates.iter().map(Vec::len)).collect_vec()
        );

        self.policy.select(candidates)
    }

    /// Results of every source for `keyword` that mention it, seed excluded
    async fn search_keyword(&self, seed: &Manga, keyword: &str) -> Vec<Manga> {
        let needle = keyword.to_lowercase();
        let results = join_all(self.parsers.iter().map(|parser| async move {
            match parser.search(keyword).await {
                Ok(found) => found,
                Err(e) => {
                    error!("[{}] Search for '{}' failed: {:#?}", parser.source(), keyword, e);
                    vec![]
                }
            }
        }))
        .await;

        results
            .into_iter()
            .flatten()
            .filter(|manga| manga.id != seed.id && mentions(manga, &needle))
            .unique_by(|manga| manga.id)
            .collect()
    }
}

fn keywords(seed: &Manga) -> Vec<String> {
    seed.title
        .split_whitespace()
        .chain(seed.alt_title.iter().flat_map(|alt| alt.split_whitespace()))
        .unique()
        .map(str::to_owned)
        .collect()
}

fn mentions(manga: &Manga, needle: &str) -> bool {
    manga.title.to_lowercase().contains(needle)
        || manga
            .alt_title
            .as_ref()
            .is_some_and(|alt| alt.to_lowercase().contains(needle))
}

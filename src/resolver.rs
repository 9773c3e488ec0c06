//! Turns an arbitrary link into a manga of one of the known sources.
//!
//! The source is picked by host. Parsers get a chance to map the link on
//! their own; otherwise the link becomes a seed whose details are fetched,
//! and when the source can search, the seed is matched against the search
//! results for its title and merged with the unique hit.

use std::sync::Arc;

use manga_parser::{
    model::{Manga, MangaState},
    parse_error::Result,
    parser::{MangaParser, Parser},
    util, Url,
};

/// Title of a seed before its details are known
pub const UNKNOWN_TITLE: &str = "<unknown>";

pub struct LinkResolver {
    parser: Arc<MangaParser>,
}

impl LinkResolver {
    pub fn new(parser: Arc<MangaParser>) -> Self {
        Self { parser }
    }

    /// `Ok(None)` when no source serves `url` or the link does not lead to a
    /// manga with chapters. Fetch errors of the link itself are returned.
    pub async fn resolve(&self, url: &Url) -> Result<Option<Manga>> {
        let Some(parser) = self.parser.find_parser(url) else {
            debug!("No parser for {}", url);
            return Ok(None);
        };
        let parser = parser.as_ref();

        if let Some(manga) = parser.resolve_link(url).await? {
            debug!("[{}] resolved {} directly", parser.source(), url);
            return Ok(Some(manga));
        }

        let seed = parser.details(&seed_from(parser, url)).await?;
        if !parser.can_search() {
            return Ok(Some(seed).filter(Manga::has_chapters));
        }

        let Some(query) = search_query(&seed) else {
            return Ok(Some(seed));
        };
        let Some(found) = find_match(parser, &query, url).await else {
            return Ok(Some(seed));
        };

        let found = match parser.details(&found).await {
            Ok(details) => details,
            Err(e) => {
                warn!("[{}] Failed to load {}: {}", parser.source(), found.public_url, e);
                found
            }
        };
        Ok(Some(merge(seed, found)))
    }
}

fn seed_from(parser: &dyn Parser, url: &Url) -> Manga {
    let relative = util::relative_to(url, parser.domain());
    Manga {
        id: parser.generate_uid(&relative),
        source: parser.source().to_owned(),
        url: relative,
        public_url: url.to_string(),
        title: UNKNOWN_TITLE.to_owned(),
        ..Default::default()
    }
}

fn search_query(seed: &Manga) -> Option<String> {
    Some(seed.title.trim())
        .filter(|title| !title.is_empty() && *title != UNKNOWN_TITLE)
        .or_else(|| seed.alt_title.as_deref().map(str::trim).filter(|alt| !alt.is_empty()))
        .or_else(|| seed.authors.iter().map(|author| author.trim()).find(|author| !author.is_empty()))
        .map(str::to_owned)
}

/// The single search result pointing at `url`. Search errors count as no match.
async fn find_match(parser: &dyn Parser, query: &str, url: &Url) -> Option<Manga> {
    let results = match parser.search(query).await {
        Ok(results) => results,
        Err(e) => {
            warn!("[{}] Search for '{}' failed: {}", parser.source(), query, e);
            return None;
        }
    };

    let mut matches = results
        .into_iter()
        .filter(|manga| same_link(&manga.public_url, url));
    match (matches.next(), matches.next()) {
        (Some(found), None) => Some(found),
        (Some(_), Some(_)) => {
            debug!("[{}] '{}' matches {} more than once", parser.source(), query, url);
            None
        }
        _ => None,
    }
}

fn same_link(public_url: &str, url: &Url) -> bool {
    public_url == url.as_str()
        || Url::parse(public_url)
            .is_ok_and(|other| other.host_str() == url.host_str() && other.path() == url.path())
}

fn non_empty<T>(found: Option<T>, seed: Option<T>, is_empty: impl Fn(&T) -> bool) -> Option<T> {
    match found {
        Some(value) if !is_empty(&value) => Some(value),
        found => seed.filter(|value| !is_empty(value)).or(found),
    }
}

/// Fields of `found` win unless they are empty and the seed has them.
fn merge(seed: Manga, found: Manga) -> Manga {
    let blank = |value: &String| value.trim().is_empty();

    let mut authors = found.authors;
    authors.extend(seed.authors);
    let mut tags = found.tags;
    tags.extend(seed.tags);

    Manga {
        chapters: non_empty(found.chapters, seed.chapters, Vec::is_empty),
        description: non_empty(found.description, seed.description, blank),
        cover_url: non_empty(found.cover_url, seed.cover_url, blank),
        large_cover_url: non_empty(found.large_cover_url, seed.large_cover_url, blank),
        alt_title: non_empty(found.alt_title, seed.alt_title, blank),
        state: if found.state == MangaState::Unknown {
            seed.state
        } else {
            found.state
        },
        authors,
        tags,
        ..found
    }
}

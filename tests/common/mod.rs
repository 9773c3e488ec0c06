#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use manga_parser::{
    model::*,
    parse_error::{ParseError, Result},
    parser::Parser,
    Url,
};
use parking_lot::Mutex;

pub fn init() {
    let _ = env_logger::builder()
        .write_style(env_logger::WriteStyle::Always)
        .filter(Some("mangalink"), log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// In-memory source. Details are looked up by relative url, searches by
/// keyword; a keyword mapped to `None` fails.
#[derive(Default)]
pub struct StubParser {
    pub source: &'static str,
    pub hostnames: Vec<&'static str>,
    pub searchable: bool,
    pub relevance: bool,
    pub direct: Option<Manga>,
    pub details: HashMap<String, Manga>,
    pub searches: HashMap<String, Option<Vec<Manga>>>,
    pub searched: Mutex<Vec<(String, SortOrder)>>,
    pub detailed: Mutex<Vec<String>>,
}

impl StubParser {
    pub fn new(source: &'static str, hostnames: Vec<&'static str>) -> Self {
        Self {
            source,
            hostnames,
            searchable: true,
            relevance: true,
            ..Default::default()
        }
    }

    pub fn without_search(self) -> Self {
        Self {
            searchable: false,
            ..self
        }
    }

    pub fn with_details(mut self, url: &str, manga: Manga) -> Self {
        self.details.insert(url.to_owned(), manga);
        self
    }

    pub fn with_search(mut self, keyword: &str, found: Vec<Manga>) -> Self {
        self.searches.insert(keyword.to_owned(), Some(found));
        self
    }

    pub fn with_failing_search(mut self, keyword: &str) -> Self {
        self.searches.insert(keyword.to_owned(), None);
        self
    }

    pub fn searched(&self) -> Vec<String> {
        self.searched.lock().iter().map(|(keyword, _)| keyword.clone()).collect()
    }

    /// A manga of this source at `https://<first hostname><path>`
    pub fn manga(&self, path: &str, title: &str) -> Manga {
        Manga {
            id: self.generate_uid(path),
            source: self.source.to_owned(),
            url: path.to_owned(),
            public_url: format!("https://{}{}", self.domain(), path),
            title: title.to_owned(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Parser for StubParser {
    fn source(&self) -> &'static str {
        self.source
    }

    fn hostnames(&self) -> Vec<&'static str> {
        self.hostnames.clone()
    }

    fn sort_orders(&self) -> Vec<SortOrder> {
        if self.relevance {
            vec![SortOrder::Updated, SortOrder::Relevance]
        } else {
            vec![SortOrder::Popularity]
        }
    }

    fn can_search(&self) -> bool {
        self.searchable
    }

    async fn list_page(
        &self,
        _offset: usize,
        order: SortOrder,
        filter: &MangaListFilter,
    ) -> Result<Vec<Manga>> {
        let Some(keyword) = filter.query() else {
            return Ok(vec![]);
        };
        self.searched.lock().push((keyword.to_owned(), order));
        match self.searches.get(keyword) {
            Some(Some(found)) => Ok(found.clone()),
            Some(None) => Err(ParseError::CloudflareIUAM),
            None => Ok(vec![]),
        }
    }

    async fn details(&self, manga: &Manga) -> Result<Manga> {
        self.detailed.lock().push(manga.url.clone());
        let details = self
            .details
            .get(&manga.url)
            .ok_or(ParseError::MissingMangaTitle)?;
        Ok(Manga {
            id: manga.id,
            source: manga.source.clone(),
            url: manga.url.clone(),
            public_url: manga.public_url.clone(),
            ..details.clone()
        })
    }

    async fn pages(&self, _chapter: &MangaChapter) -> Result<Vec<MangaPage>> {
        Ok(vec![])
    }

    async fn resolve_link(&self, url: &Url) -> Result<Option<Manga>> {
        Ok(self
            .direct
            .clone()
            .filter(|manga| manga.public_url == url.as_str()))
    }
}

pub fn chapters(count: usize) -> Vec<MangaChapter> {
    (1..=count)
        .map(|number| MangaChapter {
            id: number as u64,
            number: number as f32,
            ..Default::default()
        })
        .collect()
}

pub fn arc(parser: StubParser) -> Arc<StubParser> {
    Arc::new(parser)
}

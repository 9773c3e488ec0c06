use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Url;

use crate::{
    id,
    model::*,
    net::{HttpTransport, RateLimitRetry, Transport},
    parse_error::{ParseError, Result},
    plugin::plugins,
    tag_cache::TagSet,
    util,
};

/// One content source.
#[async_trait]
pub trait Parser: Send + Sync {
    /// Namespace of every id this parser generates
    fn source(&self) -> &'static str;
    fn hostnames(&self) -> Vec<&'static str>;
    /// Domain requests are sent to
    fn domain(&self) -> &'static str {
        self.hostnames().first().copied().unwrap_or_default()
    }
    fn sort_orders(&self) -> Vec<SortOrder>;
    fn default_sort_order(&self) -> SortOrder {
        self.sort_orders()
            .first()
            .copied()
            .unwrap_or(SortOrder::Updated)
    }
    fn can_search(&self) -> bool;

    /// The list page containing the item at `offset`
    async fn list_page(
        &self,
        offset: usize,
        order: SortOrder,
        filter: &MangaListFilter,
    ) -> Result<Vec<Manga>>;
    /// `manga` with every field the details page offers, chapters included
    async fn details(&self, manga: &Manga) -> Result<Manga>;
    async fn pages(&self, chapter: &MangaChapter) -> Result<Vec<MangaPage>>;
    async fn tags(&self) -> Result<Arc<TagSet>> {
        Ok(Default::default())
    }
    /// Shortcut for links the parser can turn into a manga on its own
    async fn resolve_link(&self, _url: &Url) -> Result<Option<Manga>> {
        Ok(None)
    }

    /// First result page for `keyword`, by relevance when supported
    async fn search(&self, keyword: &str) -> Result<Vec<Manga>> {
        if !self.can_search() {
            return Err(ParseError::SearchNotImplemented);
        }
        let order = if self.sort_orders().contains(&SortOrder::Relevance) {
            SortOrder::Relevance
        } else {
            self.default_sort_order()
        };
        self.list_page(0, order, &MangaListFilter::search(keyword))
            .await
    }

    fn generate_uid(&self, url: &str) -> u64 {
        id::generate_uid(self.source(), url)
    }

    /// Does `url` belong to this source, by full host or registrable domain
    fn accepts(&self, url: &Url) -> bool {
        let hostnames = self.hostnames();
        url.host_str().is_some_and(|host| hostnames.contains(&host))
            || util::get_hostname(url).is_ok_and(|domain| hostnames.contains(&domain.as_str()))
    }
}

/// What a parser gets injected with on creation.
#[derive(Clone)]
pub struct ParserContext {
    pub transport: Arc<dyn Transport>,
}

impl ParserContext {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

impl Default for ParserContext {
    fn default() -> Self {
        Self::new(Arc::new(RateLimitRetry::new(
            HttpTransport::new(),
            Duration::from_secs(5),
        )))
    }
}

pub struct MangaParser {
    pub parsers: Vec<Arc<dyn Parser>>,
}

impl Default for MangaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MangaParser {
    pub fn new() -> MangaParser {
        Self::with_context(&ParserContext::default())
    }

    pub fn with_context(context: &ParserContext) -> MangaParser {
        MangaParser {
            parsers: plugins(context),
        }
    }

    pub fn from_parsers(parsers: Vec<Arc<dyn Parser>>) -> MangaParser {
        MangaParser { parsers }
    }

    pub fn find_parser(&self, url: &Url) -> Option<&Arc<dyn Parser>> {
        self.parsers.iter().find(|parser| parser.accepts(url))
    }

    pub fn parser_for(&self, url: &Url) -> Result<&Arc<dyn Parser>> {
        self.find_parser(url).ok_or_else(|| {
            ParseError::NoParserFound(url.host_str().unwrap_or_default().to_owned())
        })
    }

    pub fn by_source(&self, source: &str) -> Option<&Arc<dyn Parser>> {
        self.parsers.iter().find(|parser| parser.source() == source)
    }

    pub async fn pages(&self, chapter: &MangaChapter) -> Result<Vec<MangaPage>> {
        let parser = self
            .by_source(&chapter.source)
            .ok_or_else(|| ParseError::NoParserFound(chapter.source.clone()))?;
        parser.pages(chapter).await
    }

    /// Search every searchable parser serving one of `hostnames` (all of them
    /// when empty). Failing parsers are logged and skipped.
    pub async fn search(&self, keyword: &str, hostnames: &[String]) -> Result<Vec<Manga>> {
        let parsers = self.parsers.iter().filter(|parser| {
            parser.can_search()
                && (hostnames.is_empty()
                    || parser
                        .hostnames()
                        .iter()
                        .any(|hn| hostnames.iter().any(|wanted| wanted == hn)))
        });

        let results = join_all(parsers.map(|parser| parser.search(keyword)))
            .await
            .into_iter()
            .filter_map(|result| match result {
                Ok(found) => Some(found),
                Err(e) => {
                    error!("{:#?}", e);
                    None
                }
            })
            .flatten()
            .collect();

        Ok(results)
    }

    pub fn hostnames(&self) -> Vec<&'static str> {
        self.parsers
            .iter()
            .flat_map(|parser| parser.hostnames())
            .collect()
    }

    pub fn can_search(&self) -> Vec<&'static str> {
        self.parsers
            .iter()
            .filter(|parser| parser.can_search())
            .map(|parser| parser.source())
            .collect()
    }
}

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html};
use serde_json::Value;

use crate::{
    chapter_list::ChapterListBuilder,
    codec::{
        crypto_js,
        packer::{self, PackedScript},
    },
    id,
    model::*,
    net::{Request, Response, Transport},
    paginator::Paginator,
    parse_error::{ParseError, Result},
    parser::{Parser, ParserContext},
    tag_cache::{TagCache, TagSet},
    util,
};

lazy_static! {
    static ref CHAPTER_NUMBER: Regex = Regex::new(r"\d+(?:\.\d+)?").unwrap();
    static ref LIST_SPLITTER: Regex = Regex::new(r"\s*[,;\n]\s*").unwrap();
    static ref NON_WORD: Regex = Regex::new(r"\W").unwrap();
}

const PACKED_MARKER: &str = "p,a,c,k,e,d";

/// Parser driven entirely by a [`GenericQuery`].
pub struct GenericQueryParser {
    query: GenericQuery,
    transport: Arc<dyn Transport>,
    paginator: Paginator,
    search_paginator: Paginator,
    tag_cache: TagCache,
}

impl GenericQueryParser {
    pub fn new(query: GenericQuery, context: &ParserContext) -> Self {
        let paginator = || {
            Paginator::new(query.list.page_size).with_first_page(query.list.first_page)
        };
        Self {
            paginator: paginator(),
            search_paginator: paginator(),
            transport: context.transport.clone(),
            tag_cache: TagCache::new(),
            query,
        }
    }

    pub fn query(&self) -> &GenericQuery {
        &self.query
    }

    async fn request(&self, request: Request) -> Result<Response> {
        self.transport.execute(request).await?.error_for_status()
    }

    fn base_url(&self) -> Result<Url> {
        let url = format!("https://{}/", self.domain());
        Url::parse(&url).map_err(|_| ParseError::FailedToMakeAbsolute(url))
    }

    fn new_manga(&self, url: &Url, title: String) -> Manga {
        let relative = util::relative_to(url, self.domain());
        Manga {
            id: id::generate_uid(self.query.source, &relative),
            source: self.query.source.to_owned(),
            url: relative,
            public_url: url.to_string(),
            title,
            ..Default::default()
        }
    }

    fn manga_url(&self, manga: &Manga) -> Result<Url> {
        match Url::parse(&manga.public_url) {
            Ok(url) if self.accepts(&url) => Ok(url),
            _ => util::join_url(&self.base_url()?, &manga.url),
        }
    }

    fn parse_keywords(&self, search: &GenericQuerySearch, keywords: &str) -> String {
        let keywords = match search.keywords {
            KeywordStyle::Plain => keywords.trim().to_owned(),
            KeywordStyle::Underscored => NON_WORD
                .replace_all(&keywords.trim().replace(' ', "_"), "")
                .into_owned(),
        };
        if search.encode {
            urlencoding::encode(&keywords).into_owned()
        } else {
            keywords
        }
    }

    fn parse_path(&self, path: &str) -> Result<Url> {
        let url = format!("https://{}/{}", self.domain(), path.trim_start_matches('/'));
        Url::parse(&url).map_err(|_| ParseError::InvalidSearchUrl(url))
    }

    fn list_url(&self, order: SortOrder, filter: &MangaListFilter, page: usize) -> Result<Url> {
        let list = &self.query.list;
        let page = page.to_string();
        let state = filter
            .states
            .iter()
            .find_map(|wanted| {
                list.states
                    .iter()
                    .find(|(state, _)| state == wanted)
                    .map(|(_, value)| *value)
            });
        if state.is_none() && !filter.states.is_empty() {
            debug!("[{}] no list for states {:?}", self.query.source, filter.states);
        }
        let state = state.unwrap_or(list.any_state);

        if let (Some(tag_path), Some(tag)) = (list.tag_path, filter.tags.iter().next()) {
            return self.parse_path(
                &tag_path
                    .replace("[tag]", &urlencoding::encode(&tag.key))
                    .replace("[state]", state)
                    .replace("[page]", &page),
            );
        }
        let path = list
            .paths
            .iter()
            .find(|(path_order, _)| *path_order == order)
            .or_else(|| list.paths.first())
            .map(|(_, path)| *path)
            .ok_or(ParseError::MissingQuery("list path"))?;
        self.parse_path(&path.replace("[state]", state).replace("[page]", &page))
    }

    fn search_url(&self, search: &GenericQuerySearch, keywords: &str, page: usize) -> Result<Url> {
        self.parse_path(
            &search
                .path
                .replace("[query]", &self.parse_keywords(search, keywords))
                .replace("[page]", &page.to_string()),
        )
    }

    pub fn parse_list(
        &self,
        html: &str,
        location: &Url,
        item: &GenericQueryItem,
    ) -> Result<Vec<Manga>> {
        let document = Html::parse_document(html);
        let href_attrs = util::merge_attr_with_default(&item.href_attr, vec!["href", "src", "data-src"]);
        let cover_attrs = util::merge_vec_with_default(
            &item.cover_attrs,
            vec!["data-src", "data-lazy-src", "data-original", "src"],
        );

        util::select(document.root_element(), item.base)?
            .into_iter()
            .map(|element| -> Result<Manga> {
                let href = match item.href {
                    Some(query) => util::select_first(element, query)?
                        .ok_or(ParseError::MissingSearchHref)?,
                    None => element,
                };
                let url = util::abs_url(location, href, &href_attrs)?;

                let title_element = match item.title {
                    Some(query) if Some(query) != item.href => util::select_first(element, query)?
                        .ok_or(ParseError::MissingSearchTitle)?,
                    _ => href,
                };
                let title = util::text_or_attr(title_element, item.title_attr)
                    .ok_or(ParseError::MissingSearchTitle)?;

                let cover_url = match item.cover {
                    Some(query) => util::select_first(element, query)?
                        .and_then(|img| util::abs_url(location, img, &cover_attrs).ok())
                        .map(String::from),
                    None => None,
                };

                Ok(Manga {
                    cover_url,
                    ..self.new_manga(&url, title)
                })
            })
            .collect()
    }

    fn select_value(
        &self,
        root: ElementRef,
        query: Option<&str>,
        attr: Option<&str>,
    ) -> Result<Option<String>> {
        let Some(query) = query else {
            return Ok(None);
        };
        Ok(util::select_first(root, query)?.and_then(|element| util::text_or_attr(element, attr)))
    }

    fn collect_list(
        &self,
        root: ElementRef,
        query: Option<&str>,
        attr: Option<&str>,
    ) -> Result<Vec<String>> {
        let Some(query) = query else {
            return Ok(vec![]);
        };
        let values = util::select(root, query)?
            .into_iter()
            .filter_map(|element| util::text_or_attr(element, attr))
            .collect_vec();
        let values = if values.len() == 1 {
            LIST_SPLITTER.split(&values[0]).map(str::to_owned).collect()
        } else {
            values
        };
        Ok(values
            .into_iter()
            .filter(|value| !value.is_empty())
            .unique()
            .collect())
    }

    fn tag_from(&self, element: ElementRef) -> Option<MangaTag> {
        let title = util::text(element);
        if title.is_empty() {
            return None;
        }
        let key = element
            .value()
            .attr("href")
            .and_then(|href| href.trim_end_matches('/').rsplit('/').next())
            .filter(|key| !key.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| title.to_lowercase().replace(' ', "-"));
        Some(MangaTag::new(key, title, self.query.source))
    }

    /// Every field of the details page except the chapters
    pub fn parse_details(&self, manga: &Manga, html: &str, location: &Url) -> Result<Manga> {
        let query = &self.query.manga;
        let document = Html::parse_document(html);
        let root = document.root_element();

        let title = self
            .select_value(root, Some(query.title), query.title_attr)?
            .ok_or(ParseError::MissingMangaTitle)?;
        let description = self
            .select_value(root, query.description, query.description_attr)?
            .or_else(|| manga.description.clone());
        let cover_url = match query.cover {
            Some(cover) => {
                let attrs = util::merge_vec_with_default(
                    &query.cover_attrs,
                    vec!["data-src", "data-lazy-src", "src"],
                );
                util::select_first(root, cover)?
                    .and_then(|img| util::abs_url(location, img, &attrs).ok())
                    .map(String::from)
            }
            None => None,
        }
        .or_else(|| manga.cover_url.clone());
        let state = self
            .select_value(root, query.state, query.state_attr)?
            .map(|state| util::string_to_state(&state))
            .unwrap_or(manga.state);
        let alt_title = self
            .collect_list(root, query.alt_titles, query.alt_titles_attr)?
            .into_iter()
            .next()
            .or_else(|| manga.alt_title.clone());
        let authors: BTreeSet<String> = self
            .collect_list(root, query.authors, query.authors_attr)?
            .into_iter()
            .collect();
        let content_rating = match query.adult {
            Some(adult) if util::select_first(root, adult)?.is_some() => ContentRating::Adult,
            _ => manga.content_rating,
        };
        let tags: BTreeSet<MangaTag> = match query.genres {
            Some(genres) => unique_tags(
                util::select(root, genres)?
                    .into_iter()
                    .filter_map(|element| self.tag_from(element)),
            ),
            None => BTreeSet::new(),
        };

        Ok(Manga {
            title,
            alt_title,
            description,
            cover_url,
            state,
            content_rating,
            authors: if authors.is_empty() { manga.authors.clone() } else { authors },
            tags: if tags.is_empty() { manga.tags.clone() } else { tags },
            ..manga.clone()
        })
    }

    pub fn parse_chapters(
        &self,
        html: &str,
        location: &Url,
        manga_title: &str,
    ) -> Result<Vec<MangaChapter>> {
        let query = &self.query.manga.chapter;
        let document = Html::parse_document(html);
        let mut elements = util::select(document.root_element(), query.base)?;
        if query.newest_first {
            elements.reverse();
        }

        let href_attrs = util::merge_attr_with_default(&query.href_attr, vec!["href", "src", "data-src"]);
        let mut chapters = ChapterListBuilder::with_capacity(elements.len());

        for (index, element) in elements.into_iter().enumerate() {
            let href = match query.href {
                Some(href) => util::select_first(element, href)?.ok_or(ParseError::MissingChapterHref)?,
                None => element,
            };
            let url = util::abs_url(location, href, &href_attrs)?;

            let title_element = match query.title {
                Some(title) if Some(title) != query.href => util::select_first(element, title)?
                    .ok_or(ParseError::MissingChapterTitle)?,
                _ => href,
            };
            let name = util::text_or_attr(title_element, query.title_attr)
                .ok_or(ParseError::MissingChapterTitle)?;
            let name = strip_title(&name, manga_title);

            // Number (is in title or we get fallback)
            let fallback = (index + 1) as f32;
            let number = match query.number {
                Some(number) => self.select_value(element, Some(number), query.number_attr)?,
                None => Some(name.clone()),
            }
            .and_then(|number| {
                CHAPTER_NUMBER
                    .find_iter(&number)
                    .last()
                    .and_then(|found| found.as_str().parse().ok())
            })
            .unwrap_or(fallback);

            let upload_date = self
                .select_value(element, query.posted, query.posted_attr)?
                .map_or(0, |posted| util::parse_date_millis(&posted, &self.query.date_formats));

            let relative = util::relative_to(&url, self.domain());
            chapters.add(MangaChapter {
                id: id::generate_uid(self.query.source, &relative),
                name,
                number,
                volume: 0,
                url: relative,
                upload_date,
                scanlator: None,
                branch: None,
                source: self.query.source.to_owned(),
            });
        }

        if query.sort_by_number {
            chapters.sort_by_number();
        }
        Ok(chapters.into_list())
    }

    fn image_urls(&self, document: &Html, location: &Url) -> Result<Vec<Url>> {
        let images = &self.query.images;
        let attrs = util::merge_vec_with_default(
            &images.image_attrs,
            vec!["data-src", "data-lazy-src", "src"],
        );
        util::select(document.root_element(), images.image)?
            .into_iter()
            .map(|img| util::abs_url(location, img, &attrs))
            .collect()
    }

    fn payload_urls(
        &self,
        document: &Html,
        location: &Url,
        payload: &GenericQueryPayload,
    ) -> Result<Option<Vec<Url>>> {
        match payload {
            GenericQueryPayload::Packed {
                host,
                files,
                path,
                query,
            } => {
                let Some(script) = util::select(document.root_element(), "script")?
                    .into_iter()
                    .map(util::raw_text)
                    .find(|script| script.contains(PACKED_MARKER))
                else {
                    return Ok(None);
                };
                let unpacked = PackedScript::parse(&script)
                    .and_then(|packed| packed.unpack())
                    .map_err(|e| ParseError::decode(location, e))?;
                let payload = packer::extract_payload(&unpacked, location.as_str())
                    .map_err(|e| ParseError::decode(location, e))?;
                packed_urls(&payload, host, files, *path, *query).map(Some)
            }
            GenericQueryPayload::CryptoJs {
                script,
                envelope_var,
                passphrase_var,
            } => {
                let Some(script) = util::select_first(document.root_element(), script)?.map(util::raw_text) else {
                    return Ok(None);
                };
                let (Some(envelope), Some(passphrase)) =
                    (js_string_var(&script, envelope_var), js_string_var(&script, passphrase_var))
                else {
                    return Ok(None);
                };
                let plaintext = crypto_js::decrypt_json_envelope(&envelope, &passphrase)
                    .map_err(|e| ParseError::decode(location, e))?;
                let urls = match serde_json::from_str(&plaintext) {
                    // some themes encode the array twice
                    Ok(Value::String(inner)) => serde_json::from_str(&inner),
                    other => other,
                }
                .map_err(|e| ParseError::Other(e.into()))?;
                string_array(&urls)
                    .map(|url| util::join_url(location, url))
                    .collect::<Result<Vec<Url>>>()
                    .map(Some)
            }
        }
    }

    pub fn parse_pages(&self, html: &str, location: &Url) -> Result<Vec<MangaPage>> {
        let document = Html::parse_document(html);
        let payload_urls = match &self.query.images.payload {
            Some(payload) => self.payload_urls(&document, location, payload)?,
            None => None,
        };
        let urls = match payload_urls {
            Some(urls) => urls,
            None => self.image_urls(&document, location)?,
        };
        if urls.is_empty() {
            return Err(ParseError::MissingImages);
        }

        Ok(urls
            .into_iter()
            .map(|url| MangaPage {
                id: id::generate_uid(self.query.source, url.as_str()),
                url: url.to_string(),
                preview: None,
                source: self.query.source.to_owned(),
            })
            .collect())
    }

    pub fn parse_tags(&self, html: &str, tags: &GenericQueryTags) -> Result<TagSet> {
        let document = Html::parse_document(html);
        Ok(unique_tags(
            util::select(document.root_element(), tags.base)?
                .into_iter()
                .filter_map(|element| self.tag_from(element)),
        ))
    }

    async fn load_tags(&self) -> Result<TagSet> {
        let Some(tags) = &self.query.tags else {
            return Ok(TagSet::new());
        };
        let response = self.request(Request::get(self.parse_path(tags.path)?)).await?;
        let parsed = self.parse_tags(&response.body, tags)?;
        debug!("[{}] loaded {} tags", self.query.source, parsed.len());
        Ok(parsed)
    }
}

fn strip_title(name: &str, manga_title: &str) -> String {
    let stripped = name
        .get(..manga_title.len())
        .filter(|prefix| !manga_title.is_empty() && prefix.to_lowercase() == manga_title.to_lowercase())
        .map(|_| name[manga_title.len()..].trim_start_matches([' ', '-', ':']).trim())
        .filter(|rest| !rest.is_empty());
    stripped.unwrap_or(name).to_owned()
}

fn js_string_var(script: &str, name: &str) -> Option<String> {
    let pattern = format!(
        r#"{}\s*=\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")"#,
        regex::escape(name)
    );
    let captures = Regex::new(&pattern).ok()?.captures(script)?;
    let value = captures.get(1).or_else(|| captures.get(2))?;
    Some(util::unescape_js(value.as_str()))
}

fn string_array(value: &Value) -> impl Iterator<Item = &str> {
    value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

fn packed_urls(
    payload: &Value,
    host: &str,
    files: &str,
    path: Option<&str>,
    query: Option<&str>,
) -> Result<Vec<Url>> {
    let prefix = path
        .and_then(|pointer| payload.pointer(pointer))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let params = query
        .and_then(|pointer| payload.pointer(pointer))
        .and_then(Value::as_object)
        .map(|params| {
            params
                .iter()
                .map(|(key, value)| match value {
                    Value::String(value) => (key.clone(), value.clone()),
                    other => (key.clone(), other.to_string()),
                })
                .collect_vec()
        })
        .unwrap_or_default();

    let files = payload.pointer(files).ok_or(ParseError::MissingImages)?;
    string_array(files)
        .map(|file| -> Result<Url> {
            let url = format!("{}{}{}", host, prefix, file);
            let mut url = Url::parse(&url).map_err(|_| ParseError::FailedToMakeAbsolute(url))?;
            if !params.is_empty() {
                url.query_pairs_mut().extend_pairs(&params);
            }
            Ok(url)
        })
        .collect()
}

#[async_trait]
impl Parser for GenericQueryParser {
    fn source(&self) -> &'static str {
        self.query.source
    }

    fn hostnames(&self) -> Vec<&'static str> {
        self.query.hostnames.clone()
    }

    fn sort_orders(&self) -> Vec<SortOrder> {
        let mut orders = self.query.list.paths.iter().map(|(order, _)| *order).collect_vec();
        if self.can_search() && !orders.contains(&SortOrder::Relevance) {
            orders.push(SortOrder::Relevance);
        }
        orders
    }

    fn can_search(&self) -> bool {
        self.query.search.is_some()
    }

    async fn list_page(
        &self,
        offset: usize,
        order: SortOrder,
        filter: &MangaListFilter,
    ) -> Result<Vec<Manga>> {
        let (paginator, item) = match (filter.query(), &self.query.search) {
            (Some(_), Some(search)) => (
                &self.search_paginator,
                search.item.as_ref().unwrap_or(&self.query.list.item),
            ),
            (Some(_), None) => return Err(ParseError::SearchNotImplemented),
            (None, _) => (&self.paginator, &self.query.list.item),
        };
        if offset == 0 {
            paginator.reset();
        }
        let page = paginator.page_for(offset);
        let url = match (filter.query(), &self.query.search) {
            (Some(keywords), Some(search)) => self.search_url(search, keywords, page)?,
            _ => self.list_url(order, filter, page)?,
        };

        let response = self.request(Request::get(url)).await?;
        let list = self.parse_list(&response.body, &response.url, item)?;
        debug!("[{}] offset {} page {}: {} items", self.query.source, offset, page, list.len());
        paginator.record_page_result(offset, page, list.len());
        Ok(list)
    }

    async fn details(&self, manga: &Manga) -> Result<Manga> {
        let response = self.request(Request::get(self.manga_url(manga)?)).await?;
        let details = self.parse_details(manga, &response.body, &response.url)?;

        let chapters = match self.query.manga.chapter.source {
            GenericQueryChapterSource::Inline => {
                self.parse_chapters(&response.body, &response.url, &details.title)?
            }
            GenericQueryChapterSource::AjaxPost(path) => {
                let url = util::join_url(&response.url, path)?;
                let ajax = self
                    .request(Request::post_form(url, std::iter::empty::<(String, String)>()))
                    .await?;
                self.parse_chapters(&ajax.body, &ajax.url, &details.title)?
            }
        };

        Ok(details.with_chapters(chapters))
    }

    async fn pages(&self, chapter: &MangaChapter) -> Result<Vec<MangaPage>> {
        let url = util::join_url(&self.base_url()?, &chapter.url)
            .map_err(|_| ParseError::InvalidChapterUrl(chapter.url.clone()))?;
        let response = self.request(Request::get(url)).await?;
        self.parse_pages(&response.body, &response.url)
    }

    async fn tags(&self) -> Result<Arc<TagSet>> {
        self.tag_cache.get_or_load(|| self.load_tags()).await
    }
}

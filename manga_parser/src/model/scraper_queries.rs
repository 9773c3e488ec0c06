use crate::model::{MangaState, SortOrder};

#[derive(Clone, Debug)]
pub struct GenericQuery {
    /// Namespace of generated ids, like `MADARA`
    pub source: &'static str,
    pub hostnames: Vec<&'static str>,
    pub list: GenericQueryList,
    pub manga: GenericQueryManga,
    pub images: GenericQueryImages,
    pub search: Option<GenericQuerySearch>,
    pub tags: Option<GenericQueryTags>,
    /// Tried before the built-in formats of [`crate::util::try_parse_date`]
    pub date_formats: Vec<&'static str>,
}

impl Default for GenericQuery {
    fn default() -> Self {
        Self {
            source: "",
            hostnames: Default::default(),
            list: Default::default(),
            manga: Default::default(),
            images: Default::default(),
            search: None,
            tags: None,
            date_formats: Default::default(),
        }
    }
}

/// Selectors for one entry of a list or search result page
#[derive(Clone, Debug)]
pub struct GenericQueryItem {
    pub base: &'static str,
    /// if None, [base] will be used
    pub href: Option<&'static str>,
    pub href_attr: Option<&'static str>,
    /// if None, the href element will be used
    pub title: Option<&'static str>,
    pub title_attr: Option<&'static str>,
    pub cover: Option<&'static str>,
    pub cover_attrs: Option<Vec<&'static str>>,
}

impl Default for GenericQueryItem {
    fn default() -> Self {
        Self {
            base: "",
            href: Some("a"),
            href_attr: Default::default(),
            title: Default::default(),
            title_attr: Default::default(),
            cover: Some("img"),
            cover_attrs: Default::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GenericQueryList {
    /// Like `/manga/page/[page]/?m_orderby=latest`, first entry is the default
    pub paths: Vec<(SortOrder, &'static str)>,
    /// Like `/genre/[tag]/page/[page]/`, used when the filter carries a tag
    pub tag_path: Option<&'static str>,
    /// What `[state]` in a path becomes; the first filtered state found here wins
    pub states: Vec<(MangaState, &'static str)>,
    /// `[state]` when no filtered state is listed in `states`
    pub any_state: &'static str,
    pub item: GenericQueryItem,
    pub page_size: usize,
    pub first_page: usize,
}

impl Default for GenericQueryList {
    fn default() -> Self {
        Self {
            paths: Default::default(),
            tag_path: Default::default(),
            states: Default::default(),
            any_state: "",
            item: Default::default(),
            page_size: 20,
            first_page: 1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GenericQueryManga {
    pub title: &'static str,
    pub title_attr: Option<&'static str>,
    pub description: Option<&'static str>,
    pub description_attr: Option<&'static str>,
    pub cover: Option<&'static str>,
    pub cover_attrs: Option<Vec<&'static str>>,
    pub state: Option<&'static str>,
    pub state_attr: Option<&'static str>,
    pub alt_titles: Option<&'static str>,
    pub alt_titles_attr: Option<&'static str>,
    pub authors: Option<&'static str>,
    pub authors_attr: Option<&'static str>,
    pub genres: Option<&'static str>,
    pub genres_attr: Option<&'static str>,
    /// Only present on adult titles, like an 18+ badge
    pub adult: Option<&'static str>,
    pub chapter: GenericQueryMangaChapter,
}

impl Default for GenericQueryManga {
    fn default() -> Self {
        Self {
            title: "h1",
            title_attr: Default::default(),
            description: Default::default(),
            description_attr: Default::default(),
            cover: Default::default(),
            cover_attrs: Default::default(),
            state: Default::default(),
            state_attr: Default::default(),
            alt_titles: Default::default(),
            alt_titles_attr: Default::default(),
            authors: Default::default(),
            authors_attr: Default::default(),
            genres: Default::default(),
            genres_attr: Default::default(),
            adult: Default::default(),
            chapter: Default::default(),
        }
    }
}

/// Where the chapter list lives when it is not part of the details page
#[derive(Clone, Debug)]
pub enum GenericQueryChapterSource {
    /// The details page itself
    Inline,
    /// POST to this path, relative to the manga url
    AjaxPost(&'static str),
}

#[derive(Clone, Debug)]
pub struct GenericQueryMangaChapter {
    pub base: &'static str,
    /// if None, [base] will be used
    pub href: Option<&'static str>,
    pub href_attr: Option<&'static str>,
    pub title: Option<&'static str>,
    pub title_attr: Option<&'static str>,
    pub posted: Option<&'static str>,
    pub posted_attr: Option<&'static str>,
    pub number: Option<&'static str>,
    pub number_attr: Option<&'static str>,
    /// Sites list the latest chapter first; the list is reversed to ascending
    pub newest_first: bool,
    /// Chapters come in several sections (volumes, extras) and are ordered by number afterwards
    pub sort_by_number: bool,
    pub source: GenericQueryChapterSource,
}

impl Default for GenericQueryMangaChapter {
    fn default() -> Self {
        Self {
            base: "ul li, ol li",
            href: Default::default(),
            href_attr: Default::default(),
            title: Default::default(),
            title_attr: Default::default(),
            posted: Default::default(),
            posted_attr: Default::default(),
            number: Default::default(),
            number_attr: Default::default(),
            newest_first: true,
            sort_by_number: false,
            source: GenericQueryChapterSource::Inline,
        }
    }
}

/// Page lists hidden inside scripts
#[derive(Clone, Debug)]
pub enum GenericQueryPayload {
    /// A `p,a,c,k,e,d` script evaluating to `f({...})`; page urls are
    /// `host + path + file` with the `query` object appended as parameters
    Packed {
        host: &'static str,
        /// JSON pointers into the payload
        files: &'static str,
        path: Option<&'static str>,
        query: Option<&'static str>,
    },
    /// A CryptoJS JSON envelope and its passphrase in one script, the
    /// plaintext being a (possibly JSON encoded) array of image urls
    CryptoJs {
        script: &'static str,
        envelope_var: &'static str,
        passphrase_var: &'static str,
    },
}

#[derive(Clone, Debug)]
pub struct GenericQueryImages {
    pub image: &'static str,
    pub image_attrs: Option<Vec<&'static str>>,
    /// Tried first; the plain image selector is the fallback
    pub payload: Option<GenericQueryPayload>,
}

impl Default for GenericQueryImages {
    fn default() -> Self {
        Self {
            image: "img",
            image_attrs: Default::default(),
            payload: Default::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GenericQuerySearch {
    /// Like `/search?q=[query]&page=[page]` or `/search/[query]`
    ///
    /// Will be translated to https://<domain><path>
    pub path: &'static str,
    /// if None, the list item selectors are used
    pub item: Option<GenericQueryItem>,
    pub encode: bool,
    pub keywords: KeywordStyle,
}

/// How keywords are rewritten before they are put in the search path
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeywordStyle {
    #[default]
    Plain,
    /// Spaces become `_`, every other non-word character is dropped
    Underscored,
}

impl Default for GenericQuerySearch {
    fn default() -> Self {
        Self {
            path: "",
            item: Default::default(),
            encode: true,
            keywords: KeywordStyle::Plain,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GenericQueryTags {
    /// Page listing every genre
    pub path: &'static str,
    /// Anchors; the key is the last path segment of the href
    pub base: &'static str,
}

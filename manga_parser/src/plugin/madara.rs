use super::generic_query_parser::GenericQueryParser;
use crate::{
    model::{
        GenericQuery, GenericQueryChapterSource, GenericQueryImages, GenericQueryItem,
        GenericQueryList, GenericQueryManga, GenericQueryMangaChapter, GenericQueryPayload,
        GenericQuerySearch, GenericQueryTags, SortOrder,
    },
    parser::ParserContext,
};

/// A WordPress site running the Madara theme. Every site is its own source.
pub fn new(
    context: &ParserContext,
    source: &'static str,
    hostnames: Vec<&'static str>,
) -> GenericQueryParser {
    let query = GenericQuery {
        source,
        list: GenericQueryList {
            paths: vec![
                (SortOrder::Updated, "/manga/page/[page]/?m_orderby=latest"),
                (SortOrder::Popularity, "/manga/page/[page]/?m_orderby=views"),
                (SortOrder::Rating, "/manga/page/[page]/?m_orderby=rating"),
                (SortOrder::Newest, "/manga/page/[page]/?m_orderby=new-manga"),
                (SortOrder::Alphabetical, "/manga/page/[page]/?m_orderby=alphabet"),
            ],
            tag_path: Some("/manga-genre/[tag]/page/[page]/"),
            item: GenericQueryItem {
                base: "div.page-item-detail, div.row.c-tabs-item__content",
                href: Some("h3 a, div.post-title a"),
                cover: Some("img"),
                cover_attrs: Some(vec!["data-src", "data-lazy-src", "src"]),
                ..Default::default()
            },
            page_size: 20,
            first_page: 1,
            ..Default::default()
        },
        manga: GenericQueryManga {
            title: "div.post-title h1, div.post-title h3",
            description: Some("div.description-summary div.summary__content, div.summary__content p, div.dsct p"),
            state: Some("div.post-status div.summary-content"),
            cover: Some("div.summary_image img"),
            cover_attrs: Some(vec!["data-src", "data-lazy-src", "src"]),
            authors: Some("div.author-content > a"),
            genres: Some("div.genres-content > a"),
            adult: Some("span.manga-title-badges.adult"),
            alt_titles: Some("div.post-content_item.alternative div.summary-content"),
            chapter: GenericQueryMangaChapter {
                base: "li.wp-manga-chapter, ul.row-content-chapter li",
                href: Some("a"),
                posted: Some("span.chapter-release-date a, span.chapter-release-date i"),
                posted_attr: Some("title"),
                newest_first: true,
                source: GenericQueryChapterSource::AjaxPost("ajax/chapters/"),
                ..Default::default()
            },
            ..Default::default()
        },
        images: GenericQueryImages {
            image: "div.page-break img.wp-manga-chapter-img, div.reading-content img",
            payload: Some(GenericQueryPayload::CryptoJs {
                script: "#chapter-protector-data",
                envelope_var: "chapter_data",
                passphrase_var: "wpmangaprotectornonce",
            }),
            ..Default::default()
        },
        search: Some(GenericQuerySearch {
            path: "/page/[page]/?s=[query]&post_type=wp-manga",
            encode: true,
            ..Default::default()
        }),
        tags: Some(GenericQueryTags {
            path: "/manga/",
            base: "div.genres__collapse ul.list-unstyled li a",
        }),
        hostnames,
        date_formats: vec!["%B-%d-%Y", "%m-%d-%Y", "%d-%m-%Y"],
    };
    GenericQueryParser::new(query, context)
}

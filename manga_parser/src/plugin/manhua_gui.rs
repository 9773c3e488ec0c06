use super::generic_query_parser::GenericQueryParser;
use crate::{
    model::{
        GenericQuery, GenericQueryImages, GenericQueryItem, GenericQueryList, GenericQueryManga,
        GenericQueryMangaChapter, GenericQueryPayload, GenericQuerySearch, GenericQueryTags,
        SortOrder,
    },
    parser::ParserContext,
};

pub const SOURCE: &str = "MANHUAGUI";

/// manhuagui.com, page lists are packed scripts with an lz-string symbol table
pub fn new(context: &ParserContext) -> GenericQueryParser {
    let query = GenericQuery {
        source: SOURCE,
        list: GenericQueryList {
            paths: vec![
                (SortOrder::Updated, "/list/update_p[page].html"),
                (SortOrder::Popularity, "/list/view_p[page].html"),
                (SortOrder::Newest, "/list/index_p[page].html"),
                (SortOrder::Rating, "/list/rate_p[page].html"),
            ],
            tag_path: Some("/list/[tag]/update_p[page].html"),
            item: GenericQueryItem {
                base: "#contList > li",
                href: Some("a.bcover"),
                title: Some("p.ell a"),
                cover: Some("a.bcover img"),
                cover_attrs: Some(vec!["data-src", "src"]),
                ..Default::default()
            },
            page_size: 42,
            first_page: 1,
            ..Default::default()
        },
        manga: GenericQueryManga {
            title: "div.book-title h1",
            alt_titles: Some("div.book-title h2"),
            description: Some("#intro-all"),
            cover: Some("p.hcover img"),
            state: Some("li.status span span"),
            authors: Some("ul.detail-list li:nth-child(2) span:nth-child(2) a"),
            genres: Some("ul.detail-list li:nth-child(2) span:nth-child(1) a"),
            chapter: GenericQueryMangaChapter {
                base: "div.chapter-list ul li",
                href: Some("a"),
                title_attr: Some("title"),
                newest_first: true,
                sort_by_number: true,
                ..Default::default()
            },
            ..Default::default()
        },
        images: GenericQueryImages {
            image: "#mangaFile",
            payload: Some(GenericQueryPayload::Packed {
                host: "https://i.hamreus.com",
                files: "/files",
                path: Some("/path"),
                query: Some("/sl"),
            }),
            ..Default::default()
        },
        search: Some(GenericQuerySearch {
            path: "/s/[query]_p[page].html",
            item: Some(GenericQueryItem {
                base: "div.book-result li.cf",
                href: Some("div.book-detail dt a"),
                cover: Some("div.book-cover img"),
                ..Default::default()
            }),
            encode: true,
            ..Default::default()
        }),
        tags: Some(GenericQueryTags {
            path: "/list/",
            base: "div.filter.genre ul li a",
        }),
        hostnames: vec!["www.manhuagui.com", "manhuagui.com", "tw.manhuagui.com"],
        date_formats: vec!["%Y-%m-%d"],
    };
    GenericQueryParser::new(query, context)
}

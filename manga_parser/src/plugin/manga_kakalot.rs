use super::generic_query_parser::GenericQueryParser;
use crate::{
    model::{
        GenericQuery, GenericQueryImages, GenericQueryItem, GenericQueryList, GenericQueryManga,
        GenericQueryMangaChapter, GenericQuerySearch, GenericQueryTags, KeywordStyle, MangaState,
        SortOrder,
    },
    parser::ParserContext,
};

/// Mangakakalot and its Manganato sibling share one layout
pub fn new(
    context: &ParserContext,
    source: &'static str,
    hostnames: Vec<&'static str>,
) -> GenericQueryParser {
    let query = GenericQuery {
        source,
        list: GenericQueryList {
            paths: vec![
                (SortOrder::Updated, "/manga_list?type=latest&category=all&state=[state]&page=[page]"),
                (SortOrder::Popularity, "/manga_list?type=topview&category=all&state=[state]&page=[page]"),
                (SortOrder::Newest, "/manga_list?type=newest&category=all&state=[state]&page=[page]"),
            ],
            tag_path: Some("/manga_list?type=latest&category=[tag]&state=[state]&page=[page]"),
            states: vec![
                (MangaState::Ongoing, "ongoing"),
                (MangaState::Finished, "completed"),
            ],
            any_state: "all",
            item: GenericQueryItem {
                base: "div.list-truyen-item-wrap, div.content-genres-item",
                href: Some("h3 a"),
                cover: Some("a img"),
                ..Default::default()
            },
            page_size: 24,
            first_page: 1,
        },
        manga: GenericQueryManga {
            title: "ul.manga-info-text h1, div.story-info-right h1",
            description: Some("#noidungm, #panel-story-info-description"),
            cover: Some("div.manga-info-pic > img, span.info-image > img"),
            cover_attrs: Some(vec!["data-src", "src"]),
            state: Some("ul.manga-info-text li:nth-child(3), td.table-value:nth-of-type(1)"),
            genres: Some("ul.manga-info-text li a[href*=category], td.table-value a[href*=genre]"),
            alt_titles: Some("h2.story-alternative, td.table-value h2"),
            authors: Some("ul.manga-info-text li a[href*=author], td.table-value a[href*=author]"),
            chapter: GenericQueryMangaChapter {
                base: "div.chapter-list div.row, ul.row-content-chapter li",
                href: Some("span a, a"),
                posted: Some("span[title], span.chapter-time"),
                posted_attr: Some("title"),
                newest_first: true,
                ..Default::default()
            },
            ..Default::default()
        },
        images: GenericQueryImages {
            image: "div.container-chapter-reader img, div.vung-doc img",
            ..Default::default()
        },
        search: Some(GenericQuerySearch {
            path: "/search/story/[query]?page=[page]",
            item: Some(GenericQueryItem {
                base: "div.story_item, div.search-story-item",
                href: Some("h3 > a"),
                cover: Some("a img"),
                ..Default::default()
            }),
            encode: false,
            keywords: KeywordStyle::Underscored,
        }),
        tags: Some(GenericQueryTags {
            path: "/manga_list",
            base: "div.panel-category a[href*=category]",
        }),
        hostnames,
        date_formats: vec!["%b-%d-%Y-%H:%M", "%b-%d-%y-%H:%M"],
    };
    GenericQueryParser::new(query, context)
}

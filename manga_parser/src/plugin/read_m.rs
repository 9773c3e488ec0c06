use super::generic_query_parser::GenericQueryParser;
use crate::{
    model::{
        GenericQuery, GenericQueryImages, GenericQueryItem, GenericQueryList, GenericQueryManga,
        GenericQueryMangaChapter, SortOrder,
    },
    parser::ParserContext,
};

pub const SOURCE: &str = "READM";

/// readm.org, no search
pub fn new(context: &ParserContext) -> GenericQueryParser {
    GenericQueryParser::new(
        GenericQuery {
            source: SOURCE,
            list: GenericQueryList {
                paths: vec![
                    (SortOrder::Updated, "/latest-releases/[page]"),
                    (SortOrder::Popularity, "/popular-manga/[page]"),
                ],
                item: GenericQueryItem {
                    base: "ul.clearfix.latest-updates li, div.poster-with-subject",
                    href: Some("h2 a, a"),
                    ..Default::default()
                },
                ..Default::default()
            },
            manga: GenericQueryManga {
                title: "h1.page-title",
                description: Some("div.series-summary-wrapper p span"),
                cover: Some("img.series-profile-thumb"),
                state: Some("span.series-status"),
                alt_titles: Some("div.sub-title.pt-sm"),
                authors: Some("#first_episode a small"),
                genres: Some("div.series-summary-wrapper div.ui.list div.item a"),
                chapter: GenericQueryMangaChapter {
                    base: "div.season_start tr",
                    href: Some("td > h6 > a"),
                    posted: Some("td.episode-date"),
                    newest_first: true,
                    ..Default::default()
                },
                ..Default::default()
            },
            images: GenericQueryImages {
                image: "center img",
                ..Default::default()
            },
            search: None,
            hostnames: vec!["readm.org", "readm.today"],
            ..Default::default()
        },
        context,
    )
}
